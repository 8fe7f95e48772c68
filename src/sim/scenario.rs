//! 场景描述（JSON）
//!
//! 描述一次运行的配置与设备集合，可构建 `SimulationConfig` 和 `DeviceRegistry`。

use super::config::SimulationConfig;
use super::error::SimError;
use super::time::SimTime;
use crate::device::{DeviceRegistry, DistanceMetric, Position};
use crate::script::{Behavior, Idle, Periodic, Program};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCENARIO_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub simulation: Option<SimulationSpec>,
    #[serde(default)]
    pub defaults: Option<DeviceDefaults>,
    pub devices: Vec<DeviceSpec>,
}

/// 运行参数（时间单位均为毫秒）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub simulation_ms: Option<u64>,
    #[serde(default)]
    pub logic_ms: Option<u64>,
    #[serde(default)]
    pub step_ms: Option<u64>,
    #[serde(default)]
    pub base_cost: Option<f64>,
    #[serde(default)]
    pub distance: Option<DistanceMetric>,
}

/// 设备字段的缺省值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceDefaults {
    #[serde(default)]
    pub radio_radius: Option<f64>,
    #[serde(default)]
    pub capture_radius: Option<f64>,
    #[serde(default)]
    pub battery: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpec {
    #[serde(default)]
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub radio_radius: Option<f64>,
    #[serde(default)]
    pub capture_radius: Option<f64>,
    #[serde(default)]
    pub with_radio: Option<bool>,
    #[serde(default)]
    pub with_sensor: Option<bool>,
    #[serde(default)]
    pub mobile: Option<bool>,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default)]
    pub behavior: Option<BehaviorSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorSpec {
    Idle,
    Periodic {
        interval_ms: u64,
        #[serde(default)]
        first_ms: Option<u64>,
        message: String,
        #[serde(default)]
        power_ratio: Option<f64>,
        #[serde(default)]
        limit: Option<u64>,
    },
    /// 内联脚本（每个元素一行）
    Script { lines: Vec<String> },
    /// 脚本文件，相对路径基于场景文件所在目录
    ScriptFile { path: PathBuf },
}

impl ScenarioSpec {
    pub fn from_json(raw: &str) -> Result<Self, SimError> {
        let spec: ScenarioSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCENARIO_SCHEMA_VERSION {
            return Err(SimError::Scenario(format!(
                "unsupported schema_version {}",
                spec.schema_version
            )));
        }
        Ok(spec)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let raw = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn config(&self) -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        let Some(s) = &self.simulation else {
            return cfg;
        };
        if let Some(name) = &s.name {
            cfg.name = name.clone();
        }
        if let Some(log_file) = &s.log_file {
            cfg.log_file = log_file.clone();
        }
        if let Some(ms) = s.simulation_ms {
            cfg.simulation_time = SimTime::from_millis(ms);
        }
        if let Some(ms) = s.logic_ms {
            cfg.logic_budget = Duration::from_millis(ms);
        }
        if let Some(ms) = s.step_ms {
            cfg.step = SimTime::from_millis(ms);
        }
        if let Some(base_cost) = s.base_cost {
            cfg.base_cost = base_cost;
        }
        cfg
    }

    pub fn distance(&self) -> DistanceMetric {
        self.simulation
            .as_ref()
            .and_then(|s| s.distance)
            .unwrap_or_default()
    }

    /// 构建设备注册表；`base_dir` 用于解析相对的脚本文件路径
    pub fn build_registry(&self, base_dir: &Path) -> Result<DeviceRegistry, SimError> {
        let defaults = self.defaults.clone().unwrap_or_default();
        let mut registry = DeviceRegistry::new(self.distance());

        for (idx, spec) in self.devices.iter().enumerate() {
            let label = spec.label.clone().unwrap_or_else(|| format!("S{idx}"));
            let behavior = build_behavior(spec.behavior.as_ref(), &label, base_dir)?;

            let dev = registry.add(label, Position::new(spec.x, spec.y));
            dev.radio_radius = spec.radio_radius.or(defaults.radio_radius).unwrap_or(0.0);
            dev.capture_radius = spec
                .capture_radius
                .or(defaults.capture_radius)
                .unwrap_or(0.0);
            dev.with_radio = spec.with_radio.unwrap_or(true);
            dev.with_sensor = spec.with_sensor.unwrap_or(false);
            dev.mobile = spec.mobile.unwrap_or(false);
            if let Some(capacity) = spec.battery.or(defaults.battery) {
                dev.battery.set_capacity(capacity);
            }
            dev.set_behavior(behavior);
        }
        Ok(registry)
    }
}

fn build_behavior(
    spec: Option<&BehaviorSpec>,
    label: &str,
    base_dir: &Path,
) -> Result<Box<dyn Behavior>, SimError> {
    let script_err = |source| SimError::Script {
        device: label.to_string(),
        source,
    };
    let behavior: Box<dyn Behavior> = match spec {
        None | Some(BehaviorSpec::Idle) => Box::new(Idle),
        Some(BehaviorSpec::Periodic {
            interval_ms,
            first_ms,
            message,
            power_ratio,
            limit,
        }) => {
            let mut p = Periodic::new(SimTime::from_millis(*interval_ms), message.clone());
            if let Some(ms) = first_ms {
                p = p.starting_at(SimTime::from_millis(*ms));
            }
            if let Some(ratio) = power_ratio {
                p = p.with_power_ratio(*ratio);
            }
            if let Some(n) = limit {
                p = p.with_limit(*n);
            }
            Box::new(p)
        }
        Some(BehaviorSpec::Script { lines }) => {
            Box::new(Program::parse(&lines.join("\n")).map_err(script_err)?)
        }
        Some(BehaviorSpec::ScriptFile { path }) => {
            let full = base_dir.join(path);
            let raw = fs::read_to_string(&full).map_err(|source| SimError::Io {
                path: full.clone(),
                source,
            })?;
            Box::new(Program::parse(&raw).map_err(script_err)?)
        }
    };
    Ok(behavior)
}
