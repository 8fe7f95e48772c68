//! 仿真配置

use super::time::SimTime;
use crate::device::DEFAULT_BASE_COST;
use std::path::PathBuf;
use std::time::Duration;

/// 默认仿真时间预算：100 小时
pub const DEFAULT_SIMULATION_TIME: SimTime = SimTime(360_000_000 * 1_000_000);
/// 默认逻辑（墙钟）预算：60 秒
pub const DEFAULT_LOGIC_BUDGET: Duration = Duration::from_secs(60);
/// 默认阶段步长：1 小时
pub const DEFAULT_STEP: SimTime = SimTime(3_600_000 * 1_000_000);

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub name: String,
    pub log_file: PathBuf,
    /// 事件日期上限
    pub simulation_time: SimTime,
    /// 墙钟运行上限
    pub logic_budget: Duration,
    /// 阶段快照步长；为 0 时不做快照
    pub step: SimTime,
    /// 一次收发的基础能耗
    pub base_cost: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            log_file: PathBuf::from("log.txt"),
            simulation_time: DEFAULT_SIMULATION_TIME,
            logic_budget: DEFAULT_LOGIC_BUDGET,
            step: DEFAULT_STEP,
            base_cost: DEFAULT_BASE_COST,
        }
    }
}
