//! 运行结果
//!
//! 终止原因、阶段快照与整次运行的汇总报告。

use super::time::SimTime;
use crate::device::DeviceId;
use serde::Serialize;
use std::time::Duration;

/// 运行为何结束
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationReason {
    /// 调度器里没有事件了
    Exhausted,
    /// 下一个事件的日期超过仿真时间预算
    SimulationTimeExceeded { date: SimTime },
    /// 墙钟时间超过逻辑预算
    LogicTimeExceeded { elapsed: Duration },
    /// 被外部停止
    Aborted,
}

impl TerminationReason {
    pub fn is_budget(&self) -> bool {
        matches!(
            self,
            TerminationReason::SimulationTimeExceeded { .. }
                | TerminationReason::LogicTimeExceeded { .. }
        )
    }
}

/// 某个阶段边界上的设备状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultSnapshot {
    pub step: SimTime,
    pub events_sent: u64,
    pub battery: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceResult {
    pub id: DeviceId,
    pub label: String,
    pub battery: f64,
    pub events_sent: u64,
    pub snapshots: Vec<ResultSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub name: String,
    pub reason: TerminationReason,
    pub events_applied: u64,
    pub receptions: u64,
    pub detections: u64,
    pub checkpoints: u64,
    pub last_date: Option<SimTime>,
    pub elapsed: Duration,
    pub devices: Vec<DeviceResult>,
    /// 关闭时仍停在行为内部、已被分离的设备（其行为随线程丢失）
    pub detached: Vec<DeviceId>,
}

impl SimulationReport {
    pub fn device(&self, id: DeviceId) -> Option<&DeviceResult> {
        self.devices.iter().find(|d| d.id == id)
    }
}
