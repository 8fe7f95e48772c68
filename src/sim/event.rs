//! 发送事件
//!
//! 某个设备在未来某一时刻的一次发送。提交给调度器后不再修改。

use super::time::SimTime;
use crate::device::{DeviceId, Position};

/// 事件：设备 `device` 在 `date` 发送 `message`。
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub device: DeviceId,
    pub date: SimTime,
    pub message: String,
    /// 收发能耗倍数
    pub power_ratio: f64,
    /// 调度抖动/容差，仅用于日志
    pub epsilon: f64,
    /// 移动设备在该时刻的新位置
    pub relocate: Option<Position>,
}

impl Event {
    pub fn new(device: DeviceId, date: SimTime, message: impl Into<String>) -> Self {
        Self {
            device,
            date,
            message: message.into(),
            power_ratio: 1.0,
            epsilon: 0.0,
            relocate: None,
        }
    }

    pub fn with_power_ratio(mut self, power_ratio: f64) -> Self {
        self.power_ratio = power_ratio;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}
