//! 设备行为
//!
//! 决定设备“下一次什么时候发什么”。仿真核心只通过 `Behavior::next_send`
//! 看到它；具体脚本语言与核心无关。

use crate::device::Position;
use crate::sim::SimTime;

/// 一次计划中的发送
#[derive(Debug, Clone, PartialEq)]
pub struct SendPlan {
    /// 相对于设备上一次事件日期的延迟
    pub delay: SimTime,
    pub message: String,
    pub power_ratio: f64,
    pub epsilon: f64,
    /// 移动设备在该事件时刻的新位置
    pub relocate: Option<Position>,
}

impl SendPlan {
    pub fn new(delay: SimTime, message: impl Into<String>) -> Self {
        Self {
            delay,
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

    pub fn with_relocate(mut self, to: Position) -> Self {
        self.relocate = Some(to);
        self
    }
}

/// 设备行为接口。在设备自己的线程里被调用。
pub trait Behavior: Send + 'static {
    fn name(&self) -> &str {
        "custom"
    }

    /// 返回下一次发送；`now` 是该设备上一次事件的日期（初始为 0）。
    /// 返回 None 表示该设备不再发送。
    fn next_send(&mut self, now: SimTime) -> Option<SendPlan>;
}

/// 从不发送（被动接收设备）
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Behavior for Idle {
    fn name(&self) -> &str {
        "idle"
    }

    fn next_send(&mut self, _now: SimTime) -> Option<SendPlan> {
        None
    }
}

/// 固定周期发送
#[derive(Debug, Clone)]
pub struct Periodic {
    interval: SimTime,
    first_delay: SimTime,
    message: String,
    power_ratio: f64,
    limit: Option<u64>,
    sent: u64,
}

impl Periodic {
    pub fn new(interval: SimTime, message: impl Into<String>) -> Self {
        Self {
            interval,
            first_delay: interval,
            message: message.into(),
            power_ratio: 1.0,
            limit: None,
            sent: 0,
        }
    }

    /// 第一次发送相对 0 时刻的延迟（默认等于周期）
    pub fn starting_at(mut self, first_delay: SimTime) -> Self {
        self.first_delay = first_delay;
        self
    }

    pub fn with_power_ratio(mut self, power_ratio: f64) -> Self {
        self.power_ratio = power_ratio;
        self
    }

    /// 最多发送 `limit` 次
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Behavior for Periodic {
    fn name(&self) -> &str {
        "periodic"
    }

    fn next_send(&mut self, _now: SimTime) -> Option<SendPlan> {
        if self.limit.is_some_and(|limit| self.sent >= limit) {
            return None;
        }
        let delay = if self.sent == 0 {
            self.first_delay
        } else {
            self.interval
        };
        self.sent += 1;
        Some(SendPlan::new(delay, self.message.clone()).with_power_ratio(self.power_ratio))
    }
}
