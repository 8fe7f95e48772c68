//! 电池模型
//!
//! 每个设备持有一块可耗尽的电池；只有驱动线程在应用事件时修改它。

use serde::{Deserialize, Serialize};

/// 默认电池容量（能量单位）
pub const DEFAULT_BATTERY_CAPACITY: f64 = 100_000_000.0;

/// 一次发送/接收的默认基础能耗（再乘以事件的 power ratio）。
pub const DEFAULT_BASE_COST: f64 = 0.000_000_000_08 / 100.0;

/// 可耗尽的能量计数器。
///
/// 不做下限截断：容量可以被扣成负数，`is_depleted` 只负责报告。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    capacity: f64,
}

impl Battery {
    pub fn new(capacity: f64) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: f64) {
        self.capacity = capacity;
    }

    /// 扣除 `amount` 个能量单位
    pub fn consume(&mut self, amount: f64) {
        self.capacity -= amount;
    }

    pub fn is_depleted(&self) -> bool {
        self.capacity <= 0.0
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::new(DEFAULT_BATTERY_CAPACITY)
    }
}

/// 能耗模型：一次收发的代价 = `base_cost * power_ratio`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyModel {
    pub base_cost: f64,
}

impl EnergyModel {
    pub fn new(base_cost: f64) -> Self {
        Self { base_cost }
    }

    pub fn transfer_cost(&self, power_ratio: f64) -> f64 {
        self.base_cost * power_ratio
    }
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_COST)
    }
}
