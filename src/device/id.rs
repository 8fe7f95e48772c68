//! 标识符类型
//!
//! 定义设备的唯一标识符。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 设备标识符（由 `DeviceRegistry` 分配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
