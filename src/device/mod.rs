//! 设备模块
//!
//! 设备、电池、位置/距离、拓扑判定以及仿真范围内的设备注册表。

// 子模块声明
mod battery;
#[allow(clippy::module_inception)]
mod device;
mod id;
mod position;
mod registry;
pub mod topology;

// 重新导出公共接口
pub use battery::{Battery, DEFAULT_BASE_COST, DEFAULT_BATTERY_CAPACITY, EnergyModel};
pub use device::Device;
pub use id::DeviceId;
pub use position::{DistanceMetric, EARTH_RADIUS_M, Position};
pub use registry::{DeviceRegistry, PositionSnapshot};
