//! 设备
//!
//! 定义无线传感器网络中的一个设备：位置、半径、能力开关、电池与行为。

use super::battery::Battery;
use super::id::DeviceId;
use super::position::{DistanceMetric, Position};
use crate::script::{Behavior, Idle};
use std::fmt;

/// 网络中的一个设备（传感器、网关、移动目标……）
pub struct Device {
    id: DeviceId,
    label: String,
    pub position: Position,
    pub radio_radius: f64,
    pub capture_radius: f64,
    /// 是否带无线电
    pub with_radio: bool,
    /// 是否带感知单元（capture）
    pub with_sensor: bool,
    pub mobile: bool,
    pub battery: Battery,
    behavior: Box<dyn Behavior>,
}

impl Device {
    pub(crate) fn new(id: DeviceId, label: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            label: label.into(),
            position,
            radio_radius: 0.0,
            capture_radius: 0.0,
            with_radio: true,
            with_sensor: false,
            mobile: false,
            battery: Battery::default(),
            behavior: Box::new(Idle),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: DeviceId) {
        self.id = id;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn behavior(&self) -> &dyn Behavior {
        self.behavior.as_ref()
    }

    pub fn set_behavior(&mut self, behavior: Box<dyn Behavior>) {
        self.behavior = behavior;
    }

    /// 把行为借给设备模拟器，原位置放一个 `Idle` 占位
    pub(crate) fn take_behavior(&mut self) -> Box<dyn Behavior> {
        std::mem::replace(&mut self.behavior, Box::new(Idle))
    }

    /// 既不移动也不带无线电的设备
    pub fn is_stationary_silent(&self) -> bool {
        !self.mobile && !self.with_radio
    }

    /// 到另一设备的地理距离（米）
    pub fn distance(&self, other: &Device, metric: DistanceMetric) -> f64 {
        self.position.distance(&other.position, metric)
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("position", &self.position)
            .field("radio_radius", &self.radio_radius)
            .field("capture_radius", &self.capture_radius)
            .field("with_radio", &self.with_radio)
            .field("with_sensor", &self.with_sensor)
            .field("mobile", &self.mobile)
            .field("battery", &self.battery)
            .field("behavior", &self.behavior.name())
            .finish()
    }
}
