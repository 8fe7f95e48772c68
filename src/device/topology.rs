//! 拓扑判定
//!
//! 按当前位置与半径判断两个设备之间的无线电可达与感知（capture）关系。
//! 关系不存储，每次应用事件时重新计算。

use super::device::Device;
use super::position::DistanceMetric;

/// 无线电可达：双方都带无线电，且两者较大的无线电半径严格大于距离。
///
/// 距离不是有限值（位置数据缺失/损坏）时视为不可达。
pub fn in_radio_range(a: &Device, b: &Device, metric: DistanceMetric) -> bool {
    if !(a.with_radio && b.with_radio) {
        return false;
    }
    let d = a.distance(b, metric);
    if !d.is_finite() {
        return false;
    }
    a.radio_radius.max(b.radio_radius) > d
}

/// `detector` 是否感知到 `target`。
///
/// 双方都需开启感知，距离严格小于两者感知半径之和；另外，静止且无无线电的
/// 目标只能被移动的或带无线电的设备感知。
pub fn detects(detector: &Device, target: &Device, metric: DistanceMetric) -> bool {
    if !(detector.with_sensor && target.with_sensor) {
        return false;
    }
    if target.is_stationary_silent() && detector.is_stationary_silent() {
        return false;
    }
    let d = detector.distance(target, metric);
    if !d.is_finite() {
        return false;
    }
    detector.capture_radius + target.capture_radius > d
}
