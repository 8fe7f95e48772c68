//! 位置与距离
//!
//! 设备坐标，以及把两个坐标换算成地理距离（米）的度量方式。

use serde::{Deserialize, Serialize};

/// 地球平均半径（米），用于 haversine 距离。
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// 设备位置
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 按给定度量计算到 `other` 的距离（米）
    pub fn distance(&self, other: &Position, metric: DistanceMetric) -> f64 {
        match metric {
            DistanceMetric::Planar => {
                let dx = self.x - other.x;
                let dy = self.y - other.y;
                dx.hypot(dy)
            }
            DistanceMetric::Haversine => haversine(self, other),
        }
    }
}

/// 距离度量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// 平面欧氏距离，坐标单位为米
    #[default]
    Planar,
    /// 球面距离：x 为经度、y 为纬度（度）
    Haversine,
}

// x = 经度, y = 纬度
fn haversine(a: &Position, b: &Position) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = (b.y - a.y).to_radians();
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
