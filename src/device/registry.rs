//! 设备注册表
//!
//! 一次仿真范围内的设备集合，自带 id 分配器（不使用全局状态）。

use super::device::Device;
use super::id::DeviceId;
use super::position::{DistanceMetric, Position};
use tracing::debug;

/// 设备集合。设备按 id 递增存放。
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    next_id: u32,
    metric: DistanceMetric,
}

/// 运行开始时记录的设备位置，用于中止后复原
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSnapshot {
    positions: Vec<(DeviceId, Position)>,
}

impl PositionSnapshot {
    pub fn get(&self, id: DeviceId) -> Option<Position> {
        self.positions
            .binary_search_by_key(&id, |(d, _)| *d)
            .ok()
            .map(|i| self.positions[i].1)
    }
}

impl DeviceRegistry {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            ..Self::default()
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn set_metric(&mut self, metric: DistanceMetric) {
        self.metric = metric;
    }

    /// 添加设备并分配新 id，返回新设备以便继续设置参数
    pub fn add(&mut self, label: impl Into<String>, position: Position) -> &mut Device {
        let id = DeviceId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.devices.push(Device::new(id, label, position));
        debug!(device = %id, total = self.devices.len(), "添加设备");
        let last = self.devices.len() - 1;
        &mut self.devices[last]
    }

    /// 删除设备；id 不存在时返回 None
    pub fn remove(&mut self, id: DeviceId) -> Option<Device> {
        let idx = self.index_of(id)?;
        Some(self.devices.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn index_of(&self, id: DeviceId) -> Option<usize> {
        self.devices.binary_search_by_key(&id, |d| d.id()).ok()
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.index_of(id).map(|i| &self.devices[i])
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.index_of(id).map(move |i| &mut self.devices[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    pub(crate) fn devices_mut(&mut self) -> &mut [Device] {
        &mut self.devices
    }

    /// 重新从 0 开始连续编号（删除设备后使用）
    pub fn renumber(&mut self) {
        for (k, d) in self.devices.iter_mut().enumerate() {
            d.set_id(DeviceId(k as u32));
        }
        self.next_id = self.devices.len() as u32;
    }

    pub fn snapshot_positions(&self) -> PositionSnapshot {
        PositionSnapshot {
            positions: self.devices.iter().map(|d| (d.id(), d.position)).collect(),
        }
    }

    /// 按快照复原位置；快照之后新增的设备不受影响
    pub fn restore_positions(&mut self, snapshot: &PositionSnapshot) {
        for d in &mut self.devices {
            if let Some(p) = snapshot.get(d.id()) {
                d.position = p;
            }
        }
    }
}
