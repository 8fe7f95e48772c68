//! 调度器
//!
//! 线程安全的待处理事件集合：按日期插入、按句柄删除、弹出最早事件。

use super::error::SimError;
use super::event::Event;
use super::scheduled_event::EventKey;
use super::time::SimTime;
use crate::device::DeviceId;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, trace};

#[derive(Default)]
struct Inner {
    next_seq: u64,
    q: BTreeMap<EventKey, Event>,
    // 每个设备至多一个待处理事件
    pending: HashMap<DeviceId, EventKey>,
}

/// 事件调度器。所有方法取 `&self`，可通过 `Arc` 在线程间共享。
#[derive(Default)]
pub struct Scheduler {
    inner: Mutex<Inner>,
}

impl Scheduler {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("scheduler lock")
    }

    /// 加入事件，返回可用于删除的句柄。
    ///
    /// 同一设备已有待处理事件时返回 `SimError::EventInFlight`。
    #[tracing::instrument(skip(self, ev), fields(device = %ev.device, date = ?ev.date))]
    pub fn add_event(&self, ev: Event) -> Result<EventKey, SimError> {
        let mut inner = self.lock();
        if inner.pending.contains_key(&ev.device) {
            return Err(SimError::EventInFlight(ev.device));
        }

        let key = EventKey {
            at: ev.date,
            seq: inner.next_seq,
        };
        inner.next_seq = inner.next_seq.wrapping_add(1);
        trace!(seq = key.seq, "调度事件");

        inner.pending.insert(ev.device, key);
        inner.q.insert(key, ev);

        debug!(queue_size = inner.q.len(), "事件已加入队列");
        Ok(key)
    }

    /// 删除指定事件；事件已被弹出或不存在时返回 None。
    pub fn remove_event(&self, key: EventKey) -> Option<Event> {
        let mut inner = self.lock();
        let ev = inner.q.remove(&key)?;
        inner.pending.remove(&ev.device);
        trace!(seq = key.seq, device = %ev.device, "事件已删除");
        Some(ev)
    }

    /// 弹出日期最早的事件（同日期按插入顺序）；队列为空时返回 None，不阻塞。
    pub fn get_next_event(&self) -> Option<Event> {
        let mut inner = self.lock();
        let (_, ev) = inner.q.pop_first()?;
        inner.pending.remove(&ev.device);
        Some(ev)
    }

    pub fn peek_date(&self) -> Option<SimTime> {
        self.lock().q.first_key_value().map(|(k, _)| k.at)
    }

    pub fn has_pending(&self, device: DeviceId) -> bool {
        self.lock().pending.contains_key(&device)
    }

    pub fn len(&self) -> usize {
        self.lock().q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().q.is_empty()
    }
}
