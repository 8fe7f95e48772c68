//! 调度键
//!
//! 定义调度器中事件的排序键：先按日期，日期相同按插入序号（FIFO）。

use super::time::SimTime;
use std::cmp::Ordering;

/// 已调度事件的句柄，同时也是它在调度器中的排序键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub(crate) at: SimTime,
    pub(crate) seq: u64,
}

impl EventKey {
    pub fn date(&self) -> SimTime {
        self.at
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
