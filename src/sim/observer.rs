//! 状态回调
//!
//! 驱动把运行进度以结构化状态推给外部（界面、统计……），自身不做任何渲染。

use super::report::TerminationReason;
use super::time::SimTime;
use crate::device::DeviceId;
use tracing::{debug, info, trace, warn};

/// 驱动在运行过程中发出的状态
#[derive(Debug, Clone, PartialEq)]
pub enum SimStatus {
    Started {
        devices: usize,
    },
    Checkpoint {
        step: SimTime,
    },
    /// 一个事件已应用
    Applied {
        date: SimTime,
        sender: DeviceId,
        receivers: Vec<DeviceId>,
        detected: Vec<DeviceId>,
    },
    Terminated {
        reason: TerminationReason,
    },
    /// 运行以错误结束（清理已完成）
    Failed {
        error: String,
    },
}

/// 状态观察者。在驱动线程上调用。
pub trait SimObserver: Send {
    fn on_status(&mut self, status: &SimStatus);
}

/// 什么也不做的观察者
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {
    fn on_status(&mut self, _status: &SimStatus) {}
}

/// 把状态交给 tracing 的观察者
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SimObserver for TracingObserver {
    fn on_status(&mut self, status: &SimStatus) {
        match status {
            SimStatus::Started { devices } => info!(devices, "▶️  仿真开始"),
            SimStatus::Checkpoint { step } => debug!(step = ?step, "保存阶段结果"),
            SimStatus::Applied {
                date,
                sender,
                receivers,
                detected,
            } => trace!(
                date = ?date,
                sender = %sender,
                receivers = receivers.len(),
                detected = detected.len(),
                "事件已应用"
            ),
            SimStatus::Terminated { reason } => info!(reason = ?reason, "⏹️  仿真结束"),
            SimStatus::Failed { error } => warn!(error = %error, "❌ 仿真失败"),
        }
    }
}
