//! 设备模拟器
//!
//! 每个设备一个线程：向行为要下一次发送，提交到调度器，向驱动报告，
//! 然后阻塞在自己的释放通道上，直到驱动消费了这个事件。
//!
//! 设备线程 → 驱动：共享的 `DeviceMessage` 通道（每次提交/结束报告一次）
//! 驱动 → 设备线程：每个设备独立的 `Release` 通道（点对点释放）

use super::error::SimError;
use super::event::Event;
use super::report::ResultSnapshot;
use super::scheduled_event::EventKey;
use super::scheduler::Scheduler;
use super::time::SimTime;
use crate::device::DeviceId;
use crate::script::Behavior;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 驱动对设备线程的释放信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// 上一个事件已应用，可以计划下一个
    Proceed,
    /// 运行结束，退出线程
    Stop,
}

/// 设备线程每轮向驱动的报告
#[derive(Debug)]
pub enum DeviceReport {
    Submitted(EventKey),
    /// 行为不再发送，线程已退出
    Finished,
    Failed(SimError),
}

#[derive(Debug)]
pub struct DeviceMessage {
    pub device: DeviceId,
    pub report: DeviceReport,
}

/// 设备线程与驱动之间的共享部分
#[derive(Clone)]
pub struct DriverLink {
    scheduler: Arc<Scheduler>,
    reports: Sender<DeviceMessage>,
}

impl DriverLink {
    pub fn new(scheduler: Arc<Scheduler>, reports: Sender<DeviceMessage>) -> Self {
        Self { scheduler, reports }
    }
}

/// 单个设备的模拟器（驱动侧句柄）
pub struct DeviceSimulator {
    device: DeviceId,
    behavior: Option<Box<dyn Behavior>>,
    link: Option<DriverLink>,
    release_tx: Option<Sender<Release>>,
    handle: Option<JoinHandle<Box<dyn Behavior>>>,
    // 线程退出时发送端随之丢弃，用于有时限地等待
    exited_rx: Option<Receiver<()>>,
    events_sent: u64,
    snapshots: Vec<ResultSnapshot>,
}

impl DeviceSimulator {
    pub fn new(device: DeviceId, behavior: Box<dyn Behavior>) -> Self {
        Self {
            device,
            behavior: Some(behavior),
            link: None,
            release_tx: None,
            handle: None,
            exited_rx: None,
            events_sent: 0,
            snapshots: Vec::new(),
        }
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn init(&mut self, link: DriverLink) {
        self.link = Some(link);
    }

    /// 启动设备线程。必须先 `init`，且只能启动一次。
    pub fn start(&mut self) -> Result<(), SimError> {
        let device = self.device;
        let Some(link) = self.link.take() else {
            return Err(SimError::NotStartable(device));
        };
        let Some(behavior) = self.behavior.take() else {
            self.link = Some(link);
            return Err(SimError::NotStartable(device));
        };
        let (release_tx, release_rx) = crossbeam_channel::bounded(1);
        let (exited_tx, exited_rx) = crossbeam_channel::bounded::<()>(0);

        debug!(device = %device, behavior = behavior.name(), "启动设备线程");
        let handle = thread::Builder::new()
            .name(format!("device-{device}"))
            .spawn(move || {
                let _exited = exited_tx;
                run_device(device, behavior, link, release_rx)
            })
            .map_err(SimError::Spawn)?;

        self.release_tx = Some(release_tx);
        self.handle = Some(handle);
        self.exited_rx = Some(exited_rx);
        Ok(())
    }

    /// 本设备的一个事件已被消费：计数并放行设备线程
    pub fn release(&mut self) -> Result<(), SimError> {
        self.events_sent += 1;
        let Some(tx) = &self.release_tx else {
            return Err(SimError::DeviceLost(self.device));
        };
        match tx.try_send(Release::Proceed) {
            Ok(()) => Ok(()),
            // 上一次释放还没被取走，说明出现了第二个在途事件
            Err(TrySendError::Full(_)) => Err(SimError::EventInFlight(self.device)),
            Err(TrySendError::Disconnected(_)) => Err(SimError::DeviceLost(self.device)),
        }
    }

    /// 记录阶段快照
    pub fn save_result(&mut self, at_step: SimTime, battery: f64) {
        self.snapshots.push(ResultSnapshot {
            step: at_step,
            events_sent: self.events_sent,
            battery,
        });
    }

    pub fn events_sent(&self) -> u64 {
        self.events_sent
    }

    pub fn snapshots(&self) -> &[ResultSnapshot] {
        &self.snapshots
    }

    /// 通知线程退出（线程可能已经结束）
    pub fn stop(&mut self) {
        if let Some(tx) = self.release_tx.take() {
            let _ = tx.try_send(Release::Stop);
        }
    }

    /// 等待线程结束并取回行为
    pub fn join(&mut self) -> Result<Box<dyn Behavior>, SimError> {
        self.join_inner(None)
    }

    /// 最多等待 `timeout`。线程仍在行为内部时将其分离，返回
    /// `SimError::DeviceDetached`，行为随线程一起丢失。
    pub fn join_within(&mut self, timeout: Duration) -> Result<Box<dyn Behavior>, SimError> {
        self.join_inner(Some(timeout))
    }

    fn join_inner(&mut self, timeout: Option<Duration>) -> Result<Box<dyn Behavior>, SimError> {
        self.stop();
        let Some(handle) = self.handle.take() else {
            return self
                .behavior
                .take()
                .ok_or(SimError::DeviceLost(self.device));
        };

        if let (Some(timeout), Some(exited)) = (timeout, self.exited_rx.take()) {
            if let Err(RecvTimeoutError::Timeout) = exited.recv_timeout(timeout) {
                warn!(device = %self.device, ?timeout, "设备线程未按时退出，分离");
                drop(handle);
                return Err(SimError::DeviceDetached(self.device));
            }
        }
        handle
            .join()
            .map_err(|_| SimError::DeviceThreadPanicked(self.device))
    }
}

fn run_device(
    device: DeviceId,
    mut behavior: Box<dyn Behavior>,
    link: DriverLink,
    release_rx: Receiver<Release>,
) -> Box<dyn Behavior> {
    let mut now = SimTime::ZERO;
    loop {
        let planned = panic::catch_unwind(AssertUnwindSafe(|| behavior.next_send(now)));
        let (report, done) = match planned {
            Err(_) => {
                warn!(device = %device, "行为 panic");
                (DeviceReport::Failed(SimError::BehaviorPanicked(device)), true)
            }
            Ok(None) => (DeviceReport::Finished, true),
            Ok(Some(plan)) => {
                let date = now.saturating_add(plan.delay);
                let ev = Event {
                    device,
                    date,
                    message: plan.message,
                    power_ratio: plan.power_ratio,
                    epsilon: plan.epsilon,
                    relocate: plan.relocate,
                };
                match link.scheduler.add_event(ev) {
                    Ok(key) => {
                        now = date;
                        (DeviceReport::Submitted(key), false)
                    }
                    Err(e) => (DeviceReport::Failed(e), true),
                }
            }
        };

        trace!(device = %device, report = ?report, "向驱动报告");
        if link.reports.send(DeviceMessage { device, report }).is_err() || done {
            return behavior;
        }

        match release_rx.recv() {
            Ok(Release::Proceed) => continue,
            Ok(Release::Stop) | Err(_) => return behavior,
        }
    }
}
