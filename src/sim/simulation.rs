//! 仿真驱动
//!
//! 持有调度器与到达闸门，循环：等待所有活跃设备报告 → 弹出最早事件 →
//! 检查终止条件 → 应用能耗与投递 → 写日志 → 只释放该事件所属的设备。
//!
//! 状态：`Idle → Running → Terminated`。

use super::config::SimulationConfig;
use super::device_simulator::{DeviceMessage, DeviceReport, DeviceSimulator, DriverLink};
use super::error::{RunFailure, SimError};
use super::event::Event;
use super::event_log::{Direction, EventLog};
use super::observer::{SimObserver, SimStatus, TracingObserver};
use super::report::{DeviceResult, SimulationReport, TerminationReason};
use super::scheduler::Scheduler;
use super::time::SimTime;
use crate::device::{DeviceId, DeviceRegistry, EnergyModel, PositionSnapshot, topology};
use crossbeam_channel::{Receiver, Sender, TryRecvError, select};
use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// 关闭时等待设备线程退出的总时限
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// 驱动状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Idle,
    Running,
    Terminated,
}

/// 一次运行的结果：交还的设备注册表与报告
#[derive(Debug)]
pub struct SimulationOutcome {
    pub registry: DeviceRegistry,
    pub report: SimulationReport,
}

/// 尚未启动的仿真
pub struct Simulation {
    cfg: SimulationConfig,
    observer: Box<dyn SimObserver>,
    log_writer: Option<Box<dyn Write + Send>>,
}

impl Simulation {
    pub fn new(cfg: SimulationConfig) -> Self {
        Self {
            cfg,
            observer: Box::new(TracingObserver),
            log_writer: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.cfg
    }

    pub fn with_observer(mut self, observer: Box<dyn SimObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 日志写到给定 writer，而不是 `cfg.log_file`
    pub fn with_log_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.log_writer = Some(writer);
        self
    }

    /// 启动仿真：打开日志、启动全部设备线程和驱动线程。
    ///
    /// 日志打不开时直接返回错误（连同注册表），不会启动任何线程。
    #[tracing::instrument(skip(self, registry), fields(name = %self.cfg.name, devices = registry.len()))]
    pub fn start(self, registry: DeviceRegistry) -> Result<RunningSimulation, RunFailure> {
        let Simulation {
            cfg,
            observer,
            log_writer,
        } = self;

        let log = match log_writer {
            Some(w) => EventLog::new(w),
            None => match EventLog::create(&cfg.log_file) {
                Ok(log) => log,
                Err(error) => {
                    return Err(RunFailure {
                        error,
                        registry: Some(registry),
                    });
                }
            },
        };

        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let mut driver = Driver::new(cfg, observer, log, registry, stop_rx);
        if let Err(error) = driver.begin() {
            return Err(RunFailure {
                error,
                registry: Some(driver.registry),
            });
        }

        let handle = thread::Builder::new()
            .name("sim-driver".to_string())
            .spawn(move || driver.drive())
            .map_err(|e| RunFailure {
                error: SimError::Spawn(e),
                registry: None,
            })?;

        Ok(RunningSimulation { stop_tx, handle })
    }

    /// 启动并等待运行结束
    pub fn run(self, registry: DeviceRegistry) -> Result<SimulationOutcome, RunFailure> {
        self.start(registry)?.join()
    }
}

/// 正在运行的仿真。丢弃句柄等同于请求停止。
pub struct RunningSimulation {
    stop_tx: Sender<()>,
    handle: JoinHandle<Result<SimulationOutcome, RunFailure>>,
}

impl RunningSimulation {
    pub fn state(&self) -> SimState {
        if self.handle.is_finished() {
            SimState::Terminated
        } else {
            SimState::Running
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 中止运行；设备位置会恢复到运行开始时的值
    pub fn stop(self) -> Result<SimulationOutcome, RunFailure> {
        let _ = self.stop_tx.try_send(());
        self.join()
    }

    /// 等待运行自然结束
    pub fn join(self) -> Result<SimulationOutcome, RunFailure> {
        let RunningSimulation { stop_tx, handle } = self;
        let out = handle.join().map_err(|_| RunFailure {
            error: SimError::DriverPanicked,
            registry: None,
        })?;
        drop(stop_tx);
        out
    }
}

enum Gate {
    Ready,
    Stopped,
    LogicTimeout(Duration),
}

struct Driver {
    cfg: SimulationConfig,
    state: SimState,
    observer: Box<dyn SimObserver>,
    log: EventLog,
    registry: DeviceRegistry,
    energy: EnergyModel,
    scheduler: Arc<Scheduler>,
    reports: Option<Receiver<DeviceMessage>>,
    stop_rx: Receiver<()>,
    // 与 registry 中的设备一一对应（同序）
    simulators: Vec<DeviceSimulator>,
    // 还欠驱动一次报告的设备
    owes: Vec<bool>,
    owed: usize,
    snapshot: Option<PositionSnapshot>,
    detached: Vec<DeviceId>,
    start: Instant,
    events_applied: u64,
    receptions: u64,
    detections: u64,
    checkpoints: u64,
    last_date: Option<SimTime>,
}

impl Driver {
    fn new(
        cfg: SimulationConfig,
        observer: Box<dyn SimObserver>,
        log: EventLog,
        registry: DeviceRegistry,
        stop_rx: Receiver<()>,
    ) -> Self {
        let energy = EnergyModel::new(cfg.base_cost);
        Self {
            cfg,
            state: SimState::Idle,
            observer,
            log,
            registry,
            energy,
            scheduler: Arc::new(Scheduler::default()),
            reports: None,
            stop_rx,
            simulators: Vec::new(),
            owes: Vec::new(),
            owed: 0,
            snapshot: None,
            detached: Vec::new(),
            start: Instant::now(),
            events_applied: 0,
            receptions: 0,
            detections: 0,
            checkpoints: 0,
            last_date: None,
        }
    }

    fn transition(&mut self, next: SimState) {
        let ok = matches!(
            (self.state, next),
            (SimState::Idle, SimState::Running) | (SimState::Running, SimState::Terminated)
        );
        assert!(ok, "invalid state transition {:?} -> {:?}", self.state, next);
        debug!(from = ?self.state, to = ?next, "驱动状态切换");
        self.state = next;
    }

    /// Idle → Running：快照位置、写日志头、启动设备线程
    fn begin(&mut self) -> Result<(), SimError> {
        self.snapshot = Some(self.registry.snapshot_positions());
        self.log.header(&self.cfg.name)?;

        let (report_tx, report_rx) = crossbeam_channel::unbounded();
        let link = DriverLink::new(Arc::clone(&self.scheduler), report_tx);
        self.reports = Some(report_rx);

        for dev in self.registry.devices_mut() {
            let mut sim = DeviceSimulator::new(dev.id(), dev.take_behavior());
            sim.init(link.clone());
            self.simulators.push(sim);
        }
        drop(link);

        self.transition(SimState::Running);
        for i in 0..self.simulators.len() {
            if let Err(e) = self.simulators[i].start() {
                self.shutdown(true);
                return Err(e);
            }
            self.owes.push(true);
            self.owed += 1;
        }
        self.start = Instant::now();
        self.observer.on_status(&SimStatus::Started {
            devices: self.simulators.len(),
        });
        info!(devices = self.simulators.len(), "▶️  设备线程已全部启动");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(name = %self.cfg.name))]
    fn drive(mut self) -> Result<SimulationOutcome, RunFailure> {
        let result = self.main_loop();
        // 耗时与日志尾部在回收设备线程之前确定
        let elapsed = self.start.elapsed();
        let footer = self.log.footer(elapsed);

        let restore = matches!(result, Err(_) | Ok(TerminationReason::Aborted));
        let join_err = self.shutdown(restore);
        self.transition(SimState::Terminated);

        let checked = result.and_then(|reason| match join_err {
            Some(e) => Err(e),
            None => footer.map(|()| reason),
        });
        let reason = match checked {
            Ok(reason) => reason,
            Err(error) => {
                self.observer.on_status(&SimStatus::Failed {
                    error: error.to_string(),
                });
                warn!(error = %error, ?elapsed, "仿真以错误结束");
                return Err(RunFailure {
                    error,
                    registry: Some(self.registry),
                });
            }
        };

        self.observer.on_status(&SimStatus::Terminated { reason });
        info!(
            reason = ?reason,
            events_applied = self.events_applied,
            ?elapsed,
            "✅ 仿真完成"
        );

        let report = self.report(reason, elapsed);
        Ok(SimulationOutcome {
            registry: self.registry,
            report,
        })
    }

    fn main_loop(&mut self) -> Result<TerminationReason, SimError> {
        loop {
            match self.wait_for_reports()? {
                Gate::Ready => {}
                Gate::Stopped => return Ok(TerminationReason::Aborted),
                Gate::LogicTimeout(elapsed) => {
                    return Ok(TerminationReason::LogicTimeExceeded { elapsed });
                }
            }

            let Some(ev) = self.scheduler.get_next_event() else {
                info!("调度器为空");
                return Ok(TerminationReason::Exhausted);
            };
            if ev.date > self.cfg.simulation_time {
                info!(date = ?ev.date, limit = ?self.cfg.simulation_time, "超过仿真时间预算");
                return Ok(TerminationReason::SimulationTimeExceeded { date: ev.date });
            }
            let elapsed = self.start.elapsed();
            if elapsed > self.cfg.logic_budget {
                info!(?elapsed, "超过逻辑时间预算");
                return Ok(TerminationReason::LogicTimeExceeded { elapsed });
            }

            self.apply(&ev)?;
            self.release(ev.device)?;
        }
    }

    /// 闸门：等到每个活跃设备都已提交下一事件或已结束
    fn wait_for_reports(&mut self) -> Result<Gate, SimError> {
        let Some(reports) = self.reports.clone() else {
            return Ok(Gate::Ready);
        };
        let stop_rx = self.stop_rx.clone();
        loop {
            match stop_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => return Ok(Gate::Stopped),
                Err(TryRecvError::Empty) => {}
            }
            if self.owed == 0 {
                return Ok(Gate::Ready);
            }

            let elapsed = self.start.elapsed();
            let Some(remaining) = self.cfg.logic_budget.checked_sub(elapsed) else {
                return Ok(Gate::LogicTimeout(elapsed));
            };

            select! {
                recv(stop_rx) -> _ => return Ok(Gate::Stopped),
                recv(reports) -> msg => match msg {
                    Ok(msg) => self.on_report(msg)?,
                    Err(_) => return Err(self.first_owing_lost()),
                },
                default(remaining) => return Ok(Gate::LogicTimeout(self.start.elapsed())),
            }
        }
    }

    fn on_report(&mut self, msg: DeviceMessage) -> Result<(), SimError> {
        let DeviceMessage { device, report } = msg;
        let idx = self
            .registry
            .index_of(device)
            .ok_or(SimError::DeviceLost(device))?;
        if !self.owes[idx] {
            return Err(SimError::EventInFlight(device));
        }

        match report {
            DeviceReport::Submitted(key) => {
                trace!(device = %device, date = ?key.date(), seq = key.seq(), "设备已提交事件");
            }
            DeviceReport::Finished => {
                debug!(device = %device, "设备不再发送");
            }
            DeviceReport::Failed(e) => return Err(e),
        }
        self.owes[idx] = false;
        self.owed -= 1;
        Ok(())
    }

    fn first_owing_lost(&self) -> SimError {
        let device = self
            .owes
            .iter()
            .position(|&o| o)
            .map(|i| self.simulators[i].device())
            .unwrap_or(DeviceId(0));
        SimError::DeviceLost(device)
    }

    fn release(&mut self, device: DeviceId) -> Result<(), SimError> {
        let idx = self
            .registry
            .index_of(device)
            .ok_or(SimError::DeviceLost(device))?;
        self.simulators[idx].release()?;
        self.owes[idx] = true;
        self.owed += 1;
        Ok(())
    }

    /// 应用一个事件：阶段快照、位置更新、发送方与范围内接收方扣电、写日志
    #[tracing::instrument(skip(self, ev), fields(device = %ev.device, date = ?ev.date))]
    fn apply(&mut self, ev: &Event) -> Result<(), SimError> {
        self.checkpoint(ev.date);

        let Some(idx) = self.registry.index_of(ev.device) else {
            warn!("事件所属设备不存在，忽略");
            return Ok(());
        };
        let metric = self.registry.metric();
        let cost = self.energy.transfer_cost(ev.power_ratio);
        let devices = self.registry.devices_mut();

        if let Some(to) = ev.relocate {
            if devices[idx].mobile {
                devices[idx].position = to;
            } else {
                warn!(to = ?to, "非移动设备不能改变位置，忽略");
            }
        }

        devices[idx].battery.consume(cost);
        self.log
            .record(self.start.elapsed(), &devices[idx], Direction::Send, ev)?;

        let sender = &devices[idx];
        let receivers: Vec<usize> = (0..devices.len())
            .filter(|&r| r != idx && topology::in_radio_range(sender, &devices[r], metric))
            .collect();
        let detected: Vec<DeviceId> = devices
            .iter()
            .enumerate()
            .filter(|&(r, target)| r != idx && topology::detects(sender, target, metric))
            .map(|(_, target)| target.id())
            .collect();

        for &r in &receivers {
            devices[r].battery.consume(cost);
            self.log
                .record(self.start.elapsed(), &devices[r], Direction::Receive, ev)?;
        }

        debug!(
            receivers = receivers.len(),
            detected = detected.len(),
            cost,
            "事件已应用"
        );

        self.events_applied += 1;
        self.receptions += receivers.len() as u64;
        self.detections += detected.len() as u64;
        self.last_date = Some(ev.date);

        let status = SimStatus::Applied {
            date: ev.date,
            sender: ev.device,
            receivers: receivers.iter().map(|&r| devices[r].id()).collect(),
            detected,
        };
        self.observer.on_status(&status);
        Ok(())
    }

    /// 日期跨过新的阶段边界时，让所有设备保存结果（每个事件至多一次）
    fn checkpoint(&mut self, date: SimTime) {
        let step = self.cfg.step.0;
        if step == 0 || date.0 / step < self.checkpoints {
            return;
        }
        self.checkpoints += 1;
        let at = SimTime(step.saturating_mul(self.checkpoints));
        for (sim, dev) in self.simulators.iter_mut().zip(self.registry.iter()) {
            sim.save_result(at, dev.battery.capacity());
        }
        self.observer.on_status(&SimStatus::Checkpoint { step: at });
    }

    /// 停止并回收全部设备线程，把行为还给设备；需要时恢复位置。
    ///
    /// 所有线程共用 `SHUTDOWN_GRACE` 时限；仍停在行为内部的线程被分离并记录，
    /// 其设备保留 `Idle` 占位。返回遇到的第一个其他回收错误。
    fn shutdown(&mut self, restore: bool) -> Option<SimError> {
        for sim in &mut self.simulators {
            sim.stop();
        }

        let deadline = Instant::now() + SHUTDOWN_GRACE;
        let mut first_err = None;
        for (sim, dev) in self
            .simulators
            .iter_mut()
            .zip(self.registry.devices_mut().iter_mut())
        {
            match sim.join_within(deadline.saturating_duration_since(Instant::now())) {
                Ok(behavior) => dev.set_behavior(behavior),
                Err(SimError::DeviceDetached(id)) => self.detached.push(id),
                Err(e) => {
                    warn!(device = %dev.id(), error = %e, "回收设备线程失败");
                    first_err.get_or_insert(e);
                }
            }
        }

        if restore {
            if let Some(snapshot) = &self.snapshot {
                self.registry.restore_positions(snapshot);
                debug!("设备位置已恢复");
            }
        }
        first_err
    }

    fn report(&self, reason: TerminationReason, elapsed: Duration) -> SimulationReport {
        let devices = self
            .simulators
            .iter()
            .zip(self.registry.iter())
            .map(|(sim, dev)| DeviceResult {
                id: dev.id(),
                label: dev.label().to_string(),
                battery: dev.battery.capacity(),
                events_sent: sim.events_sent(),
                snapshots: sim.snapshots().to_vec(),
            })
            .collect();

        SimulationReport {
            name: self.cfg.name.clone(),
            reason,
            events_applied: self.events_applied,
            receptions: self.receptions,
            detections: self.detections,
            checkpoints: self.checkpoints,
            last_date: self.last_date,
            elapsed,
            devices,
            detached: self.detached.clone(),
        }
    }
}
