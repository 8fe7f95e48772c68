//! 仿真核心模块
//!
//! 此模块包含离散事件仿真的核心组件：仿真时间、事件、调度器、
//! 每设备一个线程的设备模拟器，以及消费事件的驱动。

// 子模块声明
mod config;
mod device_simulator;
mod error;
mod event;
mod event_log;
mod observer;
mod report;
mod scenario;
mod scheduled_event;
mod scheduler;
mod simulation;
mod time;

// 重新导出公共接口
pub use config::{DEFAULT_LOGIC_BUDGET, DEFAULT_SIMULATION_TIME, DEFAULT_STEP, SimulationConfig};
pub use device_simulator::{DeviceMessage, DeviceReport, DeviceSimulator, DriverLink, Release};
pub use error::{RunFailure, SimError};
pub use event::Event;
pub use event_log::{Direction, EventLog};
pub use observer::{NoopObserver, SimObserver, SimStatus, TracingObserver};
pub use report::{DeviceResult, ResultSnapshot, SimulationReport, TerminationReason};
pub use scenario::{
    BehaviorSpec, DeviceDefaults, DeviceSpec, SCENARIO_SCHEMA_VERSION, ScenarioSpec,
    SimulationSpec,
};
pub use scheduled_event::EventKey;
pub use scheduler::Scheduler;
pub use simulation::{
    RunningSimulation, SHUTDOWN_GRACE, SimState, Simulation, SimulationOutcome,
};
pub use time::SimTime;
