//! 错误类型
//!
//! 仿真运行、日志、脚本与场景加载的统一错误。

use crate::device::{DeviceId, DeviceRegistry};
use crate::script::ScriptError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("event log: {0}")]
    Log(#[source] io::Error),

    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] io::Error),

    /// 同一设备在上一事件被释放前又提交了事件
    #[error("device {0} already has an event in flight")]
    EventInFlight(DeviceId),

    /// 未 `init` 或重复启动
    #[error("simulator of device {0} is not initialized or already started")]
    NotStartable(DeviceId),

    #[error("behavior of device {0} panicked")]
    BehaviorPanicked(DeviceId),

    #[error("simulator thread of device {0} panicked")]
    DeviceThreadPanicked(DeviceId),

    /// 线程在关闭时限内没有退出，已被分离
    #[error("simulator thread of device {0} did not exit in time and was detached")]
    DeviceDetached(DeviceId),

    #[error("device {0} stopped reporting to the driver")]
    DeviceLost(DeviceId),

    #[error("driver thread panicked")]
    DriverPanicked,

    #[error("script of device `{device}`: {source}")]
    Script {
        device: String,
        #[source]
        source: ScriptError,
    },

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error("scenario json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 失败的运行：错误，以及清理后交还的设备注册表
/// （位置已复原，行为已交还）。
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: SimError,
    /// 驱动线程未能启动或自身 panic 时为 None
    pub registry: Option<DeviceRegistry>,
}

impl From<RunFailure> for SimError {
    fn from(failure: RunFailure) -> Self {
        failure.error
    }
}
