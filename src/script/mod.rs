//! 设备行为与脚本
//!
//! 仿真核心只依赖 `Behavior` trait；这里同时提供几个内置实现，
//! 以及一个简单的逐行命令脚本。

mod behavior;
mod command;
mod program;

pub use behavior::{Behavior, Idle, Periodic, SendPlan};
pub use command::{Command, ScriptError, parse_script};
pub use program::Program;
