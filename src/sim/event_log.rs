//! 事件日志
//!
//! 文本日志：头部、每个收发一行、尾部以及耗时汇总。
//!
//! ```text
//! wsn-sim v. 0.1.0
//! Simulation name : demo
//! Events list [
//! 51234 0 S0 send hello, date : 1000000 + eps 0
//! 60211 1 S1 receive hello, date : 1000000 + eps 0
//! ]
//!
//! Duration :
//! Logic : 81234 ns
//! End simulation
//! ```

use super::error::SimError;
use super::event::Event;
use crate::device::Device;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// 日志行的收发方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Send => "send",
            Direction::Receive => "receive",
        }
    }
}

pub struct EventLog {
    out: BufWriter<Box<dyn Write + Send>>,
}

impl EventLog {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: BufWriter::new(writer),
        }
    }

    /// 创建（或截断）日志文件
    pub fn create(path: &Path) -> Result<Self, SimError> {
        let file = File::create(path).map_err(SimError::Log)?;
        Ok(Self::new(Box::new(file)))
    }

    pub fn header(&mut self, name: &str) -> Result<(), SimError> {
        self.write(|out| {
            writeln!(out, "wsn-sim v. {}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "Simulation name : {name}")?;
            writeln!(out, "Events list [")
        })
    }

    pub fn record(
        &mut self,
        elapsed: Duration,
        device: &Device,
        direction: Direction,
        ev: &Event,
    ) -> Result<(), SimError> {
        self.write(|out| {
            writeln!(
                out,
                "{} {} {} {} {}, date : {} + eps {}",
                elapsed.as_nanos(),
                device.id(),
                device.label(),
                direction.as_str(),
                ev.message,
                ev.date.0,
                ev.epsilon
            )
        })
    }

    /// 写尾部并刷新
    pub fn footer(&mut self, elapsed: Duration) -> Result<(), SimError> {
        self.write(|out| {
            writeln!(out, "]")?;
            writeln!(out)?;
            writeln!(out, "Duration :")?;
            writeln!(out, "Logic : {} ns", elapsed.as_nanos())?;
            writeln!(out, "End simulation")?;
            out.flush()
        })
    }

    fn write(
        &mut self,
        f: impl FnOnce(&mut BufWriter<Box<dyn Write + Send>>) -> io::Result<()>,
    ) -> Result<(), SimError> {
        f(&mut self.out).map_err(SimError::Log)
    }
}
