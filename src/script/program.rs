//! 脚本程序行为
//!
//! 按顺序执行命令，执行到末尾后从头循环。

use super::behavior::{Behavior, SendPlan};
use super::command::{Command, ScriptError, parse_script};
use crate::device::Position;
use crate::sim::SimTime;

/// 由命令序列驱动的行为
#[derive(Debug, Clone)]
pub struct Program {
    commands: Vec<Command>,
    pc: usize,
    pending_delay: SimTime,
    epsilon: f64,
    relocate: Option<Position>,
    stopped: bool,
}

impl Program {
    pub fn new(commands: Vec<Command>) -> Self {
        let stopped = !commands.iter().any(|c| matches!(c, Command::Send { .. }));
        Self {
            commands,
            pc: 0,
            pending_delay: SimTime::ZERO,
            epsilon: 0.0,
            relocate: None,
            stopped,
        }
    }

    pub fn parse(src: &str) -> Result<Self, ScriptError> {
        Ok(Self::new(parse_script(src)?))
    }
}

impl Behavior for Program {
    fn name(&self) -> &str {
        "program"
    }

    fn next_send(&mut self, _now: SimTime) -> Option<SendPlan> {
        // 没有 send 的程序在构造时就已标记为 stopped，循环必然会遇到 send 或 stop
        while !self.stopped {
            let cmd = &self.commands[self.pc];
            self.pc = (self.pc + 1) % self.commands.len();
            match cmd {
                Command::Delay(ms) => {
                    self.pending_delay = self.pending_delay.saturating_add(SimTime::from_millis(*ms));
                }
                Command::Epsilon(eps) => self.epsilon = *eps,
                Command::Move { x, y } => self.relocate = Some(Position::new(*x, *y)),
                Command::Stop => self.stopped = true,
                Command::Send {
                    message,
                    power_ratio,
                } => {
                    let mut plan = SendPlan::new(self.pending_delay, message.clone())
                        .with_power_ratio(*power_ratio)
                        .with_epsilon(self.epsilon);
                    plan.relocate = self.relocate.take();
                    self.pending_delay = SimTime::ZERO;
                    return Some(plan);
                }
            }
        }
        None
    }
}
