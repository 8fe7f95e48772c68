//! 脚本命令
//!
//! 每行一条命令：`delay <ms>`、`send <msg> [power_ratio]`、`epsilon <v>`、
//! `move <x> <y>`、`stop`。`#` 开头为注释，空行忽略。

use thiserror::Error;

/// 脚本解析错误（行号从 1 开始）
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: `{command}` is missing an argument")]
    MissingArgument { line: usize, command: &'static str },
    #[error("line {line}: invalid number `{value}`")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: unexpected trailing input `{rest}`")]
    TrailingInput { line: usize, rest: String },
}

/// 一条脚本命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 推进本地时钟（毫秒）
    Delay(u64),
    Send { message: String, power_ratio: f64 },
    Epsilon(f64),
    Move { x: f64, y: f64 },
    Stop,
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Delay(_) => "delay",
            Command::Send { .. } => "send",
            Command::Epsilon(_) => "epsilon",
            Command::Move { .. } => "move",
            Command::Stop => "stop",
        }
    }
}

/// 解析整段脚本
pub fn parse_script(src: &str) -> Result<Vec<Command>, ScriptError> {
    let mut out = Vec::new();
    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        out.push(parse_line(line, text)?);
    }
    Ok(out)
}

fn parse_line(line: usize, text: &str) -> Result<Command, ScriptError> {
    let mut words = text.split_whitespace();
    let head = words.next().unwrap_or("");
    let cmd = match head.to_ascii_lowercase().as_str() {
        "delay" => Command::Delay(number(line, required(line, "delay", words.next())?)?),
        "send" => {
            let message = required(line, "send", words.next())?.to_string();
            let power_ratio = match words.next() {
                Some(v) => number(line, v)?,
                None => 1.0,
            };
            Command::Send {
                message,
                power_ratio,
            }
        }
        "epsilon" => Command::Epsilon(number(line, required(line, "epsilon", words.next())?)?),
        "move" => {
            let x = number(line, required(line, "move", words.next())?)?;
            let y = number(line, required(line, "move", words.next())?)?;
            Command::Move { x, y }
        }
        "stop" => Command::Stop,
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: head.to_string(),
            });
        }
    };

    let rest: Vec<&str> = words.collect();
    if !rest.is_empty() {
        return Err(ScriptError::TrailingInput {
            line,
            rest: rest.join(" "),
        });
    }
    Ok(cmd)
}

fn required<'a>(
    line: usize,
    command: &'static str,
    word: Option<&'a str>,
) -> Result<&'a str, ScriptError> {
    word.ok_or(ScriptError::MissingArgument { line, command })
}

fn number<T: std::str::FromStr>(line: usize, value: &str) -> Result<T, ScriptError> {
    value.parse().map_err(|_| ScriptError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}
