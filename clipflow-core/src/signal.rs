//! Named actions a trigger source sends to the working buffer.

use crate::error::{BufferError, BufferResult};
use std::fmt;
use std::str::FromStr;

/// An action requested by a trigger source (hotkey, command line, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Push the carried text through the filters into the buffer.
    Push(String),
    Pop,
    Commit,
    Revert,
}

impl Signal {
    pub const PUSH: &'static str = "push_to_buffer";
    pub const POP: &'static str = "pop_buffer";
    pub const COMMIT: &'static str = "commit";
    pub const REVERT: &'static str = "revert";

    /// Every signal name, in the order a help listing shows them.
    pub const NAMES: [&'static str; 4] = [Self::PUSH, Self::POP, Self::COMMIT, Self::REVERT];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Push(_) => Self::PUSH,
            Self::Pop => Self::POP,
            Self::Commit => Self::COMMIT,
            Self::Revert => Self::REVERT,
        }
    }

    /// Parses `<name> [text]`. Only a push carries text; anything after
    /// other names is ignored.
    pub fn parse(line: &str) -> BufferResult<Self> {
        let line = line.trim_start();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        Self::from_parts(name, rest)
    }

    /// Builds the signal called `name`, handing `text` to a push.
    pub fn from_parts(name: &str, text: &str) -> BufferResult<Self> {
        match name {
            Self::PUSH | "push" => Ok(Self::Push(text.to_string())),
            Self::POP | "pop" => Ok(Self::Pop),
            Self::COMMIT => Ok(Self::Commit),
            Self::REVERT => Ok(Self::Revert),
            other => Err(BufferError::UnknownSignal(other.to_string())),
        }
    }
}

impl FromStr for Signal {
    type Err = BufferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(text) => write!(f, "{} {}", Self::PUSH, text),
            other => f.write_str(other.name()),
        }
    }
}
