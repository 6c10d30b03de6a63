//! A tiny line-oriented language for driving a [`VM`](crate::runtime::VM).
//!
//! ```text
//! int 1          # push an integer
//! int 2
//! pair           # (2, 1)
//! let a          # name the top of the stack
//! gc
//! expect live 3
//! ```

pub mod command;
pub mod demos;
pub mod parser;
pub mod runner;

pub use command::{Command, Statement};
pub use parser::parse_script;
pub use runner::{RunReport, Runner, run_source};

use crate::runtime::VmError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: {source}")]
    Runtime { line: usize, source: VmError },

    #[error("line {line}: unbound name `{name}`")]
    UnboundName { line: usize, name: String },

    #[error("line {line}: expected {what} to be {expected}, found {actual}")]
    Expectation {
        line: usize,
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl ScriptError {
    /// 1-based source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ScriptError::Parse { line, .. }
            | ScriptError::Runtime { line, .. }
            | ScriptError::UnboundName { line, .. }
            | ScriptError::Expectation { line, .. } => *line,
        }
    }
}
