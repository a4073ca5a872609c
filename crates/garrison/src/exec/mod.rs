//! Command execution inside containers.

pub mod command;
mod dispatch;

pub use command::{ShellProfile, decode_payload, format_shell_command, join_tokens};
pub use dispatch::{ExecOutcome, ExecutionDispatcher};
