//! Foreground, background and interactive execution.

use std::future::Future;

use futures::StreamExt;
use garrison_common::GarrisonResult;

use super::command::join_tokens;
use crate::container::ContainerHandle;

/// How an execution ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Issued in the background; output is not collected.
    Detached,
    /// Output streamed until the command finished.
    Completed {
        /// Exit code, when the runtime reported one.
        exit_code: Option<i64>,
    },
    /// The operator stopped following the output. The remote process keeps running.
    Interrupted,
}

/// Runs commands in a container through its handle.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionDispatcher<'a> {
    handle: &'a ContainerHandle,
}

impl<'a> ExecutionDispatcher<'a> {
    /// Dispatcher for `handle`.
    #[must_use]
    pub const fn new(handle: &'a ContainerHandle) -> Self {
        Self { handle }
    }

    /// Run `tokens` in the container, starting it first if needed.
    ///
    /// Attached output is followed until the command ends or Ctrl-C is
    /// pressed.
    pub async fn exec<S: AsRef<str>>(
        &self,
        tokens: &[S],
        detached: bool,
    ) -> GarrisonResult<ExecOutcome> {
        self.exec_until(tokens, detached, interrupted()).await
    }

    /// Same as [`exec`](Self::exec), with `interrupt` as the local
    /// cancellation signal.
    ///
    /// Cancellation only stops reading the output; nothing is sent to the
    /// remote process.
    pub async fn exec_until<S, F>(
        &self,
        tokens: &[S],
        detached: bool,
        interrupt: F,
    ) -> GarrisonResult<ExecOutcome>
    where
        S: AsRef<str>,
        F: Future<Output = ()>,
    {
        self.handle.start().await?;

        let ctx = self.handle.context();
        let console = ctx.console.as_ref();
        console.info("Executing command in the container");
        if !console.is_verbose() {
            console.info("Hint: use verbose mode to see command output (-v).");
        }

        console.success(&format!("Command received: {}", join_tokens(tokens)));
        let command = ctx.settings.profile.format(tokens);
        tracing::debug!(container = %self.handle.name(), command = %command, "Formatted shell command");

        let session = self.handle.runtime().exec(&command, detached).await?;
        if detached {
            console.success("Command successfully executed in background");
            return Ok(ExecOutcome::Detached);
        }

        if let Some(mut output) = session.output {
            let mut text = Utf8Carry::default();
            tokio::pin!(interrupt);
            loop {
                tokio::select! {
                    biased;
                    () = &mut interrupt => {
                        console.info("Detaching process logging");
                        console.warning("Exiting this command does NOT stop the process in the container");
                        return Ok(ExecOutcome::Interrupted);
                    }
                    chunk = output.next() => match chunk {
                        Some(chunk) => {
                            let decoded = text.push(&chunk?);
                            if !decoded.is_empty() {
                                console.raw(&decoded);
                            }
                        }
                        None => break,
                    },
                }
            }
            let rest = text.finish();
            if !rest.is_empty() {
                console.raw(&rest);
            }
        }

        let exit_code = match session.exec_id.as_deref() {
            Some(exec_id) => self.handle.runtime().exec_exit_code(exec_id).await?,
            None => None,
        };
        tracing::debug!(container = %self.handle.name(), ?exit_code, "Command finished");

        console.success("End of the command");
        Ok(ExecOutcome::Completed { exit_code })
    }

    /// Open an interactive shell in the container on the current terminal.
    ///
    /// Returns the shell's exit code.
    pub async fn spawn_shell(&self) -> GarrisonResult<i32> {
        let ctx = self.handle.context();
        let config = self.handle.config();

        ctx.console.info(&format!(
            "Location of the workspace on the host: {}",
            config.host_workspace_path
        ));
        for device in config.host_devices() {
            ctx.console.info(&format!("Shared host device: {device}"));
        }
        ctx.console
            .success(&format!("Opening shell in '{}'", self.handle.name()));

        if config.gui_enabled {
            if let Err(err) = ctx.host.grant_display_access(self.handle.hostname()).await {
                ctx.console
                    .warning(&format!("Cannot grant display access to the container: {err}"));
            }
        }

        // Interactive shells load their aliases natively: no formatting.
        ctx.host
            .attach_shell(self.handle.full_id(), &ctx.settings.profile.shell)
            .await
    }
}

/// Resolves on Ctrl-C. Never resolves if signals cannot be watched.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Decodes a byte stream as UTF-8 across chunk boundaries.
///
/// A character split between two chunks is held back until its last byte
/// arrives. Invalid sequences are replaced with U+FFFD.
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let split = self.pending.len() - incomplete_suffix(&self.pending);
        let text = String::from_utf8_lossy(&self.pending[..split]).into_owned();
        self.pending.drain(..split);
        text
    }

    fn finish(self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}

/// Length of a truncated multi-byte sequence at the end of `bytes`.
fn incomplete_suffix(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 != 0x80 {
            let width = match byte {
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => 1,
            };
            return if width > back { back } else { 0 };
        }
    }
    0
}
