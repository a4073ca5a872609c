//! Operator-facing console.
//!
//! Everything the operator reads or answers goes through [`Console`]:
//! status lines, raw command output, confirmations and wait spinners.
//! Diagnostics for developers go through `tracing` instead.

use std::io::Write;
use std::time::Duration;

use ::console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// How much the console shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Status lines only.
    #[default]
    Normal,
    /// Also verbose lines and raw command output.
    Verbose,
    /// Everything.
    Debug,
}

impl Verbosity {
    /// Map a `-v` occurrence count to a verbosity level.
    #[must_use]
    pub const fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }
}

/// Sink for operator-facing output.
pub trait Console: Send + Sync {
    /// Informational line.
    fn info(&self, message: &str);

    /// Line only shown in verbose mode.
    fn verbose(&self, message: &str);

    /// Success line.
    fn success(&self, message: &str);

    /// Warning line.
    fn warning(&self, message: &str);

    /// Error line.
    fn error(&self, message: &str);

    /// Raw passthrough text (command output), written as-is.
    fn raw(&self, text: &str);

    /// Whether verbose output is shown.
    fn is_verbose(&self) -> bool;

    /// Ask the operator a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> bool;

    /// Show a wait indicator until the returned guard is dropped.
    fn waiting(&self, message: &str) -> WaitIndicator;
}

/// Guard for a wait indicator. The indicator disappears on drop.
#[derive(Debug)]
pub struct WaitIndicator {
    bar: Option<ProgressBar>,
}

impl WaitIndicator {
    /// An indicator that displays nothing.
    #[must_use]
    pub const fn hidden() -> Self {
        Self { bar: None }
    }

    /// A spinner with `message`.
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }
}

impl Drop for WaitIndicator {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Console writing to the terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalConsole {
    verbosity: Verbosity,
}

impl TerminalConsole {
    /// Create a console with the given verbosity.
    #[must_use]
    pub const fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl Console for TerminalConsole {
    fn info(&self, message: &str) {
        eprintln!("{} {message}", style("[*]").blue().bold());
    }

    fn verbose(&self, message: &str) {
        if self.is_verbose() {
            eprintln!("{} {message}", style("[~]").dim());
        }
    }

    fn success(&self, message: &str) {
        eprintln!("{} {message}", style("[+]").green().bold());
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {message}", style("[!]").yellow().bold());
    }

    fn error(&self, message: &str) {
        eprintln!("{} {message}", style("[-]").red().bold());
    }

    fn raw(&self, text: &str) {
        if self.is_verbose() {
            let mut stdout = std::io::stdout().lock();
            // Output is best effort: a closed stdout must not abort the stream.
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    fn confirm(&self, prompt: &str, default: bool) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .unwrap_or_else(|err| {
                tracing::debug!(error = %err, "Confirmation prompt unavailable, using default");
                default
            })
    }

    fn waiting(&self, message: &str) -> WaitIndicator {
        WaitIndicator::spinner(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_occurrences(0), Verbosity::Normal);
        assert_eq!(Verbosity::from_occurrences(1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_occurrences(4), Verbosity::Debug);
    }

    #[test]
    fn terminal_verbosity() {
        assert!(!TerminalConsole::new(Verbosity::Normal).is_verbose());
        assert!(TerminalConsole::new(Verbosity::Debug).is_verbose());
    }

    #[test]
    fn hidden_indicator_drops_cleanly() {
        let indicator = WaitIndicator::hidden();
        drop(indicator);
    }
}
