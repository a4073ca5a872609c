//! Collaborators shared by every container handle.

use std::sync::Arc;

use crate::config::Settings;
use crate::console::{Console, TerminalConsole, Verbosity};
use crate::host::{HostShell, SystemShell};

/// Settings plus the console and host bridge handles report through.
#[derive(Clone)]
pub struct Context {
    /// Garrison settings.
    pub settings: Settings,
    /// Operator console.
    pub console: Arc<dyn Console>,
    /// Host shell bridge.
    pub host: Arc<dyn HostShell>,
}

impl Context {
    /// Bundle the collaborators.
    #[must_use]
    pub fn new(settings: Settings, console: Arc<dyn Console>, host: Arc<dyn HostShell>) -> Self {
        Self {
            settings,
            console,
            host,
        }
    }

    /// Production collaborators: terminal console and real host processes.
    #[must_use]
    pub fn terminal(settings: Settings, verbosity: Verbosity) -> Self {
        let host = SystemShell::new(settings.runtime_bin.clone());
        Self::new(
            settings,
            Arc::new(TerminalConsole::new(verbosity)),
            Arc::new(host),
        )
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
