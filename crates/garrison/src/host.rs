//! Host shell bridge.
//!
//! The two side effects that need the real host (granting X11 access and
//! handing the terminal to an interactive shell) live behind [`HostShell`].

use async_trait::async_trait;
use garrison_common::{GarrisonError, GarrisonResult};
use tokio::process::Command;

/// Side effects performed on the host rather than through the runtime API.
#[async_trait]
pub trait HostShell: Send + Sync {
    /// Grant `hostname` access to the local display server.
    async fn grant_display_access(&self, hostname: &str) -> GarrisonResult<()>;

    /// Attach the current terminal to `shell` running in `container_id`.
    ///
    /// Blocks until the shell exits and returns its exit code.
    async fn attach_shell(&self, container_id: &str, shell: &str) -> GarrisonResult<i32>;
}

/// Host bridge running real processes with inherited stdio.
#[derive(Debug, Clone)]
pub struct SystemShell {
    runtime_bin: String,
}

impl SystemShell {
    /// Create a bridge using `runtime_bin` (e.g. `docker`) for attach.
    #[must_use]
    pub fn new(runtime_bin: impl Into<String>) -> Self {
        Self {
            runtime_bin: runtime_bin.into(),
        }
    }
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new("docker")
    }
}

#[async_trait]
impl HostShell for SystemShell {
    async fn grant_display_access(&self, hostname: &str) -> GarrisonResult<()> {
        let acl = format!("+local:{hostname}");
        tracing::debug!(acl = %acl, "Adding xhost ACL");

        let status = Command::new("xhost")
            .arg(&acl)
            .stdout(std::process::Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(GarrisonError::Exec {
                message: format!("xhost {acl} exited with {status}"),
            });
        }
        Ok(())
    }

    async fn attach_shell(&self, container_id: &str, shell: &str) -> GarrisonResult<i32> {
        tracing::debug!(container = %container_id, shell = %shell, "Attaching interactive shell");

        let status = Command::new(&self.runtime_bin)
            .args(["exec", "-ti", container_id, shell])
            .status()
            .await
            .map_err(|e| GarrisonError::Exec {
                message: format!("Cannot run {}: {e}", self.runtime_bin),
            })?;

        Ok(status.code().unwrap_or(-1))
    }
}
