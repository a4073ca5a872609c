//! Container runtime collaborator.
//!
//! Garrison never talks to the container engine directly: every live query
//! and mutation goes through [`RuntimeContainer`]. [`ContainerRuntime`]
//! resolves names to runtime objects.

mod attrs;
mod docker;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use garrison_common::GarrisonResult;

pub use attrs::{
    ContainerAttrs, ContainerConfigAttrs, DeviceAttrs, HostConfigAttrs, MountAttrs, StateAttrs,
};
pub use docker::{DockerContainer, DockerRuntime};

/// Live output of an attached exec, chunk by chunk in arrival order.
pub type OutputStream = BoxStream<'static, GarrisonResult<Bytes>>;

/// Result of issuing a command inside a container.
pub struct ExecSession {
    /// Runtime identifier of the exec instance, used to read its exit code.
    pub exec_id: Option<String>,
    /// Output stream. `None` for detached execution.
    pub output: Option<OutputStream>,
}

impl ExecSession {
    /// A session for a detached command: nothing to follow.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            exec_id: None,
            output: None,
        }
    }

    /// A session streaming `output` for the exec instance `exec_id`.
    #[must_use]
    pub fn attached(exec_id: impl Into<String>, output: OutputStream) -> Self {
        Self {
            exec_id: Some(exec_id.into()),
            output: Some(output),
        }
    }
}

impl std::fmt::Debug for ExecSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecSession")
            .field("exec_id", &self.exec_id)
            .field("attached", &self.output.is_some())
            .finish()
    }
}

/// A live container object owned by the runtime.
#[async_trait]
pub trait RuntimeContainer: Send + Sync {
    /// Full container ID.
    fn id(&self) -> &str;

    /// Refresh and return the container attributes.
    async fn reload(&self) -> GarrisonResult<ContainerAttrs>;

    /// Start the container.
    async fn start(&self) -> GarrisonResult<()>;

    /// Stop the container, waiting up to `timeout_secs` before killing it.
    async fn stop(&self, timeout_secs: u64) -> GarrisonResult<()>;

    /// Delete the container.
    ///
    /// Fails with `ContainerNotFound` if it is already gone.
    async fn remove(&self) -> GarrisonResult<()>;

    /// Run `command` inside the container.
    async fn exec(&self, command: &str, detached: bool) -> GarrisonResult<ExecSession>;

    /// Exit code of a finished exec instance. `None` while it still runs.
    async fn exec_exit_code(&self, exec_id: &str) -> GarrisonResult<Option<i64>>;
}

/// Lookup of runtime objects.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Find a container by name or ID.
    async fn container(&self, name: &str) -> GarrisonResult<Box<dyn RuntimeContainer>>;

    /// List every container known to the runtime, running or not.
    async fn list(&self) -> GarrisonResult<Vec<Box<dyn RuntimeContainer>>>;
}
