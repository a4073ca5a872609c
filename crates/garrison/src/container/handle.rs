//! Container handle: identity, live status, start/stop/remove.

use std::fmt;
use std::sync::Arc;

use garrison_common::{ContainerId, GarrisonResult, Identifiable};

use super::status::{ContainerStatus, UNKNOWN_STATUS};
use super::template::{ContainerTemplate, ImageRef};
use super::volume::{VolumeOutcome, VolumeReclaimer};
use super::workspace::WorkspaceConfig;
use crate::context::Context;
use crate::exec::ExecutionDispatcher;
use crate::runtime::{ContainerAttrs, RuntimeContainer};

/// What happened to the runtime object during removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRemoval {
    /// The runtime deleted the container.
    Removed,
    /// The container was already gone.
    AlreadyAbsent,
}

/// Result of [`ContainerHandle::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Fate of the runtime object.
    pub container: ContainerRemoval,
    /// Fate of the private workspace.
    pub volume: VolumeOutcome,
}

/// Handle on an existing container.
pub struct ContainerHandle {
    container: Box<dyn RuntimeContainer>,
    id: ContainerId,
    name: String,
    hostname: String,
    config: WorkspaceConfig,
    image: Arc<ImageRef>,
    ctx: Arc<Context>,
}

impl ContainerHandle {
    /// Wrap a live container found in the runtime.
    ///
    /// Workspace configuration and image are reconstructed from the
    /// container's attributes.
    pub async fn from_discovered(
        container: Box<dyn RuntimeContainer>,
        ctx: Arc<Context>,
    ) -> GarrisonResult<Self> {
        let attrs = container.reload().await?;
        let image = Arc::new(ImageRef::from_attrs(&attrs));
        Self::build(container, &attrs, image, None, ctx)
    }

    /// Pair a freshly created container with the template it was created from.
    ///
    /// The configuration is rebuilt from the container (paths are only final
    /// after creation); the image is inherited from the template.
    pub async fn from_template(
        container: Box<dyn RuntimeContainer>,
        template: &ContainerTemplate,
        ctx: Arc<Context>,
    ) -> GarrisonResult<Self> {
        let attrs = container.reload().await?;
        Self::build(
            container,
            &attrs,
            Arc::clone(&template.image),
            Some(template.hostname.as_str()),
            ctx,
        )
    }

    fn build(
        container: Box<dyn RuntimeContainer>,
        attrs: &ContainerAttrs,
        image: Arc<ImageRef>,
        fallback_hostname: Option<&str>,
        ctx: Arc<Context>,
    ) -> GarrisonResult<Self> {
        let id = ContainerId::new(container.id())?;
        let name = attrs.display_name().to_string();
        tracing::debug!(container = %name, id = %id, "Loading container");

        let hostname = attrs
            .hostname()
            .or(fallback_hostname)
            .unwrap_or(&name)
            .to_string();
        let config = WorkspaceConfig::from_attrs(attrs, &ctx.settings.paths);

        Ok(Self {
            container,
            id,
            name,
            hostname,
            config,
            image,
            ctx,
        })
    }

    /// Full container ID.
    #[must_use]
    pub fn full_id(&self) -> &str {
        self.id.as_str()
    }

    /// Short container ID (prefix of the full ID).
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.short()
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hostname inside the container.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Workspace configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Image the container was built from.
    #[must_use]
    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub(crate) fn context(&self) -> &Context {
        &self.ctx
    }

    pub(crate) fn runtime(&self) -> &dyn RuntimeContainer {
        self.container.as_ref()
    }

    /// Raw status string, freshly queried from the runtime.
    ///
    /// Returns `"unknown"` if the runtime does not report one.
    pub async fn raw_status(&self) -> GarrisonResult<String> {
        let attrs = self.container.reload().await?;
        Ok(attrs.raw_status().unwrap_or(UNKNOWN_STATUS).to_string())
    }

    /// Typed status, freshly queried from the runtime.
    pub async fn status(&self) -> GarrisonResult<ContainerStatus> {
        Ok(ContainerStatus::from_raw(&self.raw_status().await?))
    }

    /// Styled status for the terminal, freshly queried from the runtime.
    pub async fn text_status(&self) -> GarrisonResult<String> {
        Ok(self.status().await?.styled())
    }

    /// Whether the container is running right now.
    pub async fn is_running(&self) -> GarrisonResult<bool> {
        Ok(self.status().await?.is_running())
    }

    /// Start the container. No-op if it is already running.
    pub async fn start(&self) -> GarrisonResult<()> {
        if self.is_running().await? {
            return Ok(());
        }

        self.ctx
            .console
            .info(&format!("Starting container {}", self.name));
        tracing::info!(container = %self.name, "Starting container");
        self.container.start().await
    }

    /// Stop the container gracefully. No-op if it is not running.
    ///
    /// `None` uses the configured default timeout.
    pub async fn stop(&self, timeout: Option<u64>) -> GarrisonResult<()> {
        if !self.is_running().await? {
            return Ok(());
        }

        let timeout = timeout.unwrap_or(self.ctx.settings.stop_timeout);
        self.ctx
            .console
            .info(&format!("Stopping container {}", self.name));
        tracing::info!(container = %self.name, timeout, "Stopping container");

        let _wait = self
            .ctx
            .console
            .waiting(&format!("Waiting to stop ({timeout}s timeout)"));
        self.container.stop(timeout).await
    }

    /// Stop and delete the container, then reclaim its private workspace.
    ///
    /// A container that already disappeared is not an error. Workspace
    /// failures are reported on the console and never raised.
    pub async fn remove(self) -> GarrisonResult<RemovalReport> {
        match self.stop(Some(self.ctx.settings.removal_timeout)).await {
            Err(err) if err.is_not_found() => {
                tracing::debug!(container = %self.name, "Container vanished before stop");
            }
            other => other?,
        }

        self.ctx
            .console
            .info(&format!("Removing container {}", self.name));

        let container = match self.container.remove().await {
            Ok(()) => {
                self.ctx
                    .console
                    .success(&format!("Container {} successfully removed.", self.name));
                ContainerRemoval::Removed
            }
            Err(err) if err.is_not_found() => {
                self.ctx.console.error(&format!(
                    "The container {} has already been removed (probably created as a temporary container).",
                    self.name
                ));
                ContainerRemoval::AlreadyAbsent
            }
            Err(err) => return Err(err),
        };

        let volume = VolumeReclaimer::new(&self.ctx.settings, self.ctx.console.as_ref())
            .remove_private_volume(&self.config);

        tracing::info!(container = %self.name, ?container, ?volume, "Container removed");
        Ok(RemovalReport { container, volume })
    }

    /// Command execution on this container.
    #[must_use]
    pub const fn dispatcher(&self) -> ExecutionDispatcher<'_> {
        ExecutionDispatcher::new(self)
    }
}

impl Identifiable for ContainerHandle {
    fn key(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] ({})", self.name, self.short_id(), self.image.name)
    }
}

impl fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("config", &self.config)
            .field("image", &self.image)
            .finish_non_exhaustive()
    }
}
