//! Container handles.
//!
//! A [`ContainerHandle`] caches only immutable identity; status is read
//! from the runtime on every call.

mod handle;
mod status;
mod template;
mod volume;
mod workspace;

pub use handle::{ContainerHandle, ContainerRemoval, RemovalReport};
pub use status::{ContainerStatus, UNKNOWN_STATUS};
pub use template::{ContainerTemplate, ImageRef};
pub use volume::{VolumeOutcome, VolumeReclaimer};
pub use workspace::{WORKSPACE_MOUNT, WorkspaceConfig, X11_SOCKET_MOUNT};
