//! Private workspace reclamation.
//!
//! Runs as the last step of container removal. Every outcome is reported on
//! the console and none of them aborts the removal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::WorkspaceConfig;
use crate::config::Settings;
use crate::console::Console;

/// Outcome of reclaiming a private workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeOutcome {
    /// The directory tree was deleted.
    Removed {
        /// Deleted directory.
        path: PathBuf,
    },
    /// The container has no private workspace.
    NoPrivateVolume,
    /// The workspace is mounted through a bridge and was left alone.
    BridgePathSkipped {
        /// Host workspace path.
        host_path: String,
    },
    /// The operator chose to keep a non-empty workspace.
    Declined {
        /// Preserved directory.
        path: PathBuf,
    },
    /// Deletion was not permitted.
    PermissionDenied {
        /// Directory left in place.
        path: PathBuf,
    },
    /// Deletion failed for another reason.
    DeletionFailed {
        /// Directory that could not be deleted.
        path: PathBuf,
        /// Error reported by the filesystem.
        message: String,
    },
}

impl VolumeOutcome {
    /// Returns true if the workspace was deleted.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }
}

/// Deletes a directory tree.
type RemoveTree = fn(&Path) -> io::Result<()>;

fn remove_tree(path: &Path) -> io::Result<()> {
    fs::remove_dir_all(path)
}

/// Teardown policy for a container's private workspace.
pub struct VolumeReclaimer<'a> {
    settings: &'a Settings,
    console: &'a dyn Console,
    remove_tree: RemoveTree,
}

impl<'a> VolumeReclaimer<'a> {
    /// Create a reclaimer reporting on `console`.
    #[must_use]
    pub fn new(settings: &'a Settings, console: &'a dyn Console) -> Self {
        Self {
            settings,
            console,
            remove_tree,
        }
    }

    #[cfg(test)]
    fn with_remover(mut self, remove_tree: RemoveTree) -> Self {
        self.remove_tree = remove_tree;
        self
    }

    /// Delete the private workspace described by `config`, if any.
    ///
    /// A non-empty directory is only deleted after confirmation (default:
    /// no). Failures are reported and absorbed.
    pub fn remove_private_volume(&self, config: &WorkspaceConfig) -> VolumeOutcome {
        if config.private_volume_path.is_empty() {
            return self.check_bridge(&config.host_workspace_path);
        }

        let path = PathBuf::from(&config.private_volume_path);
        self.console.verbose("Removing workspace volume");
        tracing::debug!(path = %path.display(), "Removing private volume");

        match self.delete(&path) {
            Ok(true) => {
                self.console
                    .success("Private workspace volume removed successfully");
                VolumeOutcome::Removed { path }
            }
            Ok(false) => {
                self.console
                    .info(&format!("Private workspace kept at {}", path.display()));
                VolumeOutcome::Declined { path }
            }
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                self.console.warning(&format!(
                    "I don't have the rights to remove {} (do it yourself)",
                    path.display()
                ));
                VolumeOutcome::PermissionDenied { path }
            }
            Err(err) => {
                self.console.error(&format!(
                    "Cannot remove workspace {}: {err}",
                    path.display()
                ));
                VolumeOutcome::DeletionFailed {
                    path,
                    message: err.to_string(),
                }
            }
        }
    }

    fn check_bridge(&self, host_path: &str) -> VolumeOutcome {
        if self.settings.is_bridge_path(host_path) {
            self.console
                .warning("Warning: WSL workspace directory cannot be removed automatically.");
            return VolumeOutcome::BridgePathSkipped {
                host_path: host_path.to_string(),
            };
        }
        VolumeOutcome::NoPrivateVolume
    }

    /// Returns `Ok(false)` if the operator declined.
    fn delete(&self, path: &Path) -> io::Result<bool> {
        let not_empty = fs::read_dir(path)?.next().is_some();
        if not_empty {
            let prompt = format!(
                "Workspace {} is not empty, do you want to delete it?",
                path.display()
            );
            if !self.console.confirm(&prompt, false) {
                return Ok(false);
            }
        }

        (self.remove_tree)(path)?;
        Ok(true)
    }
}
