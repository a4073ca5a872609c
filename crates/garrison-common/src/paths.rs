//! Standard filesystem paths for Garrison.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

/// Default root directory for Garrison data.
pub static GARRISON_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("GARRISON_ROOT").map_or_else(
        |_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".garrison")
        },
        PathBuf::from,
    )
});

/// Standard paths used by Garrison on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarrisonPaths {
    /// Root data directory (default: ~/.garrison).
    pub root: PathBuf,
}

impl GarrisonPaths {
    /// Create paths with default locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the private workspace of every container.
    #[must_use]
    pub fn workspaces(&self) -> PathBuf {
        self.root.join("workspaces")
    }

    /// Private workspace directory for a specific container.
    #[must_use]
    pub fn workspace(&self, name: &str) -> PathBuf {
        self.workspaces().join(name)
    }

    /// Returns true if `path` is a private workspace managed by Garrison.
    #[must_use]
    pub fn is_private_workspace(&self, path: &Path) -> bool {
        path.starts_with(self.workspaces()) && path != self.workspaces()
    }
}

impl Default for GarrisonPaths {
    fn default() -> Self {
        Self {
            root: GARRISON_ROOT.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_root() {
        let paths = GarrisonPaths::with_root("/tmp/garrison-test");
        assert_eq!(
            paths.workspaces(),
            PathBuf::from("/tmp/garrison-test/workspaces")
        );
        assert_eq!(
            paths.workspace("lab"),
            PathBuf::from("/tmp/garrison-test/workspaces/lab")
        );
    }

    #[test]
    fn private_workspace_detection() {
        let paths = GarrisonPaths::with_root("/srv/garrison");
        assert!(paths.is_private_workspace(Path::new("/srv/garrison/workspaces/lab")));
        assert!(!paths.is_private_workspace(Path::new("/srv/garrison/workspaces")));
        assert!(!paths.is_private_workspace(Path::new("/home/user/project")));
    }
}
