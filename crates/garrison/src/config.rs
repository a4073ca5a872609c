//! Garrison settings.

use std::path::PathBuf;

use garrison_common::GarrisonPaths;

use crate::exec::ShellProfile;

/// Host path prefixes of volumes mounted through the WSL bridge.
pub const WSL_BRIDGE_PREFIXES: &[&str] = &["/wsl/", "\\wsl\\"];

/// Settings shared by every container handle.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Paths on the host.
    pub paths: GarrisonPaths,
    /// Shell used for commands and interactive sessions.
    pub profile: ShellProfile,
    /// Default graceful stop timeout (seconds).
    pub stop_timeout: u64,
    /// Stop timeout used when the container is about to be removed (seconds).
    pub removal_timeout: u64,
    /// Runtime CLI used for interactive attach.
    pub runtime_bin: String,
    /// Host path prefixes that cannot be removed automatically.
    pub bridge_prefixes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: GarrisonPaths::new(),
            profile: ShellProfile::default(),
            stop_timeout: 10,
            removal_timeout: 2,
            runtime_bin: "docker".to_string(),
            bridge_prefixes: WSL_BRIDGE_PREFIXES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Settings {
    /// Set the root directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.paths = GarrisonPaths::with_root(root);
        self
    }

    /// Set the shell used inside containers.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.profile.shell = shell.into();
        self
    }

    /// Set the default stop timeout.
    #[must_use]
    pub const fn with_stop_timeout(mut self, timeout: u64) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Returns true if `host_path` is mounted through a bridge.
    #[must_use]
    pub fn is_bridge_path(&self, host_path: &str) -> bool {
        self.bridge_prefixes
            .iter()
            .any(|prefix| host_path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.stop_timeout, 10);
        assert_eq!(settings.removal_timeout, 2);
        assert_eq!(settings.profile.shell, "zsh");
    }

    #[test]
    fn builder_pattern() {
        let settings = Settings::default()
            .with_root("/custom/root")
            .with_shell("bash")
            .with_stop_timeout(30);

        assert_eq!(settings.paths.root, PathBuf::from("/custom/root"));
        assert_eq!(settings.profile.shell, "bash");
        assert_eq!(settings.stop_timeout, 30);
    }

    #[test]
    fn bridge_paths() {
        let settings = Settings::default();
        assert!(settings.is_bridge_path("/wsl/home/user/project"));
        assert!(settings.is_bridge_path("\\wsl\\Ubuntu\\home"));
        assert!(!settings.is_bridge_path("/home/user/wsl/project"));
    }
}
