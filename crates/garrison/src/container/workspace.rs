//! Workspace configuration of a container.

use std::path::Path;

use garrison_common::GarrisonPaths;

use crate::runtime::ContainerAttrs;

/// Mount point of the shared workspace inside containers.
pub const WORKSPACE_MOUNT: &str = "/workspace";

/// Mount point of the X11 socket inside GUI-enabled containers.
pub const X11_SOCKET_MOUNT: &str = "/tmp/.X11-unix";

/// Host-side view of a container's workspace, devices and GUI forwarding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Host path mounted at `/workspace` (empty if none).
    pub host_workspace_path: String,
    /// Shared devices, as `hostPath:containerPath`.
    pub devices: Vec<String>,
    /// Whether X11 forwarding is enabled.
    pub gui_enabled: bool,
    /// Private workspace directory owned by this container (empty if none).
    pub private_volume_path: String,
}

impl WorkspaceConfig {
    /// Rebuild the configuration from a container's attributes.
    ///
    /// The workspace is private when its host path lives under the
    /// Garrison workspaces directory.
    #[must_use]
    pub fn from_attrs(attrs: &ContainerAttrs, paths: &GarrisonPaths) -> Self {
        let host_workspace_path = attrs
            .mount_source(WORKSPACE_MOUNT)
            .unwrap_or_default()
            .to_string();

        let devices = attrs
            .devices()
            .iter()
            .map(|d| format!("{}:{}", d.path_on_host, d.path_in_container))
            .collect();

        let gui_enabled = attrs.mount_source(X11_SOCKET_MOUNT).is_some()
            || attrs.env().iter().any(|e| e.starts_with("DISPLAY="));

        let private_volume_path = if !host_workspace_path.is_empty()
            && paths.is_private_workspace(Path::new(&host_workspace_path))
        {
            host_workspace_path.clone()
        } else {
            String::new()
        };

        Self {
            host_workspace_path,
            devices,
            gui_enabled,
            private_volume_path,
        }
    }

    /// Host-side segment of every shared device.
    pub fn host_devices(&self) -> impl Iterator<Item = &str> {
        self.devices
            .iter()
            .map(|d| d.split(':').next().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ContainerConfigAttrs, DeviceAttrs, HostConfigAttrs, MountAttrs};

    fn attrs_with_workspace(source: &str) -> ContainerAttrs {
        ContainerAttrs {
            mounts: vec![MountAttrs {
                source: source.to_string(),
                destination: WORKSPACE_MOUNT.to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn private_workspace_under_root() {
        let paths = GarrisonPaths::with_root("/home/op/.garrison");
        let attrs = attrs_with_workspace("/home/op/.garrison/workspaces/lab");

        let config = WorkspaceConfig::from_attrs(&attrs, &paths);
        assert_eq!(config.host_workspace_path, "/home/op/.garrison/workspaces/lab");
        assert_eq!(config.private_volume_path, "/home/op/.garrison/workspaces/lab");
    }

    #[test]
    fn custom_workspace_is_not_private() {
        let paths = GarrisonPaths::with_root("/home/op/.garrison");
        let attrs = attrs_with_workspace("/home/op/engagements/acme");

        let config = WorkspaceConfig::from_attrs(&attrs, &paths);
        assert_eq!(config.host_workspace_path, "/home/op/engagements/acme");
        assert!(config.private_volume_path.is_empty());
    }

    #[test]
    fn devices_and_gui() {
        let attrs = ContainerAttrs {
            config: Some(ContainerConfigAttrs {
                env: Some(vec!["PATH=/usr/bin".into(), "DISPLAY=:0".into()]),
                ..Default::default()
            }),
            host_config: Some(HostConfigAttrs {
                devices: Some(vec![DeviceAttrs {
                    path_on_host: "/dev/ttyACM0".into(),
                    path_in_container: "/dev/ttyACM0".into(),
                }]),
            }),
            ..Default::default()
        };

        let config = WorkspaceConfig::from_attrs(&attrs, &GarrisonPaths::with_root("/r"));
        assert!(config.gui_enabled);
        assert_eq!(config.devices, vec!["/dev/ttyACM0:/dev/ttyACM0"]);
        assert_eq!(config.host_devices().collect::<Vec<_>>(), vec!["/dev/ttyACM0"]);
        assert!(config.host_workspace_path.is_empty());
    }
}
