//! Container attribute snapshot.
//!
//! Mirrors the subset of the Docker inspect document that Garrison reads.
//! Field names follow the inspect JSON (PascalCase) so a raw inspect payload
//! deserializes directly. Every field is optional on the wire.

use serde::{Deserialize, Serialize};

/// Snapshot of a container's attributes, as returned by a runtime refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerAttrs {
    /// Full container ID.
    #[serde(default)]
    pub id: String,

    /// Container name. Docker prefixes it with `/`.
    #[serde(default)]
    pub name: String,

    /// Image ID the container was created from.
    #[serde(default)]
    pub image: String,

    /// Container configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ContainerConfigAttrs>,

    /// Live state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateAttrs>,

    /// Mounts attached to the container.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<MountAttrs>,

    /// Host-side configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_config: Option<HostConfigAttrs>,
}

/// `Config` section of the inspect document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerConfigAttrs {
    /// Hostname inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Image reference the container was created with (e.g. `garrison:full`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Environment, as `KEY=value` strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
}

/// `State` section of the inspect document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StateAttrs {
    /// Raw status string (`running`, `exited`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// One entry of the `Mounts` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountAttrs {
    /// Host-side source path.
    #[serde(default)]
    pub source: String,

    /// Mount point inside the container.
    #[serde(default)]
    pub destination: String,
}

/// `HostConfig` section of the inspect document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfigAttrs {
    /// Devices shared with the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceAttrs>>,
}

/// One entry of the `HostConfig.Devices` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceAttrs {
    /// Device path on the host.
    #[serde(default)]
    pub path_on_host: String,

    /// Device path inside the container.
    #[serde(default)]
    pub path_in_container: String,
}

impl ContainerAttrs {
    /// Container name without the leading `/` added by Docker.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.trim_start_matches('/')
    }

    /// Raw `State.Status` field, if present and non-empty.
    #[must_use]
    pub fn raw_status(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Hostname configured for the container, if any.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.hostname.as_deref())
    }

    /// Image reference from the container configuration, if any.
    #[must_use]
    pub fn image_reference(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.image.as_deref())
    }

    /// Environment variables, as `KEY=value` strings.
    #[must_use]
    pub fn env(&self) -> &[String] {
        self.config
            .as_ref()
            .and_then(|c| c.env.as_deref())
            .unwrap_or_default()
    }

    /// Devices shared with the container.
    #[must_use]
    pub fn devices(&self) -> &[DeviceAttrs] {
        self.host_config
            .as_ref()
            .and_then(|h| h.devices.as_deref())
            .unwrap_or_default()
    }

    /// Source of the mount targeting `destination`, if any.
    #[must_use]
    pub fn mount_source(&self, destination: &str) -> Option<&str> {
        self.mounts
            .iter()
            .find(|m| m.destination == destination)
            .map(|m| m.source.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inspect_document() {
        let json = r#"{
            "Id": "4f3c2b1a0e9d8c7b6a5f",
            "Name": "/garrison-lab",
            "Image": "sha256:0123456789abcdef",
            "Config": {"Hostname": "garrison-lab", "Image": "garrison:full", "Env": ["DISPLAY=:0"]},
            "State": {"Status": "running", "Pid": 4242},
            "Mounts": [{"Source": "/home/user/ws", "Destination": "/workspace", "Mode": "rw"}],
            "HostConfig": {"Devices": [{"PathOnHost": "/dev/ttyUSB0", "PathInContainer": "/dev/ttyUSB0", "CgroupPermissions": "rwm"}]}
        }"#;

        let attrs: ContainerAttrs = serde_json::from_str(json).unwrap();
        assert_eq!(attrs.display_name(), "garrison-lab");
        assert_eq!(attrs.raw_status(), Some("running"));
        assert_eq!(attrs.hostname(), Some("garrison-lab"));
        assert_eq!(attrs.image_reference(), Some("garrison:full"));
        assert_eq!(attrs.env(), ["DISPLAY=:0".to_string()]);
        assert_eq!(attrs.mount_source("/workspace"), Some("/home/user/ws"));
        assert_eq!(attrs.devices()[0].path_on_host, "/dev/ttyUSB0");
    }

    #[test]
    fn missing_sections_are_tolerated() {
        let attrs: ContainerAttrs = serde_json::from_str(r#"{"Id": "abc"}"#).unwrap();
        assert_eq!(attrs.raw_status(), None);
        assert!(attrs.devices().is_empty());
        assert!(attrs.env().is_empty());
        assert_eq!(attrs.mount_source("/workspace"), None);
    }
}
