//! Container status values and their operator display.

use std::fmt;

use ::console::style;

/// Raw status reported when the runtime does not provide one.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Container status, as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerStatus {
    /// Created but never started.
    Created,
    /// Restarting after a failure.
    Restarting,
    /// Running.
    Running,
    /// Being removed.
    Removing,
    /// Paused.
    Paused,
    /// Exited.
    Exited,
    /// Dead (failed removal).
    Dead,
    /// Status absent from the runtime's answer.
    Unknown,
    /// A status this version does not know about.
    Other(String),
}

impl ContainerStatus {
    /// Parse a raw runtime status. Never fails: every input maps to a value.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "created" => Self::Created,
            "restarting" => Self::Restarting,
            "running" => Self::Running,
            "removing" => Self::Removing,
            "paused" => Self::Paused,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            "" | UNKNOWN_STATUS => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true if the container is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Plain display label.
    ///
    /// `exited` reads as "Stopped"; statuses without a dedicated label are
    /// shown as their raw lowercase string.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Unknown => "Unknown".to_string(),
            Self::Exited => "Stopped".to_string(),
            Self::Running => "Running".to_string(),
            other => other.to_string(),
        }
    }

    /// Styled display label for the terminal.
    #[must_use]
    pub fn styled(&self) -> String {
        match self {
            Self::Unknown => format!("{} {}", style("?").red(), self.label()),
            Self::Exited => format!("{}", style(format!("■ {}", self.label())).red()),
            Self::Running => format!("{}", style(format!("▶ {}", self.label())).green()),
            other => other.label(),
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Restarting => write!(f, "restarting"),
            Self::Running => write!(f, "running"),
            Self::Removing => write!(f, "removing"),
            Self::Paused => write!(f, "paused"),
            Self::Exited => write!(f, "exited"),
            Self::Dead => write!(f, "dead"),
            Self::Unknown => write!(f, "{UNKNOWN_STATUS}"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_statuses() {
        assert_eq!(ContainerStatus::from_raw("running"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::from_raw("Exited"), ContainerStatus::Exited);
        assert_eq!(ContainerStatus::from_raw("unknown"), ContainerStatus::Unknown);
        assert_eq!(ContainerStatus::from_raw(""), ContainerStatus::Unknown);
    }

    #[test]
    fn labels() {
        assert_eq!(ContainerStatus::Running.label(), "Running");
        assert_eq!(ContainerStatus::Exited.label(), "Stopped");
        assert_eq!(ContainerStatus::Unknown.label(), "Unknown");
        assert_eq!(ContainerStatus::Paused.label(), "paused");
        assert_eq!(ContainerStatus::from_raw("Hibernating").label(), "hibernating");
    }

    #[test]
    fn mapping_is_total() {
        for raw in ["created", "restarting", "removing", "dead", "weird", "", "RUNNING"] {
            let status = ContainerStatus::from_raw(raw);
            assert!(!status.label().is_empty(), "no label for {raw:?}");
            assert!(!status.styled().is_empty());
        }
    }

    #[test]
    fn only_running_is_running() {
        assert!(ContainerStatus::Running.is_running());
        assert!(!ContainerStatus::Paused.is_running());
        assert!(!ContainerStatus::Unknown.is_running());
    }
}
