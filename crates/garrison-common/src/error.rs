//! Common error types for Garrison.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`GarrisonError`].
pub type GarrisonResult<T> = Result<T, GarrisonError>;

/// Common errors across Garrison.
#[derive(Error, Diagnostic, Debug)]
pub enum GarrisonError {
    /// The container runtime could not be contacted.
    #[error("Container runtime unreachable: {message}")]
    #[diagnostic(
        code(garrison::runtime::unreachable),
        help("Check that the Docker daemon is running and that you can access its socket")
    )]
    RuntimeUnreachable {
        /// Underlying transport failure.
        message: String,
    },

    /// Container not found (or already removed).
    #[error("Container not found: {name}")]
    #[diagnostic(code(garrison::container::not_found))]
    ContainerNotFound {
        /// The container name or ID that was not found.
        name: String,
    },

    /// Invalid container ID format.
    #[error("Invalid container ID: {id}")]
    #[diagnostic(
        code(garrison::container::invalid_id),
        help("Container IDs must be alphanumeric with hyphens and underscores, 1-64 characters")
    )]
    InvalidContainerId {
        /// The invalid container ID.
        id: String,
    },

    /// The runtime rejected a request for another reason.
    #[error("Runtime error on {operation}: {message}")]
    #[diagnostic(code(garrison::runtime::error))]
    Runtime {
        /// The operation that failed (start, stop, exec, ...).
        operation: String,
        /// Message returned by the runtime.
        message: String,
    },

    /// A command could not be executed or its output could not be read.
    #[error("Execution failed: {message}")]
    #[diagnostic(code(garrison::exec))]
    Exec {
        /// The error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(garrison::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(garrison::serialization))]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(garrison::internal),
        help("This is a bug, please report it at https://github.com/fishmindlabs360/garrison/issues")
    )]
    Internal {
        /// The error message.
        message: String,
    },
}

impl GarrisonError {
    /// Returns true if the error means the container does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ContainerNotFound { .. })
    }
}

impl From<serde_json::Error> for GarrisonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
