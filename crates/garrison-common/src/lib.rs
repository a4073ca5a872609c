//! # garrison-common
//!
//! Shared utilities and types for the Garrison container manager.
//!
//! This crate provides common functionality used across Garrison crates:
//! - Container ID validation and short-id derivation
//! - Standard filesystem paths (private workspaces)
//! - Key-based selection over heterogeneous entities
//! - Common error types

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod paths;
pub mod select;

pub use error::{GarrisonError, GarrisonResult};
pub use id::ContainerId;
pub use paths::GarrisonPaths;
pub use select::{Identifiable, select_by_key, sorted_keys};
