//! # Garrison
//!
//! Lifecycle manager for security-tooling containers.
//!
//! ## Features
//!
//! - **Live status**: container status is always read from the runtime, never cached
//! - **Safe command transport**: commands are base64-wrapped so operator quoting survives the shell
//! - **Foreground, background and interactive execution**, with local detach on Ctrl-C
//! - **Workspace reclamation**: private workspaces are deleted on removal, after confirmation
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use garrison::config::Settings;
//! use garrison::console::Verbosity;
//! use garrison::context::Context;
//! use garrison::runtime::{ContainerRuntime, DockerRuntime};
//! use garrison::ContainerHandle;
//!
//! # async fn example() -> garrison_common::GarrisonResult<()> {
//! let runtime = DockerRuntime::connect()?;
//! let ctx = Arc::new(Context::terminal(Settings::default(), Verbosity::Verbose));
//!
//! let handle = ContainerHandle::from_discovered(runtime.container("lab").await?, ctx).await?;
//! handle.dispatcher().exec(&["nmap", "-sV", "10.0.0.1"], false).await?;
//! handle.remove().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod console;
pub mod container;
pub mod context;
pub mod exec;
pub mod host;
pub mod runtime;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use container::ContainerHandle;
pub use exec::{ExecOutcome, ExecutionDispatcher};
