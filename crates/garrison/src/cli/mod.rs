//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use ::console::style;
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use garrison_common::{GarrisonError, Identifiable, select_by_key, sorted_keys};

use crate::config::Settings;
use crate::console::Verbosity;
use crate::container::{ContainerHandle, ContainerRemoval};
use crate::context::Context;
use crate::exec::ExecOutcome;
use crate::runtime::{ContainerRuntime, DockerRuntime};

/// Garrison - lifecycle manager for security-tooling containers
#[derive(Parser, Debug)]
#[command(name = "garrison")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root directory for garrison data (default: ~/.garrison)
    #[arg(long, global = true, env = "GARRISON_ROOT")]
    pub root: Option<PathBuf>,

    /// Shell used inside containers
    #[arg(long, global = true, env = "GARRISON_SHELL")]
    pub shell: Option<String>,

    /// Increase verbosity (-v shows command output, -vv adds diagnostics)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Container lifecycle commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List containers
    List,

    /// Show the live status of a container
    Status {
        /// Container name
        name: String,
    },

    /// Start a container
    Start {
        /// Container name
        name: String,
    },

    /// Stop a running container
    Stop {
        /// Container name
        name: String,

        /// Seconds to wait before killing the container
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Open an interactive shell in a container
    Shell {
        /// Container name
        name: String,
    },

    /// Execute a command in a container
    Exec {
        /// Container name
        name: String,

        /// Run in the background without following the output
        #[arg(short, long)]
        background: bool,

        /// Command and arguments
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Remove containers and their private workspaces
    Remove {
        /// Container names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show the configuration of a container
    Info {
        /// Container name
        name: String,
    },
}

impl Cli {
    /// Console verbosity requested on the command line.
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        if self.debug {
            Verbosity::Debug
        } else {
            Verbosity::from_occurrences(self.verbose)
        }
    }

    /// Default `tracing` directive for the requested verbosity.
    #[must_use]
    pub const fn log_directive(&self) -> &'static str {
        match self.verbosity() {
            Verbosity::Normal => "garrison=warn",
            Verbosity::Verbose => "garrison=info",
            Verbosity::Debug => "garrison=debug",
        }
    }

    /// Settings derived from global flags.
    #[must_use]
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(root) = &self.root {
            settings = settings.with_root(root);
        }
        if let Some(shell) = &self.shell {
            settings = settings.with_shell(shell);
        }
        settings
    }

    /// Execute the CLI command against the local Docker engine.
    pub async fn execute(self) -> Result<()> {
        let ctx = Arc::new(Context::terminal(self.settings(), self.verbosity()));
        let runtime = DockerRuntime::connect().wrap_err("Cannot reach the container engine")?;
        self.command.run(&runtime, ctx).await
    }
}

impl Commands {
    /// Run the command against `runtime`.
    pub async fn run(self, runtime: &dyn ContainerRuntime, ctx: Arc<Context>) -> Result<()> {
        match self {
            Self::List => {
                let handles = load_all(runtime, &ctx).await?;
                print_table(&handles).await?;
                Ok(())
            }

            Self::Status { name } => {
                let handles = load_all(runtime, &ctx).await?;
                let handle = select_by_key(&handles, &name)
                    .ok_or_else(|| not_found(&name, &handles))?;
                println!("{}\t{}", handle.name(), handle.text_status().await?);
                Ok(())
            }

            Self::Info { name } => {
                let handles = load_all(runtime, &ctx).await?;
                let handle = select_by_key(&handles, &name)
                    .ok_or_else(|| not_found(&name, &handles))?;
                print_info(handle).await
            }

            Self::Start { name } => {
                let handle = find(runtime, &ctx, &name).await?;
                handle
                    .start()
                    .await
                    .wrap_err_with(|| format!("Failed to start container {name}"))?;
                ctx.console
                    .success(&format!("Container {} is running", handle.name()));
                Ok(())
            }

            Self::Stop { name, timeout } => {
                let handle = find(runtime, &ctx, &name).await?;
                handle
                    .stop(timeout)
                    .await
                    .wrap_err_with(|| format!("Failed to stop container {name}"))?;
                ctx.console
                    .success(&format!("Container {} stopped", handle.name()));
                Ok(())
            }

            Self::Shell { name } => {
                let handle = find(runtime, &ctx, &name).await?;
                handle.start().await?;
                let code = handle.dispatcher().spawn_shell().await?;
                tracing::debug!(container = %name, code, "Shell exited");
                Ok(())
            }

            Self::Exec {
                name,
                background,
                command,
            } => {
                let handle = find(runtime, &ctx, &name).await?;
                let outcome = handle
                    .dispatcher()
                    .exec(&command, background)
                    .await
                    .wrap_err_with(|| format!("Failed to execute command in {name}"))?;
                if let ExecOutcome::Completed {
                    exit_code: Some(code),
                } = outcome
                {
                    tracing::debug!(container = %name, code, "Command finished");
                }
                Ok(())
            }

            Self::Remove { names } => {
                for name in names {
                    let handle = match find(runtime, &ctx, &name).await {
                        Ok(handle) => handle,
                        Err(err) => {
                            ctx.console.error(&format!("{err:#}"));
                            continue;
                        }
                    };
                    let report = handle
                        .remove()
                        .await
                        .wrap_err_with(|| format!("Failed to remove container {name}"))?;
                    if report.container == ContainerRemoval::AlreadyAbsent {
                        tracing::info!(container = %name, "Container was already gone");
                    }
                }
                Ok(())
            }
        }
    }
}

/// Load a handle on every container known to the runtime, sorted by name.
///
/// Containers deleted between listing and inspection are skipped.
async fn load_all(runtime: &dyn ContainerRuntime, ctx: &Arc<Context>) -> Result<Vec<ContainerHandle>> {
    let mut handles = Vec::new();
    for container in runtime.list().await? {
        match ContainerHandle::from_discovered(container, Arc::clone(ctx)).await {
            Ok(handle) => handles.push(handle),
            Err(err) if err.is_not_found() => {
                tracing::debug!(error = %err, "Container vanished while listing");
            }
            Err(err) => return Err(err.into()),
        }
    }
    handles.sort_by(|a, b| a.key().cmp(b.key()));
    Ok(handles)
}

/// Resolve `name` (or an ID prefix) to a handle.
async fn find(runtime: &dyn ContainerRuntime, ctx: &Arc<Context>, name: &str) -> Result<ContainerHandle> {
    match runtime.container(name).await {
        Ok(container) => Ok(ContainerHandle::from_discovered(container, Arc::clone(ctx)).await?),
        Err(GarrisonError::ContainerNotFound { .. }) => {
            let handles = load_all(runtime, ctx).await?;
            Err(not_found(name, &handles))
        }
        Err(err) => Err(err.into()),
    }
}

fn not_found(name: &str, handles: &[ContainerHandle]) -> color_eyre::eyre::Report {
    let available = sorted_keys(handles);
    if available.is_empty() {
        eyre!("Container {name} not found (no containers available)")
    } else {
        eyre!(
            "Container {name} not found (available: {})",
            available.join(", ")
        )
    }
}

async fn print_table(handles: &[ContainerHandle]) -> Result<()> {
    println!(
        "{:<24} {:<14} {:<24} {}",
        style("NAME").bold(),
        style("ID").bold(),
        style("IMAGE").bold(),
        style("STATUS").bold()
    );
    for handle in handles {
        println!(
            "{:<24} {:<14} {:<24} {}",
            handle.name(),
            handle.short_id(),
            handle.image().name,
            handle.text_status().await?
        );
    }
    Ok(())
}

async fn print_info(handle: &ContainerHandle) -> Result<()> {
    let config = handle.config();
    let or_none = |value: &str| {
        if value.is_empty() {
            style("none").dim().to_string()
        } else {
            value.to_string()
        }
    };

    println!("{:<16}{}", "Name", handle.name());
    println!("{:<16}{}", "ID", handle.full_id());
    println!("{:<16}{} ({})", "Image", handle.image().name, handle.image().id);
    println!("{:<16}{}", "Hostname", handle.hostname());
    println!("{:<16}{}", "Status", handle.text_status().await?);
    println!("{:<16}{}", "Workspace", or_none(&config.host_workspace_path));
    println!("{:<16}{}", "Private volume", or_none(&config.private_volume_path));
    println!("{:<16}{}", "GUI", if config.gui_enabled { "on" } else { "off" });
    println!("{:<16}{}", "Devices", or_none(&config.devices.join(", ")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockContainer, MockRuntime, RuntimeCall, test_context};

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_flags() {
        let cli = Cli::parse_from(["garrison", "-vv", "list"]);
        assert_eq!(cli.verbosity(), Verbosity::Debug);
        assert_eq!(cli.log_directive(), "garrison=debug");

        let cli = Cli::parse_from(["garrison", "list"]);
        assert_eq!(cli.log_directive(), "garrison=warn");
    }

    #[test]
    fn exec_keeps_trailing_arguments() {
        let cli = Cli::parse_from(["garrison", "exec", "lab", "--", "nmap", "-sV", "10.0.0.1"]);
        match cli.command {
            Commands::Exec {
                name,
                background,
                command,
            } => {
                assert_eq!(name, "lab");
                assert!(!background);
                assert_eq!(command, ["nmap", "-sV", "10.0.0.1"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_reach_settings() {
        let cli = Cli::parse_from(["garrison", "--root", "/srv/garrison", "--shell", "bash", "list"]);
        let settings = cli.settings();
        assert_eq!(settings.paths.root, PathBuf::from("/srv/garrison"));
        assert_eq!(settings.profile.shell, "bash");
    }

    #[tokio::test]
    async fn stop_with_explicit_timeout() {
        let mock = MockContainer::new("9a8b7c6d5e4f3a2b1c0d", "lab").with_status("running");
        let runtime = MockRuntime::new(vec![mock.clone()]);
        let (ctx, console, _) = test_context(true);

        Commands::Stop {
            name: "lab".to_string(),
            timeout: Some(30),
        }
        .run(&runtime, ctx)
        .await
        .unwrap();

        assert_eq!(mock.mutations(), vec![RuntimeCall::Stop(30)]);
        assert!(console.contains_success("Container lab stopped"));
    }

    #[tokio::test]
    async fn unknown_container_lists_available() {
        let runtime = MockRuntime::new(vec![
            MockContainer::new("1111aaaa", "web"),
            MockContainer::new("2222bbbb", "ad"),
        ]);
        let (ctx, _, _) = test_context(true);

        let err = Commands::Start {
            name: "lab".to_string(),
        }
        .run(&runtime, ctx)
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Container lab not found (available: ad, web)"
        );
    }

    #[tokio::test]
    async fn remove_skips_unknown_names() {
        let mock = MockContainer::new("3333cccc", "lab").with_status("exited");
        let runtime = MockRuntime::new(vec![mock.clone()]);
        let (ctx, console, _) = test_context(true);

        Commands::Remove {
            names: vec!["ghost".to_string(), "lab".to_string()],
        }
        .run(&runtime, ctx)
        .await
        .unwrap();

        assert_eq!(mock.mutations(), vec![RuntimeCall::Remove]);
        assert!(console.contains_success("Container lab successfully removed."));
    }

    #[tokio::test]
    async fn unreachable_engine_is_an_error() {
        let (ctx, _, _) = test_context(true);
        let result = Commands::List.run(&MockRuntime::unreachable(), ctx).await;
        assert!(result.is_err());
    }
}
