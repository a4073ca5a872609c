//! Integration tests for the container lifecycle against in-memory doubles.
use std::error::Error;

use garrison::cli::Commands;
use garrison::container::{ContainerRemoval, VolumeOutcome};
use garrison::exec::decode_payload;
use garrison::testing::{MockContainer, MockRuntime, RuntimeCall, test_context_in};
use garrison::{ContainerHandle, ExecOutcome};
use tempfile::TempDir;

const ID: &str = "c0ffee0123456789abcdef0123456789";

#[test_log::test(tokio::test)]
async fn test_start_exec_remove() -> Result<(), Box<dyn Error>> {
    // Setup: a stopped container with a non-empty private workspace
    let temp_dir = TempDir::new()?;
    let (ctx, console, _) = test_context_in(temp_dir.path(), true);
    let workspace = ctx.settings.paths.workspace("lab");
    std::fs::create_dir_all(&workspace)?;
    std::fs::write(workspace.join("hosts.txt"), "10.0.0.1\n")?;

    let mock = MockContainer::new(ID, "lab")
        .with_status("exited")
        .with_workspace(&workspace.display().to_string())
        .with_output(&["Nmap scan report for 10.0.0.1\n"]);
    let handle = ContainerHandle::from_discovered(Box::new(mock.clone()), ctx).await?;

    // 1. Foreground exec starts the container first
    let outcome = handle
        .dispatcher()
        .exec(&["nmap", "-sV", "10.0.0.1"], false)
        .await?;
    assert_eq!(outcome, ExecOutcome::Completed { exit_code: Some(0) });
    assert!(handle.is_running().await?);
    assert_eq!(console.raw_output(), "Nmap scan report for 10.0.0.1\n");

    // 2. Remove stops with the short timeout, deletes, then reclaims
    let report = handle.remove().await?;
    assert_eq!(report.container, ContainerRemoval::Removed);
    assert_eq!(report.volume, VolumeOutcome::Removed { path: workspace.clone() });
    assert!(!workspace.exists());
    assert_eq!(console.prompts().len(), 1);

    // 3. Runtime saw exactly the expected mutations
    let calls = mock.mutations();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], RuntimeCall::Start);
    match &calls[1] {
        RuntimeCall::Exec { command, detached } => {
            assert!(!detached);
            assert_eq!(decode_payload(command)?, "nmap -sV 10.0.0.1");
        }
        other => panic!("unexpected call: {other:?}"),
    }
    assert_eq!(calls[2..], [RuntimeCall::Stop(2), RuntimeCall::Remove]);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_declined_reclamation_keeps_data() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let (ctx, _, _) = test_context_in(temp_dir.path(), false);
    let workspace = ctx.settings.paths.workspace("lab");
    std::fs::create_dir_all(&workspace)?;
    std::fs::write(workspace.join("creds.txt"), "admin:admin")?;

    let mock = MockContainer::new(ID, "lab").with_workspace(&workspace.display().to_string());
    let runtime = MockRuntime::new(vec![mock.clone()]);

    Commands::Remove {
        names: vec!["lab".to_string()],
    }
    .run(&runtime, ctx)
    .await
    .map_err(|e| e.to_string())?;

    assert_eq!(mock.mutations(), vec![RuntimeCall::Remove]);
    assert_eq!(std::fs::read_to_string(workspace.join("creds.txt"))?, "admin:admin");

    Ok(())
}
