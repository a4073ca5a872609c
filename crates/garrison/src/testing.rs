//! In-memory doubles for the runtime, the console and the host shell.
//!
//! Used by the unit tests of this crate and by the integration tests under
//! `tests/`. Nothing here touches a real engine or terminal.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use garrison_common::{GarrisonError, GarrisonResult};
use parking_lot::Mutex;

use crate::config::Settings;
use crate::console::{Console, WaitIndicator};
use crate::container::{WORKSPACE_MOUNT, X11_SOCKET_MOUNT};
use crate::context::Context;
use crate::host::HostShell;
use crate::runtime::{
    ContainerAttrs, ContainerConfigAttrs, ContainerRuntime, DeviceAttrs, ExecSession,
    HostConfigAttrs, MountAttrs, RuntimeContainer, StateAttrs,
};

/// Root used by contexts that never touch the filesystem.
const UNUSED_ROOT: &str = "/nonexistent/garrison";

/// A line recorded by [`RecordingConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// [`Console::info`].
    Info(String),
    /// [`Console::verbose`].
    Verbose(String),
    /// [`Console::success`].
    Success(String),
    /// [`Console::warning`].
    Warning(String),
    /// [`Console::error`].
    Error(String),
    /// [`Console::raw`].
    Raw(String),
    /// [`Console::waiting`].
    Wait(String),
}

/// Console that records every line and answers prompts with a fixed value.
#[derive(Debug)]
pub struct RecordingConsole {
    answer: bool,
    verbose: bool,
    lines: Mutex<Vec<ConsoleLine>>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingConsole {
    /// Verbose console answering `answer` to every confirmation.
    #[must_use]
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            verbose: true,
            lines: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Report the console as non-verbose.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.verbose = false;
        self
    }

    /// Every recorded line, in order.
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.lock().clone()
    }

    /// Every confirmation prompt shown, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Concatenated raw output.
    pub fn raw_output(&self) -> String {
        self.lines
            .lock()
            .iter()
            .filter_map(|line| match line {
                ConsoleLine::Raw(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether a success line contains `needle`.
    pub fn contains_success(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|line| matches!(line, ConsoleLine::Success(msg) if msg.contains(needle)))
    }

    /// Whether an info line contains `needle`.
    pub fn contains_info(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|line| matches!(line, ConsoleLine::Info(msg) if msg.contains(needle)))
    }

    fn push(&self, line: ConsoleLine) {
        self.lines.lock().push(line);
    }
}

impl Console for RecordingConsole {
    fn info(&self, message: &str) {
        self.push(ConsoleLine::Info(message.to_string()));
    }

    fn verbose(&self, message: &str) {
        self.push(ConsoleLine::Verbose(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.push(ConsoleLine::Success(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(ConsoleLine::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(ConsoleLine::Error(message.to_string()));
    }

    fn raw(&self, text: &str) {
        self.push(ConsoleLine::Raw(text.to_string()));
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn confirm(&self, prompt: &str, _default: bool) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }

    fn waiting(&self, message: &str) -> WaitIndicator {
        self.push(ConsoleLine::Wait(message.to_string()));
        WaitIndicator::hidden()
    }
}

/// Host shell that records requests and reports a clean exit.
#[derive(Debug, Default)]
pub struct RecordingHostShell {
    grants: Mutex<Vec<String>>,
    attaches: Mutex<Vec<(String, String)>>,
}

impl RecordingHostShell {
    /// Hostnames granted display access, in order.
    pub fn display_grants(&self) -> Vec<String> {
        self.grants.lock().clone()
    }

    /// `(container_id, shell)` pairs attached, in order.
    pub fn attaches(&self) -> Vec<(String, String)> {
        self.attaches.lock().clone()
    }
}

#[async_trait]
impl HostShell for RecordingHostShell {
    async fn grant_display_access(&self, hostname: &str) -> GarrisonResult<()> {
        self.grants.lock().push(hostname.to_string());
        Ok(())
    }

    async fn attach_shell(&self, container_id: &str, shell: &str) -> GarrisonResult<i32> {
        self.attaches
            .lock()
            .push((container_id.to_string(), shell.to_string()));
        Ok(0)
    }
}

/// A call received by [`MockContainer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    /// Attribute refresh.
    Reload,
    /// Start.
    Start,
    /// Stop with the given timeout.
    Stop(u64),
    /// Delete.
    Remove,
    /// Command execution.
    Exec {
        /// Command as received.
        command: String,
        /// Detached flag.
        detached: bool,
    },
}

#[derive(Debug)]
struct MockState {
    attrs: ContainerAttrs,
    exists: bool,
    unreachable: bool,
    auto_remove: bool,
    hanging: bool,
    output: Vec<Bytes>,
    exit_code: Option<i64>,
    calls: Vec<RuntimeCall>,
}

/// Scriptable in-memory container.
///
/// Clones share state, so a test can keep one clone to drive and inspect
/// while a handle owns another.
#[derive(Debug, Clone)]
pub struct MockContainer {
    id: String,
    state: Arc<Mutex<MockState>>,
}

impl MockContainer {
    /// Container `name` with ID `id`, status `created`, image `garrison:full`
    /// and hostname equal to its name.
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        let attrs = ContainerAttrs {
            id: id.to_string(),
            name: format!("/{name}"),
            image: "sha256:4b1d".to_string(),
            config: Some(ContainerConfigAttrs {
                hostname: Some(name.to_string()),
                image: Some("garrison:full".to_string()),
                env: Some(Vec::new()),
            }),
            state: Some(StateAttrs {
                status: Some("created".to_string()),
            }),
            mounts: Vec::new(),
            host_config: Some(HostConfigAttrs::default()),
        };

        Self {
            id: id.to_string(),
            state: Arc::new(Mutex::new(MockState {
                attrs,
                exists: true,
                unreachable: false,
                auto_remove: false,
                hanging: false,
                output: Vec::new(),
                exit_code: Some(0),
                calls: Vec::new(),
            })),
        }
    }

    /// Set the raw status.
    #[must_use]
    pub fn with_status(self, status: &str) -> Self {
        self.set_status(Some(status));
        self
    }

    /// Mount `host_path` as the workspace.
    #[must_use]
    pub fn with_workspace(self, host_path: &str) -> Self {
        self.mount(host_path, WORKSPACE_MOUNT);
        self
    }

    /// Share a host device.
    #[must_use]
    pub fn with_device(self, on_host: &str, in_container: &str) -> Self {
        {
            let mut state = self.state.lock();
            let host_config = state.attrs.host_config.get_or_insert_with(Default::default);
            host_config
                .devices
                .get_or_insert_with(Vec::new)
                .push(DeviceAttrs {
                    path_on_host: on_host.to_string(),
                    path_in_container: in_container.to_string(),
                });
        }
        self
    }

    /// Enable X11 forwarding.
    #[must_use]
    pub fn with_gui(self) -> Self {
        self.mount("/tmp/.X11-unix", X11_SOCKET_MOUNT);
        {
            let mut state = self.state.lock();
            if let Some(config) = state.attrs.config.as_mut() {
                config
                    .env
                    .get_or_insert_with(Vec::new)
                    .push("DISPLAY=:0".to_string());
            }
        }
        self
    }

    /// Delete the container when it stops, like `--rm`.
    #[must_use]
    pub fn auto_remove(self) -> Self {
        self.state.lock().auto_remove = true;
        self
    }

    /// Output chunks streamed by attached execs.
    #[must_use]
    pub fn with_output<B: AsRef<[u8]>>(self, chunks: &[B]) -> Self {
        self.state.lock().output = chunks
            .iter()
            .map(|chunk| Bytes::copy_from_slice(chunk.as_ref()))
            .collect();
        self
    }

    /// Exit code reported once an attached exec finishes (default `Some(0)`).
    #[must_use]
    pub fn with_exit_code(self, code: Option<i64>) -> Self {
        self.state.lock().exit_code = code;
        self
    }

    /// Keep attached output streams open after the last chunk.
    #[must_use]
    pub fn hanging(self) -> Self {
        self.state.lock().hanging = true;
        self
    }

    /// Change the raw status. `None` removes the status field.
    pub fn set_status(&self, status: Option<&str>) {
        self.state.lock().attrs.state = Some(StateAttrs {
            status: status.map(ToString::to_string),
        });
    }

    /// Make every call fail as if the engine were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Delete the container behind the handle's back.
    pub fn delete_out_of_band(&self) {
        self.state.lock().exists = false;
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state.lock().calls.clone()
    }

    /// Calls other than [`RuntimeCall::Reload`], in order.
    pub fn mutations(&self) -> Vec<RuntimeCall> {
        self.calls()
            .into_iter()
            .filter(|call| *call != RuntimeCall::Reload)
            .collect()
    }

    /// Container name without the leading `/`.
    pub fn name(&self) -> String {
        self.state.lock().attrs.display_name().to_string()
    }

    fn exists(&self) -> bool {
        self.state.lock().exists
    }

    fn mount(&self, source: &str, destination: &str) {
        self.state.lock().attrs.mounts.push(MountAttrs {
            source: source.to_string(),
            destination: destination.to_string(),
        });
    }

    /// Record `call` and check the container can be reached.
    fn enter(&self, call: RuntimeCall) -> GarrisonResult<parking_lot::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.unreachable {
            return Err(GarrisonError::RuntimeUnreachable {
                message: "connection refused".to_string(),
            });
        }
        if !state.exists {
            return Err(GarrisonError::ContainerNotFound {
                name: state.attrs.display_name().to_string(),
            });
        }
        Ok(state)
    }

    fn set_raw_status(state: &mut MockState, status: &str) {
        state.attrs.state = Some(StateAttrs {
            status: Some(status.to_string()),
        });
    }
}

#[async_trait]
impl RuntimeContainer for MockContainer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn reload(&self) -> GarrisonResult<ContainerAttrs> {
        let state = self.enter(RuntimeCall::Reload)?;
        Ok(state.attrs.clone())
    }

    async fn start(&self) -> GarrisonResult<()> {
        let mut state = self.enter(RuntimeCall::Start)?;
        Self::set_raw_status(&mut state, "running");
        Ok(())
    }

    async fn stop(&self, timeout_secs: u64) -> GarrisonResult<()> {
        let mut state = self.enter(RuntimeCall::Stop(timeout_secs))?;
        Self::set_raw_status(&mut state, "exited");
        if state.auto_remove {
            state.exists = false;
        }
        Ok(())
    }

    async fn remove(&self) -> GarrisonResult<()> {
        let mut state = self.enter(RuntimeCall::Remove)?;
        state.exists = false;
        Ok(())
    }

    async fn exec(&self, command: &str, detached: bool) -> GarrisonResult<ExecSession> {
        let state = self.enter(RuntimeCall::Exec {
            command: command.to_string(),
            detached,
        })?;
        if detached {
            return Ok(ExecSession::detached());
        }

        let chunks = stream::iter(state.output.clone().into_iter().map(Ok));
        let output = if state.hanging {
            chunks.chain(stream::pending()).boxed()
        } else {
            chunks.boxed()
        };
        Ok(ExecSession::attached(format!("exec-{}", state.calls.len()), output))
    }

    async fn exec_exit_code(&self, _exec_id: &str) -> GarrisonResult<Option<i64>> {
        Ok(self.state.lock().exit_code)
    }
}

/// In-memory runtime over a set of [`MockContainer`]s.
#[derive(Debug, Clone, Default)]
pub struct MockRuntime {
    containers: Vec<MockContainer>,
    unreachable: bool,
}

impl MockRuntime {
    /// Runtime holding `containers`.
    #[must_use]
    pub fn new(containers: Vec<MockContainer>) -> Self {
        Self {
            containers,
            unreachable: false,
        }
    }

    /// A runtime whose engine cannot be reached.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            containers: Vec::new(),
            unreachable: true,
        }
    }

    fn check(&self) -> GarrisonResult<()> {
        if self.unreachable {
            return Err(GarrisonError::RuntimeUnreachable {
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn container(&self, name: &str) -> GarrisonResult<Box<dyn RuntimeContainer>> {
        self.check()?;
        self.containers
            .iter()
            .find(|c| c.exists() && (c.name() == name || c.id.starts_with(name)))
            .map(|c| Box::new(c.clone()) as Box<dyn RuntimeContainer>)
            .ok_or_else(|| GarrisonError::ContainerNotFound {
                name: name.to_string(),
            })
    }

    async fn list(&self) -> GarrisonResult<Vec<Box<dyn RuntimeContainer>>> {
        self.check()?;
        Ok(self
            .containers
            .iter()
            .filter(|c| c.exists())
            .map(|c| Box::new(c.clone()) as Box<dyn RuntimeContainer>)
            .collect())
    }
}

/// Context over recording doubles, rooted where nothing is ever written.
pub fn test_context(
    answer: bool,
) -> (Arc<Context>, Arc<RecordingConsole>, Arc<RecordingHostShell>) {
    test_context_in(Path::new(UNUSED_ROOT), answer)
}

/// Context over recording doubles, rooted at `root`.
pub fn test_context_in(
    root: &Path,
    answer: bool,
) -> (Arc<Context>, Arc<RecordingConsole>, Arc<RecordingHostShell>) {
    test_context_with(RecordingConsole::answering(answer), root)
}

/// Context over `console` and a recording host shell, rooted at `root`.
pub fn test_context_with(
    console: RecordingConsole,
    root: &Path,
) -> (Arc<Context>, Arc<RecordingConsole>, Arc<RecordingHostShell>) {
    let console = Arc::new(console);
    let host = Arc::new(RecordingHostShell::default());
    let settings = Settings::default().with_root(root);
    let ctx = Context::new(
        settings,
        Arc::clone(&console) as Arc<dyn Console>,
        Arc::clone(&host) as Arc<dyn HostShell>,
    );
    (Arc::new(ctx), console, host)
}
