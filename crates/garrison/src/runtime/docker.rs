//! Docker runtime backed by the Engine API (`bollard`).

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, LogOutput, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use futures::StreamExt;
use garrison_common::{GarrisonError, GarrisonResult};

use super::{ContainerAttrs, ContainerRuntime, ExecSession, RuntimeContainer};

/// Translate an Engine API error into the Garrison taxonomy.
fn map_error(err: bollard::errors::Error, operation: &str, target: &str) -> GarrisonError {
    match err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => GarrisonError::ContainerNotFound {
            name: target.to_string(),
        },
        bollard::errors::Error::DockerResponseServerError { message, .. } => {
            GarrisonError::Runtime {
                operation: operation.to_string(),
                message,
            }
        }
        other => GarrisonError::RuntimeUnreachable {
            message: other.to_string(),
        },
    }
}

/// Connection to the local Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the local Docker daemon using the platform defaults.
    pub fn connect() -> GarrisonResult<Self> {
        let docker =
            Docker::connect_with_local_defaults().map_err(|e| GarrisonError::RuntimeUnreachable {
                message: format!("Failed to connect to Docker daemon: {e}. Is Docker running?"),
            })?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn container(&self, name: &str) -> GarrisonResult<Box<dyn RuntimeContainer>> {
        let inspect = self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
            .map_err(|e| map_error(e, "inspect", name))?;

        let id = inspect.id.ok_or_else(|| GarrisonError::Internal {
            message: format!("Runtime returned container {name} without an ID"),
        })?;

        tracing::debug!(container = %name, id = %id, "Resolved container");
        Ok(Box::new(DockerContainer::new(self.docker.clone(), id)))
    }

    async fn list(&self) -> GarrisonResult<Vec<Box<dyn RuntimeContainer>>> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        let summaries = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| map_error(e, "list", "*"))?;

        Ok(summaries
            .into_iter()
            .filter_map(|summary| summary.id)
            .map(|id| Box::new(DockerContainer::new(self.docker.clone(), id)) as Box<dyn RuntimeContainer>)
            .collect())
    }
}

/// A single container on the Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerContainer {
    docker: Docker,
    id: String,
}

impl DockerContainer {
    /// Wrap the container `id`.
    #[must_use]
    pub fn new(docker: Docker, id: impl Into<String>) -> Self {
        Self {
            docker,
            id: id.into(),
        }
    }
}

#[async_trait]
impl RuntimeContainer for DockerContainer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn reload(&self) -> GarrisonResult<ContainerAttrs> {
        let inspect = self
            .docker
            .inspect_container(&self.id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| map_error(e, "inspect", &self.id))?;

        // The inspect document shares its field names with ContainerAttrs.
        let value = serde_json::to_value(&inspect)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn start(&self) -> GarrisonResult<()> {
        self.docker
            .start_container(&self.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| map_error(e, "start", &self.id))
    }

    async fn stop(&self, timeout_secs: u64) -> GarrisonResult<()> {
        let options = StopContainerOptions {
            t: i64::try_from(timeout_secs).unwrap_or(i64::MAX),
        };
        self.docker
            .stop_container(&self.id, Some(options))
            .await
            .map_err(|e| map_error(e, "stop", &self.id))
    }

    async fn remove(&self) -> GarrisonResult<()> {
        self.docker
            .remove_container(&self.id, None::<RemoveContainerOptions>)
            .await
            .map_err(|e| map_error(e, "remove", &self.id))
    }

    async fn exec(&self, command: &str, detached: bool) -> GarrisonResult<ExecSession> {
        let argv = shell_words::split(command).map_err(|e| GarrisonError::Exec {
            message: format!("Cannot split command line: {e}"),
        })?;

        let exec = self
            .docker
            .create_exec(
                &self.id,
                CreateExecOptions {
                    cmd: Some(argv),
                    attach_stdout: Some(!detached),
                    attach_stderr: Some(!detached),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| map_error(e, "exec", &self.id))?;

        let started = self
            .docker
            .start_exec(
                &exec.id,
                Some(StartExecOptions {
                    detach: detached,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| map_error(e, "exec", &self.id))?;

        match started {
            StartExecResults::Detached => Ok(ExecSession::detached()),
            StartExecResults::Attached { output, .. } => {
                let id = self.id.clone();
                let stream = output
                    .map(move |chunk| {
                        chunk
                            .map(LogOutput::into_bytes)
                            .map_err(|e| map_error(e, "exec", &id))
                    })
                    .boxed();
                Ok(ExecSession::attached(exec.id, stream))
            }
        }
    }

    async fn exec_exit_code(&self, exec_id: &str) -> GarrisonResult<Option<i64>> {
        let inspect = self
            .docker
            .inspect_exec(exec_id)
            .await
            .map_err(|e| map_error(e, "exec", &self.id))?;
        Ok(inspect.exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_container_not_found() {
        let err = bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message: "No such container: lab".to_string(),
        };
        let mapped = map_error(err, "remove", "lab");
        assert!(mapped.is_not_found());
    }

    #[test]
    fn conflict_maps_to_runtime_error() {
        let err = bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message: "container is paused".to_string(),
        };
        match map_error(err, "stop", "lab") {
            GarrisonError::Runtime { operation, message } => {
                assert_eq!(operation, "stop");
                assert_eq!(message, "container is paused");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
