// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Supports both Docker and Podman via Docker-compatible API.

use crate::runtime::traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerOps, ContainerSummary, ImageError,
    ImageOps, LogError, LogLine, LogLineStream, LogOps, LogOptions, LogStream, RuntimeInfo,
    RuntimeInfoError, RuntimeMetadata,
};
use crate::runtime::types::RuntimeType;
use crate::types::ContainerId;
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, ListContainersOptions, LogsOptions,
    RemoveContainerOptions, StopContainerOptions,
};
use futures::StreamExt;
use std::collections::HashMap;
use std::time::Duration;

/// Request timeout, in seconds, for calls to the runtime socket.
const SOCKET_TIMEOUT_SECS: u64 = 120;

/// Whole seconds for the stop API, saturating instead of wrapping.
fn stop_seconds(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_secs()).unwrap_or(i32::MAX)
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_remove_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        // Removal already in progress, typically triggered by auto-remove.
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 && message.contains("already in progress") => {
            ContainerError::NotFound(message.clone())
        }
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_logs_error(e: bollard::errors::Error) -> LogError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => LogError::ContainerNotFound(message.clone()),
        _ => LogError::StreamError(e.to_string()),
    }
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime implementation using bollard.
///
/// Supports both Docker and Podman via Docker-compatible API. Cloning is
/// cheap and shares the underlying connection pool, so one runtime can back
/// any number of concurrent deployments.
#[derive(Clone)]
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to a container runtime using detected runtime info.
    ///
    /// Use with `detect_local()` or `detect_with()` to connect to a runtime.
    pub fn connect(info: &super::types::RuntimeInfo) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_unix(
            &info.socket_path,
            SOCKET_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, info.runtime_type))
    }

    /// Get the runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }
}

impl std::fmt::Debug for BollardRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BollardRuntime")
            .field("runtime_type", &self.runtime_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        let info = self
            .client
            .info()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        let name = match self.runtime_type {
            RuntimeType::Docker => "Docker".to_string(),
            RuntimeType::Podman => "Podman".to_string(),
        };

        Ok(RuntimeMetadata {
            name,
            version: info.server_version.unwrap_or_default(),
            api_version: bollard::API_DEFAULT_VERSION.to_string(),
            os: info.operating_system.unwrap_or_default(),
            arch: info.architecture.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn pull_image(&self, image: &str) -> Result<(), ImageError> {
        let opts = CreateImageOptions {
            from_image: Some(image.to_string()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            result.map_err(|e| map_image_pull_error(e, image))?;
        }

        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool, ImageError> {
        match self.client.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(ImageError::Runtime(format!(
                "failed to inspect {}: {}",
                image, e
            ))),
        }
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let mut host_config = HostConfig {
            auto_remove: Some(config.auto_remove),
            ..Default::default()
        };

        let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
        let mut exposed_ports: Vec<String> = Vec::new();
        for port in &config.ports {
            let port_key = format!("{}/{}", port.container_port, port.protocol.as_str());

            exposed_ports.push(port_key.clone());

            if let Some(host_port) = port.host_port {
                port_bindings.insert(
                    port_key,
                    Some(vec![PortBinding {
                        host_ip: port.host_ip.clone(),
                        host_port: Some(host_port.to_string()),
                    }]),
                );
            }
        }
        if !port_bindings.is_empty() {
            host_config.port_bindings = Some(port_bindings);
        }

        let container_config = ContainerCreateBody {
            image: Some(config.image.clone()),
            labels: if config.labels.is_empty() {
                None
            } else {
                Some(config.labels.clone())
            },
            cmd: config.command.clone(),
            host_config: Some(host_config),
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            stop_timeout: config
                .stop_timeout
                .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX)),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: Some(config.name.clone()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), container_config)
            .await
            .map_err(map_container_create_error)?;

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(
                id.as_str(),
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: Some(stop_seconds(timeout)),
            signal: None,
        };

        self.client
            .stop_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_remove_error)
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut filter_map: HashMap<String, Vec<String>> = HashMap::new();

        if let Some(ref name) = filters.name {
            filter_map.insert("name".to_string(), vec![name.clone()]);
        }

        for (key, value) in &filters.labels {
            filter_map
                .entry("label".to_string())
                .or_default()
                .push(format!("{}={}", key, value));
        }

        let opts = ListContainersOptions {
            all: filters.all,
            filters: Some(filter_map),
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        Ok(containers
            .into_iter()
            .map(|c| {
                let name = c
                    .names
                    .unwrap_or_default()
                    .first()
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default();

                let state = c
                    .state
                    .map(|s| format!("{:?}", s).to_lowercase())
                    .unwrap_or_default();

                ContainerSummary {
                    id: ContainerId::new(c.id.unwrap_or_default()),
                    name,
                    image: c.image.unwrap_or_default(),
                    state,
                    labels: c.labels.unwrap_or_default(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl LogOps for BollardRuntime {
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogLineStream, LogError> {
        let log_opts = LogsOptions {
            stdout: opts.stdout,
            stderr: opts.stderr,
            follow: opts.follow,
            timestamps: opts.timestamps,
            tail: opts
                .tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let stream = self.client.logs(id.as_str(), Some(log_opts));

        let mapped_stream = stream.map(|result| {
            result
                .map(|output| {
                    let (stream_type, data) = match output {
                        bollard::container::LogOutput::StdErr { message } => {
                            (LogStream::Stderr, message)
                        }
                        bollard::container::LogOutput::StdOut { message }
                        | bollard::container::LogOutput::StdIn { message }
                        | bollard::container::LogOutput::Console { message } => {
                            (LogStream::Stdout, message)
                        }
                    };

                    LogLine {
                        content: String::from_utf8_lossy(&data).to_string(),
                        stream: stream_type,
                    }
                })
                .map_err(map_logs_error)
        });

        Ok(Box::pin(mapped_stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_seconds_truncates_fractions() {
        assert_eq!(stop_seconds(Duration::from_millis(10_900)), 10);
        assert_eq!(stop_seconds(Duration::ZERO), 0);
    }

    #[test]
    fn stop_seconds_saturates() {
        assert_eq!(stop_seconds(Duration::from_secs(u64::MAX)), i32::MAX);
        assert_eq!(stop_seconds(Duration::from_secs(1 << 31)), i32::MAX);
    }
}
