// ABOUTME: Lifecycle transitions: build, start, and dispose.
// ABOUTME: Each transition checks the current state before touching the runtime.

use std::collections::HashMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{CLIENT_PORT, MANAGEMENT_PORT, NatsConfig};
use crate::messaging::{MessagingClient, ObjectStoreOps};
use crate::runtime::{ContainerConfig, ContainerOps, FullRuntime, ImageOps, PortMapping};
use crate::types::{BucketName, ContainerId};

use super::deployment::NatsDeployment;
use super::error::DeployError;
use super::orphans::{LABEL_DEPLOYMENT, LABEL_MANAGED};
use super::readiness::{READY_LOG_LINE, ReadinessProbe, wait_for_log_line};
use super::state::{BuiltContainer, Lifecycle, LifecycleState, RunningServer};

// =============================================================================
// Created -> Built
// =============================================================================

impl<R, C: MessagingClient> NatsDeployment<R, C> {
    /// Prepare the container spec. Makes no runtime calls.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidState` unless the deployment is `Created`.
    pub fn build(&mut self) -> Result<(), DeployError> {
        let state = self.state();
        if state != LifecycleState::Created {
            return Err(DeployError::InvalidState {
                operation: "build",
                state,
            });
        }

        let built = BuiltContainer {
            spec: build_container_config(&self.config),
            probe: ReadinessProbe::log_line(READY_LOG_LINE, self.config.startup_timeout()),
        };

        tracing::info!(
            deployment = %self.config.name(),
            image = %built.spec.image,
            command = ?built.spec.command,
            "deployment built"
        );

        self.lifecycle = Lifecycle::Built(built);
        Ok(())
    }
}

impl<R: FullRuntime, C: MessagingClient> NatsDeployment<R, C> {
    // =========================================================================
    // Built -> Running
    // =========================================================================

    /// Launch the server, wait for readiness, connect, and provision buckets.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::NotInitialized` before `build()`, and
    /// `DeployError::InvalidState` once started or disposed; neither touches
    /// the runtime. Any other error leaves the deployment `Faulted`, still
    /// owning whatever container was created, so call `dispose()`.
    pub async fn start(&mut self) -> Result<(), DeployError> {
        self.start_with_cancellation(&CancellationToken::new())
            .await
    }

    /// Like [`start`](Self::start), aborting at the current suspension point
    /// with `DeployError::Cancelled` once `cancel` fires.
    pub async fn start_with_cancellation(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<(), DeployError> {
        let built = match std::mem::replace(
            &mut self.lifecycle,
            Lifecycle::Faulted { container: None },
        ) {
            Lifecycle::Built(built) => built,
            other => {
                let state = other.state();
                self.lifecycle = other;
                return Err(match state {
                    LifecycleState::Created => DeployError::NotInitialized,
                    state => DeployError::InvalidState {
                        operation: "start",
                        state,
                    },
                });
            }
        };

        tracing::info!(
            deployment = %self.config.name(),
            container = %built.spec.name,
            "starting deployment"
        );

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DeployError::Cancelled),
            result = launch(&self.runtime, &self.client, &self.config, &built, &mut self.lifecycle) => result,
        };

        match outcome {
            Ok(server) => {
                tracing::info!(
                    deployment = %self.config.name(),
                    container = %server.container_id,
                    url = %self.client_url(),
                    "deployment running"
                );
                self.lifecycle = Lifecycle::Running(server);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    deployment = %self.config.name(),
                    container = ?self.lifecycle.container_id(),
                    error = %e,
                    "deployment failed to start"
                );
                Err(e)
            }
        }
    }

    // =========================================================================
    // * -> Disposed
    // =========================================================================

    /// Stop and remove the container, if one exists. Idempotent.
    ///
    /// The deployment is `Disposed` as soon as this is called, even if
    /// releasing the container fails, so a second call is always a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::ContainerStopFailed` or
    /// `DeployError::ContainerRemoveFailed` when the runtime rejects the call
    /// for a reason other than the container already being gone.
    pub async fn dispose(&mut self) -> Result<(), DeployError> {
        let container = match std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed) {
            // Drop the client handles before the server goes away.
            Lifecycle::Running(server) => Some(server.container_id),
            Lifecycle::Faulted { container } => container,
            Lifecycle::Created | Lifecycle::Built(_) | Lifecycle::Disposed => None,
        };

        let Some(container_id) = container else {
            return Ok(());
        };

        tracing::info!(
            deployment = %self.config.name(),
            container = %container_id,
            "disposing deployment"
        );

        release_container(&self.runtime, &container_id, self.config.stop_timeout()).await
    }
}

// =============================================================================
// Internal Helpers
// =============================================================================

/// Run the start sequence. `lifecycle` is `Faulted` on entry and records the
/// container as soon as it exists, so the id survives an early return or a
/// dropped future.
async fn launch<R: FullRuntime, C: MessagingClient>(
    runtime: &R,
    client: &C,
    config: &NatsConfig,
    built: &BuiltContainer,
    lifecycle: &mut Lifecycle<C>,
) -> Result<RunningServer<C>, DeployError> {
    ensure_image(runtime, &built.spec.image).await?;

    let container_id = runtime
        .create_container(&built.spec)
        .await
        .map_err(DeployError::ContainerCreateFailed)?;
    *lifecycle = Lifecycle::Faulted {
        container: Some(container_id.clone()),
    };

    runtime
        .start_container(&container_id)
        .await
        .map_err(DeployError::ContainerStartFailed)?;

    wait_for_log_line(
        runtime,
        &container_id,
        &built.probe.pattern,
        built.probe.timeout,
    )
    .await?;

    let url = format!("nats://localhost:{}", config.host_client_port());
    let connection = client
        .connect(&url)
        .await
        .map_err(DeployError::ConnectFailed)?;

    let stream = client.stream_context(&connection);
    let object_store = client.object_store_context(&stream);
    let key_value = client.key_value_context(&stream);

    provision_buckets(&object_store, config).await?;

    Ok(RunningServer {
        container_id,
        connection,
        stream,
        object_store,
        key_value,
    })
}

/// Pull the image only when the runtime does not have it yet.
async fn ensure_image<R: ImageOps + ?Sized>(runtime: &R, image: &str) -> Result<(), DeployError> {
    let unavailable = |source| DeployError::ImageUnavailable {
        image: image.to_string(),
        source,
    };

    if runtime.image_exists(image).await.map_err(unavailable)? {
        return Ok(());
    }

    tracing::info!(image, "pulling image");
    runtime.pull_image(image).await.map_err(unavailable)
}

/// Create one object-store bucket per configured entry, in order.
///
/// Every bucket is created under the deployment's sanitised name; only the
/// size limit comes from the entry. Earlier buckets are left in place when a
/// later one fails.
async fn provision_buckets<O: ObjectStoreOps + ?Sized>(
    object_store: &O,
    config: &NatsConfig,
) -> Result<(), DeployError> {
    let bucket_name = BucketName::for_deployment(config.name());

    for (index, bucket) in config.buckets().iter().enumerate() {
        tracing::debug!(
            bucket = %bucket_name,
            entry = bucket.name(),
            max_bytes = ?bucket.size_limit_bytes(),
            "creating bucket"
        );
        object_store
            .create_bucket(bucket_name.as_str(), bucket.size_limit_bytes())
            .await
            .map_err(|source| DeployError::BucketCreateFailed { index, source })?;
    }

    Ok(())
}

/// Stop then force-remove a container, treating "already gone" as success.
async fn release_container<R: ContainerOps + ?Sized>(
    runtime: &R,
    id: &ContainerId,
    stop_timeout: Duration,
) -> Result<(), DeployError> {
    match runtime.stop_container(id, stop_timeout).await {
        Ok(()) => {}
        Err(e) if e.is_already_released() => {
            tracing::debug!(container = %id, error = %e, "container already stopped");
        }
        Err(e) => return Err(DeployError::ContainerStopFailed(e)),
    }

    match runtime.remove_container(id, true).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_already_released() => {
            tracing::debug!(container = %id, error = %e, "container already removed");
            Ok(())
        }
        Err(e) => Err(DeployError::ContainerRemoveFailed(e)),
    }
}

/// Build the container spec from deployment config.
fn build_container_config(config: &NatsConfig) -> ContainerConfig {
    let mut labels = HashMap::new();
    labels.insert(LABEL_MANAGED.to_string(), "true".to_string());
    labels.insert(LABEL_DEPLOYMENT.to_string(), config.name().sanitized());

    let mut ports = vec![PortMapping::tcp(config.host_client_port(), CLIENT_PORT)];
    let mut command: Vec<String> = Vec::new();

    if config.stream_enabled() {
        command.push("--jetstream".to_string());
    }

    if let Some(host_port) = config.host_management_port() {
        ports.push(PortMapping::tcp(host_port, MANAGEMENT_PORT));
        command.push("--http_port".to_string());
        command.push(MANAGEMENT_PORT.to_string());
    }

    if config.debug_log_enabled() {
        command.push("--debug".to_string());
    }

    if config.trace_log_enabled() {
        command.push("--trace".to_string());
    }

    ContainerConfig {
        name: config.container_name().to_string(),
        image: config.image_tag().to_string(),
        labels,
        ports,
        // Without flags the image's own default command runs.
        command: if command.is_empty() {
            None
        } else {
            Some(command)
        },
        auto_remove: true,
        stop_timeout: Some(config.stop_timeout()),
    }
}
