// ABOUTME: The deployment controller and its read-only accessors.
// ABOUTME: Owns the runtime, the messaging client, and exactly one lifecycle state.

use super::error::DeployError;
use super::state::{BuiltContainer, Lifecycle, LifecycleState};
use crate::config::NatsConfig;
use crate::messaging::{MessagingClient, NatsClient};
use crate::runtime::{
    BollardRuntime, DetectionSnafu, RuntimeConfig, RuntimeInfoTrait, UnreachableSnafu, detect_with,
};
use crate::types::ContainerId;
use snafu::ResultExt;
use std::fmt;

/// One ephemeral NATS server, from configuration to teardown.
///
/// The lifecycle is `build()` → `start()` → `dispose()`, at most once per
/// instance. Connection accessors return `Some` only while running.
///
/// ```no_run
/// use natsbox::config::NatsConfig;
/// use natsbox::deploy::NatsDeployment;
///
/// # async fn fixture() -> natsbox::error::Result<()> {
/// let config = NatsConfig::new("orders")?.with_stream(true);
/// let mut nats = NatsDeployment::local(config).await?;
/// nats.build()?;
/// nats.start().await?;
///
/// let url = nats.client_url();
/// assert!(nats.connection().is_some(), "connected to {url}");
///
/// nats.dispose().await?;
/// # Ok(())
/// # }
/// ```
pub struct NatsDeployment<R, C = NatsClient>
where
    C: MessagingClient,
{
    pub(crate) config: NatsConfig,
    pub(crate) runtime: R,
    pub(crate) client: C,
    pub(crate) lifecycle: Lifecycle<C>,
}

impl<R, C: MessagingClient> NatsDeployment<R, C> {
    /// Create a deployment in the `Created` state.
    pub fn from_config(config: NatsConfig, runtime: R, client: C) -> Self {
        NatsDeployment {
            config,
            runtime,
            client,
            lifecycle: Lifecycle::Created,
        }
    }

    pub fn config(&self) -> &NatsConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Prepared container, available between `build()` and `start()`.
    pub fn built(&self) -> Option<&BuiltContainer> {
        match &self.lifecycle {
            Lifecycle::Built(built) => Some(built),
            _ => None,
        }
    }

    /// Container currently owned by this deployment.
    pub fn container_id(&self) -> Option<&ContainerId> {
        self.lifecycle.container_id()
    }

    pub fn connection(&self) -> Option<&C::Connection> {
        self.lifecycle.running().map(|server| &server.connection)
    }

    pub fn stream(&self) -> Option<&C::Stream> {
        self.lifecycle.running().map(|server| &server.stream)
    }

    pub fn object_store(&self) -> Option<&C::ObjectStore> {
        self.lifecycle.running().map(|server| &server.object_store)
    }

    pub fn key_value(&self) -> Option<&C::KeyValue> {
        self.lifecycle.running().map(|server| &server.key_value)
    }

    /// URL clients use to reach the server from the host.
    pub fn client_url(&self) -> String {
        format!("nats://localhost:{}", self.config.host_client_port())
    }

    /// Monitoring endpoint, when a management port is mapped.
    pub fn management_url(&self) -> Option<String> {
        self.config
            .host_management_port()
            .map(|port| format!("http://localhost:{}", port))
    }
}

impl NatsDeployment<BollardRuntime, NatsClient> {
    /// Pair `config` with the local Docker or Podman daemon and a NATS client
    /// named after the deployment.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::RuntimeUnavailable` if no runtime socket is
    /// found or the daemon does not answer a ping.
    pub async fn local(config: NatsConfig) -> Result<Self, DeployError> {
        Self::with_runtime_config(config, &RuntimeConfig::default()).await
    }

    /// Like [`local`](Self::local), but with an explicit runtime and/or
    /// socket instead of probing the default locations.
    pub async fn with_runtime_config(
        config: NatsConfig,
        runtime_config: &RuntimeConfig,
    ) -> Result<Self, DeployError> {
        let info = detect_with(runtime_config).context(DetectionSnafu)?;
        let unreachable = || UnreachableSnafu {
            socket: &info.socket_path,
        };
        let runtime = BollardRuntime::connect(&info).context(unreachable())?;
        runtime.ping().await.context(unreachable())?;

        tracing::debug!(
            runtime = %info.runtime_type,
            socket = %info.socket_path,
            "using container runtime"
        );

        let client = NatsClient::new().connection_name(config.name().as_str());
        Ok(Self::from_config(config, runtime, client))
    }
}

impl<R, C: MessagingClient> fmt::Debug for NatsDeployment<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NatsDeployment")
            .field("name", &self.config.name().as_str())
            .field("state", &self.state())
            .field("container", &self.container_id())
            .finish_non_exhaustive()
    }
}

impl<R, C: MessagingClient> Drop for NatsDeployment<R, C> {
    fn drop(&mut self) {
        if let Some(container) = self.lifecycle.container_id() {
            tracing::warn!(
                deployment = %self.config.name(),
                container = %container,
                "deployment dropped without dispose(); container left behind"
            );
        }
    }
}
