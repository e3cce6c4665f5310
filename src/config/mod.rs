// ABOUTME: Immutable deployment configuration and its fluent builder.
// ABOUTME: Handles YAML loading, defaults, and environment overrides.

mod bucket;
mod deserialize;
mod env;

pub use bucket::BucketSpec;
pub use env::{ENV_IMAGE, ENV_STARTUP_TIMEOUT};

use crate::error::ErrorKind;
use crate::types::{DeploymentName, DeploymentNameError};
use deserialize::deserialize_deployment_name;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Client port the server listens on inside the container.
pub const CLIENT_PORT: u16 = 4222;

/// Cluster routing port inside the container. Reserved; never mapped.
pub const ROUTING_PORT: u16 = 6222;

/// HTTP management (monitoring) port inside the container.
pub const MANAGEMENT_PORT: u16 = 8222;

pub const DEFAULT_IMAGE: &str = "nats:2.10";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid deployment name: {0}")]
    InvalidName(#[from] DeploymentNameError),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value in {var}: {message}")]
    InvalidEnv { var: String, message: String },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Settings for one ephemeral NATS server.
///
/// Values are immutable: every `with_*` method returns a new configuration and
/// leaves the receiver untouched.
///
/// ```
/// use natsbox::config::{BucketSpec, NatsConfig};
///
/// let base = NatsConfig::new("orders")?;
/// let js = base
///     .with_stream(true)
///     .with_host_client_port(14222)
///     .with_bucket(BucketSpec::new("blobs", Some(1024 * 1024)));
///
/// assert!(!base.stream_enabled());
/// assert!(js.stream_enabled());
/// # Ok::<(), natsbox::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NatsConfig {
    #[serde(deserialize_with = "deserialize_deployment_name")]
    name: DeploymentName,

    #[serde(default = "default_image", rename = "image")]
    image_tag: String,

    #[serde(default = "default_container_name")]
    container_name: String,

    #[serde(default = "default_client_port", rename = "client_port")]
    host_client_port: u16,

    #[serde(default, rename = "management_port")]
    host_management_port: Option<u16>,

    #[serde(default, rename = "jetstream")]
    enable_stream: bool,

    #[serde(default, rename = "debug")]
    enable_debug_log: bool,

    #[serde(default, rename = "trace")]
    enable_trace_log: bool,

    #[serde(default)]
    buckets: Vec<BucketSpec>,

    #[serde(default = "default_startup_timeout", with = "humantime_serde")]
    startup_timeout: Duration,

    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    stop_timeout: Duration,
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

fn default_container_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("natsbox-{}", &id[..12])
}

fn default_client_port() -> u16 {
    CLIENT_PORT
}

fn default_startup_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_stop_timeout() -> Duration {
    Duration::from_secs(10)
}

impl NatsConfig {
    /// Create a configuration with defaults for everything but the name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidName` if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let name = DeploymentName::new(name)?;
        Ok(NatsConfig {
            name,
            image_tag: default_image(),
            container_name: default_container_name(),
            host_client_port: default_client_port(),
            host_management_port: None,
            enable_stream: false,
            enable_debug_log: false,
            enable_trace_log: false,
            buckets: Vec::new(),
            startup_timeout: default_startup_timeout(),
            stop_timeout: default_stop_timeout(),
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(ConfigError::from)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Apply `NATSBOX_IMAGE` and `NATSBOX_STARTUP_TIMEOUT` if they are set.
    pub fn with_env_overrides(&self) -> Result<Self, ConfigError> {
        let mut config = self.clone();
        if let Some(image) = env::image_override() {
            config.image_tag = image;
        }
        if let Some(timeout) = env::startup_timeout_override()? {
            config.startup_timeout = timeout;
        }
        Ok(config)
    }

    pub fn with_image_tag(&self, image_tag: impl Into<String>) -> Self {
        NatsConfig {
            image_tag: image_tag.into(),
            ..self.clone()
        }
    }

    pub fn with_container_name(&self, container_name: impl Into<String>) -> Self {
        NatsConfig {
            container_name: container_name.into(),
            ..self.clone()
        }
    }

    pub fn with_host_client_port(&self, port: u16) -> Self {
        NatsConfig {
            host_client_port: port,
            ..self.clone()
        }
    }

    pub fn with_host_management_port(&self, port: u16) -> Self {
        NatsConfig {
            host_management_port: Some(port),
            ..self.clone()
        }
    }

    /// Enable or disable JetStream.
    pub fn with_stream(&self, enabled: bool) -> Self {
        NatsConfig {
            enable_stream: enabled,
            ..self.clone()
        }
    }

    pub fn with_debug_log(&self, enabled: bool) -> Self {
        NatsConfig {
            enable_debug_log: enabled,
            ..self.clone()
        }
    }

    pub fn with_trace_log(&self, enabled: bool) -> Self {
        NatsConfig {
            enable_trace_log: enabled,
            ..self.clone()
        }
    }

    /// Append a bucket to provision after startup.
    pub fn with_bucket(&self, bucket: BucketSpec) -> Self {
        let mut buckets = self.buckets.clone();
        buckets.push(bucket);
        NatsConfig {
            buckets,
            ..self.clone()
        }
    }

    /// Upper bound on the wait for the readiness log line.
    pub fn with_startup_timeout(&self, timeout: Duration) -> Self {
        NatsConfig {
            startup_timeout: timeout,
            ..self.clone()
        }
    }

    /// Grace period given to the server when the container is stopped.
    pub fn with_stop_timeout(&self, timeout: Duration) -> Self {
        NatsConfig {
            stop_timeout: timeout,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &DeploymentName {
        &self.name
    }

    pub fn image_tag(&self) -> &str {
        &self.image_tag
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn host_client_port(&self) -> u16 {
        self.host_client_port
    }

    pub fn host_management_port(&self) -> Option<u16> {
        self.host_management_port
    }

    pub fn stream_enabled(&self) -> bool {
        self.enable_stream
    }

    pub fn debug_log_enabled(&self) -> bool {
        self.enable_debug_log
    }

    pub fn trace_log_enabled(&self) -> bool {
        self.enable_trace_log
    }

    pub fn buckets(&self) -> &[BucketSpec] {
        &self.buckets
    }

    pub fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }

    pub fn stop_timeout(&self) -> Duration {
        self.stop_timeout
    }
}
