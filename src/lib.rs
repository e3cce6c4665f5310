// ABOUTME: Library root for natsbox - ephemeral NATS servers for integration tests.
// ABOUTME: Containers run on the local Docker or Podman daemon through bollard.

pub mod config;
pub mod deploy;
pub mod error;
pub mod messaging;
pub mod runtime;
pub mod types;

pub use config::{BucketSpec, NatsConfig};
pub use deploy::{DeployError, LifecycleState, NatsDeployment};
pub use error::{Error, ErrorKind, Result};
