// ABOUTME: Error types for deployment lifecycle operations.
// ABOUTME: Covers lifecycle misuse, container, readiness, connection, and bucket failures.

use super::readiness::ReadinessError;
use super::state::LifecycleState;
use crate::error::ErrorKind;
use crate::messaging::MessagingError;
use crate::runtime::{ContainerError, ImageError, RuntimeError};

/// Errors that can occur while building, starting, or disposing a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// `start()` was called before `build()`.
    #[error("deployment is not initialized")]
    NotInitialized,

    /// The operation is not allowed in the current lifecycle state.
    #[error("cannot {operation} a deployment in state {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },

    /// The runtime could not be detected or reached.
    #[error(transparent)]
    RuntimeUnavailable(#[from] RuntimeError),

    /// The server image is neither present locally nor pullable.
    #[error("image {image} is unavailable: {source}")]
    ImageUnavailable {
        image: String,
        #[source]
        source: ImageError,
    },

    /// Container creation failed.
    #[error("failed to create container: {0}")]
    ContainerCreateFailed(#[source] ContainerError),

    /// Container start failed.
    #[error("failed to start container: {0}")]
    ContainerStartFailed(#[source] ContainerError),

    /// The readiness log line was never observed.
    #[error(transparent)]
    NotReady(#[from] ReadinessError),

    /// Connecting to the server failed.
    #[error("failed to connect to server: {0}")]
    ConnectFailed(#[source] MessagingError),

    /// Creating one of the configured buckets failed.
    #[error("failed to create bucket #{index}: {source}")]
    BucketCreateFailed {
        index: usize,
        #[source]
        source: MessagingError,
    },

    /// Container stop failed during teardown.
    #[error("failed to stop container: {0}")]
    ContainerStopFailed(#[source] ContainerError),

    /// Container removal failed during teardown.
    #[error("failed to remove container: {0}")]
    ContainerRemoveFailed(#[source] ContainerError),

    /// Start was cancelled through its cancellation token.
    #[error("start cancelled")]
    Cancelled,
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::NotInitialized | DeployError::InvalidState { .. } => {
                ErrorKind::InvalidOperationState
            }
            DeployError::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::ExternalFailure,
        }
    }
}
