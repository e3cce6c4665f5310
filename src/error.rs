// ABOUTME: Crate-wide error type and error classification.
// ABOUTME: Wraps configuration and deployment errors so fixtures can use a single `?`.

use crate::config::ConfigError;
use crate::deploy::DeployError;
use thiserror::Error;

/// Coarse classification of every error natsbox can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration input, detected when the configuration is built.
    InvalidArgument,
    /// A lifecycle operation was called in a state that does not allow it.
    InvalidOperationState,
    /// The container runtime or the NATS server failed.
    ExternalFailure,
    /// The caller cancelled an in-flight start.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(e) => e.kind(),
            Error::Deploy(e) => e.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
