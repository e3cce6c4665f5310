// ABOUTME: Why a deployment could not reach a container runtime.
// ABOUTME: SNAFU context selectors attach the socket that was tried.

use snafu::Snafu;

use super::detection::DetectionError;
use super::traits::RuntimeInfoError;

/// No usable runtime: none was found, or the one found did not answer.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RuntimeError {
    #[snafu(display("{source}"))]
    Detection { source: DetectionError },

    #[snafu(display("container runtime at {socket} is unreachable: {source}"))]
    Unreachable {
        socket: String,
        source: RuntimeInfoError,
    },
}

impl RuntimeError {
    /// Socket path that was tried, if detection got that far.
    pub fn socket(&self) -> Option<&str> {
        match self {
            RuntimeError::Detection { .. } => None,
            RuntimeError::Unreachable { socket, .. } => Some(socket),
        }
    }
}
