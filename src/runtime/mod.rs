// ABOUTME: Container runtime access for Docker and Podman.
// ABOUTME: Capability traits, the bollard implementation, and local detection.

mod bollard;
mod detection;
mod error;
pub mod traits;
mod types;

pub use self::bollard::BollardRuntime;
pub use detection::{DetectionError, detect_local, detect_with};
pub use error::RuntimeError;
pub(crate) use error::{DetectionSnafu, UnreachableSnafu};
pub use traits::RuntimeInfo as RuntimeInfoTrait;
pub use traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerOps, ContainerSummary,
    FullRuntime, ImageError, ImageOps, LogError, LogLine, LogLineStream, LogOps, LogOptions,
    LogStream, PortMapping, Protocol, RuntimeInfoError, RuntimeMetadata,
};
pub use types::{RuntimeConfig, RuntimeInfo, RuntimeType};
