// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ImageOps, ContainerOps, LogOps, RuntimeInfo.

mod container;
mod image;
mod logs;
mod runtime_info;
mod shared_types;

pub use container::{ContainerError, ContainerFilters, ContainerOps, ContainerSummary};
pub use image::{ImageError, ImageOps};
pub use logs::{LogError, LogLine, LogLineStream, LogOps, LogOptions, LogStream};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;

/// Everything the deployment controller needs from a runtime.
pub trait FullRuntime: ImageOps + ContainerOps + LogOps {}

impl<T: ImageOps + ContainerOps + LogOps> FullRuntime for T {}
