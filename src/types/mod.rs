// ABOUTME: Validated domain types and identifiers.
// ABOUTME: Deployment names, derived bucket names, and container ids.

mod bucket_name;
mod deployment_name;
mod id;

pub use bucket_name::BucketName;
pub use deployment_name::{DeploymentName, DeploymentNameError};
pub use id::ContainerId;
