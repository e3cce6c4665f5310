// ABOUTME: Object-store bucket name derived from a deployment name.
// ABOUTME: Non-alphanumeric characters are replaced so the name is valid for JetStream.

use super::deployment_name::DeploymentName;
use std::fmt;

/// Name under which provisioned object-store buckets are created.
///
/// Every bucket of a deployment shares this name; only the size limit differs
/// between [`BucketSpec`](crate::config::BucketSpec) entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    pub fn for_deployment(name: &DeploymentName) -> Self {
        Self(name.sanitized())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
