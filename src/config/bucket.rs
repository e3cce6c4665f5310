// ABOUTME: Object-store bucket provisioning request.
// ABOUTME: Pairs a bucket label with an optional size limit in bytes.

use serde::Deserialize;

/// A bucket to create in the object store once the server is running.
///
/// Only `size_limit_bytes` affects the created bucket: the bucket itself is
/// named after the deployment (see [`BucketName`](crate::types::BucketName)).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BucketSpec {
    name: String,

    #[serde(default)]
    size_limit_bytes: Option<i64>,
}

impl BucketSpec {
    pub fn new(name: impl Into<String>, size_limit_bytes: Option<i64>) -> Self {
        BucketSpec {
            name: name.into(),
            size_limit_bytes,
        }
    }

    /// Bucket without a size limit.
    pub fn unlimited(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_limit_bytes(&self) -> Option<i64> {
        self.size_limit_bytes
    }
}
