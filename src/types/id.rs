// ABOUTME: Container identifier newtype.
// ABOUTME: Keeps runtime-assigned container ids distinct from names and bucket names.

use std::fmt;

/// Identifier assigned by the container runtime when a container is created.
#[must_use = "IDs reference resources and should not be ignored"]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
