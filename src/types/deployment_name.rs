// ABOUTME: Validated deployment name.
// ABOUTME: A deployment name is any string that is not empty or whitespace-only.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeploymentNameError {
    #[error("deployment name cannot be empty")]
    Empty,

    #[error("deployment name cannot be whitespace only")]
    Blank,
}

/// Human-readable name of a deployment.
///
/// The name is kept verbatim (it may contain spaces or punctuation); use
/// [`DeploymentName::sanitized`] wherever a runtime-safe identifier is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentName(String);

impl DeploymentName {
    pub fn new(value: &str) -> Result<Self, DeploymentNameError> {
        if value.is_empty() {
            return Err(DeploymentNameError::Empty);
        }

        if value.trim().is_empty() {
            return Err(DeploymentNameError::Blank);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Replace every character outside `[A-Za-z0-9]` with `-`.
    pub fn sanitized(&self) -> String {
        self.0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect()
    }
}

impl fmt::Display for DeploymentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
