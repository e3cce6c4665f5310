// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Routes deployment names through the same validation as the builder.

use serde::Deserialize;

use crate::types::DeploymentName;

pub fn deserialize_deployment_name<'de, D>(deserializer: D) -> Result<DeploymentName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DeploymentName::new(&s).map_err(serde::de::Error::custom)
}
