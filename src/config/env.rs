// ABOUTME: Environment variable overrides for deployment configuration.
// ABOUTME: Lets CI pin the server image or stretch the startup timeout without code changes.

use super::ConfigError;
use humantime_serde::re::humantime;
use std::time::Duration;

/// Overrides the configured image tag, e.g. `nats:2.10-alpine`.
pub const ENV_IMAGE: &str = "NATSBOX_IMAGE";

/// Overrides the startup timeout, as a humantime duration such as `90s`.
pub const ENV_STARTUP_TIMEOUT: &str = "NATSBOX_STARTUP_TIMEOUT";

pub(super) fn image_override() -> Option<String> {
    std::env::var(ENV_IMAGE)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub(super) fn startup_timeout_override() -> Result<Option<Duration>, ConfigError> {
    let Ok(raw) = std::env::var(ENV_STARTUP_TIMEOUT) else {
        return Ok(None);
    };

    humantime::parse_duration(raw.trim())
        .map(Some)
        .map_err(|e| ConfigError::InvalidEnv {
            var: ENV_STARTUP_TIMEOUT.to_string(),
            message: e.to_string(),
        })
}
