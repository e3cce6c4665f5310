// ABOUTME: Detection and cleanup of containers left behind by earlier test runs.
// ABOUTME: Managed containers are found through the labels every build attaches.

use std::collections::HashMap;
use std::time::Duration;

use crate::runtime::{ContainerError, ContainerFilters, ContainerOps, ContainerSummary};
use crate::types::{ContainerId, DeploymentName};

/// Label marking a container as created by this crate.
pub const LABEL_MANAGED: &str = "natsbox.managed";

/// Label carrying the sanitised deployment name.
pub const LABEL_DEPLOYMENT: &str = "natsbox.deployment";

const ORPHAN_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of [`cleanup_orphans`].
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub removed: Vec<ContainerId>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupResult {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A container that could not be removed.
#[derive(Debug)]
pub struct CleanupFailure {
    pub container: ContainerId,
    pub error: ContainerError,
}

/// Detect managed containers that no live deployment owns.
///
/// An orphan carries `natsbox.managed=true`, matches `deployment` when one is
/// given, and is not listed in `known`. Stopped containers are included.
pub async fn detect_orphans<R: ContainerOps + ?Sized>(
    runtime: &R,
    deployment: Option<&DeploymentName>,
    known: &[ContainerId],
) -> Result<Vec<ContainerSummary>, ContainerError> {
    let mut labels = HashMap::new();
    labels.insert(LABEL_MANAGED.to_string(), "true".to_string());
    if let Some(name) = deployment {
        labels.insert(LABEL_DEPLOYMENT.to_string(), name.sanitized());
    }

    let filters = ContainerFilters {
        labels,
        all: true,
        ..Default::default()
    };

    let orphans: Vec<ContainerSummary> = runtime
        .list_containers(&filters)
        .await?
        .into_iter()
        .filter(|c| !known.contains(&c.id))
        .collect();

    tracing::debug!(count = orphans.len(), "orphan containers detected");
    Ok(orphans)
}

/// Stop and force-remove each container. Best effort: one failure does not
/// stop the sweep.
pub async fn cleanup_orphans<R: ContainerOps + ?Sized>(
    runtime: &R,
    orphans: &[ContainerId],
) -> CleanupResult {
    let mut result = CleanupResult::default();

    for container in orphans {
        // Stop failures are ignored; the forced remove decides the outcome.
        if let Err(e) = runtime.stop_container(container, ORPHAN_STOP_TIMEOUT).await {
            tracing::debug!(container = %container, error = %e, "orphan stop failed");
        }

        match runtime.remove_container(container, true).await {
            Ok(()) => result.removed.push(container.clone()),
            Err(e) if e.is_already_released() => result.removed.push(container.clone()),
            Err(error) => {
                tracing::warn!(container = %container, error = %error, "failed to remove orphan");
                result.failed.push(CleanupFailure {
                    container: container.clone(),
                    error,
                });
            }
        }
    }

    result
}
