// ABOUTME: Lifecycle state of a deployment.
// ABOUTME: Each variant carries only the data that is valid in that state.

use super::readiness::ReadinessProbe;
use crate::messaging::MessagingClient;
use crate::runtime::ContainerConfig;
use crate::types::ContainerId;
use std::fmt;

/// Observable lifecycle state, without the data each state carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed; nothing prepared yet.
    Created,
    /// Container spec prepared; nothing running.
    Built,
    /// Server ready, client connected, buckets provisioned.
    Running,
    /// `start()` failed or was cancelled. A container may still need disposal.
    Faulted,
    /// Torn down. Terminal.
    Disposed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Built => "built",
            LifecycleState::Running => "running",
            LifecycleState::Faulted => "faulted",
            LifecycleState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Prepared, not yet created, container.
#[derive(Debug, Clone)]
pub struct BuiltContainer {
    pub(crate) spec: ContainerConfig,
    pub(crate) probe: ReadinessProbe,
}

impl BuiltContainer {
    pub fn spec(&self) -> &ContainerConfig {
        &self.spec
    }

    pub fn probe(&self) -> &ReadinessProbe {
        &self.probe
    }
}

/// A ready server and the client handles derived from it.
pub(crate) struct RunningServer<C: MessagingClient> {
    pub(crate) container_id: ContainerId,
    pub(crate) connection: C::Connection,
    pub(crate) stream: C::Stream,
    pub(crate) object_store: C::ObjectStore,
    pub(crate) key_value: C::KeyValue,
}

pub(crate) enum Lifecycle<C: MessagingClient> {
    Created,
    Built(BuiltContainer),
    Running(RunningServer<C>),
    Faulted { container: Option<ContainerId> },
    Disposed,
}

impl<C: MessagingClient> Lifecycle<C> {
    pub(crate) fn state(&self) -> LifecycleState {
        match self {
            Lifecycle::Created => LifecycleState::Created,
            Lifecycle::Built(_) => LifecycleState::Built,
            Lifecycle::Running(_) => LifecycleState::Running,
            Lifecycle::Faulted { .. } => LifecycleState::Faulted,
            Lifecycle::Disposed => LifecycleState::Disposed,
        }
    }

    /// Container that teardown still has to release, if any.
    pub(crate) fn container_id(&self) -> Option<&ContainerId> {
        match self {
            Lifecycle::Running(server) => Some(&server.container_id),
            Lifecycle::Faulted { container } => container.as_ref(),
            Lifecycle::Created | Lifecycle::Built(_) | Lifecycle::Disposed => None,
        }
    }

    pub(crate) fn running(&self) -> Option<&RunningServer<C>> {
        match self {
            Lifecycle::Running(server) => Some(server),
            _ => None,
        }
    }
}
