// ABOUTME: Deployment lifecycle for ephemeral NATS servers.
// ABOUTME: Exports the controller, its states and errors, readiness, and orphan cleanup.

mod deployment;
mod error;
mod orphans;
mod readiness;
mod state;
mod transitions;

pub use deployment::NatsDeployment;
pub use error::DeployError;
pub use orphans::{
    CleanupFailure, CleanupResult, LABEL_DEPLOYMENT, LABEL_MANAGED, cleanup_orphans,
    detect_orphans,
};
pub use readiness::{READY_LOG_LINE, ReadinessError, ReadinessProbe, wait_for_log_line};
pub use state::{BuiltContainer, LifecycleState};
