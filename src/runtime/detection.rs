// ABOUTME: Runtime detection logic for the local system.
// ABOUTME: Honours DOCKER_HOST, then checks Podman sockets, then Docker.

use super::types::{RuntimeConfig, RuntimeInfo, RuntimeType};
use std::path::Path;

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked DOCKER_HOST, Podman and Docker sockets)")]
    NoRuntimeFound,
}

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect container runtime on the local system.
///
/// Detection order:
/// 1. `DOCKER_HOST`, if it is a `unix://` URL pointing at an existing path
/// 2. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 3. Rootful Podman socket (`/run/podman/podman.sock`)
/// 4. Docker socket (`/var/run/docker.sock`)
pub fn detect_local() -> Result<RuntimeInfo, DetectionError> {
    // 1. DOCKER_HOST
    if let Some(socket_path) = docker_host_socket() {
        if Path::new(&socket_path).exists() {
            return Ok(RuntimeInfo {
                runtime_type: runtime_type_for_socket(&socket_path),
                socket_path,
            });
        }
        tracing::debug!(socket = %socket_path, "DOCKER_HOST socket does not exist, probing defaults");
    }

    // 2. Rootless Podman
    if let Some(uid) = get_uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if Path::new(&rootless_socket).exists() {
            return Ok(RuntimeInfo {
                runtime_type: RuntimeType::Podman,
                socket_path: rootless_socket,
            });
        }
    }

    // 3. Rootful Podman
    if Path::new(ROOTFUL_PODMAN).exists() {
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::Podman,
            socket_path: ROOTFUL_PODMAN.to_string(),
        });
    }

    // 4. Docker
    if Path::new(DOCKER_SOCKET).exists() {
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::Docker,
            socket_path: DOCKER_SOCKET.to_string(),
        });
    }

    Err(DetectionError::NoRuntimeFound)
}

/// Resolve the runtime from an explicit override, falling back to
/// [`detect_local`] when neither runtime nor socket is given.
pub fn detect_with(config: &RuntimeConfig) -> Result<RuntimeInfo, DetectionError> {
    match (config.runtime, config.socket.as_ref()) {
        (Some(runtime_type), socket) => Ok(RuntimeInfo {
            runtime_type,
            socket_path: socket
                .cloned()
                .unwrap_or_else(|| default_socket_path(runtime_type)),
        }),
        (None, Some(socket)) => Ok(RuntimeInfo {
            runtime_type: runtime_type_for_socket(socket),
            socket_path: socket.clone(),
        }),
        (None, None) => detect_local(),
    }
}

fn docker_host_socket() -> Option<String> {
    let host = std::env::var("DOCKER_HOST").ok()?;
    host.strip_prefix("unix://").map(|path| path.to_string())
}

fn runtime_type_for_socket(socket: &str) -> RuntimeType {
    if socket.contains("podman") {
        RuntimeType::Podman
    } else {
        RuntimeType::Docker
    }
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

fn default_socket_path(runtime: RuntimeType) -> String {
    match runtime {
        RuntimeType::Docker => DOCKER_SOCKET.to_string(),
        RuntimeType::Podman => ROOTFUL_PODMAN.to_string(),
    }
}
