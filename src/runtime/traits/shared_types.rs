// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: ContainerConfig, PortMapping, RuntimeMetadata.

use std::collections::HashMap;
use std::time::Duration;

/// Configuration for creating a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Name for the container.
    pub name: String,
    /// Image to run.
    pub image: String,
    /// Labels to apply.
    pub labels: HashMap<String, String>,
    /// Port mappings (host:container).
    pub ports: Vec<PortMapping>,
    /// Command to run (overrides image CMD).
    pub command: Option<Vec<String>>,
    /// Remove the container as soon as it stops.
    pub auto_remove: bool,
    /// Stop timeout.
    pub stop_timeout: Option<Duration>,
}

/// Port mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Host port.
    pub host_port: Option<u16>,
    /// Container port.
    pub container_port: u16,
    /// Protocol (tcp/udp).
    pub protocol: Protocol,
    /// Host IP to bind to.
    pub host_ip: Option<String>,
}

impl PortMapping {
    /// TCP mapping bound on all host interfaces.
    pub fn tcp(host_port: u16, container_port: u16) -> Self {
        PortMapping {
            host_port: Some(host_port),
            container_port,
            protocol: Protocol::Tcp,
            host_ip: None,
        }
    }
}

/// Network protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

/// Runtime metadata.
#[derive(Debug, Clone)]
pub struct RuntimeMetadata {
    /// Runtime name (e.g., "docker", "podman").
    pub name: String,
    /// Runtime version.
    pub version: String,
    /// API version.
    pub api_version: String,
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
}
