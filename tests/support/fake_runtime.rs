// ABOUTME: In-memory container runtime that records every call.
// ABOUTME: Log output and per-operation failures are scripted by each test.

use async_trait::async_trait;
use futures::StreamExt;
use natsbox::runtime::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerOps, ContainerSummary, ImageError,
    ImageOps, LogError, LogLine, LogLineStream, LogOps, LogOptions, LogStream,
};
use natsbox::types::ContainerId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A runtime call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ImageExists(String),
    PullImage(String),
    Create(ContainerConfig),
    Start(ContainerId),
    Stop(ContainerId, Duration),
    Remove(ContainerId, bool),
    Logs(ContainerId),
    List(HashMap<String, String>),
}

/// Failure to inject. Runtime errors are not `Clone`, so tests pick a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fail {
    NotFound,
    NotRunning,
    Runtime,
}

impl Fail {
    fn container_error(self, id: &str) -> ContainerError {
        match self {
            Fail::NotFound => ContainerError::NotFound(id.to_string()),
            Fail::NotRunning => ContainerError::NotRunning(id.to_string()),
            Fail::Runtime => ContainerError::Runtime(format!("injected failure for {id}")),
        }
    }
}

#[derive(Debug)]
struct State {
    calls: Vec<Call>,
    next_id: usize,
    image_present: bool,
    fail_pull: bool,
    fail_create: Option<Fail>,
    fail_start: Option<Fail>,
    fail_stop: HashMap<ContainerId, Fail>,
    fail_remove: HashMap<ContainerId, Fail>,
    fail_logs: bool,
    log_chunks: Vec<String>,
    hold_logs_open: bool,
    containers: Vec<ContainerSummary>,
}

/// Shared handle: clones observe the same calls and scripted behaviour.
#[derive(Debug, Clone)]
pub struct FakeRuntime {
    state: Arc<Mutex<State>>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRuntime {
    /// Image present, server prints the readiness line on start.
    pub fn new() -> Self {
        FakeRuntime {
            state: Arc::new(Mutex::new(State {
                calls: Vec::new(),
                next_id: 1,
                image_present: true,
                fail_pull: false,
                fail_create: None,
                fail_start: None,
                fail_stop: HashMap::new(),
                fail_remove: HashMap::new(),
                fail_logs: false,
                log_chunks: vec![
                    "[1] [INF] Starting nats-server\n".to_string(),
                    "[1] [INF] Listening for client connections on 0.0.0.0:4222\n".to_string(),
                    "[1] [INF] Server is ready\n".to_string(),
                ],
                hold_logs_open: true,
                containers: Vec::new(),
            })),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn without_image(self) -> Self {
        self.state.lock().image_present = false;
        self
    }

    pub fn failing_pull(self) -> Self {
        self.state.lock().fail_pull = true;
        self
    }

    pub fn failing_create(self, fail: Fail) -> Self {
        self.state.lock().fail_create = Some(fail);
        self
    }

    pub fn failing_start(self, fail: Fail) -> Self {
        self.state.lock().fail_start = Some(fail);
        self
    }

    pub fn failing_stop(self, id: &str, fail: Fail) -> Self {
        self.state.lock().fail_stop.insert(ContainerId::new(id), fail);
        self
    }

    pub fn failing_remove(self, id: &str, fail: Fail) -> Self {
        self.state
            .lock()
            .fail_remove
            .insert(ContainerId::new(id), fail);
        self
    }

    pub fn failing_logs(self) -> Self {
        self.state.lock().fail_logs = true;
        self
    }

    /// Replace the scripted output. When `hold_open` is false the stream
    /// ends after the last chunk, as it does when the container exits.
    pub fn with_output(self, chunks: &[&str], hold_open: bool) -> Self {
        {
            let mut state = self.state.lock();
            state.log_chunks = chunks.iter().map(|c| c.to_string()).collect();
            state.hold_logs_open = hold_open;
        }
        self
    }

    pub fn with_container(self, id: &str, labels: &[(&str, &str)]) -> Self {
        self.state.lock().containers.push(ContainerSummary {
            id: ContainerId::new(id),
            name: format!("/{id}"),
            image: "nats:2.10".to_string(),
            state: "exited".to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn pull_image(&self, image: &str) -> Result<(), ImageError> {
        let mut state = self.state.lock();
        state.calls.push(Call::PullImage(image.to_string()));
        if state.fail_pull {
            return Err(ImageError::PullFailed(format!("{image}: manifest unknown")));
        }
        state.image_present = true;
        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool, ImageError> {
        let mut state = self.state.lock();
        state.calls.push(Call::ImageExists(image.to_string()));
        Ok(state.image_present)
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Create(config.clone()));
        if let Some(fail) = state.fail_create {
            return Err(fail.container_error(&config.name));
        }
        let id = ContainerId::new(format!("container-{}", state.next_id));
        state.next_id += 1;
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Start(id.clone()));
        match state.fail_start {
            Some(fail) => Err(fail.container_error(id.as_str())),
            None => Ok(()),
        }
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Duration,
    ) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Stop(id.clone(), timeout));
        match state.fail_stop.get(id) {
            Some(fail) => Err(fail.container_error(id.as_str())),
            None => Ok(()),
        }
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Remove(id.clone(), force));
        match state.fail_remove.get(id) {
            Some(fail) => Err(fail.container_error(id.as_str())),
            None => Ok(()),
        }
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut state = self.state.lock();
        state.calls.push(Call::List(filters.labels.clone()));
        Ok(state
            .containers
            .iter()
            .filter(|c| {
                filters
                    .labels
                    .iter()
                    .all(|(k, v)| c.labels.get(k) == Some(v))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LogOps for FakeRuntime {
    async fn container_logs(
        &self,
        id: &ContainerId,
        _opts: &LogOptions,
    ) -> Result<LogLineStream, LogError> {
        let (chunks, hold_open) = {
            let mut state = self.state.lock();
            state.calls.push(Call::Logs(id.clone()));
            if state.fail_logs {
                return Err(LogError::ContainerNotFound(id.to_string()));
            }
            (state.log_chunks.clone(), state.hold_logs_open)
        };

        let lines = futures::stream::iter(chunks.into_iter().map(|content| {
            Ok::<_, LogError>(LogLine {
                content,
                stream: LogStream::Stderr,
            })
        }));

        if hold_open {
            Ok(Box::pin(lines.chain(futures::stream::pending())))
        } else {
            Ok(Box::pin(lines))
        }
    }
}
