// ABOUTME: In-memory messaging client recording connections and bucket creation.
// ABOUTME: Connect and the nth bucket creation can be scripted to fail.

use async_trait::async_trait;
use natsbox::messaging::{MessagingClient, MessagingError, ObjectStoreOps};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct State {
    connects: Vec<String>,
    buckets: Vec<(String, Option<i64>)>,
    fail_connect: bool,
    fail_bucket_at: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeMessaging {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeConnection {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeStream {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct FakeObjectStore {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeKeyValue {
    pub url: String,
}

impl FakeMessaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect(self) -> Self {
        self.state.lock().fail_connect = true;
        self
    }

    /// Fail the bucket creation at zero-based position `index`.
    pub fn failing_bucket(self, index: usize) -> Self {
        self.state.lock().fail_bucket_at = Some(index);
        self
    }

    pub fn connects(&self) -> Vec<String> {
        self.state.lock().connects.clone()
    }

    pub fn buckets(&self) -> Vec<(String, Option<i64>)> {
        self.state.lock().buckets.clone()
    }
}

#[async_trait]
impl MessagingClient for FakeMessaging {
    type Connection = FakeConnection;
    type Stream = FakeStream;
    type ObjectStore = FakeObjectStore;
    type KeyValue = FakeKeyValue;

    async fn connect(&self, url: &str) -> Result<Self::Connection, MessagingError> {
        let mut state = self.state.lock();
        state.connects.push(url.to_string());
        if state.fail_connect {
            return Err(MessagingError::Connect {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(FakeConnection {
            url: url.to_string(),
        })
    }

    fn stream_context(&self, connection: &Self::Connection) -> Self::Stream {
        FakeStream {
            url: connection.url.clone(),
        }
    }

    fn object_store_context(&self, _stream: &Self::Stream) -> Self::ObjectStore {
        FakeObjectStore {
            state: Arc::clone(&self.state),
        }
    }

    fn key_value_context(&self, stream: &Self::Stream) -> Self::KeyValue {
        FakeKeyValue {
            url: stream.url.clone(),
        }
    }
}

#[async_trait]
impl ObjectStoreOps for FakeObjectStore {
    async fn create_bucket(
        &self,
        name: &str,
        max_bytes: Option<i64>,
    ) -> Result<(), MessagingError> {
        let mut state = self.state.lock();
        let index = state.buckets.len();
        state.buckets.push((name.to_string(), max_bytes));
        if state.fail_bucket_at == Some(index) {
            return Err(MessagingError::BucketCreate {
                bucket: name.to_string(),
                message: "insufficient resources".to_string(),
            });
        }
        Ok(())
    }
}
