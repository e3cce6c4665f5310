// ABOUTME: async-nats implementation of the messaging traits.
// ABOUTME: Object-store and key-value contexts are typed views over one JetStream context.

use super::{MessagingClient, MessagingError, ObjectStoreOps};
use async_nats::jetstream;
use async_trait::async_trait;
use std::time::Duration;

/// JetStream treats a negative byte limit as "no limit".
const UNLIMITED_BYTES: i64 = -1;

/// NATS client factory.
#[derive(Debug, Clone, Default)]
pub struct NatsClient {
    connection_name: Option<String>,
    connection_timeout: Option<Duration>,
}

impl NatsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name reported to the server, visible in its monitoring endpoints.
    pub fn connection_name(mut self, name: impl Into<String>) -> Self {
        self.connection_name = Some(name.into());
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl MessagingClient for NatsClient {
    type Connection = async_nats::Client;
    type Stream = jetstream::Context;
    type ObjectStore = ObjectStoreContext;
    type KeyValue = KeyValueContext;

    async fn connect(&self, url: &str) -> Result<Self::Connection, MessagingError> {
        let mut options = async_nats::ConnectOptions::new();
        if let Some(ref name) = self.connection_name {
            options = options.name(name.clone());
        }
        if let Some(timeout) = self.connection_timeout {
            options = options.connection_timeout(timeout);
        }

        options
            .connect(url)
            .await
            .map_err(|e| MessagingError::Connect {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn stream_context(&self, connection: &Self::Connection) -> Self::Stream {
        jetstream::new(connection.clone())
    }

    fn object_store_context(&self, stream: &Self::Stream) -> Self::ObjectStore {
        ObjectStoreContext {
            context: stream.clone(),
        }
    }

    fn key_value_context(&self, stream: &Self::Stream) -> Self::KeyValue {
        KeyValueContext {
            context: stream.clone(),
        }
    }
}

/// Object-store view of a JetStream context.
#[derive(Clone)]
pub struct ObjectStoreContext {
    context: jetstream::Context,
}

impl ObjectStoreContext {
    /// Open an existing bucket.
    pub async fn get_bucket(
        &self,
        name: &str,
    ) -> Result<jetstream::object_store::ObjectStore, MessagingError> {
        self.context
            .get_object_store(name)
            .await
            .map_err(|e| MessagingError::BucketOpen {
                bucket: name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn jetstream(&self) -> &jetstream::Context {
        &self.context
    }
}

#[async_trait]
impl ObjectStoreOps for ObjectStoreContext {
    async fn create_bucket(
        &self,
        name: &str,
        max_bytes: Option<i64>,
    ) -> Result<(), MessagingError> {
        let config = jetstream::object_store::Config {
            bucket: name.to_string(),
            max_bytes: max_bytes.unwrap_or(UNLIMITED_BYTES),
            ..Default::default()
        };

        self.context
            .create_object_store(config)
            .await
            .map(|_| ())
            .map_err(|e| MessagingError::BucketCreate {
                bucket: name.to_string(),
                message: e.to_string(),
            })
    }
}

/// Key-value view of a JetStream context.
#[derive(Clone)]
pub struct KeyValueContext {
    context: jetstream::Context,
}

impl KeyValueContext {
    pub async fn create_bucket(&self, name: &str) -> Result<jetstream::kv::Store, MessagingError> {
        let config = jetstream::kv::Config {
            bucket: name.to_string(),
            ..Default::default()
        };

        self.context
            .create_key_value(config)
            .await
            .map_err(|e| MessagingError::KeyValue {
                bucket: name.to_string(),
                message: e.to_string(),
            })
    }

    pub async fn get_bucket(&self, name: &str) -> Result<jetstream::kv::Store, MessagingError> {
        self.context
            .get_key_value(name)
            .await
            .map_err(|e| MessagingError::KeyValue {
                bucket: name.to_string(),
                message: e.to_string(),
            })
    }

    pub fn jetstream(&self) -> &jetstream::Context {
        &self.context
    }
}
