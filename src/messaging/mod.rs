// ABOUTME: Messaging client traits consumed by the deployment controller.
// ABOUTME: Connection, derived JetStream contexts, and object-store bucket creation.

mod nats;

pub use nats::{KeyValueContext, NatsClient, ObjectStoreContext};

use async_trait::async_trait;

/// Client side of the messaging protocol.
///
/// A connection is opened once per deployment; the stream, object-store and
/// key-value contexts are views derived from it and hold no resources of
/// their own.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    type Connection: Send + Sync;
    type Stream: Send + Sync;
    type ObjectStore: ObjectStoreOps;
    type KeyValue: Send + Sync;

    /// Open a connection to `url`. No retries are attempted.
    async fn connect(&self, url: &str) -> Result<Self::Connection, MessagingError>;

    fn stream_context(&self, connection: &Self::Connection) -> Self::Stream;

    fn object_store_context(&self, stream: &Self::Stream) -> Self::ObjectStore;

    fn key_value_context(&self, stream: &Self::Stream) -> Self::KeyValue;
}

/// Object-store operations used during provisioning.
#[async_trait]
pub trait ObjectStoreOps: Send + Sync {
    /// Create a bucket. `max_bytes` of `None` means unlimited.
    async fn create_bucket(
        &self,
        name: &str,
        max_bytes: Option<i64>,
    ) -> Result<(), MessagingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("failed to create bucket {bucket}: {message}")]
    BucketCreate { bucket: String, message: String },

    #[error("failed to open bucket {bucket}: {message}")]
    BucketOpen { bucket: String, message: String },

    #[error("key-value operation on {bucket} failed: {message}")]
    KeyValue { bucket: String, message: String },
}
