// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Pull images and check whether they exist locally.

use async_trait::async_trait;

#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Pull an image from its registry.
    async fn pull_image(&self, image: &str) -> Result<(), ImageError>;

    /// Check if an image exists locally.
    async fn image_exists(&self, image: &str) -> Result<bool, ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
