//! Vision-language model client abstraction and implementations.

mod openai;
mod types;

pub use openai::OpenAiCompatClient;
pub use types::{ImagePayload, VisionRequest, VisionResponse, VisionUsage};

use async_trait::async_trait;
use std::time::Duration;

/// Error type for vision model operations.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Vision endpoint not configured (missing API key)")]
    NotConfigured,
}

/// Trait for vision-language model clients.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Provider name (e.g. "openai-compat")
    fn provider(&self) -> &str;

    /// Model name (e.g. "qwen3-vl-plus")
    fn model(&self) -> &str;

    /// Send a chat request, optionally carrying an image, and get the
    /// model's text reply.
    async fn complete(&self, request: VisionRequest) -> Result<VisionResponse, VisionError>;
}
