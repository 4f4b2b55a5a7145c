//! Mock vision client for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::vision::{VisionClient, VisionError, VisionRequest, VisionResponse, VisionUsage};

/// One scripted reply from the mock.
enum ScriptedReply {
    Text(String),
    Error(VisionError),
}

/// Mock implementation of the [`VisionClient`] trait.
///
/// Provides controllable behavior for testing:
/// - Queue text replies and errors, consumed in order
/// - A default reply once the queue is drained
/// - Recorded requests for assertions
///
/// # Example
///
/// ```rust,ignore
/// use glimpse_core::testing::MockVisionClient;
///
/// let client = MockVisionClient::new();
/// client.push_response("a lighthouse at dawn").await;
///
/// let response = client.complete(VisionRequest::new("describe")).await?;
/// assert_eq!(response.text, "a lighthouse at dawn");
/// assert_eq!(client.call_count().await, 1);
/// ```
pub struct MockVisionClient {
    /// Scripted replies, consumed front to back.
    script: Arc<RwLock<VecDeque<ScriptedReply>>>,
    /// Reply used when the script is empty.
    default_reply: Arc<RwLock<String>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<VisionRequest>>>,
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVisionClient {
    /// Create a mock that answers "mock analysis" to everything.
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_reply: Arc::new(RwLock::new("mock analysis".to_string())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue a text reply for the next unanswered call.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.script
            .write()
            .await
            .push_back(ScriptedReply::Text(text.into()));
    }

    /// Queue an error for the next unanswered call.
    pub async fn push_error(&self, error: VisionError) {
        self.script
            .write()
            .await
            .push_back(ScriptedReply::Error(error));
    }

    /// Change the reply used once the script is drained.
    pub async fn set_default_reply(&self, text: impl Into<String>) {
        *self.default_reply.write().await = text.into();
    }

    /// Get recorded requests.
    pub async fn recorded_requests(&self) -> Vec<VisionRequest> {
        self.requests.read().await.clone()
    }

    /// Number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Clear recorded requests and any unconsumed script entries.
    pub async fn reset(&self) {
        self.requests.write().await.clear();
        self.script.write().await.clear();
    }
}

#[async_trait]
impl VisionClient for MockVisionClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-vl"
    }

    async fn complete(&self, request: VisionRequest) -> Result<VisionResponse, VisionError> {
        self.requests.write().await.push(request);

        let scripted = self.script.write().await.pop_front();
        let text = match scripted {
            Some(ScriptedReply::Text(text)) => text,
            Some(ScriptedReply::Error(error)) => return Err(error),
            None => self.default_reply.read().await.clone(),
        };

        Ok(VisionResponse {
            text,
            usage: VisionUsage {
                prompt_tokens: 10,
                completion_tokens: 10,
            },
            model: "mock-vl".to_string(),
        })
    }
}
