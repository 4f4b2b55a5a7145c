//! Uniform success envelope for JSON responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Wrapper applied to every successful JSON body.
///
/// `data` serializes as `null` when absent; `error` is carried for shape
/// compatibility and is `null` on the success paths that use the envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> Envelope<T> {
    /// Successful response with a payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl Envelope<serde_json::Value> {
    /// Successful response with no payload (confirmations).
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }
}
