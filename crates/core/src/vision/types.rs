//! Request and response types for vision model calls.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::image::ImageFormat;

/// A base64-encoded image ready to be attached to a model request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    base64_data: String,
    format: ImageFormat,
}

impl ImagePayload {
    /// Encode raw image bytes.
    pub fn from_bytes(bytes: &[u8], format: ImageFormat) -> Self {
        Self {
            base64_data: BASE64.encode(bytes),
            format,
        }
    }

    /// Wrap an already-encoded payload.
    pub fn from_base64(base64_data: impl Into<String>, format: ImageFormat) -> Self {
        Self {
            base64_data: base64_data.into(),
            format,
        }
    }

    /// The `data:` URI embedded in chat-completion image parts.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.base64_data)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The raw base64 payload, without the data-URI prefix.
    pub fn base64_data(&self) -> &str {
        &self.base64_data
    }
}

/// Request for a model completion.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// System prompt (instructions for the model)
    pub system: Option<String>,
    /// User message text
    pub prompt: String,
    /// Optional image attachment
    pub image: Option<ImagePayload>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic)
    pub temperature: f32,
}

impl VisionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            image: None,
            max_tokens: 1024,
            temperature: 0.3,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Response from a model completion.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// The generated text
    pub text: String,
    /// Token usage
    pub usage: VisionUsage,
    /// Model that answered
    pub model: String,
}
