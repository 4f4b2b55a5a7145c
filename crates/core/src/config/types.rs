use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub vision: VisionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Vision-language model endpoint configuration.
///
/// The endpoint speaks the OpenAI chat-completion protocol. The API key is
/// normally supplied through the environment rather than the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisionConfig {
    /// Base URL of the chat-completion endpoint (e.g. "https://api.example.com/v1")
    pub base_url: String,
    /// Model name (e.g. "qwen3-vl-plus")
    pub model: String,
    /// API key for bearer authentication
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_vision_timeout")]
    pub timeout_secs: u64,
    /// Sampling temperature for analysis requests
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_vision_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

/// Upload size limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum accepted upload size for async processing (default: 10 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Maximum accepted upload size for the blocking endpoint (default: 5 MiB)
    #[serde(default = "default_max_sync_upload_bytes")]
    pub max_sync_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            max_sync_upload_bytes: default_max_sync_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_sync_upload_bytes() -> usize {
    5 * 1024 * 1024
}

/// Task store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TasksConfig {
    /// Maximum number of task records kept in memory. When an insert would
    /// exceed the cap, the oldest terminal records are evicted first;
    /// records still pending or processing are never evicted.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
        }
    }
}

fn default_max_records() -> usize {
    1000
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub vision: SanitizedVisionConfig,
    pub limits: LimitsConfig,
    pub tasks: TasksConfig,
}

/// Sanitized vision config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedVisionConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            vision: SanitizedVisionConfig {
                base_url: config.vision.base_url.clone(),
                model: config.vision.model.clone(),
                api_key_configured: config
                    .vision
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                timeout_secs: config.vision.timeout_secs,
            },
            limits: config.limits.clone(),
            tasks: config.tasks.clone(),
        }
    }
}
