pub mod config;
pub mod image;
pub mod moderation;
pub mod pipeline;
pub mod task;
pub mod testing;
pub mod vision;
pub mod workflow;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LimitsConfig,
    SanitizedConfig, ServerConfig, TasksConfig, VisionConfig,
};
pub use image::ImageFormat;
pub use moderation::{
    ContentModerator, ContentReport, ModerationError, ModerationVerdict, RiskLevel,
};
pub use pipeline::{ImageProcessor, ProcessOutcome};
pub use task::{
    MemoryTaskStore, ProcessingMethod, TaskError, TaskRecord, TaskStatus, TaskStore, TaskUpdate,
};
pub use vision::{ImagePayload, OpenAiCompatClient, VisionClient, VisionError, VisionRequest};
