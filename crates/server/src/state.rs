use std::sync::Arc;

use glimpse_core::{Config, ContentModerator, ImageProcessor, SanitizedConfig, TaskStore};

/// Shared application state
pub struct AppState {
    config: Config,
    tasks: Arc<dyn TaskStore>,
    processor: Arc<ImageProcessor>,
    moderator: Arc<ContentModerator>,
}

impl AppState {
    pub fn new(
        config: Config,
        tasks: Arc<dyn TaskStore>,
        processor: Arc<ImageProcessor>,
        moderator: Arc<ContentModerator>,
    ) -> Self {
        Self {
            config,
            tasks,
            processor,
            moderator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn tasks(&self) -> &dyn TaskStore {
        self.tasks.as_ref()
    }

    pub fn processor(&self) -> &ImageProcessor {
        &self.processor
    }

    pub fn moderator(&self) -> &ContentModerator {
        &self.moderator
    }
}
