//! Service-level handlers: API info, health, config, metrics.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use glimpse_core::SanitizedConfig;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

use super::envelope::Envelope;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

/// API information for the root path.
pub async fn root() -> Json<Envelope<ApiInfo>> {
    let endpoints = BTreeMap::from([
        ("upload", "/upload-image"),
        ("status", "/status/{task_id}"),
        ("sync_process", "/process-image-sync"),
        ("results", "/results"),
        ("moderate_text", "/moderate-text"),
        ("moderate_image", "/moderate-image"),
        ("moderate_content", "/moderate-content"),
        ("health", "/health"),
        ("config", "/config"),
        ("metrics", "/metrics"),
    ]);

    Json(Envelope::success(
        "API information",
        ApiInfo {
            message: "Image analysis API".to_string(),
            version: VERSION.to_string(),
            endpoints,
        },
    ))
}

/// Liveness check.
pub async fn health() -> Json<Envelope<HealthData>> {
    Json(Envelope::success(
        "Service healthy",
        HealthData {
            status: "healthy".to_string(),
            version: VERSION.to_string(),
        },
    ))
}

/// Current configuration with secrets redacted.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    collect_dynamic_metrics(&state);
    encode_metrics()
}
