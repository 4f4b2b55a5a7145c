use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, images, middleware::metrics_middleware, moderation, tasks};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Leave headroom above the application limit so oversized uploads reach
    // the handler's own size check (and its 400) instead of a framework 413.
    let body_limit = state.config().limits.max_upload_bytes * 2 + 1024 * 1024;

    Router::new()
        // Service info
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Image analysis
        .route("/upload-image", post(images::upload_image))
        .route("/process-image-sync", post(images::process_image_sync))
        // Task tracking
        .route("/status/{task_id}", get(tasks::get_status))
        .route("/results", get(tasks::list_results))
        .route("/results/{task_id}", delete(tasks::delete_result))
        // Content moderation
        .route("/moderate-text", post(moderation::moderate_text))
        .route("/moderate-image", post(moderation::moderate_image))
        .route("/moderate-content", post(moderation::moderate_content))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
