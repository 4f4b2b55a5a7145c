//! Image upload and processing handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use glimpse_core::{
    ImageFormat, ImagePayload, ProcessingMethod, TaskStatus, TaskUpdate,
};

use crate::metrics::{ANALYSES_BY_METHOD, TASKS_CREATED_TOTAL, TASKS_FAILED_TOTAL};
use crate::state::AppState;

use super::envelope::Envelope;
use super::error::ApiError;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response data for an accepted upload.
#[derive(Debug, Serialize)]
pub struct TaskAccepted {
    pub task_id: String,
    pub status: TaskStatus,
    pub message: String,
}

/// Response data for the synchronous endpoint.
#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub analysis_result: String,
    pub processing_method: ProcessingMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_error: Option<String>,
}

/// Query parameters for the synchronous endpoint.
#[derive(Debug, Deserialize)]
pub struct SyncParams {
    /// Skip the workflow and call the model directly.
    #[serde(default)]
    pub direct: bool,
}

/// One uploaded file pulled out of a multipart body.
pub(crate) struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

// ============================================================================
// Multipart helpers
// ============================================================================

/// Pull the `file` field out of a multipart body.
pub(crate) async fn extract_file(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;

        return Ok(Upload {
            bytes: bytes.to_vec(),
            content_type,
            filename,
        });
    }

    Err(ApiError::bad_request("No file uploaded"))
}

/// Determine the image format from the declared content type, falling back
/// to the filename extension.
pub(crate) fn detect_format(upload: &Upload) -> Result<ImageFormat, ApiError> {
    upload
        .content_type
        .as_deref()
        .and_then(ImageFormat::from_content_type)
        .or_else(|| {
            upload
                .filename
                .as_deref()
                .and_then(ImageFormat::from_filename)
        })
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "Unsupported image format. Supported formats: {}",
                ImageFormat::supported_types()
            ))
        })
}

/// Reject uploads over the given limit before any processing begins.
pub(crate) fn ensure_size(len: usize, max_bytes: usize, detail: String) -> Result<(), ApiError> {
    if len > max_bytes {
        return Err(ApiError::bad_request(detail));
    }
    Ok(())
}

fn mib(bytes: usize) -> usize {
    bytes / (1024 * 1024)
}

// ============================================================================
// Handlers
// ============================================================================

/// Accept an image and process it in the background.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<TaskAccepted>>, ApiError> {
    let upload = extract_file(&mut multipart).await?;
    let format = detect_format(&upload)?;
    ensure_size(
        upload.bytes.len(),
        state.config().limits.max_upload_bytes,
        format!(
            "File size cannot exceed {} MB",
            mib(state.config().limits.max_upload_bytes)
        ),
    )?;

    let image = ImagePayload::from_bytes(&upload.bytes, format);

    let record = state.tasks().create();
    TASKS_CREATED_TOTAL.inc();
    info!(task_id = %record.task_id, size = upload.bytes.len(), "image accepted for processing");

    let task_id = record.task_id.clone();
    tokio::spawn(process_image_background(
        Arc::clone(&state),
        task_id.clone(),
        image,
    ));

    let message = "Image uploaded, processing started";
    Ok(Json(Envelope::success(
        message,
        TaskAccepted {
            task_id,
            status: TaskStatus::Processing,
            message: message.to_string(),
        },
    )))
}

/// Process an image while the caller waits.
pub async fn process_image_sync(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SyncParams>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<SyncResult>>, ApiError> {
    let upload = extract_file(&mut multipart).await?;
    let format = detect_format(&upload)?;
    let max_bytes = state.config().limits.max_sync_upload_bytes;
    ensure_size(
        upload.bytes.len(),
        max_bytes,
        format!(
            "Synchronous processing accepts at most {} MB, use /upload-image for larger files",
            mib(max_bytes)
        ),
    )?;

    let image = ImagePayload::from_bytes(&upload.bytes, format);

    let outcome = if params.direct {
        state.processor().process_direct(image).await
    } else {
        state.processor().process(image).await
    }
    .map_err(|e| ApiError::internal(format!("Image processing failed: {e}")))?;

    ANALYSES_BY_METHOD
        .with_label_values(&[outcome.method.as_str()])
        .inc();

    let message = match outcome.method {
        ProcessingMethod::Fallback => "Image processed (fallback)",
        _ => "Image processed",
    };

    Ok(Json(Envelope::success(
        message,
        SyncResult {
            analysis_result: outcome.analysis,
            processing_method: outcome.method,
            graph_error: outcome.graph_error,
        },
    )))
}

/// Background unit of work: run the pipeline and record the outcome.
///
/// Never returns an error; every failure ends up in the task record so the
/// serving process is unaffected.
async fn process_image_background(state: Arc<AppState>, task_id: String, image: ImagePayload) {
    if let Err(e) = state
        .tasks()
        .update(&task_id, TaskUpdate::processing("Image is being processed"))
    {
        error!(task_id = %task_id, error = %e, "failed to mark task as processing");
        return;
    }

    match state.processor().process(image).await {
        Ok(outcome) => {
            ANALYSES_BY_METHOD
                .with_label_values(&[outcome.method.as_str()])
                .inc();

            let message = match outcome.method {
                ProcessingMethod::Fallback => "Image processed (fallback)",
                _ => "Image processed (graph)",
            };
            let mut update = TaskUpdate::completed(message, outcome.analysis, outcome.method);
            if let Some(graph_error) = outcome.graph_error {
                update = update.with_graph_error(graph_error);
            }

            if let Err(e) = state.tasks().update(&task_id, update) {
                error!(task_id = %task_id, error = %e, "failed to record task completion");
            }
        }
        Err(e) => {
            TASKS_FAILED_TOTAL.inc();
            error!(task_id = %task_id, error = %e, "image processing failed");
            if let Err(store_err) = state
                .tasks()
                .update(
                    &task_id,
                    TaskUpdate::failed("Image processing failed", e.to_string()),
                )
            {
                error!(task_id = %task_id, error = %store_err, "failed to record task failure");
            }
        }
    }
}
