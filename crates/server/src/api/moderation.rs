//! Content moderation handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;

use glimpse_core::{ContentReport, ImagePayload, ModerationError, ModerationVerdict};

use crate::metrics::MODERATION_VERDICTS_TOTAL;
use crate::state::AppState;

use super::envelope::Envelope;
use super::error::ApiError;
use super::images::{detect_format, ensure_size, extract_file, Upload};

// ============================================================================
// Request Types
// ============================================================================

/// Request body for text moderation.
#[derive(Debug, Deserialize)]
pub struct ModerateTextBody {
    pub text_content: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Moderate a piece of text.
pub async fn moderate_text(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ModerateTextBody>,
) -> Json<Envelope<ModerationVerdict>> {
    let verdict = state.moderator().moderate_text(&body.text_content).await;
    record_verdict("text", &verdict);

    Json(Envelope::success("Text moderation complete", verdict))
}

/// Moderate an uploaded image.
pub async fn moderate_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<ModerationVerdict>>, ApiError> {
    let upload = extract_file(&mut multipart).await?;
    let image = validated_image(&state, &upload)?;

    let verdict = state.moderator().moderate_image(image).await;
    record_verdict("image", &verdict);

    Ok(Json(Envelope::success("Image moderation complete", verdict)))
}

/// Moderate text and/or an image together.
///
/// The multipart body may carry a `text_content` field, a `file` field, or
/// both; at least one is required.
pub async fn moderate_content(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<ContentReport>>, ApiError> {
    let mut text: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("text_content") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read text: {e}")))?;
                text = Some(value);
            }
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
                upload = Some(Upload {
                    bytes: bytes.to_vec(),
                    content_type,
                    filename,
                });
            }
            _ => {}
        }
    }

    let image = match &upload {
        Some(upload) => Some(validated_image(&state, upload)?),
        None => None,
    };

    let report = state
        .moderator()
        .moderate_content(text.as_deref(), image)
        .await
        .map_err(|e| match e {
            ModerationError::NoContent => {
                ApiError::bad_request("Provide text_content, a file, or both")
            }
        })?;

    MODERATION_VERDICTS_TOTAL
        .with_label_values(&["content", if report.overall_safe { "safe" } else { "flagged" }])
        .inc();

    Ok(Json(Envelope::success(
        "Content moderation complete",
        report,
    )))
}

fn validated_image(state: &AppState, upload: &Upload) -> Result<ImagePayload, ApiError> {
    let format = detect_format(upload)?;
    let max_bytes = state.config().limits.max_upload_bytes;
    ensure_size(
        upload.bytes.len(),
        max_bytes,
        format!(
            "File size cannot exceed {} MB",
            max_bytes / (1024 * 1024)
        ),
    )?;
    Ok(ImagePayload::from_bytes(&upload.bytes, format))
}

fn record_verdict(kind: &str, verdict: &ModerationVerdict) {
    MODERATION_VERDICTS_TOTAL
        .with_label_values(&[kind, if verdict.is_safe { "safe" } else { "flagged" }])
        .inc();
}
