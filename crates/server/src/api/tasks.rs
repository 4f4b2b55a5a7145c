//! Task status and result handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use glimpse_core::{ProcessingMethod, TaskRecord, TaskStatus};

use crate::state::AppState;

use super::envelope::Envelope;
use super::error::ApiError;

// ============================================================================
// Response Types
// ============================================================================

/// Task record as exposed over the API.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub task_id: String,
    pub status: TaskStatus,
    pub message: String,
    pub result: Option<String>,
    pub error: Option<String>,
    pub processing_method: Option<ProcessingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TaskRecord> for TaskView {
    fn from(record: TaskRecord) -> Self {
        Self {
            task_id: record.task_id,
            status: record.status,
            message: record.message,
            result: record.result,
            error: record.error,
            processing_method: record.processing_method,
            graph_error: record.graph_error,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// Response for listing every task.
#[derive(Debug, Serialize)]
pub struct AllTasks {
    pub total_tasks: usize,
    pub results: HashMap<String, TaskView>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the current state of a task.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Envelope<TaskView>>, ApiError> {
    match state.tasks().get(&task_id) {
        Some(record) => Ok(Json(Envelope::success(
            "Query successful",
            TaskView::from(record),
        ))),
        None => Err(ApiError::not_found("Task ID does not exist")),
    }
}

/// Snapshot of every task record.
pub async fn list_results(
    State(state): State<Arc<AppState>>,
) -> Json<Envelope<AllTasks>> {
    let records = state.tasks().list_all();
    let results: HashMap<String, TaskView> = records
        .into_iter()
        .map(|record| (record.task_id.clone(), TaskView::from(record)))
        .collect();

    Json(Envelope::success(
        "Query successful",
        AllTasks {
            total_tasks: results.len(),
            results,
        },
    ))
}

/// Remove a task record.
pub async fn delete_result(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Envelope<serde_json::Value>>, ApiError> {
    if !state.tasks().delete(&task_id) {
        return Err(ApiError::not_found("Task ID does not exist"));
    }

    Ok(Json(Envelope::message_only(format!(
        "Result for task {task_id} deleted"
    ))))
}
