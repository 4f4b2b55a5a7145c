//! Task storage trait and update types.

use thiserror::Error;

use crate::task::{ProcessingMethod, TaskRecord, TaskStatus};

/// Error type for task store operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task not found.
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Rejected status transition.
    #[error("Cannot move task {task_id} from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: &'static str,
        to: &'static str,
    },
}

/// Partial update applied to a stored task record.
///
/// Only the listed fields are touched; everything else keeps its current
/// value. `updated_at` is refreshed by the store on every successful update.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub message: Option<String>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub processing_method: Option<ProcessingMethod>,
    pub graph_error: Option<String>,
}

impl TaskUpdate {
    /// Update that marks the task as running.
    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Processing),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Update that completes the task with an analysis result.
    pub fn completed(
        message: impl Into<String>,
        result: impl Into<String>,
        method: ProcessingMethod,
    ) -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            message: Some(message.into()),
            result: Some(result.into()),
            processing_method: Some(method),
            ..Default::default()
        }
    }

    /// Update that fails the task.
    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Failed),
            message: Some(message.into()),
            error: Some(error.into()),
            processing_method: Some(ProcessingMethod::Failed),
            ..Default::default()
        }
    }

    /// Attach the primary-path diagnostic (fallback outcomes).
    pub fn with_graph_error(mut self, graph_error: impl Into<String>) -> Self {
        self.graph_error = Some(graph_error.into());
        self
    }
}

/// Trait for task storage backends.
pub trait TaskStore: Send + Sync {
    /// Allocate a fresh task id and insert a pending record.
    fn create(&self) -> TaskRecord;

    /// Get a task by id.
    fn get(&self, id: &str) -> Option<TaskRecord>;

    /// Apply a partial update to a task.
    ///
    /// Backward status transitions and any mutation of a terminal record are
    /// rejected with [`TaskError::InvalidTransition`].
    fn update(&self, id: &str, update: TaskUpdate) -> Result<TaskRecord, TaskError>;

    /// Remove a task. Returns whether anything was removed.
    fn delete(&self, id: &str) -> bool;

    /// Snapshot of all records at call time.
    fn list_all(&self) -> Vec<TaskRecord>;

    /// Number of records currently stored.
    fn len(&self) -> usize;

    /// Returns true if the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
