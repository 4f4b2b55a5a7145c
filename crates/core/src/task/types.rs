//! Core task data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
///
/// Transitions are forward-only:
/// ```text
/// Pending -> Processing -> Completed
///                 |
///                 v
///              Failed
/// ```
/// Terminal records are never mutated again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Position in the forward-only ordering, for transition checks.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Processing => 1,
            TaskStatus::Completed => 2,
            TaskStatus::Failed => 2,
        }
    }

    /// Returns the status as a string (for metrics labels and logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

/// Which path produced the outcome of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    /// Primary path: the orchestrated analysis workflow.
    Graph,
    /// Secondary path: direct model call after the workflow failed.
    Fallback,
    /// Caller-requested direct call, no orchestration involved.
    Direct,
    /// Neither path produced a result.
    Failed,
}

impl ProcessingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMethod::Graph => "graph",
            ProcessingMethod::Fallback => "fallback",
            ProcessingMethod::Direct => "direct",
            ProcessingMethod::Failed => "failed",
        }
    }
}

/// A tracked image-analysis request.
///
/// Exactly one of `result` / `error` is set once the status is terminal;
/// both are absent (and `processing_method` unset) before that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskRecord {
    /// Unique identifier, never reused within a process lifetime.
    pub task_id: String,

    /// Current status.
    pub status: TaskStatus,

    /// Human-readable progress message.
    pub message: String,

    /// Serialized analysis payload, present iff completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Error message, present iff failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Which path produced the outcome, set at terminal states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_method: Option<ProcessingMethod>,

    /// Primary-path diagnostic retained when the fallback path succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_error: Option<String>,

    /// When the task was created.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
