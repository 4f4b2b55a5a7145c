//! Structured workflow execution.
//!
//! A small state-graph engine: named async nodes transform a JSON state,
//! connected by edges from [`START`] to [`END`]. Today's workflows are
//! linear chains, but the graph surface keeps multi-step orchestration
//! (extra nodes, reordering) a local change.

mod graph;

pub use graph::{node_fn, CompiledWorkflow, NodeExecutor, NodeState, Workflow, END, START};

use thiserror::Error;

/// Error type for workflow construction and execution.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A node returned an error during execution.
    #[error("Node '{node}' failed: {message}")]
    NodeFailed { node: String, message: String },

    /// The graph failed structural validation.
    #[error("Invalid workflow: {0}")]
    Invalid(String),
}

impl WorkflowError {
    /// Convenience constructor used inside node bodies.
    pub fn node(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NodeFailed {
            node: node.into(),
            message: message.into(),
        }
    }
}
