//! Workflow graph construction and execution.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::WorkflowError;

/// Entry marker: the first edge of every workflow leaves from here.
pub const START: &str = "__start__";

/// Exit marker: execution stops when an edge reaches here.
pub const END: &str = "__end__";

/// State passed between nodes.
pub type NodeState = serde_json::Value;

/// A node body: consumes the current state, produces the next one.
pub type NodeExecutor =
    Arc<dyn Fn(NodeState) -> BoxFuture<'static, Result<NodeState, WorkflowError>> + Send + Sync>;

/// Wrap an async closure as a [`NodeExecutor`].
pub fn node_fn<F, Fut>(f: F) -> NodeExecutor
where
    F: Fn(NodeState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<NodeState, WorkflowError>> + Send + 'static,
{
    Arc::new(move |state| Box::pin(f(state)))
}

/// Builder for a workflow graph.
#[derive(Default)]
pub struct Workflow {
    nodes: HashMap<String, NodeExecutor>,
    edges: HashMap<String, String>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named node. Re-registering a name replaces the executor.
    pub fn add_node(mut self, name: impl Into<String>, executor: NodeExecutor) -> Self {
        self.nodes.insert(name.into(), executor);
        self
    }

    /// Connect `from` to `to`. Each node has a single outgoing edge.
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.insert(from.into(), to.into());
        self
    }

    /// Validate the graph and freeze it into an executable form.
    ///
    /// Checks that every edge endpoint is a known node (or START/END), that
    /// the path from START terminates at END, and that no registered node is
    /// unreachable.
    pub fn compile(self) -> Result<CompiledWorkflow, WorkflowError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(WorkflowError::Invalid(format!("unknown edge source '{from}'")));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(WorkflowError::Invalid(format!("unknown edge target '{to}'")));
            }
        }

        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut current = START.to_string();

        loop {
            let next = self
                .edges
                .get(&current)
                .ok_or_else(|| WorkflowError::Invalid(format!("no edge out of '{current}'")))?
                .clone();

            if next == END {
                break;
            }
            if !visited.insert(next.clone()) {
                return Err(WorkflowError::Invalid(format!("cycle through '{next}'")));
            }
            order.push(next.clone());
            current = next;
        }

        if order.is_empty() {
            return Err(WorkflowError::Invalid("workflow has no nodes".to_string()));
        }
        if visited.len() != self.nodes.len() {
            let orphan = self
                .nodes
                .keys()
                .find(|name| !visited.contains(*name))
                .cloned()
                .unwrap_or_default();
            return Err(WorkflowError::Invalid(format!("unreachable node '{orphan}'")));
        }

        Ok(CompiledWorkflow {
            nodes: self.nodes,
            order,
        })
    }
}

/// A validated, executable workflow.
pub struct CompiledWorkflow {
    nodes: HashMap<String, NodeExecutor>,
    order: Vec<String>,
}

impl CompiledWorkflow {
    /// Execute the nodes in edge order, threading the state through.
    pub async fn run(&self, state: NodeState) -> Result<NodeState, WorkflowError> {
        let mut state = state;
        for name in &self.order {
            // order only contains validated node names
            let executor = &self.nodes[name];
            state = executor(state).await?;
        }
        Ok(state)
    }

    /// Node names in execution order.
    pub fn node_order(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn passthrough() -> NodeExecutor {
        node_fn(|state| async move { Ok(state) })
    }

    #[test]
    fn test_compile_linear_chain() {
        let workflow = Workflow::new()
            .add_node("a", passthrough())
            .add_node("b", passthrough())
            .add_edge(START, "a")
            .add_edge("a", "b")
            .add_edge("b", END)
            .compile()
            .unwrap();

        assert_eq!(workflow.node_order(), ["a", "b"]);
    }

    #[test]
    fn test_compile_rejects_missing_start_edge() {
        let result = Workflow::new()
            .add_node("a", passthrough())
            .add_edge("a", END)
            .compile();
        assert!(matches!(result, Err(WorkflowError::Invalid(_))));
    }

    #[test]
    fn test_compile_rejects_dangling_edge() {
        let result = Workflow::new()
            .add_node("a", passthrough())
            .add_edge(START, "a")
            .add_edge("a", "ghost")
            .compile();
        assert!(matches!(result, Err(WorkflowError::Invalid(_))));
    }

    #[test]
    fn test_compile_rejects_unreachable_node() {
        let result = Workflow::new()
            .add_node("a", passthrough())
            .add_node("island", passthrough())
            .add_edge(START, "a")
            .add_edge("a", END)
            .compile();
        let err = result.err().unwrap();
        assert!(err.to_string().contains("island"));
    }

    #[test]
    fn test_compile_rejects_cycle() {
        let result = Workflow::new()
            .add_node("a", passthrough())
            .add_node("b", passthrough())
            .add_edge(START, "a")
            .add_edge("a", "b")
            .add_edge("b", "a")
            .compile();
        assert!(matches!(result, Err(WorkflowError::Invalid(_))));
    }

    #[test]
    fn test_compile_rejects_empty_workflow() {
        let result = Workflow::new().add_edge(START, END).compile();
        assert!(matches!(result, Err(WorkflowError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_run_threads_state_through_nodes() {
        let workflow = Workflow::new()
            .add_node(
                "double",
                node_fn(|state| async move {
                    let n = state["n"].as_i64().unwrap_or(0);
                    Ok(json!({ "n": n * 2 }))
                }),
            )
            .add_node(
                "add_one",
                node_fn(|state| async move {
                    let n = state["n"].as_i64().unwrap_or(0);
                    Ok(json!({ "n": n + 1 }))
                }),
            )
            .add_edge(START, "double")
            .add_edge("double", "add_one")
            .add_edge("add_one", END)
            .compile()
            .unwrap();

        let out = workflow.run(json!({ "n": 20 })).await.unwrap();
        assert_eq!(out["n"], 41);
    }

    #[tokio::test]
    async fn test_run_surfaces_node_failure() {
        let workflow = Workflow::new()
            .add_node(
                "boom",
                node_fn(|_state| async move {
                    Err(WorkflowError::node("boom", "deliberate failure"))
                }),
            )
            .add_edge(START, "boom")
            .add_edge("boom", END)
            .compile()
            .unwrap();

        let err = workflow.run(json!({})).await.err().unwrap();
        assert!(err.to_string().contains("boom"));
        assert!(err.to_string().contains("deliberate failure"));
    }
}
