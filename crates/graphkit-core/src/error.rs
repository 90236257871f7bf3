//! Error types for graph construction and algorithm queries.

use crate::graph::NodeId;
use thiserror::Error;

/// Errors surfaced by the graph model and the algorithms built on it.
///
/// Every error is returned synchronously with no partial result attached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// An argument was unusable: an unknown node id, or a request that
    /// makes no sense for the given graph.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A topological order was requested on a graph with a directed cycle.
    #[error("graph contains a directed cycle")]
    CycleDetected,

    /// Bellman-Ford found a negative-weight cycle reachable from the source.
    #[error("graph contains a negative-weight cycle reachable from the source")]
    NegativeCycle,
}

impl GraphError {
    /// Creates an error for a node id that is not present in the graph.
    pub fn unknown_node(id: NodeId) -> Self {
        GraphError::InvalidArgument(format!("unknown node id {}", id))
    }

    /// Creates an invalid-argument error from any message.
    pub fn invalid(message: impl Into<String>) -> Self {
        GraphError::InvalidArgument(message.into())
    }
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_node_message() {
        let err = GraphError::unknown_node(42);
        assert_eq!(err.to_string(), "invalid argument: unknown node id 42");
    }
}
