//! Node and edge payloads stored in the graph arena.
//!
//! Both are plain values. Endpoints live in the arena's edge table, so an
//! edge never holds a reference to a node.

use crate::graph::NodeId;
use serde::{Deserialize, Serialize};

/// A vertex. The id is fixed for the node's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Caller-defined identifier, unique within a graph.
    pub id: NodeId,
}

impl Node {
    /// Creates a node with the given id.
    pub fn new(id: NodeId) -> Self {
        Self { id }
    }
}

/// A directed, weighted edge.
///
/// `weight` is read as a capacity, a rating or a distance depending on the
/// algorithm. `flow` starts at zero and only changes on the working copy
/// that max-flow builds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Capacity, rating or distance.
    pub weight: f64,

    /// Units of flow currently pushed along this edge.
    pub flow: i64,
}

impl Edge {
    /// Creates an edge carrying no flow.
    pub fn new(weight: f64) -> Self {
        Self { weight, flow: 0 }
    }

    /// Integral capacity of the edge. Fractional weights are truncated.
    pub fn capacity(&self) -> i64 {
        self.weight.trunc() as i64
    }

    /// Remaining capacity: `capacity - flow`.
    pub fn residual(&self) -> i64 {
        self.capacity() - self.flow
    }
}

/// A flat edge record for export and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_truncates_fractional_capacity() {
        let mut edge = Edge::new(3.7);
        assert_eq!(edge.capacity(), 3);
        assert_eq!(edge.residual(), 3);

        edge.flow = 2;
        assert_eq!(edge.residual(), 1);

        // Reverse twins may carry negative flow
        edge.flow = -4;
        assert_eq!(edge.residual(), 7);
    }

    #[test]
    fn test_sub_unit_capacity_has_no_residual() {
        let edge = Edge::new(0.5);
        assert_eq!(edge.residual(), 0);
    }
}
