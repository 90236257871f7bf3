//! Core graph data structure.
//!
//! `Graph` wraps a petgraph arena and adds an index from caller ids to
//! arena slots. Nodes and edges are addressed by `NodeIndex`/`EdgeIndex`;
//! adjacency is the arena's per-node edge list, so there are no
//! back-references to keep alive.

use crate::edge::{Edge, EdgeRecord, Node};
use crate::error::{GraphError, Result};
use petgraph::graph::{DiGraph, EdgeReference};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::trace;

pub use petgraph::graph::{EdgeIndex, NodeIndex};

/// Caller-defined node identifier.
pub type NodeId = i64;

/// A directed, weighted graph keyed by integer ids.
///
/// Invariant: both endpoints of every edge are nodes of the same graph.
/// The arena guarantees this since edges are only ever created between
/// existing node slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredGraph")]
pub struct Graph {
    /// The underlying petgraph arena.
    graph: DiGraph<Node, Edge>,

    /// Maps caller ids to arena slots. Derived from the arena, never stored.
    #[serde(skip)]
    id_index: HashMap<NodeId, NodeIndex>,
}

/// On-disk form of a graph: the arena alone.
#[derive(Deserialize)]
struct StoredGraph {
    graph: DiGraph<Node, Edge>,
}

impl TryFrom<StoredGraph> for Graph {
    type Error = GraphError;

    /// Rebuilds the id index, rejecting arenas that repeat an id.
    fn try_from(stored: StoredGraph) -> Result<Self> {
        let mut id_index = HashMap::with_capacity(stored.graph.node_count());
        for index in stored.graph.node_indices() {
            let id = stored.graph[index].id;
            if id_index.insert(id, index).is_some() {
                return Err(GraphError::invalid(format!("duplicate node id {}", id)));
            }
        }

        Ok(Self {
            graph: stored.graph,
            id_index,
        })
    }
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given id, or returns the existing one.
    pub fn add_node(&mut self, id: NodeId) -> NodeIndex {
        if let Some(&index) = self.id_index.get(&id) {
            return index;
        }
        let index = self.graph.add_node(Node::new(id));
        self.id_index.insert(id, index);
        index
    }

    /// Adds an edge `src -> tgt`, creating missing endpoints.
    ///
    /// Adding the same `(src, tgt, weight)` triple twice returns the edge
    /// created the first time. Edges between the same pair with a different
    /// weight are kept side by side as parallel edges.
    pub fn add_edge(&mut self, src: NodeId, tgt: NodeId, weight: f64) -> EdgeIndex {
        let source = self.add_node(src);
        let target = self.add_node(tgt);

        let existing = self
            .graph
            .edges_connecting(source, target)
            .find(|edge_ref| edge_ref.weight().weight == weight)
            .map(|edge_ref| edge_ref.id());

        match existing {
            Some(index) => index,
            None => self.graph.add_edge(source, target, Edge::new(weight)),
        }
    }

    /// Inserts an edge between two existing slots without the duplicate check.
    ///
    /// Used to build residual twins, where an edge and its counterpart must
    /// have distinct indexes even if an identical edge already exists.
    pub fn add_parallel_edge(&mut self, source: NodeIndex, target: NodeIndex, edge: Edge) -> EdgeIndex {
        self.graph.add_edge(source, target, edge)
    }

    /// Returns a snapshot of every node id.
    ///
    /// The vector is owned by the caller; changing it never touches the graph.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.graph.node_weights().map(|node| node.id).collect()
    }

    /// Gets the arena slot for a node id.
    pub fn node_by_id(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Gets the arena slot for a node id, failing if the id is unknown.
    pub fn require(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_by_id(id).ok_or_else(|| GraphError::unknown_node(id))
    }

    /// Gets the caller id stored in a slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this graph.
    pub fn id_of(&self, index: NodeIndex) -> NodeId {
        self.graph[index].id
    }

    /// Returns true if at least one edge runs from `src` to `tgt`.
    pub fn contains_edge(&self, src: NodeId, tgt: NodeId) -> bool {
        match (self.node_by_id(src), self.node_by_id(tgt)) {
            (Some(source), Some(target)) => self.graph.contains_edge(source, target),
            _ => false,
        }
    }

    /// Returns the number of nodes.
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterates over all node slots in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Iterates over all edge slots in insertion order.
    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    /// Gets an edge payload.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this graph.
    pub fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.graph[index]
    }

    /// Gets a mutable edge payload.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this graph.
    pub fn edge_mut(&mut self, index: EdgeIndex) -> &mut Edge {
        &mut self.graph[index]
    }

    /// Returns the `(source, target)` slots of an edge.
    pub fn endpoints(&self, index: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(index)
    }

    /// Iterates over the edges leaving a node, in no particular order.
    pub fn out_edges(&self, index: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, Edge>> {
        self.graph.edges_directed(index, Direction::Outgoing)
    }

    /// Iterates over every edge with its endpoints.
    pub fn edge_references(&self) -> impl Iterator<Item = EdgeReference<'_, Edge>> {
        self.graph.edge_references()
    }

    /// Returns the distinct successors of a node.
    ///
    /// Parallel edges collapse to a single neighbour. Linear in the node's
    /// out-degree.
    pub fn neighbors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        let mut neighbors = Vec::new();
        for edge_ref in self.out_edges(index) {
            if seen.insert(edge_ref.target()) {
                neighbors.push(edge_ref.target());
            }
        }
        neighbors
    }

    /// Number of edges leaving a node.
    pub fn out_degree(&self, index: NodeIndex) -> usize {
        self.graph.edges_directed(index, Direction::Outgoing).count()
    }

    /// Number of edges entering a node.
    pub fn in_degree(&self, index: NodeIndex) -> usize {
        self.graph.edges_directed(index, Direction::Incoming).count()
    }

    /// Builds a structurally independent copy.
    ///
    /// Node and edge slots keep their order, so slot `i` of the copy holds
    /// the same id as slot `i` of `self`. With `reverse` every edge is
    /// flipped; with `forced_weight` every weight is replaced by that
    /// constant. Flow is reset to zero on every copied edge.
    pub fn copy_of(&self, reverse: bool, forced_weight: Option<f64>) -> Graph {
        let mut copy = Graph::new();

        for node in self.graph.node_weights() {
            copy.add_node(node.id);
        }

        for edge_ref in self.graph.edge_references() {
            let (source, target) = if reverse {
                (edge_ref.target(), edge_ref.source())
            } else {
                (edge_ref.source(), edge_ref.target())
            };
            let weight = forced_weight.unwrap_or(edge_ref.weight().weight);
            copy.add_parallel_edge(source, target, Edge::new(weight));
        }

        trace!(
            nodes = copy.size(),
            edges = copy.edge_count(),
            reverse,
            "copied graph"
        );

        copy
    }

    /// Returns all edges with source and target ids for export.
    pub fn export_edges(&self) -> Vec<EdgeRecord> {
        self.graph
            .edge_references()
            .map(|edge_ref| EdgeRecord {
                source: self.id_of(edge_ref.source()),
                target: self.id_of(edge_ref.target()),
                weight: edge_ref.weight().weight,
            })
            .collect()
    }
}

/// Graph statistics for the stats command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Nodes with no outgoing edge.
    pub sinks: usize,
    /// Nodes with no incoming edge.
    pub sources: usize,
}

impl Graph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.size(),
            edge_count: self.edge_count(),
            sinks: self
                .node_indices()
                .filter(|&index| self.out_degree(index) == 0)
                .count(),
            sources: self
                .node_indices()
                .filter(|&index| self.in_degree(index) == 0)
                .count(),
        }
    }
}
