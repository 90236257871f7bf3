//! Maximum flow via Edmonds-Karp (BFS-based Ford-Fulkerson).
//!
//! The input graph is never touched. Flow is pushed on a working copy in
//! which input edge `i` keeps slot `i` and its residual twin sits at slot
//! `i + m` (`m` = input edge count), so pairing a hop with its twin is
//! index arithmetic rather than a shared reference.

use crate::search;
use graphkit_core::{EdgeIndex, Graph, GraphError, NodeIndex, Result};
use petgraph::visit::EdgeRef;
use tracing::debug;

/// Outcome of a maximum-flow computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxFlow {
    /// Net flow leaving the source.
    pub value: i64,
    /// Flow on every input edge, indexed by the input's edge slot.
    pub edge_flows: Vec<i64>,
    /// Number of augmenting paths used.
    pub augmentations: usize,
}

impl MaxFlow {
    /// Flow carried by an input edge.
    pub fn flow_on(&self, edge: EdgeIndex) -> i64 {
        self.edge_flows.get(edge.index()).copied().unwrap_or(0)
    }
}

/// Working graph holding every input edge plus a zero-capacity twin.
struct ResidualNetwork {
    graph: Graph,
    forward_edges: usize,
}

impl ResidualNetwork {
    fn build(input: &Graph) -> Self {
        let mut graph = input.copy_of(false, None);
        let twins = input.copy_of(true, Some(0.0));

        for edge_ref in twins.edge_references() {
            graph.add_parallel_edge(edge_ref.source(), edge_ref.target(), *edge_ref.weight());
        }

        Self {
            graph,
            forward_edges: input.edge_count(),
        }
    }

    fn twin(&self, edge: EdgeIndex) -> EdgeIndex {
        if edge.index() < self.forward_edges {
            EdgeIndex::new(edge.index() + self.forward_edges)
        } else {
            EdgeIndex::new(edge.index() - self.forward_edges)
        }
    }

    /// Pushes `amount` along `edge` and takes it back from its twin.
    fn push(&mut self, edge: EdgeIndex, amount: i64) -> Result<()> {
        let twin = self.twin(edge);
        let forward = self.graph.edge(edge).flow.checked_add(amount);
        let backward = self.graph.edge(twin).flow.checked_sub(amount);

        match (forward, backward) {
            (Some(forward), Some(backward)) => {
                self.graph.edge_mut(edge).flow = forward;
                self.graph.edge_mut(twin).flow = backward;
                Ok(())
            }
            _ => Err(overflow()),
        }
    }
}

fn overflow() -> GraphError {
    GraphError::invalid("flow overflows i64")
}

/// Maximum flow from `src` to `tgt`.
///
/// Capacities are edge weights truncated to integers. Each round takes the
/// shortest augmenting path (by edge count) in the residual network and
/// pushes its bottleneck.
///
/// # Errors
///
/// Returns [`GraphError::InvalidArgument`] if `src == tgt`, or if the flow
/// value does not fit in an `i64`.
pub fn edmonds_karp(graph: &Graph, src: NodeIndex, tgt: NodeIndex) -> Result<MaxFlow> {
    if src == tgt {
        return Err(GraphError::invalid("source and sink must be different nodes"));
    }

    let mut network = ResidualNetwork::build(graph);
    let mut augmentations = 0;

    while let Some(path) = search::bfs_edges(&network.graph, src, tgt, true) {
        let bottleneck = path
            .iter()
            .map(|&edge| network.graph.edge(edge).residual())
            .min()
            .unwrap_or(0);
        if bottleneck <= 0 {
            break;
        }

        for &edge in &path {
            network.push(edge, bottleneck)?;
        }
        augmentations += 1;
        debug!(augmentations, bottleneck, hops = path.len(), "augmented flow");
    }

    let value = network
        .graph
        .out_edges(src)
        .try_fold(0_i64, |total, edge_ref| total.checked_add(edge_ref.weight().flow))
        .ok_or_else(overflow)?;

    let edge_flows = (0..network.forward_edges)
        .map(|slot| network.graph.edge(EdgeIndex::new(slot)).flow)
        .collect();

    debug!(value, augmentations, "max flow computed");
    Ok(MaxFlow {
        value,
        edge_flows,
        augmentations,
    })
}
