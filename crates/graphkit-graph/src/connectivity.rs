//! Strongly connected components via Kosaraju's two-pass algorithm.
//!
//! Pass 1 walks the whole graph and records nodes in order of finishing.
//! Pass 2 walks a reversed copy, taking roots in decreasing finish order;
//! each walk collects exactly one component.

use crate::search::{Visit, Walker};
use graphkit_core::{Graph, NodeIndex};
use tracing::debug;

/// Returns the strongly connected components of `graph`.
///
/// The components partition the node set: every node appears in exactly
/// one component. Components come out in decreasing order of their root's
/// finish time, which is a topological order of the condensation.
pub fn kosaraju(graph: &Graph) -> Vec<Vec<NodeIndex>> {
    let finish_order = finish_order(graph);

    // Reversed copy keeps slot order, so indexes are shared with `graph`
    let reversed = graph.copy_of(true, None);
    let mut walker = Walker::new(&reversed);
    let mut components = Vec::new();

    for &root in finish_order.iter().rev() {
        if walker.is_visited(root) {
            continue;
        }
        let mut component = Vec::new();
        walker.walk(root, |visit| {
            if let Visit::Discover(node) = visit {
                component.push(node);
            }
        });
        components.push(component);
    }

    debug!(
        nodes = graph.size(),
        components = components.len(),
        "strongly connected components computed"
    );
    components
}

/// Visits every component and returns nodes in increasing finish time.
fn finish_order(graph: &Graph) -> Vec<NodeIndex> {
    let mut walker = Walker::new(graph);
    let mut order = Vec::with_capacity(graph.size());

    for root in graph.node_indices() {
        walker.walk(root, |visit| {
            if let Visit::Finish(node) = visit {
                order.push(node);
            }
        });
    }

    order
}
