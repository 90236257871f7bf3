//! Id-based entry points.
//!
//! Every function here takes and returns caller-defined [`NodeId`]s, checks
//! that referenced ids exist, and delegates to the slot-based algorithm
//! modules. Arena indexes never leak out of this module.

use crate::centrality::{self, PairCounting};
use crate::connectivity;
use crate::flow;
use crate::ranking::{self, PageRankConfig};
use crate::search::{self, TimeStamps};
use graphkit_core::{Graph, NodeId, NodeIndex, Result};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Flow carried by one input edge after a max-flow run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeFlow {
    pub source: NodeId,
    pub target: NodeId,
    /// Integral capacity (truncated weight).
    pub capacity: i64,
    pub flow: i64,
}

/// Maximum flow value with the flow on every input edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAssignment {
    /// Net flow leaving the source.
    pub value: i64,
    pub edges: Vec<EdgeFlow>,
}

/// PageRank scores keyed by id, with convergence details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRankReport {
    pub scores: HashMap<NodeId, f64>,
    pub iterations: usize,
    pub converged: bool,
}

fn to_ids(graph: &Graph, nodes: &[NodeIndex]) -> Vec<NodeId> {
    nodes.iter().map(|&node| graph.id_of(node)).collect()
}

fn keyed_by_id<V>(graph: &Graph, by_index: HashMap<NodeIndex, V>) -> HashMap<NodeId, V> {
    by_index
        .into_iter()
        .map(|(node, value)| (graph.id_of(node), value))
        .collect()
}

/// Shortest path by edge count from `src` to `tgt`, as ids.
///
/// With `flow_mode` only edges with positive residual capacity are
/// followed. An unreachable target yields an empty list.
pub fn bfs(graph: &Graph, src: NodeId, tgt: NodeId, flow_mode: bool) -> Result<Vec<NodeId>> {
    let src = graph.require(src)?;
    let tgt = graph.require(tgt)?;
    Ok(to_ids(graph, &search::bfs(graph, src, tgt, flow_mode)))
}

/// DFS timestamps for nodes reachable from `src`.
pub fn dfs_tree(graph: &Graph, src: NodeId) -> Result<HashMap<NodeId, TimeStamps>> {
    let src = graph.require(src)?;
    Ok(keyed_by_id(graph, search::dfs_tree(graph, src)))
}

/// DFS timestamps for every node, starting at `src`.
pub fn dfs_forest(graph: &Graph, src: NodeId) -> Result<HashMap<NodeId, TimeStamps>> {
    let src = graph.require(src)?;
    Ok(keyed_by_id(graph, search::dfs_forest(graph, src)))
}

/// Topological order of an acyclic graph.
pub fn top_sort(graph: &Graph) -> Result<Vec<NodeId>> {
    let order = search::top_sort(graph)?;
    Ok(to_ids(graph, &order))
}

/// Bellman-Ford distances from `src`.
pub fn single_source_shortest_path(graph: &Graph, src: NodeId) -> Result<HashMap<NodeId, f64>> {
    let src = graph.require(src)?;
    Ok(keyed_by_id(graph, search::bellman_ford(graph, src)?))
}

/// Floyd-Warshall distances between every ordered pair of ids.
pub fn all_pairs_shortest_path(graph: &Graph) -> HashMap<NodeId, HashMap<NodeId, f64>> {
    let matrix = search::floyd_warshall(graph);
    graph
        .node_indices()
        .map(|from| {
            let row = graph
                .node_indices()
                .map(|to| (graph.id_of(to), matrix.distance(from, to)))
                .collect();
            (graph.id_of(from), row)
        })
        .collect()
}

/// Maximum flow value from `src` to `tgt`.
pub fn max_flow(graph: &Graph, src: NodeId, tgt: NodeId) -> Result<i64> {
    let src = graph.require(src)?;
    let tgt = graph.require(tgt)?;
    Ok(flow::edmonds_karp(graph, src, tgt)?.value)
}

/// Maximum flow from `src` to `tgt` broken down per input edge.
pub fn max_flow_assignment(graph: &Graph, src: NodeId, tgt: NodeId) -> Result<FlowAssignment> {
    let src = graph.require(src)?;
    let tgt = graph.require(tgt)?;
    let result = flow::edmonds_karp(graph, src, tgt)?;

    let edges = graph
        .edge_references()
        .map(|edge_ref| EdgeFlow {
            source: graph.id_of(edge_ref.source()),
            target: graph.id_of(edge_ref.target()),
            capacity: edge_ref.weight().capacity(),
            flow: result.flow_on(edge_ref.id()),
        })
        .collect();

    Ok(FlowAssignment {
        value: result.value,
        edges,
    })
}

/// Raw betweenness over ordered pairs.
pub fn betweenness_centrality(graph: &Graph) -> HashMap<NodeId, f64> {
    keyed_by_id(
        graph,
        centrality::betweenness_centrality(graph, PairCounting::Directed),
    )
}

/// Betweenness for graphs that model each undirected link as two opposite
/// edges; every total is halved.
pub fn undirected_betweenness_centrality(graph: &Graph) -> HashMap<NodeId, f64> {
    keyed_by_id(
        graph,
        centrality::betweenness_centrality(graph, PairCounting::Undirected),
    )
}

/// PageRank with default parameters.
pub fn page_rank(graph: &Graph) -> Result<HashMap<NodeId, f64>> {
    page_rank_with(graph, &PageRankConfig::default())
}

/// PageRank with explicit parameters.
pub fn page_rank_with(graph: &Graph, config: &PageRankConfig) -> Result<HashMap<NodeId, f64>> {
    Ok(page_rank_report(graph, config)?.scores)
}

/// PageRank with explicit parameters, reporting iterations and convergence.
pub fn page_rank_report(graph: &Graph, config: &PageRankConfig) -> Result<PageRankReport> {
    let result = ranking::pagerank(graph, config)?;
    let iterations = result.iterations;
    let converged = result.converged;

    Ok(PageRankReport {
        scores: keyed_by_id(graph, result.into_map()),
        iterations,
        converged,
    })
}

/// Strongly connected components as sets of ids.
pub fn strongly_connected_components(graph: &Graph) -> BTreeSet<BTreeSet<NodeId>> {
    connectivity::kosaraju(graph)
        .iter()
        .map(|component| component.iter().map(|&node| graph.id_of(node)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphkit_core::GraphError;

    fn chain() -> Graph {
        let mut graph = Graph::new();
        graph.add_edge(10, 20, 2.0);
        graph.add_edge(20, 30, 3.0);
        graph
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let graph = chain();
        assert!(matches!(bfs(&graph, 10, 99, false), Err(GraphError::InvalidArgument(_))));
        assert!(matches!(bfs(&graph, 99, 10, false), Err(GraphError::InvalidArgument(_))));
        assert!(dfs_tree(&graph, 99).is_err());
        assert!(dfs_forest(&graph, 99).is_err());
        assert!(single_source_shortest_path(&graph, 99).is_err());
        assert!(max_flow(&graph, 10, 99).is_err());
        assert!(max_flow_assignment(&graph, 99, 30).is_err());
    }

    #[test]
    fn test_results_keyed_by_id() {
        let graph = chain();

        assert_eq!(bfs(&graph, 10, 30, false).unwrap(), vec![10, 20, 30]);
        assert_eq!(top_sort(&graph).unwrap(), vec![10, 20, 30]);

        let dist = single_source_shortest_path(&graph, 10).unwrap();
        assert_eq!(dist[&30], 5.0);

        let all = all_pairs_shortest_path(&graph);
        assert_eq!(all[&10][&30], 5.0);
        assert!(all[&30][&10].is_infinite());
    }

    #[test]
    fn test_flow_assignment_matches_value() {
        let graph = chain();
        let assignment = max_flow_assignment(&graph, 10, 30).unwrap();

        assert_eq!(max_flow(&graph, 10, 30).unwrap(), 2);
        assert_eq!(assignment.value, 2);
        assert_eq!(assignment.edges.len(), 2);
        let first = assignment.edges.iter().find(|edge| edge.source == 10).unwrap();
        assert_eq!((first.capacity, first.flow), (2, 2));
    }

    #[test]
    fn test_flow_overflow_surfaces() {
        let mut graph = Graph::new();
        for (src, tgt) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
            graph.add_edge(src, tgt, 9e18);
        }
        assert!(matches!(max_flow(&graph, 1, 4), Err(GraphError::InvalidArgument(_))));
        assert!(max_flow_assignment(&graph, 1, 4).is_err());
    }

    #[test]
    fn test_page_rank_report_keyed_by_id() {
        let mut graph = chain();
        graph.add_edge(30, 10, 1.0);
        let report = page_rank_report(&graph, &PageRankConfig::default()).unwrap();

        assert!(report.converged);
        assert!(report.iterations >= 1);
        let mut ids: Vec<NodeId> = report.scores.keys().copied().collect();
        ids.sort();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(page_rank(&graph).unwrap(), report.scores);
    }

    #[test]
    fn test_page_rank_errors_propagate() {
        let config = PageRankConfig {
            damping_factor: -0.1,
            ..PageRankConfig::default()
        };
        assert!(matches!(
            page_rank_with(&chain(), &config),
            Err(GraphError::InvalidArgument(_))
        ));
        assert!(page_rank_report(&chain(), &config).is_err());
    }

    #[test]
    fn test_scc_ids() {
        let mut graph = chain();
        graph.add_edge(30, 20, 1.0);
        let components = strongly_connected_components(&graph);

        let expected: BTreeSet<BTreeSet<NodeId>> = [
            [10].into_iter().collect(),
            [20, 30].into_iter().collect(),
        ]
        .into_iter()
        .collect();
        assert_eq!(components, expected);
    }
}
