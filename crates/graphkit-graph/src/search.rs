//! Traversal and ordering: BFS, DFS, topological sort, Bellman-Ford and
//! Floyd-Warshall.
//!
//! Everything here works on arena slots (`NodeIndex`). The id-based
//! wrappers live in [`crate::toolkit`].

use graphkit_core::{EdgeIndex, Graph, GraphError, NodeIndex, Result};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Discovery and finish times of a node in a depth-first traversal.
///
/// Both come from one clock that ticks on every discovery and every finish,
/// so times run from 1 to twice the number of visited nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeStamps {
    pub start: usize,
    pub finish: usize,
}

/// Dense all-pairs distance table produced by Floyd-Warshall.
///
/// Rows and columns follow the graph's slot order. Unreachable pairs hold
/// `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    dist: Vec<f64>,
}

impl DistanceMatrix {
    fn new(size: usize) -> Self {
        Self {
            size,
            dist: vec![f64::INFINITY; size * size],
        }
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Shortest distance from `from` to `to`.
    pub fn distance(&self, from: NodeIndex, to: NodeIndex) -> f64 {
        self.dist[from.index() * self.size + to.index()]
    }

    fn at(&self, from: usize, to: usize) -> f64 {
        self.dist[from * self.size + to]
    }

    fn set(&mut self, from: usize, to: usize, value: f64) {
        self.dist[from * self.size + to] = value;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Depth-first walker
// ─────────────────────────────────────────────────────────────────────────────

/// Events reported while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    /// First time a node is reached.
    Discover(NodeIndex),
    /// An edge to a node that is still on the active path.
    BackEdge(NodeIndex, NodeIndex),
    /// All successors of a node are exhausted.
    Finish(NodeIndex),
}

struct Frame {
    node: NodeIndex,
    neighbors: Vec<NodeIndex>,
    next: usize,
}

/// Iterative depth-first walker with an explicit stack.
///
/// The visited set persists across calls to [`Walker::walk`], so walking
/// from several roots yields a forest where no node is visited twice.
pub(crate) struct Walker<'g> {
    graph: &'g Graph,
    visited: Vec<bool>,
    on_path: Vec<bool>,
}

impl<'g> Walker<'g> {
    pub(crate) fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            visited: vec![false; graph.size()],
            on_path: vec![false; graph.size()],
        }
    }

    pub(crate) fn is_visited(&self, node: NodeIndex) -> bool {
        self.visited[node.index()]
    }

    /// Walks everything reachable from `root` that has not been visited yet.
    pub(crate) fn walk<F: FnMut(Visit)>(&mut self, root: NodeIndex, mut on_visit: F) {
        if self.visited[root.index()] {
            return;
        }

        let mut stack = vec![self.enter(root, &mut on_visit)];

        loop {
            let step = match stack.last_mut() {
                None => break,
                Some(frame) if frame.next < frame.neighbors.len() => {
                    let next = frame.neighbors[frame.next];
                    frame.next += 1;
                    Some((frame.node, next))
                }
                Some(_) => None,
            };

            match step {
                Some((from, to)) => {
                    if !self.visited[to.index()] {
                        let frame = self.enter(to, &mut on_visit);
                        stack.push(frame);
                    } else if self.on_path[to.index()] {
                        on_visit(Visit::BackEdge(from, to));
                    }
                }
                None => {
                    if let Some(frame) = stack.pop() {
                        self.on_path[frame.node.index()] = false;
                        on_visit(Visit::Finish(frame.node));
                    }
                }
            }
        }
    }

    fn enter<F: FnMut(Visit)>(&mut self, node: NodeIndex, on_visit: &mut F) -> Frame {
        self.visited[node.index()] = true;
        self.on_path[node.index()] = true;
        on_visit(Visit::Discover(node));
        Frame {
            node,
            neighbors: self.graph.neighbors(node),
            next: 0,
        }
    }
}

/// Records discovery/finish times from walker events.
struct Stamper {
    clock: usize,
    stamps: HashMap<NodeIndex, TimeStamps>,
}

impl Stamper {
    fn new() -> Self {
        Self {
            clock: 0,
            stamps: HashMap::new(),
        }
    }

    fn record(&mut self, visit: Visit) {
        match visit {
            Visit::Discover(node) => {
                self.clock += 1;
                self.stamps.insert(
                    node,
                    TimeStamps {
                        start: self.clock,
                        finish: 0,
                    },
                );
            }
            Visit::Finish(node) => {
                self.clock += 1;
                if let Some(stamp) = self.stamps.get_mut(&node) {
                    stamp.finish = self.clock;
                }
            }
            Visit::BackEdge(..) => {}
        }
    }
}

/// Picks the next forest root: an unvisited node with no incoming edge if
/// there is one, otherwise the first unvisited node.
fn next_root(graph: &Graph, walker: &Walker<'_>) -> Option<NodeIndex> {
    graph
        .node_indices()
        .find(|&node| !walker.is_visited(node) && graph.in_degree(node) == 0)
        .or_else(|| graph.node_indices().find(|&node| !walker.is_visited(node)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Breadth-first search
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest path by edge count, as a list of edges.
///
/// With `flow_mode` only edges with positive residual capacity are
/// traversable. Returns `None` when `tgt` is unreachable and an empty path
/// when `src == tgt`.
pub fn bfs_edges(graph: &Graph, src: NodeIndex, tgt: NodeIndex, flow_mode: bool) -> Option<Vec<EdgeIndex>> {
    if src == tgt {
        return Some(Vec::new());
    }

    let mut explored = vec![false; graph.size()];
    let mut parents: Vec<Option<EdgeIndex>> = vec![None; graph.size()];
    let mut queue = VecDeque::new();

    explored[src.index()] = true;
    queue.push_back(src);

    while let Some(current) = queue.pop_front() {
        for edge_ref in graph.out_edges(current) {
            if flow_mode && edge_ref.weight().residual() <= 0 {
                continue;
            }

            let next = edge_ref.target();
            if explored[next.index()] {
                continue;
            }
            explored[next.index()] = true;
            parents[next.index()] = Some(edge_ref.id());

            if next == tgt {
                return Some(trace_path(graph, &parents, tgt));
            }
            queue.push_back(next);
        }
    }

    None
}

/// Walks parent edges back from `tgt` to the root of the search.
fn trace_path(graph: &Graph, parents: &[Option<EdgeIndex>], tgt: NodeIndex) -> Vec<EdgeIndex> {
    let mut path = Vec::new();
    let mut current = tgt;

    while let Some(edge) = parents[current.index()] {
        path.push(edge);
        match graph.endpoints(edge) {
            Some((source, _)) => current = source,
            None => break,
        }
    }

    path.reverse();
    path
}

/// Shortest path by edge count, as a list of nodes from `src` to `tgt`.
///
/// Returns `[src]` when `src == tgt` and an empty list when `tgt` cannot be
/// reached under the active traversal rule.
pub fn bfs(graph: &Graph, src: NodeIndex, tgt: NodeIndex, flow_mode: bool) -> Vec<NodeIndex> {
    match bfs_edges(graph, src, tgt, flow_mode) {
        Some(edges) => {
            let mut nodes = Vec::with_capacity(edges.len() + 1);
            nodes.push(src);
            nodes.extend(
                edges
                    .iter()
                    .filter_map(|&edge| graph.endpoints(edge).map(|(_, target)| target)),
            );
            nodes
        }
        None => Vec::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Depth-first search
// ─────────────────────────────────────────────────────────────────────────────

/// Depth-first traversal from a single root.
///
/// Only nodes reachable from `src` appear in the result.
pub fn dfs_tree(graph: &Graph, src: NodeIndex) -> HashMap<NodeIndex, TimeStamps> {
    let mut walker = Walker::new(graph);
    let mut stamper = Stamper::new();
    walker.walk(src, |visit| stamper.record(visit));
    stamper.stamps
}

/// Depth-first traversal that restarts until every node is stamped.
///
/// The first tree is rooted at `src`. Later roots prefer nodes without
/// incoming edges and fall back to any unvisited node.
pub fn dfs_forest(graph: &Graph, src: NodeIndex) -> HashMap<NodeIndex, TimeStamps> {
    let mut walker = Walker::new(graph);
    let mut stamper = Stamper::new();

    let mut root = Some(src);
    while let Some(node) = root {
        walker.walk(node, |visit| stamper.record(visit));
        root = next_root(graph, &walker);
    }

    stamper.stamps
}

/// Returns true if the graph contains a directed cycle (self-loops included).
pub fn detect_cycle(graph: &Graph) -> bool {
    let mut walker = Walker::new(graph);
    let mut found = false;

    while let Some(root) = next_root(graph, &walker) {
        walker.walk(root, |visit| {
            if let Visit::BackEdge(..) = visit {
                found = true;
            }
        });
        if found {
            return true;
        }
    }

    false
}

/// Orders nodes so that every edge points forward.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if the graph has a directed cycle.
pub fn top_sort(graph: &Graph) -> Result<Vec<NodeIndex>> {
    if detect_cycle(graph) {
        return Err(GraphError::CycleDetected);
    }

    let root = match graph.node_indices().find(|&node| graph.in_degree(node) == 0) {
        Some(root) => root,
        None => return Ok(Vec::new()),
    };

    let stamps = dfs_forest(graph, root);
    let mut order: Vec<(NodeIndex, usize)> = stamps
        .into_iter()
        .map(|(node, stamp)| (node, stamp.finish))
        .collect();
    order.sort_by(|a, b| b.1.cmp(&a.1));

    debug!(nodes = order.len(), "topological order computed");
    Ok(order.into_iter().map(|(node, _)| node).collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Weighted shortest paths
// ─────────────────────────────────────────────────────────────────────────────

/// Single-source shortest distances via Bellman-Ford.
///
/// Handles negative edge weights. Unreachable nodes get `f64::INFINITY`.
///
/// # Errors
///
/// Returns [`GraphError::NegativeCycle`] if a negative cycle is reachable
/// from `src`.
pub fn bellman_ford(graph: &Graph, src: NodeIndex) -> Result<HashMap<NodeIndex, f64>> {
    let n = graph.size();
    let mut dist = vec![f64::INFINITY; n];
    dist[src.index()] = 0.0;

    let relax = |dist: &mut [f64]| -> bool {
        let mut updated = false;
        for edge_ref in graph.edge_references() {
            let u = edge_ref.source().index();
            let v = edge_ref.target().index();
            if dist[u].is_infinite() {
                continue;
            }
            let candidate = dist[u] + edge_ref.weight().weight;
            if candidate < dist[v] {
                dist[v] = candidate;
                updated = true;
            }
        }
        updated
    };

    let mut rounds = 0;
    for _ in 1..n {
        rounds += 1;
        if !relax(dist.as_mut_slice()) {
            break;
        }
    }

    // One more pass: anything that still relaxes sits on a negative cycle
    if relax(dist.as_mut_slice()) {
        return Err(GraphError::NegativeCycle);
    }

    debug!(rounds, "bellman-ford converged");
    Ok(graph
        .node_indices()
        .map(|node| (node, dist[node.index()]))
        .collect())
}

/// All-pairs shortest distances via Floyd-Warshall.
///
/// Self-distance starts at 0 and missing edges at `f64::INFINITY`. Between
/// parallel edges the lightest one wins.
pub fn floyd_warshall(graph: &Graph) -> DistanceMatrix {
    let n = graph.size();
    let mut matrix = DistanceMatrix::new(n);

    for i in 0..n {
        matrix.set(i, i, 0.0);
    }
    for edge_ref in graph.edge_references() {
        let (u, v) = (edge_ref.source().index(), edge_ref.target().index());
        let weight = edge_ref.weight().weight;
        if weight < matrix.at(u, v) {
            matrix.set(u, v, weight);
        }
    }

    for i in 0..n {
        for j in 0..n {
            let via = matrix.at(j, i);
            if via.is_infinite() {
                continue;
            }
            for k in 0..n {
                let candidate = via + matrix.at(i, k);
                if candidate < matrix.at(j, k) {
                    matrix.set(j, k, candidate);
                }
            }
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(edges: &[(i64, i64, f64)]) -> Graph {
        let mut graph = Graph::new();
        for &(src, tgt, weight) in edges {
            graph.add_edge(src, tgt, weight);
        }
        graph
    }

    fn ids(graph: &Graph, nodes: &[NodeIndex]) -> Vec<i64> {
        nodes.iter().map(|&node| graph.id_of(node)).collect()
    }

    fn idx(graph: &Graph, id: i64) -> NodeIndex {
        graph.require(id).unwrap()
    }

    #[test]
    fn test_bfs_shortest_by_edge_count() {
        let graph = graph_from(&[
            (1, 2, 1.0),
            (2, 4, 1.0),
            (2, 3, 1.0),
            (3, 5, 1.0),
            (5, 6, 1.0),
        ]);
        let path = bfs(&graph, idx(&graph, 1), idx(&graph, 4), false);
        assert_eq!(ids(&graph, &path), vec![1, 2, 4]);

        let path = bfs(&graph, idx(&graph, 1), idx(&graph, 6), false);
        assert_eq!(ids(&graph, &path), vec![1, 2, 3, 5, 6]);
    }

    #[test]
    fn test_bfs_prefers_fewer_hops_over_weight() {
        let graph = graph_from(&[(1, 2, 1.0), (2, 3, 1.0), (1, 3, 100.0)]);
        let path = bfs(&graph, idx(&graph, 1), idx(&graph, 3), false);
        assert_eq!(ids(&graph, &path), vec![1, 3]);
    }

    #[test]
    fn test_bfs_same_node() {
        let graph = graph_from(&[(1, 2, 1.0)]);
        let path = bfs(&graph, idx(&graph, 1), idx(&graph, 1), false);
        assert_eq!(ids(&graph, &path), vec![1]);
    }

    #[test]
    fn test_bfs_unreachable() {
        let graph = graph_from(&[(1, 2, 1.0), (3, 1, 1.0)]);
        let path = bfs(&graph, idx(&graph, 1), idx(&graph, 3), false);
        assert!(path.is_empty());
    }

    #[test]
    fn test_bfs_flow_mode_skips_saturated_edges() {
        let mut graph = graph_from(&[(1, 2, 1.0), (2, 3, 1.0), (1, 4, 1.0), (4, 5, 1.0), (5, 3, 1.0)]);
        let one_two = graph.edge_indices().next().unwrap();
        graph.edge_mut(one_two).flow = 1;

        let plain = bfs(&graph, idx(&graph, 1), idx(&graph, 3), false);
        assert_eq!(ids(&graph, &plain), vec![1, 2, 3]);

        let residual = bfs(&graph, idx(&graph, 1), idx(&graph, 3), true);
        assert_eq!(ids(&graph, &residual), vec![1, 4, 5, 3]);
    }

    #[test]
    fn test_bfs_flow_mode_zero_capacity_is_unreachable() {
        let graph = graph_from(&[(1, 2, 0.0)]);
        assert!(bfs(&graph, idx(&graph, 1), idx(&graph, 2), true).is_empty());
        assert_eq!(bfs(&graph, idx(&graph, 1), idx(&graph, 2), false).len(), 2);
    }

    #[test]
    fn test_dfs_tree_only_reachable() {
        let graph = graph_from(&[(1, 2, 1.0), (2, 3, 1.0), (4, 5, 1.0)]);
        let stamps = dfs_tree(&graph, idx(&graph, 1));

        assert_eq!(stamps.len(), 3);
        assert!(!stamps.contains_key(&idx(&graph, 4)));

        let one = stamps[&idx(&graph, 1)];
        let two = stamps[&idx(&graph, 2)];
        let three = stamps[&idx(&graph, 3)];
        assert_eq!(one, TimeStamps { start: 1, finish: 6 });
        assert_eq!(two, TimeStamps { start: 2, finish: 5 });
        assert_eq!(three, TimeStamps { start: 3, finish: 4 });
    }

    #[test]
    fn test_dfs_forest_covers_all_nodes() {
        let graph = graph_from(&[(1, 2, 1.0), (2, 3, 1.0), (4, 5, 1.0), (6, 6, 1.0)]);
        let stamps = dfs_forest(&graph, idx(&graph, 2));

        assert_eq!(stamps.len(), graph.size());

        // Every clock value is used exactly once
        let mut times: Vec<usize> = stamps
            .values()
            .flat_map(|stamp| [stamp.start, stamp.finish])
            .collect();
        times.sort();
        assert_eq!(times, (1..=2 * graph.size()).collect::<Vec<_>>());

        for stamp in stamps.values() {
            assert!(stamp.start < stamp.finish);
        }
    }

    #[test]
    fn test_dfs_forest_restarts_at_zero_in_degree() {
        // 3 -> 1 -> 2; starting at 2 leaves 3 and 1, and 3 has no in-edges
        let graph = graph_from(&[(3, 1, 1.0), (1, 2, 1.0)]);
        let stamps = dfs_forest(&graph, idx(&graph, 2));

        let three = stamps[&idx(&graph, 3)];
        let one = stamps[&idx(&graph, 1)];
        assert_eq!(three.start, 3);
        assert!(three.start < one.start && one.finish < three.finish);
    }

    #[test]
    fn test_detect_cycle() {
        assert!(detect_cycle(&graph_from(&[(1, 2, 1.0), (2, 3, 1.0), (3, 1, 1.0)])));
        assert!(detect_cycle(&graph_from(&[(1, 1, 1.0)])));
        assert!(!detect_cycle(&graph_from(&[(1, 2, 1.0), (1, 3, 1.0), (2, 3, 1.0)])));

        // Cycle hidden in a component no zero in-degree root reaches
        assert!(detect_cycle(&graph_from(&[(1, 2, 1.0), (5, 6, 1.0), (6, 5, 1.0)])));
    }

    #[test]
    fn test_top_sort_respects_edges() {
        let edges = [
            (1, 2, 1.0),
            (1, 3, 1.0),
            (2, 4, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (6, 3, 1.0),
        ];
        let graph = graph_from(&edges);
        let order = ids(&graph, &top_sort(&graph).unwrap());

        assert_eq!(order.len(), graph.size());
        let position = |id: i64| order.iter().position(|&x| x == id).unwrap();
        for &(src, tgt, _) in &edges {
            assert!(position(src) < position(tgt), "{} should precede {}", src, tgt);
        }
    }

    #[test]
    fn test_top_sort_cycle() {
        let graph = graph_from(&[(1, 2, 1.0), (2, 3, 1.0), (3, 1, 1.0), (3, 4, 1.0)]);
        assert_eq!(top_sort(&graph), Err(GraphError::CycleDetected));
    }

    #[test]
    fn test_top_sort_empty() {
        assert_eq!(top_sort(&Graph::new()), Ok(Vec::new()));
    }

    #[test]
    fn test_bellman_ford_negative_edge() {
        let graph = graph_from(&[(1, 2, 4.0), (1, 3, 2.0), (3, 2, -1.0), (2, 4, 1.0)]);
        let dist = bellman_ford(&graph, idx(&graph, 1)).unwrap();

        assert_eq!(dist[&idx(&graph, 1)], 0.0);
        assert_eq!(dist[&idx(&graph, 2)], 1.0);
        assert_eq!(dist[&idx(&graph, 3)], 2.0);
        assert_eq!(dist[&idx(&graph, 4)], 2.0);
    }

    #[test]
    fn test_bellman_ford_unreachable_is_infinite() {
        let graph = graph_from(&[(1, 2, 1.0), (3, 1, 1.0)]);
        let dist = bellman_ford(&graph, idx(&graph, 1)).unwrap();
        assert!(dist[&idx(&graph, 3)].is_infinite());
    }

    #[test]
    fn test_bellman_ford_negative_cycle() {
        let graph = graph_from(&[(1, 2, 1.0), (2, 3, -2.0), (3, 2, 1.0)]);
        assert_eq!(
            bellman_ford(&graph, idx(&graph, 1)),
            Err(GraphError::NegativeCycle)
        );
    }

    #[test]
    fn test_bellman_ford_ignores_unreachable_negative_cycle() {
        let graph = graph_from(&[(1, 2, 1.0), (3, 4, -2.0), (4, 3, 1.0)]);
        assert!(bellman_ford(&graph, idx(&graph, 1)).is_ok());
    }

    #[test]
    fn test_floyd_warshall() {
        let graph = graph_from(&[(1, 2, 3.0), (2, 3, 4.0), (1, 3, 10.0), (3, 1, -1.0), (4, 4, 5.0)]);
        let matrix = floyd_warshall(&graph);
        let d = |a: i64, b: i64| matrix.distance(idx(&graph, a), idx(&graph, b));

        assert_eq!(matrix.size(), 4);
        assert_eq!(d(1, 3), 7.0);
        assert_eq!(d(3, 2), 2.0);
        assert_eq!(d(2, 1), 3.0);
        assert_eq!(d(1, 1), 0.0);
        assert_eq!(d(4, 4), 0.0);
        assert!(d(1, 4).is_infinite());
    }

    #[test]
    fn test_floyd_warshall_agrees_with_bellman_ford() {
        let graph = graph_from(&[
            (1, 2, 2.0),
            (1, 3, 7.0),
            (2, 3, -1.0),
            (3, 4, 3.0),
            (2, 4, 6.0),
            (4, 1, 1.0),
        ]);
        let matrix = floyd_warshall(&graph);
        for src in graph.node_indices() {
            let dist = bellman_ford(&graph, src).unwrap();
            for tgt in graph.node_indices() {
                assert_eq!(matrix.distance(src, tgt), dist[&tgt]);
            }
        }
    }
}
