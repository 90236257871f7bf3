//! Graphkit Graph - Algorithms over the weighted digraph
//!
//! Stateless algorithm modules that read a [`graphkit_core::Graph`] and
//! return plain results. None of them mutates its input; max flow works on
//! a private copy.
//!
//! # Architecture
//!
//! The algorithm modules speak in arena slots (`NodeIndex`):
//! - `search`: BFS, DFS timestamps, topological sort, shortest paths
//! - `connectivity`: strongly connected components
//! - `flow`: Edmonds-Karp maximum flow
//! - `centrality` / `ranking`: betweenness and PageRank
//!
//! The [`toolkit`] module wraps them with caller-facing node ids.
//!
//! # Example
//!
//! ```
//! use graphkit_core::Graph;
//! use graphkit_graph::toolkit;
//!
//! let mut graph = Graph::new();
//! graph.add_edge(1, 2, 1.0);
//! graph.add_edge(2, 3, 1.0);
//!
//! assert_eq!(toolkit::bfs(&graph, 1, 3, false).unwrap(), vec![1, 2, 3]);
//! assert_eq!(toolkit::top_sort(&graph).unwrap(), vec![1, 2, 3]);
//! ```

mod centrality;
mod connectivity;
mod flow;
mod ranking;
mod search;
pub mod toolkit;

pub use centrality::{betweenness_centrality, PairCounting};
pub use connectivity::kosaraju;
pub use flow::{edmonds_karp, MaxFlow};
pub use ranking::{pagerank, EdgeWeighting, PageRankConfig, PageRankScores};
pub use search::{
    bellman_ford, bfs, bfs_edges, detect_cycle, dfs_forest, dfs_tree, floyd_warshall, top_sort,
    DistanceMatrix, TimeStamps,
};
pub use toolkit::{EdgeFlow, FlowAssignment, PageRankReport};
