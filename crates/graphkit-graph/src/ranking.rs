//! PageRank via power iteration on the damped transition matrix.
//!
//! The transition matrix `A` has `A[target][source]` equal to the share of
//! `source`'s out-going weight that goes to `target`; every column sums to
//! 1 when every node has an out-edge. Damping gives
//! `M = d·A + (1-d)/n · J`, still column-stochastic, whose eigenvalue 1 is
//! unique and dominant. Repeated multiplication from the uniform vector
//! converges to its eigenvector, normalised to sum to 1.
//!
//! Sinks leave their column empty. No mass is redistributed for them, so
//! the eigenvalue-1 guarantee does not hold on such graphs; the result is
//! whatever the normalised iteration converges to.

use graphkit_core::{Graph, GraphError, NodeIndex, Result};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{debug, warn};

/// How edges split a node's rank among its successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeWeighting {
    /// Every out-edge gets `1 / out_degree`; weights are ignored.
    #[default]
    Uniform,
    /// Every out-edge gets `weight / total out-weight`.
    Proportional,
}

/// PageRank parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankConfig {
    pub damping_factor: f64,
    pub max_iterations: usize,
    /// Iteration stops once the L1 change between rounds drops below this.
    pub tolerance: f64,
    pub weighting: EdgeWeighting,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 1000,
            tolerance: 1e-12,
            weighting: EdgeWeighting::Uniform,
        }
    }
}

/// PageRank scores with convergence diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankScores {
    scores: HashMap<NodeIndex, f64>,
    /// Rounds of multiplication performed.
    pub iterations: usize,
    /// Whether the tolerance was reached before `max_iterations`.
    pub converged: bool,
}

impl PageRankScores {
    /// Score of a node, or 0 if the node is unknown.
    pub fn get(&self, node: NodeIndex) -> f64 {
        self.scores.get(&node).copied().unwrap_or(0.0)
    }

    /// Iterates over `(node, score)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.scores.iter().map(|(&node, &score)| (node, score))
    }

    /// Consumes the scores into a map.
    pub fn into_map(self) -> HashMap<NodeIndex, f64> {
        self.scores
    }
}

/// Dense column-major damped transition matrix.
struct TransitionMatrix {
    n: usize,
    /// `cells[target * n + source]`
    cells: Vec<f64>,
}

impl TransitionMatrix {
    fn build(graph: &Graph, config: &PageRankConfig) -> Self {
        let n = graph.size();
        let mut cells = vec![0.0_f64; n * n];

        for source in graph.node_indices() {
            let total: f64 = match config.weighting {
                EdgeWeighting::Uniform => graph.out_degree(source) as f64,
                EdgeWeighting::Proportional => graph
                    .out_edges(source)
                    .map(|edge_ref| edge_ref.weight().weight)
                    .sum(),
            };
            if total <= 0.0 {
                continue;
            }

            for edge_ref in graph.out_edges(source) {
                let share = match config.weighting {
                    EdgeWeighting::Uniform => 1.0,
                    EdgeWeighting::Proportional => edge_ref.weight().weight,
                };
                cells[edge_ref.target().index() * n + source.index()] += share / total;
            }
        }

        // Damping
        let d = config.damping_factor;
        let jump = (1.0 - d) / n as f64;
        for cell in cells.iter_mut() {
            *cell = d * *cell + jump;
        }

        Self { n, cells }
    }

    fn multiply(&self, vector: &[f64], out: &mut [f64]) {
        for (target, slot) in out.iter_mut().enumerate() {
            let row = &self.cells[target * self.n..(target + 1) * self.n];
            *slot = row.iter().zip(vector).map(|(a, b)| a * b).sum();
        }
    }
}

/// PageRank of every node.
///
/// # Errors
///
/// Returns [`GraphError::InvalidArgument`] if the damping factor is outside
/// `[0, 1]` or the tolerance is not positive.
pub fn pagerank(graph: &Graph, config: &PageRankConfig) -> Result<PageRankScores> {
    if !(0.0..=1.0).contains(&config.damping_factor) {
        return Err(GraphError::invalid(format!(
            "damping factor {} is outside [0, 1]",
            config.damping_factor
        )));
    }
    if config.tolerance <= 0.0 || config.tolerance.is_nan() {
        return Err(GraphError::invalid("tolerance must be positive"));
    }

    let n = graph.size();
    if n == 0 {
        return Ok(PageRankScores {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
        });
    }

    let matrix = TransitionMatrix::build(graph, config);
    let mut rank = vec![1.0 / n as f64; n];
    let mut next = vec![0.0_f64; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;
        matrix.multiply(&rank, &mut next);

        let total: f64 = next.iter().sum();
        if total > 0.0 {
            for value in next.iter_mut() {
                *value /= total;
            }
        }

        let diff: f64 = rank
            .iter()
            .zip(next.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        std::mem::swap(&mut rank, &mut next);

        if diff < config.tolerance {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(iterations, "pagerank converged");
    } else {
        warn!(
            iterations,
            tolerance = config.tolerance,
            "pagerank stopped before converging"
        );
    }

    Ok(PageRankScores {
        scores: graph
            .node_indices()
            .map(|node| (node, rank[node.index()]))
            .collect(),
        iterations,
        converged,
    })
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

    fn four_node() -> Graph {
        graph_from(&[
            (1, 2, 5.0),
            (1, 3, 4.0),
            (1, 4, 3.0),
            (2, 3, 5.0),
            (2, 4, 1.0),
            (3, 1, 2.0),
            (4, 1, 4.0),
            (4, 3, 5.0),
        ])
    }

    fn rank_of(graph: &Graph, scores: &PageRankScores, id: i64) -> f64 {
        scores.get(graph.require(id).unwrap())
    }

    #[test]
    fn test_four_node_damped() {
        let graph = four_node();
        let scores = pagerank(&graph, &PageRankConfig::default()).unwrap();

        assert!(scores.converged);
        assert!((rank_of(&graph, &scores, 1) - 0.368).abs() < 0.001);
        assert!((rank_of(&graph, &scores, 2) - 0.142).abs() < 0.001);
        assert!((rank_of(&graph, &scores, 3) - 0.288).abs() < 0.001);
        assert!((rank_of(&graph, &scores, 4) - 0.202).abs() < 0.001);
    }

    #[test]
    fn test_undamped_matches_principal_eigenvector() {
        let graph = four_node();
        let config = PageRankConfig {
            damping_factor: 1.0,
            ..PageRankConfig::default()
        };
        let scores = pagerank(&graph, &config).unwrap();

        // Stationary vector (12, 4, 9, 6) / 31
        assert!((rank_of(&graph, &scores, 1) - 12.0 / 31.0).abs() < 1e-6);
        assert!((rank_of(&graph, &scores, 2) - 4.0 / 31.0).abs() < 1e-6);
        assert!((rank_of(&graph, &scores, 3) - 9.0 / 31.0).abs() < 1e-6);
        assert!((rank_of(&graph, &scores, 4) - 6.0 / 31.0).abs() < 1e-6);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let graph = graph_from(&[
            (1, 2, 1.0),
            (2, 3, 1.0),
            (3, 1, 1.0),
            (3, 4, 1.0),
            (4, 2, 1.0),
            (5, 1, 1.0),
            (1, 5, 1.0),
        ]);
        let scores = pagerank(&graph, &PageRankConfig::default()).unwrap();
        let total: f64 = scores.iter().map(|(_, score)| score).sum();

        assert!((total - 1.0).abs() < 1e-6);
        assert!(scores.iter().all(|(_, score)| score >= 0.0));
    }

    #[test]
    fn test_symmetric_cycle_is_uniform() {
        let graph = graph_from(&[(1, 2, 1.0), (2, 3, 1.0), (3, 1, 1.0)]);
        let scores = pagerank(&graph, &PageRankConfig::default()).unwrap();
        for (_, score) in scores.iter() {
            assert!((score - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_proportional_weighting_follows_weights() {
        let graph = graph_from(&[(1, 2, 3.0), (1, 3, 1.0), (2, 1, 1.0), (3, 1, 1.0)]);

        let uniform = pagerank(&graph, &PageRankConfig::default()).unwrap();
        assert!((rank_of(&graph, &uniform, 2) - rank_of(&graph, &uniform, 3)).abs() < 1e-9);

        let config = PageRankConfig {
            weighting: EdgeWeighting::Proportional,
            ..PageRankConfig::default()
        };
        let weighted = pagerank(&graph, &config).unwrap();
        assert!(rank_of(&graph, &weighted, 2) > rank_of(&graph, &weighted, 3));
        let total: f64 = weighted.iter().map(|(_, score)| score).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_damping() {
        let graph = four_node();
        let config = PageRankConfig {
            damping_factor: 1.5,
            ..PageRankConfig::default()
        };
        assert!(matches!(
            pagerank(&graph, &config),
            Err(GraphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_iteration_cap() {
        let graph = four_node();
        let config = PageRankConfig {
            max_iterations: 2,
            ..PageRankConfig::default()
        };
        let scores = pagerank(&graph, &config).unwrap();
        assert_eq!(scores.iterations, 2);
        assert!(!scores.converged);
    }

    #[test]
    fn test_empty_graph() {
        let scores = pagerank(&Graph::new(), &PageRankConfig::default()).unwrap();
        assert!(scores.converged);
        assert_eq!(scores.into_map().len(), 0);
    }
}
