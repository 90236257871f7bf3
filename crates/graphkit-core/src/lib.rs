//! Graphkit Core - Weighted digraph model
//!
//! This crate holds the data model every graphkit algorithm works on: an
//! arena of nodes and edges keyed by caller-defined integer ids.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with an extra index from node ids to
//! arena slots. Edges carry a real-valued `weight` and an integral `flow`
//! that only the max-flow working copy ever changes.
//!
//! # Example
//!
//! ```
//! use graphkit_core::Graph;
//!
//! let mut graph = Graph::new();
//! graph.add_edge(1, 2, 4.0);
//! graph.add_edge(2, 3, 1.0);
//!
//! assert_eq!(graph.size(), 3);
//! assert!(graph.contains_edge(1, 2));
//! ```

mod edge;
mod error;
mod graph;

pub use edge::{Edge, EdgeRecord, Node};
pub use error::{GraphError, Result};
pub use graph::{EdgeIndex, Graph, GraphStats, NodeId, NodeIndex};
