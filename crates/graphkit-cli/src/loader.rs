//! Edge-list ingestion.
//!
//! One edge per line: `source<delim>target<delim>weight`, with any further
//! fields ignored. Blank lines and lines starting with `#` are skipped.

use graphkit_core::{Graph, NodeId};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: expected source, target and weight, found {found} field(s)")]
    MissingFields { line: usize, found: usize },
    #[error("line {line}: invalid node id {value:?}")]
    BadId { line: usize, value: String },
    #[error("line {line}: invalid weight {value:?}")]
    BadWeight { line: usize, value: String },
}

/// Reads an edge-list file into a graph.
pub fn load_edge_list(path: &Path, delimiter: char) -> Result<Graph, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = parse_edge_list(&text, delimiter)?;

    info!(
        path = %path.display(),
        nodes = graph.size(),
        edges = graph.edge_count(),
        "loaded edge list"
    );
    Ok(graph)
}

/// Parses edge-list text into a graph.
pub fn parse_edge_list(text: &str, delimiter: char) -> Result<Graph, LoadError> {
    let mut graph = Graph::new();

    for (number, raw) in text.lines().enumerate() {
        let line = number + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Runs of whitespace count as one separator
        let fields: Vec<&str> = trimmed
            .split(delimiter)
            .map(str::trim)
            .filter(|field| !(delimiter.is_whitespace() && field.is_empty()))
            .collect();
        if fields.len() < 3 {
            return Err(LoadError::MissingFields {
                line,
                found: fields.len(),
            });
        }

        let source = parse_id(fields[0], line)?;
        let target = parse_id(fields[1], line)?;
        let weight = match fields[2].parse::<f64>() {
            Ok(weight) if weight.is_finite() => weight,
            _ => {
                return Err(LoadError::BadWeight {
                    line,
                    value: fields[2].to_string(),
                })
            }
        };

        graph.add_edge(source, target, weight);
    }

    Ok(graph)
}

fn parse_id(field: &str, line: usize) -> Result<NodeId, LoadError> {
    field.parse().map_err(|_| LoadError::BadId {
        line,
        value: field.to_string(),
    })
}
