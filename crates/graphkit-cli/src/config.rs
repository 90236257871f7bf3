//! `graphkit.json` settings.

use graphkit_graph::{EdgeWeighting, PageRankConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name written by `graphkit init` and read by default.
pub const CONFIG_FILE: &str = "graphkit.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings shared by every subcommand. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Field separator of edge-list files.
    pub delimiter: char,
    pub damping_factor: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let pagerank = PageRankConfig::default();
        Self {
            delimiter: '\t',
            damping_factor: pagerank.damping_factor,
            max_iterations: pagerank.max_iterations,
            tolerance: pagerank.tolerance,
        }
    }
}

impl CliConfig {
    /// Reads a config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn page_rank(&self, weighting: EdgeWeighting) -> PageRankConfig {
        PageRankConfig {
            damping_factor: self.damping_factor,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            weighting,
        }
    }
}
