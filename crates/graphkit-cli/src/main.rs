//! Graphkit CLI - Command-line interface for graphkit
//!
//! Loads an edge list and runs one graph algorithm on it per invocation.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod loader;

use commands::Options;
use config::{CliConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "graphkit")]
#[command(author = "Graphkit Contributors")]
#[command(version)]
#[command(about = "Graph algorithms over weighted edge lists", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to ./graphkit.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Edge-list field separator ("\t" or "tab" for tab)
    #[arg(short, long, global = true, value_parser = parse_delimiter)]
    delimiter: Option<char>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default graphkit.json
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show node and edge counts
    Stats {
        /// Edge-list file
        file: PathBuf,
    },

    /// Export the parsed graph as JSON
    Export {
        /// Edge-list file
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Shortest path by edge count
    Bfs {
        file: PathBuf,
        src: i64,
        tgt: i64,

        /// Only follow edges with remaining capacity
        #[arg(long)]
        flow: bool,
    },

    /// Depth-first discovery and finish times
    Dfs {
        file: PathBuf,
        src: i64,

        /// Restart until every node is visited
        #[arg(long)]
        forest: bool,
    },

    /// Topological order of an acyclic graph
    Topsort { file: PathBuf },

    /// Shortest distances from one node (Bellman-Ford)
    Sssp { file: PathBuf, src: i64 },

    /// Shortest distances between all pairs (Floyd-Warshall)
    Apsp { file: PathBuf },

    /// Maximum flow between two nodes (Edmonds-Karp)
    MaxFlow { file: PathBuf, src: i64, tgt: i64 },

    /// Betweenness centrality (Brandes)
    Betweenness {
        file: PathBuf,

        /// Halve scores for graphs with one edge per direction
        #[arg(long)]
        undirected: bool,

        /// Show only the highest scores
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// PageRank scores
    Pagerank {
        file: PathBuf,

        /// Damping factor (overrides the config file)
        #[arg(long)]
        damping: Option<f64>,

        /// Split rank by edge weight instead of evenly
        #[arg(long)]
        weighted: bool,

        /// Show only the highest scores
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Strongly connected components (Kosaraju)
    Scc { file: PathBuf },
}

fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "\\t" | "tab" => Ok('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("delimiter must be a single character, got {:?}", value)),
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = match CliConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    let options = Options {
        json: cli.json,
        config,
    };

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Stats { file } => commands::stats(&file, &options),
        Commands::Export { file, output } => commands::export(&file, output.as_deref(), &options),
        Commands::Bfs {
            file,
            src,
            tgt,
            flow,
        } => commands::bfs(&file, src, tgt, flow, &options),
        Commands::Dfs { file, src, forest } => commands::dfs(&file, src, forest, &options),
        Commands::Topsort { file } => commands::topsort(&file, &options),
        Commands::Sssp { file, src } => commands::sssp(&file, src, &options),
        Commands::Apsp { file } => commands::apsp(&file, &options),
        Commands::MaxFlow { file, src, tgt } => commands::max_flow(&file, src, tgt, &options),
        Commands::Betweenness {
            file,
            undirected,
            top,
        } => commands::betweenness(&file, undirected, top, &options),
        Commands::Pagerank {
            file,
            damping,
            weighted,
            top,
        } => commands::pagerank(&file, damping, weighted, top, &options),
        Commands::Scc { file } => commands::scc(&file, &options),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
