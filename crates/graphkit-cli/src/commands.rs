//! CLI command implementations.

use crate::config::{CliConfig, CONFIG_FILE};
use crate::loader::load_edge_list;
use colored::Colorize;
use graphkit_core::{Graph, NodeId};
use graphkit_graph::{toolkit, EdgeWeighting};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Settings resolved from the config file and global flags.
pub struct Options {
    pub json: bool,
    pub config: CliConfig,
}

fn load(file: &Path, options: &Options) -> Result<Graph> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Loading {}...", file.display()));

    let result = load_edge_list(file, options.config.delimiter);
    spinner.finish_and_clear();
    Ok(result?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn sorted<V>(map: HashMap<NodeId, V>) -> BTreeMap<NodeId, V> {
    map.into_iter().collect()
}

/// Highest scores first; ties broken by id.
fn ranked(scores: HashMap<NodeId, f64>, top: Option<usize>) -> Vec<(NodeId, f64)> {
    let mut ranked: Vec<(NodeId, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    if let Some(top) = top {
        ranked.truncate(top);
    }
    ranked
}

fn format_distance(distance: f64) -> String {
    if distance.is_infinite() {
        "∞".to_string()
    } else {
        format!("{}", distance)
    }
}

/// Write a default config file.
pub fn init(path: &Path) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(path)?;
    CliConfig::default().save(&config_path)?;

    println!("{} Wrote {}", "✓".green(), config_path.display());
    println!("  Run {} to inspect an edge list", "graphkit stats <FILE>".cyan());

    Ok(())
}

/// Print node and edge counts.
pub fn stats(file: &Path, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let stats = graph.stats();

    if options.json {
        return print_json(&stats);
    }

    println!("{}", "Graph Statistics".cyan().bold());
    println!();
    println!("  {} {}", "Nodes:".dimmed(), stats.node_count);
    println!("  {} {}", "Edges:".dimmed(), stats.edge_count);
    println!("  {} {}", "Sources:".dimmed(), stats.sources);
    println!("  {} {}", "Sinks:".dimmed(), stats.sinks);

    Ok(())
}

/// Export the parsed edges as JSON.
pub fn export(file: &Path, output: Option<&Path>, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let export = serde_json::json!({
        "stats": graph.stats(),
        "edges": graph.export_edges(),
    });

    match output {
        Some(out_path) => {
            fs::write(out_path, serde_json::to_string_pretty(&export)?)?;
            println!("{} Exported to {}", "✓".green(), out_path.display());
            Ok(())
        }
        None => print_json(&export),
    }
}

/// Shortest path by edge count.
pub fn bfs(file: &Path, src: NodeId, tgt: NodeId, flow_mode: bool, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let path = toolkit::bfs(&graph, src, tgt, flow_mode)?;

    if options.json {
        return print_json(&path);
    }

    if path.is_empty() {
        println!("{} {} is unreachable from {}", "✗".red(), tgt, src);
    } else {
        let hops: Vec<String> = path.iter().map(|id| id.to_string()).collect();
        println!("{} {}", "Path:".dimmed(), hops.join(" → ").cyan());
        println!("{} {}", "Hops:".dimmed(), path.len() - 1);
    }

    Ok(())
}

/// Depth-first discovery and finish times.
pub fn dfs(file: &Path, src: NodeId, forest: bool, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let stamps = if forest {
        toolkit::dfs_forest(&graph, src)?
    } else {
        toolkit::dfs_tree(&graph, src)?
    };
    let mut rows: Vec<_> = stamps.into_iter().collect();
    rows.sort_by_key(|(_, stamp)| stamp.start);

    if options.json {
        return print_json(&rows);
    }

    println!("{:>12}  {:>8}  {:>8}", "node".bold(), "start".bold(), "finish".bold());
    for (id, stamp) in rows {
        println!("{:>12}  {:>8}  {:>8}", id.to_string().cyan(), stamp.start, stamp.finish);
    }

    Ok(())
}

/// Topological order.
pub fn topsort(file: &Path, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let order = toolkit::top_sort(&graph)?;

    if options.json {
        return print_json(&order);
    }

    for (position, id) in order.iter().enumerate() {
        println!("{:>6}  {}", (position + 1).to_string().dimmed(), id);
    }

    Ok(())
}

/// Bellman-Ford distances from one node.
pub fn sssp(file: &Path, src: NodeId, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let distances = sorted(toolkit::single_source_shortest_path(&graph, src)?);

    if options.json {
        return print_json(&distances);
    }

    println!("Distances from {}:\n", src.to_string().cyan());
    for (id, distance) in distances {
        println!("  {:>12}  {}", id, format_distance(distance));
    }

    Ok(())
}

/// Floyd-Warshall distances between all pairs.
pub fn apsp(file: &Path, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let table: BTreeMap<NodeId, BTreeMap<NodeId, f64>> = toolkit::all_pairs_shortest_path(&graph)
        .into_iter()
        .map(|(id, row)| (id, sorted(row)))
        .collect();

    if options.json {
        return print_json(&table);
    }

    for (from, row) in table {
        let reachable: Vec<String> = row
            .iter()
            .filter(|(to, distance)| **to != from && distance.is_finite())
            .map(|(to, distance)| format!("{}:{}", to, distance))
            .collect();
        println!("{:>12}  {}", from.to_string().cyan(), reachable.join("  "));
    }

    Ok(())
}

/// Maximum flow and its per-edge assignment.
pub fn max_flow(file: &Path, src: NodeId, tgt: NodeId, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let assignment = toolkit::max_flow_assignment(&graph, src, tgt)?;

    if options.json {
        return print_json(&serde_json::json!({
            "source": src,
            "sink": tgt,
            "value": assignment.value,
            "edges": assignment.edges,
        }));
    }

    println!(
        "{} Max flow {} → {}: {}",
        "✓".green(),
        src,
        tgt,
        assignment.value.to_string().cyan().bold()
    );
    for edge in assignment.edges.iter().filter(|edge| edge.flow > 0) {
        println!(
            "  {:>8} → {:<8} {}/{}",
            edge.source, edge.target, edge.flow, edge.capacity
        );
    }

    Ok(())
}

/// Betweenness centrality.
pub fn betweenness(file: &Path, undirected: bool, top: Option<usize>, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let scores = if undirected {
        toolkit::undirected_betweenness_centrality(&graph)
    } else {
        toolkit::betweenness_centrality(&graph)
    };
    let rows = ranked(scores, top);

    if options.json {
        return print_json(&rows);
    }

    for (id, score) in rows {
        println!("  {:>12}  {:.4}", id.to_string().cyan(), score);
    }

    Ok(())
}

/// PageRank with convergence details.
pub fn pagerank(
    file: &Path,
    damping: Option<f64>,
    weighted: bool,
    top: Option<usize>,
    options: &Options,
) -> Result<()> {
    let graph = load(file, options)?;
    let weighting = if weighted {
        EdgeWeighting::Proportional
    } else {
        EdgeWeighting::Uniform
    };
    let mut config = options.config.page_rank(weighting);
    if let Some(damping) = damping {
        config.damping_factor = damping;
    }

    let report = toolkit::page_rank_report(&graph, &config)?;
    let iterations = report.iterations;
    let converged = report.converged;
    let rows = ranked(report.scores, top);

    if options.json {
        return print_json(&serde_json::json!({
            "iterations": iterations,
            "converged": converged,
            "scores": rows,
        }));
    }

    if converged {
        println!("{} Converged after {} iterations", "✓".green(), iterations);
    } else {
        println!("{} Stopped after {} iterations", "⚠".yellow(), iterations);
    }
    for (id, score) in rows {
        println!("  {:>12}  {:.6}", id.to_string().cyan(), score);
    }

    Ok(())
}

/// Strongly connected components.
pub fn scc(file: &Path, options: &Options) -> Result<()> {
    let graph = load(file, options)?;
    let mut components: Vec<Vec<NodeId>> = toolkit::strongly_connected_components(&graph)
        .into_iter()
        .map(|component| component.into_iter().collect())
        .collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    if options.json {
        return print_json(&components);
    }

    println!("Found {} components:\n", components.len());
    for component in components {
        let ids: Vec<String> = component.iter().map(|id| id.to_string()).collect();
        println!("  {} {}", format!("[{}]", component.len()).dimmed(), ids.join(", "));
    }

    Ok(())
}
