//! `build`, `solve` and `verify` commands.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pairgraph_core::{solve as solve_closures, verify as verify_closures, ClosureTable, Graph};
use tracing::{info, warn};

use crate::config::{ReportFormat, Settings, ADJACENCY_EXT, CLOSURE_EXT};
use crate::error::{CliError, CliResult};
use crate::report;

/// Build the adjacency list and write `<stem>.adj`.
pub fn build(settings: &Settings, input: &str) -> CliResult<PathBuf> {
    let (graph, path) = load(settings, input)?;
    write_adjacency_report(settings, &graph, &path)
}

/// Build, solve, and write both `<stem>.adj` and `<stem>.cnt`.
pub fn solve(settings: &Settings, input: &str) -> CliResult<(PathBuf, PathBuf)> {
    let (graph, path) = load(settings, input)?;
    let adj = write_adjacency_report(settings, &graph, &path)?;

    let (table, stats) = solve_closures(&graph, &settings.solve_options());
    println!("Elapsed time: {} ms", stats.elapsed.as_millis());
    println!(
        "Closures: {} ({} copied, {} traversed)",
        table.len(),
        stats.shortcuts,
        stats.traversals
    );

    let cnt = write_closure_report(settings, &table, &path)?;
    Ok((adj, cnt))
}

/// Solve and compare every closure against plain BFS.
///
/// Returns `CliError::Mismatch` when any closure differs.
pub fn verify(settings: &Settings, input: &str) -> CliResult<()> {
    let (graph, _) = load(settings, input)?;
    let (table, _) = solve_closures(&graph, &settings.solve_options());
    let mismatches = verify_closures(&graph, &table);

    if mismatches.is_empty() {
        println!("All {} closures match the reference traversal.", table.len());
        return Ok(());
    }

    for m in &mismatches {
        warn!(node = %m.node, origin = ?m.origin, "closure mismatch");
        println!(
            "{}: {} missing, {} extra",
            m.node,
            m.missing.len(),
            m.extra.len()
        );
    }
    Err(CliError::Mismatch(mismatches.len()))
}

fn load(settings: &Settings, input: &str) -> CliResult<(Graph, PathBuf)> {
    settings.validate()?;
    let path = settings.resolve_input(input);
    info!(path = %path.display(), "loading pair records");

    let mut graph = Graph::new();
    let stats = graph.load_file(&path)?;
    println!("Elapsed time: {} ms", stats.elapsed.as_millis());
    println!("\n<<< There are {} IDs in total. >>>", stats.nodes);
    println!("\n<<< There are {} nodes in total. >>>", stats.edges);
    Ok((graph, path))
}

fn write_adjacency_report(settings: &Settings, graph: &Graph, input: &Path) -> CliResult<PathBuf> {
    let out = settings.report_path(input, ADJACENCY_EXT);
    let mut w = BufWriter::new(File::create(&out)?);
    match settings.format {
        ReportFormat::Text => report::write_adjacency(&mut w, graph, settings.entries_per_line)?,
        ReportFormat::Json => report::write_adjacency_json(&mut w, graph)?,
    }
    w.flush()?;
    info!(path = %out.display(), "adjacency report written");
    Ok(out)
}

fn write_closure_report(
    settings: &Settings,
    table: &ClosureTable,
    input: &Path,
) -> CliResult<PathBuf> {
    let out = settings.report_path(input, CLOSURE_EXT);
    let mut w = BufWriter::new(File::create(&out)?);
    match settings.format {
        ReportFormat::Text => report::write_closures(&mut w, table, settings.entries_per_line)?,
        ReportFormat::Json => report::write_closures_json(&mut w, table)?,
    }
    w.flush()?;
    info!(path = %out.display(), "closure report written");
    Ok(out)
}
