//! Adjacency and closure reports.
//!
//! Text layout:
//!
//! ```text
//! <<< There are 2 IDs in total. >>>
//! [  1] A: 
//!     ( 1) B,    1.5    ( 2) C,      2
//! [  2] B: 
//!     ( 1) C,      1
//! <<< There are 3 nodes in total. >>>
//! ```
//!
//! Entries are tab-prefixed and a line break follows every
//! `entries_per_line` entries. The closure report uses `[rank] id(size):`
//! headers and has no trailer.

use std::collections::BTreeSet;
use std::io::{self, Write};

use pairgraph_core::{AdjacencyEntry, ClosureOrigin, ClosureTable, Connection, Graph, NodeId};
use serde::Serialize;

/// Significant digits in text-report weights.
const WEIGHT_PRECISION: i32 = 6;

pub fn write_adjacency<W: Write>(w: &mut W, graph: &Graph, per_line: usize) -> io::Result<()> {
    writeln!(w, "<<< There are {} IDs in total. >>>", graph.node_count())?;

    let mut total = 0usize;
    for (rank, entry) in graph.adjacency().iter().enumerate() {
        writeln!(w, "[{:>3}] {}: ", rank + 1, entry.source)?;
        for (j, conn) in entry.connections.iter().enumerate() {
            total += 1;
            write!(
                w,
                "\t({:>2}) {},{:>7}",
                j + 1,
                conn.target,
                format_weight(conn.weight)
            )?;
            if (j + 1) % per_line == 0 {
                writeln!(w)?;
            }
        }
        writeln!(w)?;
    }

    writeln!(w, "<<< There are {} nodes in total. >>>", total)?;
    Ok(())
}

pub fn write_closures<W: Write>(w: &mut W, table: &ClosureTable, per_line: usize) -> io::Result<()> {
    writeln!(w, "<<< There are {} IDs in total. >>>", table.len())?;

    for (rank, entry) in table.iter().enumerate() {
        writeln!(w, "[{:>3}] {}({}): ", rank + 1, entry.node, entry.len())?;
        for (j, member) in entry.members.iter().enumerate() {
            write!(w, "\t({:>2}) {}", j + 1, member)?;
            if (j + 1) % per_line == 0 {
                writeln!(w)?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct AdjacencyRow<'a> {
    rank: usize,
    source: NodeId,
    connections: &'a [Connection],
}

#[derive(Serialize)]
struct AdjacencyReport<'a> {
    ids: usize,
    connections: usize,
    nodes: Vec<AdjacencyRow<'a>>,
}

#[derive(Serialize)]
struct ClosureRow<'a> {
    rank: usize,
    node: NodeId,
    size: usize,
    members: &'a BTreeSet<NodeId>,
    origin: ClosureOrigin,
}

#[derive(Serialize)]
struct ClosureReport<'a> {
    ids: usize,
    nodes: Vec<ClosureRow<'a>>,
}

fn adjacency_row((idx, entry): (usize, &AdjacencyEntry)) -> AdjacencyRow<'_> {
    AdjacencyRow {
        rank: idx + 1,
        source: entry.source,
        connections: &entry.connections,
    }
}

pub fn write_adjacency_json<W: Write>(w: &mut W, graph: &Graph) -> serde_json::Result<()> {
    let report = AdjacencyReport {
        ids: graph.node_count(),
        connections: graph.edge_count(),
        nodes: graph.adjacency().iter().enumerate().map(adjacency_row).collect(),
    };
    serde_json::to_writer_pretty(w, &report)
}

pub fn write_closures_json<W: Write>(w: &mut W, table: &ClosureTable) -> serde_json::Result<()> {
    let report = ClosureReport {
        ids: table.len(),
        nodes: table
            .iter()
            .enumerate()
            .map(|(idx, e)| ClosureRow {
                rank: idx + 1,
                node: e.node,
                size: e.len(),
                members: &e.members,
                origin: e.origin,
            })
            .collect(),
    };
    serde_json::to_writer_pretty(w, &report)
}

/// Shortest-form float with six significant digits: `1`, `2.5`, `0.0001`,
/// `1e-05`, `1.23457e+06`.
pub fn format_weight(weight: f32) -> String {
    let value = f64::from(weight);
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Round to the target precision first; rounding can bump the exponent.
    let sci = format!("{:.*e}", (WEIGHT_PRECISION - 1) as usize, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= WEIGHT_PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (WEIGHT_PRECISION - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairgraph_core::{solve, EdgeRecord, SolveOptions};

    fn graph(edges: &[(&str, &str, f32)]) -> Graph {
        let mut g = Graph::new();
        g.build(
            edges
                .iter()
                .map(|(from, to, w)| EdgeRecord::new(from, to, *w).unwrap()),
        );
        g
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(1.0), "1");
        assert_eq!(format_weight(2.5), "2.5");
        assert_eq!(format_weight(-3.25), "-3.25");
        assert_eq!(format_weight(0.0), "0");
        assert_eq!(format_weight(100000.0), "100000");
        assert_eq!(format_weight(1234567.0), "1.23457e+06");
        assert_eq!(format_weight(0.0001), "0.0001");
        assert_eq!(format_weight(0.00001), "1e-05");
        assert_eq!(format_weight(2345678.0), "2.34568e+06");
        assert_eq!(format_weight(f32::INFINITY), "inf");
    }

    #[test]
    fn test_adjacency_text() {
        let g = graph(&[("B", "C", 1.0), ("A", "C", 2.0), ("A", "B", 1.5)]);
        let text = render(|w| write_adjacency(w, &g, 12));
        let expected = "<<< There are 2 IDs in total. >>>\n\
                        [  1] A: \n\
                        \t( 1) B,    1.5\t( 2) C,      2\n\
                        [  2] B: \n\
                        \t( 1) C,      1\n\
                        <<< There are 3 nodes in total. >>>\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_adjacency_wraps() {
        let g = graph(&[("A", "B", 1.0), ("A", "C", 1.0), ("A", "D", 1.0)]);
        let text = render(|w| write_adjacency(w, &g, 2));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "[  1] A: ");
        assert_eq!(lines[2], "\t( 1) B,      1\t( 2) C,      1");
        assert_eq!(lines[3], "\t( 3) D,      1");
    }

    #[test]
    fn test_exact_multiple_leaves_blank_line() {
        let g = graph(&[("A", "B", 1.0), ("A", "C", 1.0)]);
        let text = render(|w| write_adjacency(w, &g, 2));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "\t( 1) B,      1\t( 2) C,      1");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_closure_text() {
        let g = graph(&[("A", "B", 1.0), ("B", "C", 2.0), ("C", "A", 3.0), ("D", "A", 4.0)]);
        let (table, _) = solve(&g, &SolveOptions::default());
        let text = render(|w| write_closures(w, &table, 12));
        let expected = "<<< There are 4 IDs in total. >>>\n\
                        [  1] D(3): \n\
                        \t( 1) A\t( 2) B\t( 3) C\n\
                        [  2] A(2): \n\
                        \t( 1) B\t( 2) C\n\
                        [  3] B(2): \n\
                        \t( 1) A\t( 2) C\n\
                        [  4] C(2): \n\
                        \t( 1) A\t( 2) B\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_reports() {
        let g = Graph::new();
        let adj = render(|w| write_adjacency(w, &g, 12));
        assert_eq!(
            adj,
            "<<< There are 0 IDs in total. >>>\n<<< There are 0 nodes in total. >>>\n"
        );
        let (table, _) = solve(&g, &SolveOptions::default());
        let cnt = render(|w| write_closures(w, &table, 12));
        assert_eq!(cnt, "<<< There are 0 IDs in total. >>>\n");
    }

    #[test]
    fn test_adjacency_json() {
        let g = graph(&[("A", "B", 1.5), ("A", "B", 2.0)]);
        let mut buf = Vec::new();
        write_adjacency_json(&mut buf, &g).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["ids"], 1);
        assert_eq!(value["connections"], 2);
        assert_eq!(value["nodes"][0]["source"], "A");
        assert_eq!(value["nodes"][0]["connections"][0]["target"], "B");
    }

    #[test]
    fn test_closures_json() {
        let g = graph(&[("A", "B", 1.0), ("B", "A", 1.0)]);
        let (table, _) = solve(&g, &SolveOptions::default());
        let mut buf = Vec::new();
        write_closures_json(&mut buf, &table).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["ids"], 2);
        assert_eq!(value["nodes"][0]["node"], "A");
        assert_eq!(value["nodes"][0]["origin"]["kind"], "traversal");
        assert_eq!(value["nodes"][1]["origin"]["kind"], "shortcut");
        assert_eq!(value["nodes"][1]["origin"]["via"], "A");
        assert_eq!(value["nodes"][1]["members"][0], "A");
    }
}
