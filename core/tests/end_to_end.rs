use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;

use pairgraph_core::record::{encode, write_records};
use pairgraph_core::{solve, EdgeRecord, Graph, GraphError, NodeId, SolveOptions};

fn id(s: &str) -> NodeId {
    NodeId::new(s).unwrap()
}

fn set(ids: &[&str]) -> BTreeSet<NodeId> {
    ids.iter().map(|s| id(s)).collect()
}

fn cycle_with_tail() -> Vec<EdgeRecord> {
    vec![
        EdgeRecord::new("A", "B", 1.0).unwrap(),
        EdgeRecord::new("B", "C", 2.0).unwrap(),
        EdgeRecord::new("C", "A", 3.0).unwrap(),
        EdgeRecord::new("D", "A", 4.0).unwrap(),
    ]
}

#[test]
fn test_cycle_with_tail_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pairs1.bin");
    let mut file = File::create(&path).unwrap();
    write_records(&mut file, &cycle_with_tail()).unwrap();
    drop(file);

    let mut g = Graph::new();
    let stats = g.load_file(&path).unwrap();
    assert_eq!(stats.records, 4);
    assert_eq!(stats.dropped_bytes, 0);

    let adjacency: Vec<(NodeId, Vec<(NodeId, f32)>)> = g
        .adjacency()
        .iter()
        .map(|e| {
            (
                e.source,
                e.connections.iter().map(|c| (c.target, c.weight)).collect(),
            )
        })
        .collect();
    assert_eq!(
        adjacency,
        vec![
            (id("A"), vec![(id("B"), 1.0)]),
            (id("B"), vec![(id("C"), 2.0)]),
            (id("C"), vec![(id("A"), 3.0)]),
            (id("D"), vec![(id("A"), 4.0)]),
        ]
    );

    let (table, _) = solve(&g, &SolveOptions::default());
    let closures: Vec<(NodeId, BTreeSet<NodeId>)> =
        table.iter().map(|e| (e.node, e.members.clone())).collect();
    assert_eq!(
        closures,
        vec![
            (id("D"), set(&["A", "B", "C"])),
            (id("A"), set(&["B", "C"])),
            (id("B"), set(&["A", "C"])),
            (id("C"), set(&["A", "B"])),
        ]
    );
}

#[test]
fn test_truncated_file_keeps_complete_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pairs2.bin");
    let mut file = File::create(&path).unwrap();
    write_records(&mut file, &cycle_with_tail()).unwrap();
    file.write_all(&encode(&EdgeRecord::new("E", "F", 1.0).unwrap())[..13])
        .unwrap();
    drop(file);

    let mut g = Graph::new();
    let stats = g.load_file(&path).unwrap();
    assert_eq!(stats.records, 4);
    assert_eq!(stats.dropped_bytes, 13);
    assert!(g.entry(id("E")).is_none());
}

#[test]
fn test_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pairs3.bin");
    File::create(&path).unwrap();

    let mut g = Graph::new();
    g.load_file(&path).unwrap();
    assert!(g.is_empty());
    let (table, _) = solve(&g, &SolveOptions::default());
    assert!(table.is_empty());
}

#[test]
fn test_missing_file_then_retry() {
    let dir = tempfile::tempdir().unwrap();
    let mut g = Graph::new();

    let err = g.load_file(dir.path().join("pairs9.bin")).unwrap_err();
    assert!(matches!(err, GraphError::MissingInput { .. }));
    assert!(g.is_empty());

    let path = dir.path().join("pairs4.bin");
    let mut file = File::create(&path).unwrap();
    write_records(&mut file, &cycle_with_tail()).unwrap();
    drop(file);

    g.load_file(&path).unwrap();
    assert_eq!(g.node_count(), 4);
}
