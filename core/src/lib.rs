//! pairgraph-core: adjacency lists and reachability closures from pair records.
//!
//! Reads a stream of fixed-width `(source, target, weight)` records, merges
//! them into a sorted adjacency list with forward, inverse and dual-side
//! indices, and computes every node's reachability closure with a memoized
//! traversal that reuses closures already solved.
//!
//! No I/O beyond reading the record stream; report formatting lives in the
//! CLI crate.

pub mod closure;
pub mod dual;
mod error;
mod graph;
pub mod record;

pub use closure::{
    exact_closure, solve, verify, ClosureEntry, ClosureMismatch, ClosureOrigin, ClosureTable,
    ShortcutPolicy, SolveOptions, SolveStats,
};
pub use error::{GraphError, Result};
pub use graph::{AdjacencyEntry, BuildStats, Connection, Graph, NodeId, NODE_ID_WIDTH};
pub use record::{EdgeRecord, RecordReader, RECORD_SIZE};
