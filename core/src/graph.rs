use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::dual;
use crate::error::{GraphError, Result};
use crate::record::{EdgeRecord, RecordReader};

/// Width of the fixed, NUL-padded identifier field in a pair record.
pub const NODE_ID_WIDTH: usize = 12;

/// Fixed-width node identifier.
///
/// Stored NUL-padded so that the derived byte ordering is the lexicographic
/// ordering of the identifier text ("A" < "AB" < "B").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId([u8; NODE_ID_WIDTH]);

impl NodeId {
    /// Decode a NUL-padded field. Bytes after the first NUL are ignored.
    pub fn from_padded(raw: &[u8; NODE_ID_WIDTH]) -> Self {
        let len = raw.iter().position(|&b| b == 0).unwrap_or(NODE_ID_WIDTH);
        let mut bytes = [0u8; NODE_ID_WIDTH];
        bytes[..len].copy_from_slice(&raw[..len]);
        Self(bytes)
    }

    pub fn new(id: &str) -> Result<Self> {
        let raw = id.as_bytes();
        if raw.len() > NODE_ID_WIDTH || raw.contains(&0) {
            return Err(GraphError::InvalidNodeId(id.to_string()));
        }
        let mut bytes = [0u8; NODE_ID_WIDTH];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..self.len()]
    }

    pub fn len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(NODE_ID_WIDTH)
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// The on-disk field: identifier bytes followed by NUL padding.
    pub fn to_padded(&self) -> [u8; NODE_ID_WIDTH] {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl FromStr for NodeId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// One outgoing connection of an adjacency entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connection {
    pub target: NodeId,
    pub weight: f32,
}

/// All outgoing connections of one source node.
///
/// Duplicate `(source, target)` pairs are kept as separate connections.
#[derive(Debug, Clone, Serialize)]
pub struct AdjacencyEntry {
    pub source: NodeId,
    pub connections: Vec<Connection>,
}

impl AdjacencyEntry {
    fn new(record: &EdgeRecord) -> Self {
        Self {
            source: record.source,
            connections: vec![Connection {
                target: record.target,
                weight: record.weight,
            }],
        }
    }

    fn sort_connections(&mut self) {
        self.connections.sort_unstable_by(|a, b| a.target.cmp(&b.target));
    }
}

/// Summary of one build pass.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub records: usize,
    pub nodes: usize,
    pub edges: usize,
    /// Bytes of a truncated trailing record that were discarded.
    pub dropped_bytes: usize,
    pub elapsed: Duration,
}

/// Adjacency list plus the forward, inverse and dual-side indices.
///
/// Built from scratch on every `build*` call; nothing carries over between
/// builds. The adjacency list is sorted ascending by source, and each entry's
/// connections ascending by target.
pub struct Graph {
    adjacency: Vec<AdjacencyEntry>,
    position: HashMap<NodeId, usize>,
    forward: HashMap<NodeId, BTreeSet<NodeId>>,
    inverse: HashMap<NodeId, BTreeSet<NodeId>>,
    dual_side: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            adjacency: Vec::new(),
            position: HashMap::new(),
            forward: HashMap::new(),
            inverse: HashMap::new(),
            dual_side: HashMap::new(),
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            adjacency: Vec::with_capacity(node_count),
            position: HashMap::with_capacity(node_count),
            forward: HashMap::with_capacity(node_count),
            inverse: HashMap::with_capacity(node_count),
            dual_side: HashMap::with_capacity(node_count),
        }
    }

    /// Reset every structure to empty.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.position.clear();
        self.forward.clear();
        self.inverse.clear();
        self.dual_side.clear();
    }

    /// Build from already-decoded records. Any previous content is discarded.
    pub fn build<I>(&mut self, records: I) -> BuildStats
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        let start = Instant::now();
        self.clear();

        let mut count = 0usize;
        for record in records {
            self.add_record(&record);
            count += 1;
        }
        self.finalize();

        self.stats(count, 0, start.elapsed())
    }

    /// Build from a raw pair-record stream.
    ///
    /// A truncated trailing record is dropped. On a read error the graph is
    /// left cleared.
    pub fn build_from_reader<R: Read>(&mut self, reader: R) -> Result<BuildStats> {
        let start = Instant::now();
        self.clear();

        let mut records = RecordReader::new(reader);
        let mut count = 0usize;
        for record in records.by_ref() {
            match record {
                Ok(record) => {
                    self.add_record(&record);
                    count += 1;
                }
                Err(e) => {
                    self.clear();
                    return Err(e.into());
                }
            }
        }
        if records.dropped_bytes() > 0 {
            debug!(
                dropped_bytes = records.dropped_bytes(),
                "discarded truncated trailing record"
            );
        }
        self.finalize();

        Ok(self.stats(count, records.dropped_bytes(), start.elapsed()))
    }

    /// Open `path` and build from its records.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<BuildStats> {
        let path = path.as_ref();
        self.clear();
        let file = File::open(path).map_err(|source| GraphError::MissingInput {
            path: path.to_path_buf(),
            source,
        })?;
        self.build_from_reader(BufReader::new(file))
    }

    /// Merge one record into the unsorted adjacency list and the indices.
    fn add_record(&mut self, record: &EdgeRecord) {
        match self.position.get(&record.source) {
            Some(&idx) => {
                self.adjacency[idx].connections.push(Connection {
                    target: record.target,
                    weight: record.weight,
                });
                self.forward
                    .entry(record.source)
                    .or_default()
                    .insert(record.target);
            }
            None => {
                self.position.insert(record.source, self.adjacency.len());
                self.adjacency.push(AdjacencyEntry::new(record));
                self.forward
                    .insert(record.source, BTreeSet::from([record.target]));
            }
        }

        self.inverse
            .entry(record.target)
            .or_default()
            .insert(record.source);
    }

    /// Sort entries and connections, re-index positions, derive the dual-side index.
    fn finalize(&mut self) {
        // Sources are unique after merging, so no secondary key is needed.
        self.adjacency
            .sort_unstable_by(|a, b| a.source.cmp(&b.source));

        self.position.clear();
        for (idx, entry) in self.adjacency.iter_mut().enumerate() {
            self.position.insert(entry.source, idx);
            entry.sort_connections();
        }

        self.dual_side = dual::dual_side_index(
            self.adjacency.iter().map(|e| e.source),
            &self.forward,
            &self.inverse,
        );
    }

    fn stats(&self, records: usize, dropped_bytes: usize, elapsed: Duration) -> BuildStats {
        let stats = BuildStats {
            records,
            nodes: self.node_count(),
            edges: self.edge_count(),
            dropped_bytes,
            elapsed,
        };
        info!(
            records = stats.records,
            nodes = stats.nodes,
            edges = stats.edges,
            elapsed_ms = elapsed.as_millis() as u64,
            "adjacency list built"
        );
        stats
    }

    /// The adjacency list in final (ascending source) order.
    pub fn adjacency(&self) -> &[AdjacencyEntry] {
        &self.adjacency
    }

    pub fn entry(&self, id: NodeId) -> Option<&AdjacencyEntry> {
        self.position.get(&id).map(|&idx| &self.adjacency[idx])
    }

    /// Outgoing connections, sorted by target. Empty for nodes that only
    /// appear as targets.
    pub fn neighbors_out(&self, id: NodeId) -> &[Connection] {
        self.entry(id)
            .map(|e| e.connections.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct outgoing targets of `id`.
    pub fn forward_targets(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.forward.get(&id)
    }

    /// Distinct incoming sources of `id`.
    pub fn inverse_sources(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.inverse.get(&id)
    }

    /// Neighbors that are both an outgoing target and an incoming source of `id`.
    pub fn dual_side(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.dual_side.get(&id)
    }

    /// Number of nodes with at least one outgoing connection.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|e| e.connections.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let set_mem = |index: &HashMap<NodeId, BTreeSet<NodeId>>| -> usize {
            index
                .values()
                .map(|s| size_of::<NodeId>() * (s.len() + 1) + 48)
                .sum()
        };

        let adjacency_mem: usize = self
            .adjacency
            .iter()
            .map(|e| size_of::<AdjacencyEntry>() + e.connections.len() * size_of::<Connection>())
            .sum();
        let position_mem = self.position.len() * (size_of::<NodeId>() + size_of::<usize>() + 8);

        adjacency_mem
            + position_mem
            + set_mem(&self.forward)
            + set_mem(&self.inverse)
            + set_mem(&self.dual_side)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
