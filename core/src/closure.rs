use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, trace};

use crate::graph::{Graph, NodeId};

/// Whether a node may copy the finalized closure of a dual-side neighbor
/// instead of traversing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortcutPolicy {
    /// Copy from the first finalized dual-side neighbor (ascending order).
    #[default]
    DualSide,
    /// Always run the memoized traversal.
    Disabled,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions {
    pub shortcut: ShortcutPolicy,
}

/// How a closure was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClosureOrigin {
    /// Copied from the finalized closure of dual-side neighbor `via`.
    Shortcut { via: NodeId },
    /// Computed by the worklist traversal.
    Traversal,
}

/// Every node reachable from `node` through one or more edges, excluding `node`.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureEntry {
    pub node: NodeId,
    pub members: BTreeSet<NodeId>,
    pub origin: ClosureOrigin,
}

impl ClosureEntry {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Solved closures, ordered by descending closure size. Equal sizes keep
/// processing (ascending id) order.
#[derive(Debug, Default)]
pub struct ClosureTable {
    entries: Vec<ClosureEntry>,
    index: HashMap<NodeId, usize>,
}

impl ClosureTable {
    fn from_entries(mut entries: Vec<ClosureEntry>) -> Self {
        // Stable: ties stay in processing order.
        entries.sort_by(|a, b| b.len().cmp(&a.len()));
        let index = entries
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.node, idx))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, node: NodeId) -> Option<&ClosureEntry> {
        self.index.get(&node).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[ClosureEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClosureEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counters from one solve pass.
#[derive(Debug, Clone, Default)]
pub struct SolveStats {
    pub nodes: usize,
    /// Closures copied from a dual-side neighbor.
    pub shortcuts: usize,
    /// Closures computed by traversal.
    pub traversals: usize,
    /// Finalized closures absorbed during traversals.
    pub folds: usize,
    /// Nodes whose outgoing edges were expanded.
    pub expansions: usize,
    pub elapsed: Duration,
}

/// Finalized closures in processing order, addressable by node.
struct Finalized {
    entries: Vec<ClosureEntry>,
    index: HashMap<NodeId, usize>,
}

impl Finalized {
    fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
            index: HashMap::with_capacity(n),
        }
    }

    fn get(&self, node: &NodeId) -> Option<&ClosureEntry> {
        self.index.get(node).map(|&idx| &self.entries[idx])
    }

    fn push(&mut self, entry: ClosureEntry) {
        self.index.insert(entry.node, self.entries.len());
        self.entries.push(entry);
    }
}

/// Compute the reachability closure of every node with outgoing edges.
///
/// Nodes are processed in ascending id order. For each node:
///
/// 1. With [`ShortcutPolicy::DualSide`], the first dual-side neighbor `m`
///    whose closure is already finalized supplies the answer:
///    `closure(m) ∪ {m} \ {node}`. No traversal runs.
/// 2. Otherwise a FIFO traversal runs from `node`. A popped node that is
///    already finalized is folded: its closure joins the visited set and its
///    edges are not expanded.
///
/// A dual-side neighbor `m` has edges both ways with `node`, so the two reach
/// the same nodes and the copy in step 1 matches a full traversal. Use
/// [`verify`] to check a table against plain BFS.
pub fn solve(graph: &Graph, options: &SolveOptions) -> (ClosureTable, SolveStats) {
    let start = Instant::now();
    let mut stats = SolveStats {
        nodes: graph.node_count(),
        ..Default::default()
    };
    let mut done = Finalized::with_capacity(graph.node_count());

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    for entry in graph.adjacency() {
        let node = entry.source;

        if options.shortcut == ShortcutPolicy::DualSide {
            if let Some(copied) = shortcut(graph, node, &done) {
                trace!(node = %node, via = ?copied.origin, "closure copied");
                stats.shortcuts += 1;
                done.push(copied);
                continue;
            }
        }

        visited.clear();
        queue.clear();
        visited.insert(node);
        queue.push_back(node);

        while let Some(current) = queue.pop_front() {
            if !visited.contains(&current) {
                continue;
            }

            if let Some(solved) = done.get(&current) {
                stats.folds += 1;
                visited.extend(solved.members.iter().copied());
                continue;
            }

            stats.expansions += 1;
            for conn in graph.neighbors_out(current) {
                if visited.insert(conn.target) {
                    queue.push_back(conn.target);
                }
            }
        }

        visited.remove(&node);
        stats.traversals += 1;
        done.push(ClosureEntry {
            node,
            members: visited.drain().collect(),
            origin: ClosureOrigin::Traversal,
        });
    }

    let table = ClosureTable::from_entries(done.entries);
    stats.elapsed = start.elapsed();

    info!(
        nodes = stats.nodes,
        shortcuts = stats.shortcuts,
        traversals = stats.traversals,
        folds = stats.folds,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "closures solved"
    );

    (table, stats)
}

/// Copy the closure of the first finalized dual-side neighbor, if any.
fn shortcut(graph: &Graph, node: NodeId, done: &Finalized) -> Option<ClosureEntry> {
    let (via, solved) = graph
        .dual_side(node)?
        .iter()
        .find_map(|m| done.get(m).map(|solved| (*m, solved)))?;

    let mut members = solved.members.clone();
    members.insert(via);
    // A self-loop makes `node` its own dual-side neighbor.
    members.remove(&node);

    Some(ClosureEntry {
        node,
        members,
        origin: ClosureOrigin::Shortcut { via },
    })
}

/// Reference closure by plain BFS, with no memoization.
pub fn exact_closure(graph: &Graph, node: NodeId) -> BTreeSet<NodeId> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    visited.insert(node);
    queue.push_back(node);

    while let Some(current) = queue.pop_front() {
        for conn in graph.neighbors_out(current) {
            if visited.insert(conn.target) {
                queue.push_back(conn.target);
            }
        }
    }

    visited.remove(&node);
    visited.into_iter().collect()
}

/// A solved closure that differs from the reference closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosureMismatch {
    pub node: NodeId,
    pub origin: ClosureOrigin,
    /// Reachable but absent from the solved closure.
    pub missing: Vec<NodeId>,
    /// Present in the solved closure but not reachable.
    pub extra: Vec<NodeId>,
}

/// Compare every entry of `table` with [`exact_closure`].
pub fn verify(graph: &Graph, table: &ClosureTable) -> Vec<ClosureMismatch> {
    table
        .iter()
        .filter_map(|entry| {
            let exact = exact_closure(graph, entry.node);
            if exact == entry.members {
                return None;
            }
            Some(ClosureMismatch {
                node: entry.node,
                origin: entry.origin,
                missing: exact.difference(&entry.members).copied().collect(),
                extra: entry.members.difference(&exact).copied().collect(),
            })
        })
        .collect()
}
