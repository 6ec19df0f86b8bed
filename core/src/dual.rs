//! Dual-side index: for each node, the neighbors that are both one of its
//! outgoing targets and one of its incoming sources (a one-hop 2-cycle).

use std::collections::{BTreeSet, HashMap};

use crate::graph::NodeId;

/// Intersect two optional sorted sets. A missing side yields the empty set.
///
/// Walks the smaller set and probes the larger, O(min · log max).
pub fn intersect(
    forward: Option<&BTreeSet<NodeId>>,
    inverse: Option<&BTreeSet<NodeId>>,
) -> BTreeSet<NodeId> {
    let (Some(forward), Some(inverse)) = (forward, inverse) else {
        return BTreeSet::new();
    };

    let (small, large) = if forward.len() <= inverse.len() {
        (forward, inverse)
    } else {
        (inverse, forward)
    };

    small
        .iter()
        .filter(|id| large.contains(id))
        .copied()
        .collect()
}

/// Compute `forward[n] ∩ inverse[n]` for every node in `nodes`.
pub fn dual_side_index<I>(
    nodes: I,
    forward: &HashMap<NodeId, BTreeSet<NodeId>>,
    inverse: &HashMap<NodeId, BTreeSet<NodeId>>,
) -> HashMap<NodeId, BTreeSet<NodeId>>
where
    I: IntoIterator<Item = NodeId>,
{
    nodes
        .into_iter()
        .map(|node| (node, intersect(forward.get(&node), inverse.get(&node))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::new(s).unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<NodeId> {
        ids.iter().map(|s| id(s)).collect()
    }

    #[test]
    fn test_intersect_basic() {
        let f = set(&["A", "B", "C"]);
        let i = set(&["B", "C", "D", "E"]);
        assert_eq!(intersect(Some(&f), Some(&i)), set(&["B", "C"]));
        assert_eq!(intersect(Some(&i), Some(&f)), set(&["B", "C"]));
    }

    #[test]
    fn test_intersect_missing_side() {
        let f = set(&["A"]);
        assert!(intersect(Some(&f), None).is_empty());
        assert!(intersect(None, Some(&f)).is_empty());
        assert!(intersect(None, None).is_empty());
    }

    #[test]
    fn test_intersect_disjoint() {
        assert!(intersect(Some(&set(&["A"])), Some(&set(&["B"]))).is_empty());
    }

    #[test]
    fn test_index_covers_every_node() {
        let mut forward = HashMap::new();
        let mut inverse = HashMap::new();
        // A <-> B, A -> C, self loop on D
        forward.insert(id("A"), set(&["B", "C"]));
        forward.insert(id("B"), set(&["A"]));
        forward.insert(id("D"), set(&["D"]));
        inverse.insert(id("A"), set(&["B"]));
        inverse.insert(id("B"), set(&["A"]));
        inverse.insert(id("C"), set(&["A"]));
        inverse.insert(id("D"), set(&["D"]));

        let index = dual_side_index([id("A"), id("B"), id("D")], &forward, &inverse);
        assert_eq!(index.len(), 3);
        assert_eq!(index[&id("A")], set(&["B"]));
        assert_eq!(index[&id("B")], set(&["A"]));
        assert_eq!(index[&id("D")], set(&["D"]));
    }
}
