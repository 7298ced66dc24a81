//! Retained-size propagation.

use crate::graph::{HeapGraph, NO_NODE};

/// Computes the retained size of every node in one post-order sweep.
///
/// A node's retained size is the total shallow size of its dominator-tree
/// subtree: the bytes that would be freed if the node were collected. The
/// root's retained size is the total shallow size of all reachable nodes.
///
/// Each entry starts at the node's shallow size; walking the post-order folds
/// every non-root node into its immediate dominator. The post-order property
/// guarantees a node is processed before its dominator, so the single pass is
/// exact. Unreachable nodes never appear in the post-order and are never
/// folded; their entries stay at shallow size.
///
/// Accumulation is `u64`; snapshots whose live bytes fit in 64 bits cannot
/// overflow.
pub fn retained_sizes(graph: &HeapGraph, post_order: &[usize], idom: &[usize]) -> Vec<u64> {
    let mut retained: Vec<u64> = (0..graph.node_count())
        .map(|node| graph.shallow_size(node))
        .collect();

    let Some((_root, body)) = post_order.split_last() else {
        return retained;
    };
    for &node in body {
        let dom = idom[node];
        if dom != NO_NODE {
            retained[dom] += retained[node];
        }
    }
    retained
}
