//! Retainer-path enumeration.
//!
//! Answers "who is keeping this object alive": walks the reverse-reference
//! index from a target node up toward the root, collecting acyclic
//! predecessor chains.

use crate::graph::HeapGraph;
use crate::predecessors::Predecessors;

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathConfig {
    /// Stop once this many paths have been collected.
    pub max_paths: usize,
    /// Maximum predecessor hops from the target; a reported path holds at
    /// most `max_depth + 1` nodes including the root.
    pub max_depth: usize,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_paths: 5,
            max_depth: 50,
        }
    }
}

/// One retaining chain, target first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetainerPath {
    /// Node handles from the target up to (when `reaches_root`) the root.
    pub nodes: Vec<usize>,
    pub reaches_root: bool,
}

/// Enumerates up to `config.max_paths` acyclic predecessor paths from
/// `target` to the root, in discovery order.
///
/// Reverse DFS on an explicit (node, cursor) frame stack. The visited set is
/// per-invocation and monotone, bounding the whole search to `O(N + E)`; the
/// root check precedes the visited check, so every node-disjoint alternate is
/// still discoverable. If the root cannot be reached the result is a single
/// rootless report holding only the target.
pub fn retainer_paths(
    graph: &HeapGraph,
    preds: &Predecessors,
    target: usize,
    config: PathConfig,
) -> Vec<RetainerPath> {
    let root = graph.root();
    if target == root {
        return vec![RetainerPath {
            nodes: vec![root],
            reaches_root: true,
        }];
    }

    let mut found: Vec<RetainerPath> = Vec::new();
    let mut visited = vec![false; graph.node_count()];
    visited[target] = true;

    // The frame stack mirrors `path`; each frame owns a cursor into its
    // node's predecessor list.
    let mut stack: Vec<(usize, usize)> = vec![(target, 0)];
    let mut path: Vec<usize> = vec![target];

    while let Some(frame) = stack.last_mut() {
        if found.len() >= config.max_paths {
            break;
        }
        let node = frame.0;
        let pred_list = preds.of(node);
        let mut descend = None;
        while frame.1 < pred_list.len() {
            let pred = pred_list[frame.1];
            frame.1 += 1;
            if pred == root {
                let mut nodes = path.clone();
                nodes.push(root);
                found.push(RetainerPath {
                    nodes,
                    reaches_root: true,
                });
                if found.len() >= config.max_paths {
                    break;
                }
                continue;
            }
            if !visited[pred] && path.len() < config.max_depth {
                descend = Some(pred);
                break;
            }
        }
        match descend {
            Some(pred) => {
                visited[pred] = true;
                stack.push((pred, 0));
                path.push(pred);
            }
            None => {
                stack.pop();
                path.pop();
            }
        }
    }

    if found.is_empty() {
        return vec![RetainerPath {
            nodes: vec![target],
            reaches_root: false,
        }];
    }
    found
}
