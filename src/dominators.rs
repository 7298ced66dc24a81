//! Immediate-dominator computation.
//!
//! The iterative scheme of Cooper, Harvey and Kennedy (*A Simple, Fast
//! Dominance Algorithm*), run over the snapshot's post-order and
//! reverse-reference index, both of which the snapshot derives anyway. On
//! heap graphs (shallow, wide, few back edges) the fixed point is reached in
//! two or three sweeps, and the working set is a single `O(N)` array.

use crate::graph::{HeapGraph, NO_NODE};
use crate::predecessors::Predecessors;

/// Computes the immediate dominator of every node reachable from the root.
///
/// `idom[n]` is the closest strict ancestor through which every path from the
/// root to `n` passes. The root and unreachable nodes get [`NO_NODE`].
/// Self-loop edges carry no dominance information and are skipped. Output is
/// deterministic under fixed child order.
pub fn immediate_dominators(
    graph: &HeapGraph,
    post_order: &[usize],
    preds: &Predecessors,
) -> Vec<usize> {
    let node_count = graph.node_count();
    let root = graph.root();

    // Post-order position per node; NO_NODE marks unreachable.
    let mut order_index = vec![NO_NODE; node_count];
    for (position, &node) in post_order.iter().enumerate() {
        order_index[node] = position;
    }

    let mut idom = vec![NO_NODE; node_count];
    // Anchor the root to itself so intersection walks terminate; rewritten to
    // the sentinel before returning.
    idom[root] = root;

    let mut changed = true;
    while changed {
        changed = false;
        // Reverse post-order guarantees a node's DFS-tree parent is processed
        // before the node itself, so every node sees at least one processed
        // predecessor on the first sweep.
        for &node in post_order.iter().rev() {
            if node == root {
                continue;
            }
            let mut new_idom = NO_NODE;
            for &pred in preds.of(node) {
                if pred == node || idom[pred] == NO_NODE {
                    continue;
                }
                new_idom = if new_idom == NO_NODE {
                    pred
                } else {
                    intersect(&idom, &order_index, pred, new_idom)
                };
            }
            if new_idom != NO_NODE && idom[node] != new_idom {
                idom[node] = new_idom;
                changed = true;
            }
        }
    }

    idom[root] = NO_NODE;
    idom
}

/// Walks two dominator chains up to their closest common ancestor. Higher
/// post-order position means closer to the root.
fn intersect(idom: &[usize], order_index: &[usize], mut a: usize, mut b: usize) -> usize {
    while a != b {
        while order_index[a] < order_index[b] {
            a = idom[a];
        }
        while order_index[b] < order_index[a] {
            b = idom[b];
        }
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::HeapGraphBuilder;
    use crate::postorder::post_order;

    fn idoms_of(children: Vec<Vec<usize>>) -> Vec<usize> {
        let mut builder = HeapGraphBuilder::new();
        let ty = builder.add_type("T");
        for targets in children {
            builder.add_node(ty, 8, 0, targets);
        }
        let graph = builder.build(0).unwrap();
        let order = post_order(&graph);
        let preds = Predecessors::build(&graph);
        immediate_dominators(&graph, &order, &preds)
    }

    #[test]
    fn chain_dominators_are_parents() {
        let idom = idoms_of(vec![vec![1], vec![2], vec![3], vec![]]);
        assert_eq!(idom, vec![NO_NODE, 0, 1, 2]);
    }

    #[test]
    fn diamond_join_is_dominated_by_the_fork() {
        // 0 -> {1, 2}; 1 -> 3; 2 -> 3. Neither branch dominates the join.
        let idom = idoms_of(vec![vec![1, 2], vec![3], vec![3], vec![]]);
        assert_eq!(idom[1], 0);
        assert_eq!(idom[2], 0);
        assert_eq!(idom[3], 0);
    }

    #[test]
    fn cycle_member_is_dominated_by_its_entry() {
        // 0 -> 1; 1 -> 2; 2 -> 1. The back edge does not make 2 dominate 1.
        let idom = idoms_of(vec![vec![1], vec![2], vec![1]]);
        assert_eq!(idom[1], 0);
        assert_eq!(idom[2], 1);
    }

    #[test]
    fn loop_with_exit_keeps_header_dominance() {
        // 0 -> 1 (header); 1 -> 2 (body); 2 -> {1, 3}.
        let idom = idoms_of(vec![vec![1], vec![2], vec![1, 3], vec![]]);
        assert_eq!(idom[1], 0);
        assert_eq!(idom[2], 1);
        assert_eq!(idom[3], 2);
    }

    #[test]
    fn nested_fork_rejoins_at_the_inner_fork() {
        // 0 -> 1; 1 -> {2, 3}; 2 -> 4; 3 -> 4.
        let idom = idoms_of(vec![vec![1], vec![2, 3], vec![4], vec![4], vec![]]);
        assert_eq!(idom[4], 1);
    }

    #[test]
    fn self_loops_are_ignored() {
        let idom = idoms_of(vec![vec![1], vec![1, 2], vec![]]);
        assert_eq!(idom[1], 0);
        assert_eq!(idom[2], 1);
    }

    #[test]
    fn unreachable_nodes_have_no_dominator() {
        // 2 is disconnected.
        let idom = idoms_of(vec![vec![1], vec![], vec![1]]);
        assert_eq!(idom[1], 0);
        assert_eq!(idom[2], NO_NODE);
    }
}
