//! Post-order indexing of the reachable heap graph.

use crate::graph::HeapGraph;

/// Computes a post-order over all nodes reachable from the root.
///
/// Every node appears after all of its descendants under the DFS spanning
/// tree; the root is the final entry. When every node is reachable the result
/// is a permutation of `0..node_count`.
///
/// Iterative DFS with (node, child-cursor) frames and no recursion, so graphs
/// with millions of nodes and deep chains are fine. Each frame owns its
/// cursor: a node revisited as a shared child never disturbs another parent's
/// sibling walk. An already-visited child (duplicate edge, shared child, back
/// edge) advances the cursor and falls through to the next sibling rather
/// than terminating the frame.
pub fn post_order(graph: &HeapGraph) -> Vec<usize> {
    let node_count = graph.node_count();
    let mut order = Vec::with_capacity(node_count);
    let mut visited = vec![false; node_count];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let root = graph.root();
    visited[root] = true;
    stack.push((root, 0));

    while let Some(frame) = stack.last_mut() {
        let node = frame.0;
        let children = graph.children(node);
        let mut descend = None;
        while frame.1 < children.len() {
            let child = children[frame.1];
            frame.1 += 1;
            if !visited[child] {
                descend = Some(child);
                break;
            }
        }
        match descend {
            Some(child) => {
                visited[child] = true;
                stack.push((child, 0));
            }
            None => {
                order.push(node);
                stack.pop();
            }
        }
    }

    order
}
