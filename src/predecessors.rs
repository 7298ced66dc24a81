//! Reverse-reference (retainer) index.
//!
//! A packed CSR inverse of the forward child relation: an offsets array of
//! length `N + 1` and a flat predecessor array of length `E`. This is a
//! standalone table, not a back-pointer inside the node: nodes never own
//! each other, the index just borrows handles.

use crate::graph::HeapGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predecessors {
    offsets: Vec<usize>,
    preds: Vec<usize>,
}

impl Predecessors {
    /// Inverts the child relation in `O(N + E)`: one counting pass, a prefix
    /// sum, one scatter pass.
    ///
    /// For a given node, predecessors enumerate in ascending (source handle,
    /// edge position) order, stable across calls and runs. Duplicate forward
    /// edges produce duplicate entries, so the index is an exact multiset
    /// inverse.
    pub fn build(graph: &HeapGraph) -> Self {
        let node_count = graph.node_count();

        let mut offsets = vec![0usize; node_count + 1];
        for node in 0..node_count {
            for &child in graph.children(node) {
                offsets[child + 1] += 1;
            }
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets[..node_count].to_vec();
        let mut preds = vec![0usize; offsets[node_count]];
        for node in 0..node_count {
            for &child in graph.children(node) {
                preds[cursor[child]] = node;
                cursor[child] += 1;
            }
        }

        Self { offsets, preds }
    }

    /// All nodes holding a reference to `node`.
    pub fn of(&self, node: usize) -> &[usize] {
        &self.preds[self.offsets[node]..self.offsets[node + 1]]
    }

    pub fn edge_count(&self) -> usize {
        self.preds.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::HeapGraphBuilder;

    fn graph_from(children: Vec<Vec<usize>>) -> HeapGraph {
        let mut builder = HeapGraphBuilder::new();
        let ty = builder.add_type("T");
        for targets in children {
            builder.add_node(ty, 8, 0, targets);
        }
        builder.build(0).unwrap()
    }

    #[test]
    fn inverts_the_child_relation() {
        // 0 -> {1, 2}; 1 -> 2; 2 -> 0
        let graph = graph_from(vec![vec![1, 2], vec![2], vec![0]]);
        let preds = Predecessors::build(&graph);

        assert_eq!(preds.of(0), &[2]);
        assert_eq!(preds.of(1), &[0]);
        assert_eq!(preds.of(2), &[0, 1]);
        assert_eq!(preds.edge_count(), graph.edge_count());
    }

    #[test]
    fn duplicate_edges_are_preserved() {
        let graph = graph_from(vec![vec![1, 1], vec![]]);
        let preds = Predecessors::build(&graph);
        assert_eq!(preds.of(1), &[0, 0]);
    }

    #[test]
    fn enumeration_is_stable() {
        let graph = graph_from(vec![vec![2], vec![2], vec![1]]);
        let preds = Predecessors::build(&graph);
        let first: Vec<usize> = preds.of(2).to_vec();
        assert_eq!(preds.of(2), first.as_slice());
        assert_eq!(first, vec![0, 1]);
    }

    #[test]
    fn leaf_has_no_predecessor_storage() {
        let graph = graph_from(vec![vec![]]);
        let preds = Predecessors::build(&graph);
        assert_eq!(preds.of(0), &[] as &[usize]);
        assert_eq!(preds.edge_count(), 0);
    }
}
