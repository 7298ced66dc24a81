//! Snapshot construction and the read-only query surface.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::aggregate::{self, TypeStats};
use crate::dominators::immediate_dominators;
use crate::graph::{HeapGraph, NO_NODE};
use crate::names::TypeNameFormatter;
use crate::paths::{retainer_paths, PathConfig, RetainerPath};
use crate::postorder::post_order;
use crate::predecessors::Predecessors;
use crate::retained::retained_sizes;

/// Whole-heap totals plus loader-supplied runtime counters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeapStatistics {
    /// Reachable objects with nonzero shallow size.
    pub total_objects: u64,
    /// Total shallow bytes of reachable nodes.
    pub total_shallow: u64,
    /// Retained bytes at the root; equals `total_shallow` by construction.
    pub total_retained: u64,
    pub counters: BTreeMap<String, u64>,
}

/// An immutable, fully indexed heap graph.
///
/// Construction eagerly derives the post-order, the reverse-reference index,
/// the dominator tree and per-node retained sizes, then freezes everything.
/// Shared readers need no locking; there is no interior mutability.
///
/// Query handles must be valid node handles of the wrapped graph: queries on
/// a validated snapshot index directly and panic on out-of-range input.
#[derive(Debug, Clone)]
pub struct Snapshot {
    graph: HeapGraph,
    post_order: Vec<usize>,
    predecessors: Predecessors,
    idom: Vec<usize>,
    retained: Vec<u64>,
    formatter: TypeNameFormatter,
    counters: BTreeMap<String, u64>,
}

impl Snapshot {
    /// Indexes a validated heap graph: three linear passes plus the dominator
    /// build, `O(N + E)` memory.
    pub fn new(graph: HeapGraph) -> Self {
        Self::with_counters(graph, BTreeMap::new())
    }

    /// Like [`new`](Self::new), with loader-supplied counters passed through
    /// verbatim into [`heap_statistics`](Self::heap_statistics).
    pub fn with_counters(graph: HeapGraph, counters: BTreeMap<String, u64>) -> Self {
        let order = post_order(&graph);
        let predecessors = Predecessors::build(&graph);
        let idom = immediate_dominators(&graph, &order, &predecessors);
        let retained = retained_sizes(&graph, &order, &idom);
        let formatter = TypeNameFormatter::new(graph.type_names().iter().map(String::as_str));
        Self {
            graph,
            post_order: order,
            predecessors,
            idom,
            retained,
            formatter,
            counters,
        }
    }

    pub fn graph(&self) -> &HeapGraph {
        &self.graph
    }

    /// Reachable nodes, every node after its DFS descendants, root last.
    pub fn post_order(&self) -> &[usize] {
        &self.post_order
    }

    /// Nodes holding a direct reference to `node`.
    pub fn predecessors_of(&self, node: usize) -> &[usize] {
        self.predecessors.of(node)
    }

    /// Retained size in bytes: what collecting `node` would free.
    pub fn retained_size(&self, node: usize) -> u64 {
        self.retained[node]
    }

    /// The closest strict dominator, or `None` for the root and for
    /// unreachable nodes.
    pub fn immediate_dominator(&self, node: usize) -> Option<usize> {
        match self.idom[node] {
            NO_NODE => None,
            dom => Some(dom),
        }
    }

    /// Walks the dominator chain from `node` (inclusive) up to the root.
    pub fn dominators(&self, node: usize) -> DominatorChain<'_> {
        DominatorChain {
            idom: &self.idom,
            current: node,
        }
    }

    pub fn is_reachable(&self, node: usize) -> bool {
        node == self.graph.root() || self.idom[node] != NO_NODE
    }

    pub fn reachable_count(&self) -> usize {
        self.post_order.len()
    }

    pub fn heap_statistics(&self) -> HeapStatistics {
        let mut total_objects = 0u64;
        for &node in &self.post_order {
            if self.graph.shallow_size(node) > 0 {
                total_objects += 1;
            }
        }
        let total_bytes = self.retained[self.graph.root()];
        HeapStatistics {
            total_objects,
            total_shallow: total_bytes,
            total_retained: total_bytes,
            counters: self.counters.clone(),
        }
    }

    /// Per-type aggregation, sorted by retained size descending (ties by name
    /// ascending); `limit` truncates after sorting.
    pub fn type_statistics(&self, limit: Option<usize>) -> Vec<TypeStats> {
        aggregate::type_statistics(self, limit)
    }

    /// Display name for a type handle (see [`TypeNameFormatter`]).
    pub fn display_name(&self, type_id: usize) -> &str {
        self.formatter
            .display_name(self.graph.type_name(type_id))
    }

    /// Structured retainer paths for `node`.
    pub fn reference_paths_with(&self, node: usize, config: PathConfig) -> Vec<RetainerPath> {
        retainer_paths(&self.graph, &self.predecessors, node, config)
    }

    /// Up to `max` (default 5) rendered retainer chains, e.g.
    /// `Order@0x7f3a00 <- OrderCache@0x7f0000 <- [GC Root]@0x0`.
    pub fn reference_paths(&self, node: usize, max: Option<usize>) -> Vec<String> {
        let config = PathConfig {
            max_paths: max.unwrap_or_else(|| PathConfig::default().max_paths),
            ..PathConfig::default()
        };
        self.reference_paths_with(node, config)
            .iter()
            .map(|path| self.render_path(path))
            .collect()
    }

    fn render_path(&self, path: &RetainerPath) -> String {
        let mut out = String::new();
        for (i, &node) in path.nodes.iter().enumerate() {
            if i > 0 {
                out.push_str(" <- ");
            }
            let name = self.display_name(self.graph.type_of(node));
            let _ = write!(out, "{name}@{:#x}", self.graph.address(node));
        }
        if !path.reaches_root {
            out.push_str(" (no path to root)");
        }
        out
    }
}

/// Iterator over a node's dominators, from the node itself up to the root.
pub struct DominatorChain<'a> {
    idom: &'a [usize],
    current: usize,
}

impl Iterator for DominatorChain<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.current == NO_NODE {
            return None;
        }
        let node = self.current;
        self.current = self.idom[node];
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::HeapGraphBuilder;

    fn small_snapshot() -> Snapshot {
        let mut builder = HeapGraphBuilder::new();
        let root_ty = builder.add_type("[.NET Roots]");
        let cache_ty = builder.add_type("App.Services.OrderCache");
        let order_ty = builder.add_type("App.Orders.Order");
        builder.add_node(root_ty, 0, 0x0, vec![1]);
        builder.add_node(cache_ty, 48, 0x7f0000, vec![2]);
        builder.add_node(order_ty, 120, 0x7f3a00, vec![]);
        Snapshot::new(builder.build(0).unwrap())
    }

    #[test]
    fn statistics_count_nonzero_objects_only() {
        let snapshot = small_snapshot();
        let stats = snapshot.heap_statistics();
        assert_eq!(stats.total_objects, 2);
        assert_eq!(stats.total_shallow, 168);
        assert_eq!(stats.total_retained, 168);
        assert!(stats.counters.is_empty());
    }

    #[test]
    fn counters_pass_through_verbatim() {
        let mut builder = HeapGraphBuilder::new();
        let ty = builder.add_type("T");
        builder.add_node(ty, 0, 0, vec![]);
        let counters = BTreeMap::from([("gen0_collections".to_string(), 12u64)]);
        let snapshot = Snapshot::with_counters(builder.build(0).unwrap(), counters.clone());
        assert_eq!(snapshot.heap_statistics().counters, counters);
    }

    #[test]
    fn dominator_chain_walks_to_the_root() {
        let snapshot = small_snapshot();
        let chain: Vec<usize> = snapshot.dominators(2).collect();
        assert_eq!(chain, vec![2, 1, 0]);
        let root_chain: Vec<usize> = snapshot.dominators(0).collect();
        assert_eq!(root_chain, vec![0]);
    }

    #[test]
    fn reference_paths_render_display_names_and_addresses() {
        let snapshot = small_snapshot();
        let rendered = snapshot.reference_paths(2, None);
        assert_eq!(
            rendered,
            vec!["Order@0x7f3a00 <- OrderCache@0x7f0000 <- [GC Root]@0x0".to_string()]
        );
    }

    #[test]
    fn rootless_path_is_flagged_in_rendering() {
        let mut builder = HeapGraphBuilder::new();
        let ty = builder.add_type("App.Thing");
        builder.add_node(ty, 0, 0, vec![]);
        builder.add_node(ty, 8, 0xbeef, vec![]);
        let snapshot = Snapshot::new(builder.build(0).unwrap());
        let rendered = snapshot.reference_paths(1, None);
        assert_eq!(rendered, vec!["Thing@0xbeef (no path to root)".to_string()]);
    }

    #[test]
    fn construction_is_deterministic() {
        let a = small_snapshot();
        let b = small_snapshot();
        assert_eq!(a.post_order(), b.post_order());
        for node in 0..a.graph().node_count() {
            assert_eq!(a.retained_size(node), b.retained_size(node));
            assert_eq!(a.immediate_dominator(node), b.immediate_dominator(node));
            assert_eq!(a.predecessors_of(node), b.predecessors_of(node));
        }
    }
}
