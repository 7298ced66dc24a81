//! Per-type aggregation of instance counts and sizes.

use crate::snapshot::Snapshot;

/// Aggregated statistics for one object type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeStats {
    pub type_id: usize,
    /// Raw type name, the identity and join key. Display shortening lives in
    /// [`TypeNameFormatter`](crate::names::TypeNameFormatter).
    pub name: String,
    pub instance_count: u64,
    /// Sum of instance shallow sizes.
    pub shallow_size: u64,
    /// Sum of instance retained sizes.
    pub retained_size: u64,
    /// Instance node handles, ascending.
    pub instances: Vec<usize>,
}

impl TypeStats {
    /// Mean shallow bytes per instance.
    pub fn average_shallow(&self) -> u64 {
        if self.instance_count == 0 {
            0
        } else {
            self.shallow_size / self.instance_count
        }
    }
}

/// Groups reachable nodes by type handle.
///
/// Zero-size nodes are synthetic placeholders (roots and bookkeeping
/// records), not user data, and are excluded; types whose every node is
/// synthetic do not appear at all. Results sort by retained size descending,
/// ties by name ascending; `limit` truncates after sorting.
///
/// Keyed by type handle: distinct handles sharing a name stay separate here.
/// The cross-snapshot comparator sums them by name when joining.
pub fn type_statistics(snapshot: &Snapshot, limit: Option<usize>) -> Vec<TypeStats> {
    let graph = snapshot.graph();
    let mut by_type: Vec<Option<TypeStats>> = vec![None; graph.type_count()];

    for node in 0..graph.node_count() {
        if graph.shallow_size(node) == 0 || !snapshot.is_reachable(node) {
            continue;
        }
        let type_id = graph.type_of(node);
        let entry = by_type[type_id].get_or_insert_with(|| TypeStats {
            type_id,
            name: graph.type_name(type_id).to_string(),
            instance_count: 0,
            shallow_size: 0,
            retained_size: 0,
            instances: Vec::new(),
        });
        entry.instance_count += 1;
        entry.shallow_size += graph.shallow_size(node);
        entry.retained_size += snapshot.retained_size(node);
        entry.instances.push(node);
    }

    let mut stats: Vec<TypeStats> = by_type.into_iter().flatten().collect();
    stats.sort_by(|a, b| {
        b.retained_size
            .cmp(&a.retained_size)
            .then_with(|| a.name.cmp(&b.name))
    });
    if let Some(limit) = limit {
        stats.truncate(limit);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::HeapGraphBuilder;

    fn snapshot() -> Snapshot {
        let mut builder = HeapGraphBuilder::new();
        let root_ty = builder.add_type("[.NET Roots]");
        let a_ty = builder.add_type("A");
        let b_ty = builder.add_type("B");
        let c_ty = builder.add_type("C");
        builder.add_node(root_ty, 0, 0, vec![1, 2, 3, 4]);
        builder.add_node(a_ty, 10, 0, vec![]);
        builder.add_node(a_ty, 10, 0, vec![]);
        builder.add_node(b_ty, 20, 0, vec![]);
        builder.add_node(c_ty, 0, 0, vec![]);
        Snapshot::new(builder.build(0).unwrap())
    }

    #[test]
    fn aggregates_counts_and_sizes_per_type() {
        let stats = snapshot().type_statistics(None);
        assert_eq!(stats.len(), 2);

        // B retains 20, A retains 20: the tie breaks by name ascending.
        assert_eq!(stats[0].name, "A");
        assert_eq!(stats[0].instance_count, 2);
        assert_eq!(stats[0].shallow_size, 20);
        assert_eq!(stats[0].retained_size, 20);
        assert_eq!(stats[0].instances, vec![1, 2]);

        assert_eq!(stats[1].name, "B");
        assert_eq!(stats[1].instance_count, 1);
        assert_eq!(stats[1].shallow_size, 20);
        assert!(stats[1].retained_size >= 20);
    }

    #[test]
    fn zero_size_nodes_are_excluded() {
        let stats = snapshot().type_statistics(None);
        assert!(stats.iter().all(|s| s.name != "C"));
        assert!(stats.iter().all(|s| s.name != "[.NET Roots]"));
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let stats = snapshot().type_statistics(Some(1));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "A");
    }

    #[test]
    fn unreachable_instances_are_excluded() {
        let mut builder = HeapGraphBuilder::new();
        let root_ty = builder.add_type("[.NET Roots]");
        let a_ty = builder.add_type("A");
        builder.add_node(root_ty, 0, 0, vec![1]);
        builder.add_node(a_ty, 10, 0, vec![]);
        builder.add_node(a_ty, 10, 0, vec![]); // disconnected
        let stats = Snapshot::new(builder.build(0).unwrap()).type_statistics(None);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].instance_count, 1);
        assert_eq!(stats[0].instances, vec![1]);
    }

    #[test]
    fn retained_dominates_sort_order() {
        let mut builder = HeapGraphBuilder::new();
        let root_ty = builder.add_type("[.NET Roots]");
        let small_ty = builder.add_type("Zz.Small");
        let holder_ty = builder.add_type("Aa.Holder");
        builder.add_node(root_ty, 0, 0, vec![1, 2]);
        builder.add_node(small_ty, 8, 0, vec![]);
        builder.add_node(holder_ty, 4, 0, vec![3]);
        builder.add_node(small_ty, 100, 0, vec![]);
        let stats = Snapshot::new(builder.build(0).unwrap()).type_statistics(None);

        // Small retains 108 across its two instances, Holder retains 104.
        assert_eq!(stats[0].name, "Zz.Small");
        assert_eq!(stats[0].retained_size, 108);
        assert_eq!(stats[1].name, "Aa.Holder");
        assert_eq!(stats[1].retained_size, 104);
    }

    #[test]
    fn average_shallow_is_count_weighted() {
        let stats = snapshot().type_statistics(None);
        assert_eq!(stats[0].average_shallow(), 10);
    }
}
