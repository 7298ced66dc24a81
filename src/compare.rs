//! Pairwise snapshot comparison.
//!
//! Joins two type aggregations by raw type name (outer union). Distinct type
//! handles sharing a name are summed before joining: handle assignment
//! differs between dumps, so names are the only stable join key.

use std::collections::BTreeMap;

use crate::snapshot::Snapshot;

/// How a type moved between two snapshots.
///
/// Exactly one status applies, in this precedence: `Added` (absent from the
/// baseline), `Removed` (absent from the current), `Changed` (count or
/// retained bytes moved), `Unchanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeStatus {
    Unchanged,
    Changed,
    Added,
    Removed,
}

/// Per-type-name comparison record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeDelta {
    pub name: String,
    pub baseline_count: u64,
    pub current_count: u64,
    pub baseline_shallow: u64,
    pub current_shallow: u64,
    pub baseline_retained: u64,
    pub current_retained: u64,
    pub count_delta: i64,
    pub shallow_delta: i64,
    pub retained_delta: i64,
    pub status: TypeStatus,
}

/// Per-instance detail attached by [`compare_instances`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceDetail {
    pub node: usize,
    pub address: u64,
    pub shallow_size: u64,
    pub retained_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonResult {
    pub object_count_delta: i64,
    pub shallow_delta: i64,
    pub retained_delta: i64,
    /// One record per type name observed in either snapshot, name ascending.
    pub type_deltas: Vec<TypeDelta>,
    pub new_types: Vec<String>,
    pub removed_types: Vec<String>,
    /// Populated by [`compare_instances`] only.
    pub baseline_instances: Vec<InstanceDetail>,
    pub current_instances: Vec<InstanceDetail>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    count: u64,
    shallow: u64,
    retained: u64,
}

fn totals_by_name(snapshot: &Snapshot) -> BTreeMap<String, Totals> {
    let mut by_name: BTreeMap<String, Totals> = BTreeMap::new();
    for stats in snapshot.type_statistics(None) {
        let entry = by_name.entry(stats.name).or_default();
        entry.count += stats.instance_count;
        entry.shallow += stats.shallow_size;
        entry.retained += stats.retained_size;
    }
    by_name
}

fn delta(baseline: u64, current: u64) -> i64 {
    current as i64 - baseline as i64
}

/// Compares two snapshots. Any two snapshots are comparable; there is no
/// mismatch condition.
pub fn compare(baseline: &Snapshot, current: &Snapshot) -> ComparisonResult {
    let base = totals_by_name(baseline);
    let curr = totals_by_name(current);

    let mut names: Vec<&String> = base.keys().chain(curr.keys()).collect();
    names.sort();
    names.dedup();

    let mut type_deltas = Vec::with_capacity(names.len());
    let mut new_types = Vec::new();
    let mut removed_types = Vec::new();

    for name in names {
        let b = base.get(name).copied().unwrap_or_default();
        let c = curr.get(name).copied().unwrap_or_default();
        let count_delta = delta(b.count, c.count);
        let retained_delta = delta(b.retained, c.retained);

        let status = if b.count == 0 && c.count > 0 {
            new_types.push(name.clone());
            TypeStatus::Added
        } else if b.count > 0 && c.count == 0 {
            removed_types.push(name.clone());
            TypeStatus::Removed
        } else if count_delta != 0 || retained_delta != 0 {
            TypeStatus::Changed
        } else {
            TypeStatus::Unchanged
        };

        type_deltas.push(TypeDelta {
            name: name.clone(),
            baseline_count: b.count,
            current_count: c.count,
            baseline_shallow: b.shallow,
            current_shallow: c.shallow,
            baseline_retained: b.retained,
            current_retained: c.retained,
            count_delta,
            shallow_delta: delta(b.shallow, c.shallow),
            retained_delta,
            status,
        });
    }

    let b_stats = baseline.heap_statistics();
    let c_stats = current.heap_statistics();

    ComparisonResult {
        object_count_delta: delta(b_stats.total_objects, c_stats.total_objects),
        shallow_delta: delta(b_stats.total_shallow, c_stats.total_shallow),
        retained_delta: delta(b_stats.total_retained, c_stats.total_retained),
        type_deltas,
        new_types,
        removed_types,
        baseline_instances: Vec::new(),
        current_instances: Vec::new(),
    }
}

/// [`compare`], plus the first `max` (default 10) instance records of
/// `type_name` from each side, in node-handle order.
pub fn compare_instances(
    baseline: &Snapshot,
    current: &Snapshot,
    type_name: &str,
    max: Option<usize>,
) -> ComparisonResult {
    let max = max.unwrap_or(10);
    let mut result = compare(baseline, current);
    result.baseline_instances = instance_details(baseline, type_name, max);
    result.current_instances = instance_details(current, type_name, max);
    result
}

fn instance_details(snapshot: &Snapshot, type_name: &str, max: usize) -> Vec<InstanceDetail> {
    let graph = snapshot.graph();
    let mut details = Vec::new();
    for node in 0..graph.node_count() {
        if details.len() == max {
            break;
        }
        if graph.shallow_size(node) == 0 || !snapshot.is_reachable(node) {
            continue;
        }
        if graph.type_name(graph.type_of(node)) != type_name {
            continue;
        }
        details.push(InstanceDetail {
            node,
            address: graph.address(node),
            shallow_size: graph.shallow_size(node),
            retained_size: snapshot.retained_size(node),
        });
    }
    details
}
