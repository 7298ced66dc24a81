//! End-to-end triage walkthrough: build two synthetic snapshots of a leaking
//! order cache, rank types by retained bytes, show who retains the biggest
//! instance, and diff the snapshots.
//!
//! Run with `cargo run --example leak_triage`.

use std::collections::BTreeMap;

use heapwalk::{compare, HeapGraphBuilder, Snapshot, TypeStatus};

/// A synthetic heap: the root holds a cache, the cache holds `orders` orders,
/// each order holds one buffer.
fn capture(orders: usize) -> Snapshot {
    let mut builder = HeapGraphBuilder::new();
    let root_ty = builder.add_type("[.NET Roots]");
    let cache_ty = builder.add_type("App.Services.OrderCache");
    let order_ty = builder.add_type("App.Orders.Order");
    let buffer_ty = builder.add_type("System.Byte[]");

    // Handles: 0 root, 1 cache, then (order, buffer) pairs.
    let order_handles: Vec<usize> = (0..orders).map(|i| 2 + 2 * i).collect();
    builder.add_node(root_ty, 0, 0x0, vec![1]);
    builder.add_node(cache_ty, 48, 0x7f00_0000, order_handles);
    for i in 0..orders {
        let buffer = 2 + 2 * i + 1;
        builder.add_node(order_ty, 120, 0x1000_0000 + 0x100 * i as u64, vec![buffer]);
        builder.add_node(buffer_ty, 4096, 0x2000_0000 + 0x100 * i as u64, vec![]);
    }

    let counters = BTreeMap::from([
        ("gen0_collections".to_string(), 40 + orders as u64),
        ("gen2_collections".to_string(), 3),
    ]);
    Snapshot::with_counters(builder.build(0).unwrap(), counters)
}

fn main() {
    let baseline = capture(3);
    let current = capture(12);

    let stats = current.heap_statistics();
    println!(
        "current heap: {} objects, {} bytes live",
        stats.total_objects, stats.total_retained
    );

    println!("\ntop types by retained bytes:");
    for ts in current.type_statistics(Some(5)) {
        println!(
            "  {:>10} B  {:>4} inst  {}",
            ts.retained_size,
            ts.instance_count,
            current.display_name(ts.type_id)
        );
    }

    // Who is keeping the biggest single object alive?
    let tops = current.type_statistics(Some(1));
    let top = &tops[0];
    let culprit = top.instances[0];
    println!("\nretention paths for the first {} instance:", top.name);
    for line in current.reference_paths(culprit, None) {
        println!("  {line}");
    }

    println!("\nbaseline -> current:");
    let diff = compare(&baseline, &current);
    println!(
        "  {:+} objects, {:+} retained bytes",
        diff.object_count_delta, diff.retained_delta
    );
    for delta in diff
        .type_deltas
        .iter()
        .filter(|d| d.status != TypeStatus::Unchanged)
    {
        println!(
            "  {:?} {} ({:+} inst, {:+} B retained)",
            delta.status, delta.name, delta.count_delta, delta.retained_delta
        );
    }
}
