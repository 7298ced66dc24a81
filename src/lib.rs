//! # heapwalk
//!
//! Heap-snapshot retention analysis: post-order indexing, reverse-reference
//! lookup, dominator trees, and per-object retained sizes over managed-runtime
//! heap graphs, with type aggregation and pairwise snapshot comparison on top.
//!
//! ## Design contract
//!
//! - **Dense handles over pointers**: nodes and types are plain `usize`
//!   handles; every derived table is a flat array indexed by handle. Dumps
//!   regularly carry millions of objects, so cache locality and predictable
//!   allocation matter more than abstraction here.
//! - **Determinism is not optional**: for a fixed loader child order, the
//!   post-order, dominator tree, retained sizes, aggregation order and path
//!   enumeration are all reproducible. Diffing two runs of the same dump must
//!   be a no-op.
//! - **Frozen after construction**: a [`Snapshot`] derives everything eagerly
//!   and is immutable afterwards. Readers can share it freely; there is no
//!   interior mutability anywhere in the crate.
//! - **Explicit stacks, never recursion**: both the forward DFS and the
//!   reverse path search run on heap-allocated frame stacks, so graph depth is
//!   bounded by memory, not by the call stack.
//!
//! ## References (what motivated the implementations/tests)
//!
//! - Lengauer & Tarjan (1979): the classic near-linear dominator algorithm.
//! - Cooper, Harvey, Kennedy (2001): *A Simple, Fast Dominance Algorithm*,
//!   the iterative scheme used here; it reuses the post-order and the
//!   reverse-reference index that the snapshot builds anyway.
//! - The retained-size model of mainstream heap profilers: an object's
//!   retained size is the shallow size of its dominator-tree subtree.

pub mod aggregate;
pub mod compare;
pub mod dominators;
pub mod graph;
pub mod names;
pub mod paths;
pub mod postorder;
pub mod predecessors;
pub mod retained;
pub mod snapshot;

pub use aggregate::{type_statistics, TypeStats};
pub use compare::{
    compare, compare_instances, ComparisonResult, InstanceDetail, TypeDelta, TypeStatus,
};
pub use dominators::immediate_dominators;
#[cfg(feature = "petgraph")]
pub use graph::HeapNodeWeight;
pub use graph::{HeapGraph, HeapGraphBuilder, NO_NODE};
pub use names::TypeNameFormatter;
pub use paths::{retainer_paths, PathConfig, RetainerPath};
pub use postorder::post_order;
pub use predecessors::Predecessors;
pub use retained::retained_sizes;
pub use snapshot::{DominatorChain, HeapStatistics, Snapshot};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node {node} has child handle {child} out of range (node count {node_count})")]
    ChildOutOfRange {
        node: usize,
        child: usize,
        node_count: usize,
    },
    #[error("node {node} has type handle {type_id} out of range (type count {type_count})")]
    TypeOutOfRange {
        node: usize,
        type_id: usize,
        type_count: usize,
    },
    #[error("root handle {root} out of range (node count {node_count})")]
    InvalidRoot { root: usize, node_count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
