//! Immutable heap-graph storage.
//!
//! Nodes and types are addressed by dense `usize` handles. Outgoing references
//! are packed in a CSR layout (an offsets array of length `N + 1` plus a flat
//! target array), so child enumeration is a borrowed-slice walk with no
//! per-node allocation. Child order is the loader's order and is preserved
//! exactly; post-order and dominator results are deterministic functions of it.

use crate::{Error, Result};

/// Sentinel for "no node" in derived tables (e.g. the root's immediate
/// dominator, or entries for nodes unreachable from the root).
pub const NO_NODE: usize = usize::MAX;

/// A loaded heap graph: node/type tables plus the designated root.
///
/// Constructed through [`HeapGraphBuilder`], which performs the one-time
/// validation pass. All accessors assume valid handles and index directly.
#[derive(Debug, Clone)]
pub struct HeapGraph {
    type_names: Vec<String>,
    node_types: Vec<usize>,
    shallow_sizes: Vec<u64>,
    addresses: Vec<u64>,
    child_offsets: Vec<usize>,
    child_targets: Vec<usize>,
    root: usize,
}

impl HeapGraph {
    pub fn node_count(&self) -> usize {
        self.node_types.len()
    }

    pub fn edge_count(&self) -> usize {
        self.child_targets.len()
    }

    pub fn type_count(&self) -> usize {
        self.type_names.len()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    /// Outgoing references of `node`, in loader order.
    pub fn children(&self, node: usize) -> &[usize] {
        &self.child_targets[self.child_offsets[node]..self.child_offsets[node + 1]]
    }

    /// Bytes occupied by the object itself, excluding referenced objects.
    /// Zero marks a synthetic placeholder node (roots, bookkeeping records).
    pub fn shallow_size(&self, node: usize) -> u64 {
        self.shallow_sizes[node]
    }

    pub fn type_of(&self, node: usize) -> usize {
        self.node_types[node]
    }

    /// Opaque 64-bit identifier, used only for display.
    pub fn address(&self, node: usize) -> u64 {
        self.addresses[node]
    }

    pub fn type_name(&self, type_id: usize) -> &str {
        &self.type_names[type_id]
    }

    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }
}

/// Assembles a [`HeapGraph`] from loader output.
///
/// The loader contract: a type-handle-to-name table, then per node a type
/// handle, shallow size, address and ordered child list. Child handles may
/// refer to nodes not added yet; everything is validated in
/// [`build`](Self::build), which is the single place malformed input is
/// rejected.
#[derive(Debug, Default)]
pub struct HeapGraphBuilder {
    type_names: Vec<String>,
    node_types: Vec<usize>,
    shallow_sizes: Vec<u64>,
    addresses: Vec<u64>,
    children: Vec<Vec<usize>>,
}

impl HeapGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type name, returning its dense handle.
    pub fn add_type(&mut self, name: impl Into<String>) -> usize {
        self.type_names.push(name.into());
        self.type_names.len() - 1
    }

    /// Appends a node, returning its handle.
    pub fn add_node(
        &mut self,
        type_id: usize,
        shallow_size: u64,
        address: u64,
        children: Vec<usize>,
    ) -> usize {
        self.node_types.push(type_id);
        self.shallow_sizes.push(shallow_size);
        self.addresses.push(address);
        self.children.push(children);
        self.node_types.len() - 1
    }

    /// Validates every handle and packs child lists into CSR form.
    pub fn build(self, root: usize) -> Result<HeapGraph> {
        let node_count = self.node_types.len();
        if root >= node_count {
            return Err(Error::InvalidRoot { root, node_count });
        }
        let type_count = self.type_names.len();
        for (node, &type_id) in self.node_types.iter().enumerate() {
            if type_id >= type_count {
                return Err(Error::TypeOutOfRange {
                    node,
                    type_id,
                    type_count,
                });
            }
        }

        let edge_count = self.children.iter().map(Vec::len).sum();
        let mut child_offsets = Vec::with_capacity(node_count + 1);
        let mut child_targets = Vec::with_capacity(edge_count);
        child_offsets.push(0);
        for (node, targets) in self.children.iter().enumerate() {
            for &child in targets {
                if child >= node_count {
                    return Err(Error::ChildOutOfRange {
                        node,
                        child,
                        node_count,
                    });
                }
                child_targets.push(child);
            }
            child_offsets.push(child_targets.len());
        }

        Ok(HeapGraph {
            type_names: self.type_names,
            node_types: self.node_types,
            shallow_sizes: self.shallow_sizes,
            addresses: self.addresses,
            child_offsets,
            child_targets,
            root,
        })
    }
}

/// Node attributes required to lift a petgraph node into a heap graph.
#[cfg(feature = "petgraph")]
pub trait HeapNodeWeight {
    fn type_id(&self) -> usize;
    fn shallow_size(&self) -> u64;
    fn address(&self) -> u64 {
        0
    }
}

#[cfg(feature = "petgraph")]
impl HeapGraph {
    /// Builds a heap graph from a directed petgraph whose node weights carry
    /// heap-object attributes.
    ///
    /// Node handles are petgraph indices. petgraph iterates outgoing
    /// neighbors newest-edge-first, so the list is reversed to recover
    /// insertion order (the stable child order everything downstream
    /// depends on).
    pub fn from_petgraph<N, E, Ix>(
        graph: &petgraph::Graph<N, E, petgraph::Directed, Ix>,
        type_names: Vec<String>,
        root: petgraph::graph::NodeIndex<Ix>,
    ) -> Result<HeapGraph>
    where
        N: HeapNodeWeight,
        Ix: petgraph::graph::IndexType,
    {
        let mut builder = HeapGraphBuilder::new();
        for name in type_names {
            builder.add_type(name);
        }
        for idx in graph.node_indices() {
            let weight = &graph[idx];
            let mut children: Vec<usize> = graph.neighbors(idx).map(|c| c.index()).collect();
            children.reverse();
            builder.add_node(
                weight.type_id(),
                weight.shallow_size(),
                weight.address(),
                children,
            );
        }
        builder.build(root.index())
    }
}
