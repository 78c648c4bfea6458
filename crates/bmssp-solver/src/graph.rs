//! Graph representations for the solver.
//!
//! The solver reads graphs through the [`Adjacency`] capability: node id in,
//! outgoing (neighbor, weight) slice out. Node ids are opaque and need not be
//! contiguous; an id without outgoing edges, including one the graph has never
//! seen, yields an empty slice and so behaves as an isolated node.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Node identifier type (u64)
pub type NodeId = u64;

/// Read access to a node's outgoing edges.
pub trait Adjacency {
    /// Outgoing (neighbor, weight) pairs of `node`, in a stable order.
    fn outgoing(&self, node: NodeId) -> &[(NodeId, f64)];
}

/// Insertion-ordered adjacency map; the caller-facing graph builder.
///
/// Nodes and edges iterate in the order they were added, so repeated solves
/// over the same build sequence scan edges identically. Parallel edges are
/// kept as-is; the search simply never improves through the heavier one.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AdjacencyMap {
    out_edges: IndexMap<NodeId, Vec<(NodeId, f64)>>,
    edge_count: usize,
}

impl AdjacencyMap {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize `node` with an (initially empty) edge list.
    pub fn ensure_node(&mut self, node: NodeId) {
        self.out_edges.entry(node).or_default();
    }

    /// Append a directed edge. The target is not materialized: a pure sink
    /// needs no entry of its own.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: f64) {
        self.out_edges.entry(from).or_default().push((to, weight));
        self.edge_count += 1;
    }

    /// Number of nodes with an adjacency entry.
    pub fn node_count(&self) -> usize {
        self.out_edges.len()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether `node` has an adjacency entry.
    pub fn contains(&self, node: NodeId) -> bool {
        self.out_edges.contains_key(&node)
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges.keys().copied()
    }

    /// Every (from, to, weight) triple in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.out_edges.iter().flat_map(|(&from, targets)| {
            targets.iter().map(move |&(to, weight)| (from, to, weight))
        })
    }
}

impl Adjacency for AdjacencyMap {
    fn outgoing(&self, node: NodeId) -> &[(NodeId, f64)] {
        self.out_edges.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A dense copy of an adjacency map in compressed sparse row form: one flat
/// (neighbor, weight) array plus per-node offsets into it.
#[derive(Clone, Debug)]
pub struct CsrGraph {
    /// Mapping from dense index (0..N) back to node id
    pub index_to_node: Vec<NodeId>,
    /// Mapping from node id to dense index
    pub node_to_index: FxHashMap<NodeId, usize>,
    /// Offsets into `edges`. Size = node_count + 1
    pub offsets: Vec<usize>,
    /// Contiguous (neighbor, weight) pairs
    pub edges: Vec<(NodeId, f64)>,
}

impl CsrGraph {
    /// Flatten an adjacency map, preserving its node and edge order.
    pub fn from_adjacency(map: &AdjacencyMap) -> Self {
        let mut index_to_node = Vec::with_capacity(map.node_count());
        let mut node_to_index =
            FxHashMap::with_capacity_and_hasher(map.node_count(), Default::default());
        for (index, node) in map.nodes().enumerate() {
            index_to_node.push(node);
            node_to_index.insert(node, index);
        }

        let mut offsets = Vec::with_capacity(map.node_count() + 1);
        let mut edges = Vec::with_capacity(map.edge_count());
        offsets.push(0);
        for &node in &index_to_node {
            edges.extend_from_slice(map.outgoing(node));
            offsets.push(edges.len());
        }

        CsrGraph {
            index_to_node,
            node_to_index,
            offsets,
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.index_to_node.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl Adjacency for CsrGraph {
    fn outgoing(&self, node: NodeId) -> &[(NodeId, f64)] {
        match self.node_to_index.get(&node) {
            Some(&index) => &self.edges[self.offsets[index]..self.offsets[index + 1]],
            None => &[],
        }
    }
}
