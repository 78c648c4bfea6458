//! Per-source priority-frontier search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use rustc_hash::FxHashMap;

use crate::error::{SolveError, SolveResult};
use crate::graph::{Adjacency, NodeId};
use crate::matrix::SolverConfig;

/// Shared cap on edge relaxations across every search of one solve call.
pub(crate) struct RelaxationBudget {
    limit: u64,
    used: AtomicU64,
}

impl RelaxationBudget {
    pub(crate) fn new(limit: u64) -> Self {
        Self {
            limit,
            used: AtomicU64::new(0),
        }
    }

    /// Charge `count` relaxations; errors once the running total passes the limit.
    pub(crate) fn charge(&self, count: u64) -> SolveResult<()> {
        let before = self.used.fetch_add(count, AtomicOrdering::Relaxed);
        if before.saturating_add(count) > self.limit {
            return Err(SolveError::RelaxationLimit { limit: self.limit });
        }
        Ok(())
    }
}

/// Frontier entry for the priority queue.
#[derive(Copy, Clone, PartialEq)]
struct State {
    dist: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare distances reversed for min-heap
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One full single-source search: best-known distance for every node
/// reachable from `source`, keyed by node id.
pub(crate) fn search<G: Adjacency>(
    graph: &G,
    source: NodeId,
    budget: &RelaxationBudget,
) -> SolveResult<FxHashMap<NodeId, f64>> {
    let mut dist: FxHashMap<NodeId, f64> = FxHashMap::default();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(State {
        dist: 0.0,
        node: source,
    });

    while let Some(State { dist: d, node: u }) = heap.pop() {
        // Stale entry: a shorter distance for this node was already settled.
        if d > *dist.get(&u).unwrap_or(&f64::INFINITY) {
            continue;
        }

        let edges = graph.outgoing(u);
        budget.charge(edges.len() as u64)?;

        for &(v, w) in edges {
            if w < 0.0 || !w.is_finite() {
                return Err(SolveError::InvalidWeight {
                    from: u,
                    to: v,
                    weight: w,
                });
            }
            let next = d + w;
            if next < *dist.get(&v).unwrap_or(&f64::INFINITY) {
                dist.insert(v, next);
                heap.push(State { dist: next, node: v });
            }
        }
    }

    Ok(dist)
}

/// Distances from `source` to every reachable node.
///
/// The relaxation cap in `config` applies to this single search.
pub fn distances_from<G: Adjacency>(
    graph: &G,
    source: NodeId,
    config: &SolverConfig,
) -> SolveResult<FxHashMap<NodeId, f64>> {
    let budget = RelaxationBudget::new(config.max_relaxations);
    search(graph, source, &budget)
}

/// Result of a point-to-point search.
#[derive(Debug, Clone)]
pub struct PathResult {
    pub source: NodeId,
    pub target: NodeId,
    pub path: Vec<NodeId>,
    pub cost: f64,
}

/// Point-to-point search with parent tracking, stopping as soon as `target`
/// is settled. Edges with negative or non-finite weight are skipped.
pub fn shortest_path<G: Adjacency>(
    graph: &G,
    source: NodeId,
    target: NodeId,
) -> Option<PathResult> {
    let mut dist: FxHashMap<NodeId, f64> = FxHashMap::default();
    let mut parent: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(State {
        dist: 0.0,
        node: source,
    });

    while let Some(State { dist: d, node: u }) = heap.pop() {
        if u == target {
            // Reconstruct path by walking parents back from the target
            let mut path = vec![target];
            let mut current = target;
            while let Some(&prev) = parent.get(&current) {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            return Some(PathResult {
                source,
                target,
                path,
                cost: d,
            });
        }

        if d > *dist.get(&u).unwrap_or(&f64::INFINITY) {
            continue;
        }

        for &(v, w) in graph.outgoing(u) {
            if w < 0.0 || !w.is_finite() {
                continue;
            }
            let next = d + w;
            if next < *dist.get(&v).unwrap_or(&f64::INFINITY) {
                dist.insert(v, next);
                parent.insert(v, u);
                heap.push(State { dist: next, node: v });
            }
        }
    }

    None
}
