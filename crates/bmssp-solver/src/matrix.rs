//! Distance-matrix assembly over per-source searches.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SolveResult;
use crate::graph::{Adjacency, NodeId};
use crate::search::{search, RelaxationBudget};

/// Knobs for one [`solve`] call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Cap on edge relaxations summed across every per-source search.
    pub max_relaxations: u64,
    /// Distribute the per-source searches over the rayon pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_relaxations: 100_000_000,
            parallel: false,
        }
    }
}

/// Shortest-path distance matrix of shape |sources| x |targets|.
///
/// Cell (i, j) holds the distance from `sources[i]` to `targets[j]`, infinite
/// when no path exists. Either list may be empty, repeat ids, or name nodes
/// the graph has never seen; an unknown id behaves as an isolated node. Rows
/// are independent searches, so the parallel path produces bit-identical
/// output to the sequential one.
pub fn solve<G>(
    graph: &G,
    sources: &[NodeId],
    targets: &[NodeId],
    config: &SolverConfig,
) -> SolveResult<Array2<f64>>
where
    G: Adjacency + Sync,
{
    let budget = RelaxationBudget::new(config.max_relaxations);

    let rows: Vec<Vec<f64>> = if config.parallel {
        sources
            .par_iter()
            .map(|&source| row(graph, source, targets, &budget))
            .collect::<SolveResult<_>>()?
    } else {
        sources
            .iter()
            .map(|&source| row(graph, source, targets, &budget))
            .collect::<SolveResult<_>>()?
    };

    let mut matrix = Array2::from_elem((sources.len(), targets.len()), f64::INFINITY);
    for (i, row) in rows.into_iter().enumerate() {
        for (j, value) in row.into_iter().enumerate() {
            matrix[[i, j]] = value;
        }
    }
    Ok(matrix)
}

/// One matrix row: search from `source`, then read off the target cells.
fn row<G: Adjacency>(
    graph: &G,
    source: NodeId,
    targets: &[NodeId],
    budget: &RelaxationBudget,
) -> SolveResult<Vec<f64>> {
    let dist = search(graph, source, budget)?;
    Ok(targets
        .iter()
        .map(|target| dist.get(target).copied().unwrap_or(f64::INFINITY))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolveError;
    use crate::graph::{AdjacencyMap, CsrGraph};
    use ndarray::arr2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rustc_hash::FxHashMap;

    fn chain() -> AdjacencyMap {
        let mut graph = AdjacencyMap::new();
        graph.add_edge(1, 2, 5.0);
        graph.add_edge(2, 3, 2.0);
        graph.ensure_node(3);
        graph
    }

    /// Sparse random digraph in the style the randomized checks use: `nodes`
    /// nodes, a handful of outgoing edges each, small integer weights.
    fn random_graph(nodes: u64, edges_per_node: usize, seed: u64) -> AdjacencyMap {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut graph = AdjacencyMap::new();
        for node in 0..nodes {
            graph.ensure_node(node);
            for _ in 0..edges_per_node {
                let to = rng.gen_range(0..nodes);
                if to != node {
                    graph.add_edge(node, to, rng.gen_range(1..10) as f64);
                }
            }
        }
        graph
    }

    /// Independent reference: textbook Bellman-Ford over the edge list.
    fn bellman_ford(graph: &AdjacencyMap, source: u64) -> FxHashMap<u64, f64> {
        let edges: Vec<(u64, u64, f64)> = graph.edges().collect();
        let mut dist = FxHashMap::default();
        dist.insert(source, 0.0);
        for _ in 0..graph.node_count() {
            let mut changed = false;
            for &(from, to, weight) in &edges {
                if let Some(&from_dist) = dist.get(&from) {
                    let next = from_dist + weight;
                    if next < *dist.get(&to).unwrap_or(&f64::INFINITY) {
                        dist.insert(to, next);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        dist
    }

    #[test]
    fn chain_distance() {
        let matrix = solve(&chain(), &[1], &[3], &SolverConfig::default()).unwrap();
        assert_eq!(matrix, arr2(&[[7.0]]));
    }

    #[test]
    fn absent_target_is_unreachable() {
        let mut graph = AdjacencyMap::new();
        graph.add_edge(1, 2, 1.0);

        let matrix = solve(&graph, &[1], &[99], &SolverConfig::default()).unwrap();
        assert!(matrix[[0, 0]].is_infinite());
    }

    #[test]
    fn absent_source_is_isolated() {
        let matrix = solve(&chain(), &[99], &[99, 1], &SolverConfig::default()).unwrap();
        assert_eq!(matrix[[0, 0]], 0.0);
        assert!(matrix[[0, 1]].is_infinite());
    }

    #[test]
    fn empty_sources_yield_zero_rows() {
        let matrix = solve(&chain(), &[], &[1, 2], &SolverConfig::default()).unwrap();
        assert_eq!(matrix.shape(), &[0, 2]);
    }

    #[test]
    fn empty_targets_yield_zero_columns() {
        let matrix = solve(&chain(), &[1], &[], &SolverConfig::default()).unwrap();
        assert_eq!(matrix.shape(), &[1, 0]);
    }

    #[test]
    fn duplicates_produce_duplicate_cells() {
        let matrix = solve(&chain(), &[1, 1], &[3, 3], &SolverConfig::default()).unwrap();
        assert_eq!(matrix, arr2(&[[7.0, 7.0], [7.0, 7.0]]));
    }

    #[test]
    fn source_equal_target_is_zero() {
        let matrix = solve(&chain(), &[2], &[2], &SolverConfig::default()).unwrap();
        assert_eq!(matrix[[0, 0]], 0.0);
    }

    #[test]
    fn direction_matters() {
        let mut graph = AdjacencyMap::new();
        graph.add_edge(7, 8, 3.0);

        let matrix = solve(&graph, &[7, 8], &[7, 8], &SolverConfig::default()).unwrap();
        assert_eq!(matrix[[0, 1]], 3.0);
        assert!(matrix[[1, 0]].is_infinite());
    }

    #[test]
    fn invalid_weight_fails_the_whole_call() {
        let mut graph = AdjacencyMap::new();
        graph.add_edge(1, 2, 1.0);
        graph.add_edge(2, 3, f64::INFINITY);

        let err = solve(&graph, &[1], &[3], &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, SolveError::InvalidWeight { from: 2, to: 3, .. }));
    }

    #[test]
    fn budget_is_shared_across_rows() {
        // Two rows over the chain cost four relaxations in total; a cap of
        // three lets the first row through and trips on the second.
        let config = SolverConfig {
            max_relaxations: 3,
            ..SolverConfig::default()
        };
        let err = solve(&chain(), &[1, 1], &[3], &config).unwrap_err();
        assert_eq!(err, SolveError::RelaxationLimit { limit: 3 });
    }

    #[test]
    fn repeated_solves_are_identical() {
        let graph = random_graph(150, 4, 9);
        let ids: Vec<u64> = (0..150).collect();
        let first = solve(&graph, &ids[..12], &ids, &SolverConfig::default()).unwrap();
        let second = solve(&graph, &ids[..12], &ids, &SolverConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parallel_matches_sequential_bitwise() {
        let graph = random_graph(300, 4, 7);
        let ids: Vec<u64> = (0..300).collect();
        let sequential = solve(&graph, &ids[..25], &ids, &SolverConfig::default()).unwrap();
        let parallel = solve(
            &graph,
            &ids[..25],
            &ids,
            &SolverConfig {
                parallel: true,
                ..SolverConfig::default()
            },
        )
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn csr_matches_adjacency_map() {
        let graph = random_graph(150, 4, 3);
        let csr = CsrGraph::from_adjacency(&graph);
        let ids: Vec<u64> = (0..150).collect();
        let from_map = solve(&graph, &ids[..10], &ids, &SolverConfig::default()).unwrap();
        let from_csr = solve(&csr, &ids[..10], &ids, &SolverConfig::default()).unwrap();
        assert_eq!(from_map, from_csr);
    }

    #[test]
    fn matches_bellman_ford_on_a_random_graph() {
        let graph = random_graph(200, 4, 42);
        let sources: Vec<u64> = vec![0, 17, 63, 155];
        let targets: Vec<u64> = (0..200).collect();
        let matrix = solve(&graph, &sources, &targets, &SolverConfig::default()).unwrap();

        for (i, &source) in sources.iter().enumerate() {
            let reference = bellman_ford(&graph, source);
            for (j, target) in targets.iter().enumerate() {
                let expected = reference.get(target).copied().unwrap_or(f64::INFINITY);
                let got = matrix[[i, j]];
                assert!(
                    (got.is_infinite() && expected.is_infinite())
                        || (got - expected).abs() < 1e-9,
                    "source {} target {}: {} vs {}",
                    source,
                    target,
                    got,
                    expected
                );
            }
        }
    }

    #[test]
    fn rows_respect_the_triangle_inequality() {
        let graph = random_graph(120, 3, 11);
        let sources: Vec<u64> = vec![0, 5, 9];
        let targets: Vec<u64> = (0..120).collect();
        let matrix = solve(&graph, &sources, &targets, &SolverConfig::default()).unwrap();

        for i in 0..sources.len() {
            for (from, to, weight) in graph.edges() {
                let via = matrix[[i, from as usize]] + weight;
                assert!(
                    matrix[[i, to as usize]] <= via + 1e-9,
                    "row {}: d({}) > d({}) + {}",
                    i,
                    to,
                    from,
                    weight
                );
            }
        }
    }
}
