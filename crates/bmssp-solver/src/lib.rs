//! Multi-source shortest-path solver.
//!
//! Builds distance matrices between source and target node sets of a weighted
//! directed graph by running one priority-frontier search per source. Graphs
//! plug in through the [`Adjacency`] trait; two representations ship, the
//! insertion-ordered [`AdjacencyMap`] builder and the compressed sparse row
//! [`CsrGraph`].
//!
//! ```rust
//! use bmssp_solver::{solve, AdjacencyMap, SolverConfig};
//!
//! let mut graph = AdjacencyMap::new();
//! graph.add_edge(1, 2, 5.0);
//! graph.add_edge(2, 3, 2.0);
//!
//! let matrix = solve(&graph, &[1], &[3], &SolverConfig::default()).unwrap();
//! assert_eq!(matrix[[0, 0]], 7.0);
//! ```

pub mod error;
pub mod graph;
pub mod matrix;
pub mod search;

pub use error::{SolveError, SolveResult};
pub use graph::{Adjacency, AdjacencyMap, CsrGraph, NodeId};
pub use matrix::{solve, SolverConfig};
pub use search::{distances_from, shortest_path, PathResult};
