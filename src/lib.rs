//! BMSSP routing engine.
//!
//! Batched multi-source shortest paths over road networks, plus the layers a
//! routing deployment stacks on top: a geographic network model, distance
//! matrices with unreachable-pair fallbacks, path geometry extraction, and a
//! vehicle-routing solver driven by the matrix.
//!
//! The computational core lives in the `bmssp-solver` crate and is re-exported
//! here.
//!
//! ## Example Usage
//!
//! ```rust
//! use bmssp::{compute_matrix, RoadNetwork};
//!
//! // Small built-in network around central Kuala Lumpur
//! let network = RoadNetwork::sample();
//!
//! // Rows and columns follow the location order
//! let matrix = compute_matrix(&network, &[0, 3, 1]).unwrap();
//! assert_eq!(matrix[[0, 0]], 0.0);
//! assert_eq!(matrix[[0, 1]], 1000.0);
//! assert_eq!(matrix[[1, 2]], 1200.0);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod geo;
pub mod matrix;
pub mod network;
pub mod route;
pub mod vrp;

// Re-export main types for convenience
pub use geo::haversine_distance;

pub use matrix::{
    compute_matrix, compute_matrix_with_fallback, FallbackCounts, FallbackMode, FallbackPolicy,
    MatrixError, MatrixMetadata, MatrixResult,
};

pub use network::{NearbyNode, NetworkError, NetworkResult, NetworkStats, RoadNetwork};

pub use route::{path_coordinates, route_geometry};

pub use vrp::{
    solve_vrp, VrpConfig, VrpError, VrpParams, VrpResult, VrpSolution, VrpSolver, VrpStatus,
};

pub use bmssp_solver::{
    distances_from, shortest_path, solve, Adjacency, AdjacencyMap, CsrGraph, NodeId, PathResult,
    SolveError, SolveResult, SolverConfig,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
