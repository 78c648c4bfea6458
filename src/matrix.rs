//! Distance matrices over a road network, with unreachable-pair fallbacks.
//!
//! A directed network can leave off-diagonal cells infinite (one-way streets,
//! clipped extracts, isolated nodes). The fallback pass repairs those cells
//! after the solve, either by reusing the opposite direction or by charging a
//! scaled great-circle estimate.

use std::env;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use bmssp_solver::{solve, NodeId, SolveError, SolverConfig};

use crate::geo::haversine_distance;
use crate::network::RoadNetwork;

/// Errors from the distance-matrix layer.
#[derive(Error, Debug, PartialEq)]
pub enum MatrixError {
    /// A requested location is not part of the network
    #[error("Node {0} not found in network")]
    UnknownNode(NodeId),

    /// The underlying solve failed
    #[error("Solver error: {0}")]
    Solve(#[from] SolveError),
}

/// Result type for matrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;

/// How unreachable off-diagonal cells are repaired after the solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackMode {
    /// Leave unreachable cells infinite.
    DirectedOnly,
    /// Copy the opposite-direction cell when it is finite.
    Symmetric,
    /// Scaled great-circle distance between the two locations.
    Haversine,
    /// Symmetric reuse first, haversine where that is also unavailable.
    Hybrid,
}

/// Fallback behavior for one matrix computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    pub mode: FallbackMode,
    /// Multiplier applied to haversine fills, to approximate road distance.
    pub factor: f64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            mode: FallbackMode::Hybrid,
            factor: 1.3,
        }
    }
}

impl FallbackPolicy {
    /// Read the policy from `MATRIX_FALLBACK_MODE` and
    /// `FALLBACK_DISTANCE_FACTOR`. Unset variables keep the defaults;
    /// unparsable ones warn and keep the defaults.
    pub fn from_env() -> Self {
        let mut policy = FallbackPolicy::default();
        if let Ok(raw) = env::var("MATRIX_FALLBACK_MODE") {
            match parse_mode(&raw) {
                Some(mode) => policy.mode = mode,
                None => warn!(
                    "Unknown MATRIX_FALLBACK_MODE '{}', defaulting to 'hybrid'",
                    raw.trim()
                ),
            }
        }
        if let Ok(raw) = env::var("FALLBACK_DISTANCE_FACTOR") {
            match raw.trim().parse::<f64>() {
                Ok(factor) => policy.factor = factor,
                Err(_) => warn!(
                    "Invalid FALLBACK_DISTANCE_FACTOR '{}', defaulting to {}",
                    raw, policy.factor
                ),
            }
        }
        policy
    }
}

fn parse_mode(raw: &str) -> Option<FallbackMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "directed-only" => Some(FallbackMode::DirectedOnly),
        "symmetric" => Some(FallbackMode::Symmetric),
        "haversine" => Some(FallbackMode::Haversine),
        "hybrid" => Some(FallbackMode::Hybrid),
        _ => None,
    }
}

/// Per-kind counts of repaired cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackCounts {
    pub symmetric: usize,
    pub haversine: usize,
}

/// What a fallback pass did to a matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixMetadata {
    pub fallback_mode: FallbackMode,
    pub fallback_factor: f64,
    pub fallback_counts: FallbackCounts,
    pub size: usize,
}

/// Square shortest-path distance matrix over `locations`.
///
/// List order defines row and column order. Every location must exist in the
/// network; unreachable pairs stay infinite.
pub fn compute_matrix(network: &RoadNetwork, locations: &[NodeId]) -> MatrixResult<Array2<f64>> {
    for &location in locations {
        if !network.contains(location) {
            return Err(MatrixError::UnknownNode(location));
        }
    }
    let matrix = solve(
        network.graph(),
        locations,
        locations,
        &SolverConfig::default(),
    )?;
    info!(
        "Computed {}x{} distance matrix",
        locations.len(),
        locations.len()
    );
    Ok(matrix)
}

/// Square matrix plus fallback repair of unreachable cells per `policy`.
///
/// The scan runs row-major over the live matrix, so a symmetric reuse can
/// pick up a haversine fill made earlier in the same pass. The filled value
/// is the same either way; only the per-kind counts depend on the order.
pub fn compute_matrix_with_fallback(
    network: &RoadNetwork,
    locations: &[NodeId],
    policy: &FallbackPolicy,
) -> MatrixResult<(Array2<f64>, MatrixMetadata)> {
    let mut matrix = compute_matrix(network, locations)?;
    let n = locations.len();
    let mut counts = FallbackCounts::default();

    if policy.mode != FallbackMode::DirectedOnly {
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    matrix[[i, j]] = 0.0;
                    continue;
                }
                if !matrix[[i, j]].is_infinite() {
                    continue;
                }
                if matches!(policy.mode, FallbackMode::Symmetric | FallbackMode::Hybrid)
                    && matrix[[j, i]].is_finite()
                {
                    matrix[[i, j]] = matrix[[j, i]];
                    counts.symmetric += 1;
                    continue;
                }
                if matches!(policy.mode, FallbackMode::Haversine | FallbackMode::Hybrid) {
                    if let (Some((lat_i, lon_i)), Some((lat_j, lon_j))) = (
                        network.node_coordinates(locations[i]),
                        network.node_coordinates(locations[j]),
                    ) {
                        matrix[[i, j]] =
                            haversine_distance(lat_i, lon_i, lat_j, lon_j) * policy.factor;
                        counts.haversine += 1;
                    }
                }
            }
        }
    }

    let total = counts.symmetric + counts.haversine;
    if total > 0 {
        info!(
            "Applied fallbacks to {} entries (symmetric={}, haversine={}), mode={:?}",
            total, counts.symmetric, counts.haversine, policy.mode
        );
    } else {
        info!("No fallbacks applied, mode={:?}", policy.mode);
    }

    let metadata = MatrixMetadata {
        fallback_mode: policy.mode,
        fallback_factor: policy.factor,
        fallback_counts: counts,
        size: n,
    };
    Ok((matrix, metadata))
}
