//! Vehicle routing over a distance matrix.
//!
//! Serves every non-depot location exactly once across a fleet, honoring
//! optional capacity and time-window constraints. Search is greedy
//! nearest-feasible-neighbor construction followed by intra-route 2-opt
//! improvement; route costs come straight from the matrix, with a large
//! penalty standing in for unreachable arcs so construction can still route
//! through them.

use std::time::{Duration, Instant};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// Search cost charged to an arc the matrix reports as unreachable.
const UNREACHABLE_ARC_COST: f64 = 1e9;

/// Travel time charged to an unreachable arc; busts any sane route-time cap.
const UNREACHABLE_ARC_TIME: f64 = 1e6;

/// Minimum cost decrease for a 2-opt move to count as an improvement.
const IMPROVEMENT_EPS: f64 = 1e-9;

/// Errors from instance validation
#[derive(Error, Debug, PartialEq)]
pub enum VrpError {
    #[error("Depot index {depot} out of range for {locations} locations")]
    DepotOutOfRange { depot: usize, locations: usize },

    #[error("Demands length {got} must match locations {expected}")]
    DemandsLength { got: usize, expected: usize },

    #[error("Vehicle capacities length {got} must match vehicle count {expected}")]
    CapacitiesLength { got: usize, expected: usize },

    #[error("Time windows length {got} must match locations {expected}")]
    TimeWindowsLength { got: usize, expected: usize },
}

/// Result type for VRP operations
pub type VrpResult<T> = Result<T, VrpError>;

/// One VRP instance over a distance matrix; indices into the matrix are the
/// locations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VrpParams {
    /// Fleet size.
    pub vehicle_count: usize,
    /// Matrix index every route starts and ends at.
    pub depot: usize,
    /// Demand per location, depot included (usually 0 there). Enforced only
    /// when capacities are present too.
    pub demands: Option<Vec<u32>>,
    /// Capacity per vehicle.
    pub capacities: Option<Vec<u32>>,
    /// (open, close) service window per location. Travel time equals matrix
    /// distance; vehicles depart the depot when its window opens.
    pub time_windows: Option<Vec<(f64, f64)>>,
}

impl Default for VrpParams {
    fn default() -> Self {
        Self {
            vehicle_count: 1,
            depot: 0,
            demands: None,
            capacities: None,
            time_windows: None,
        }
    }
}

/// Knobs for the VRP search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VrpConfig {
    /// Longest a vehicle may idle waiting for a window to open.
    pub max_wait: f64,
    /// Cumulative travel-time cap per route.
    pub max_route_time: f64,
    /// Upper bound on 2-opt improvement passes per route.
    pub max_iterations: usize,
    /// Wall-clock budget for the whole solve.
    pub time_limit: Duration,
}

impl Default for VrpConfig {
    fn default() -> Self {
        Self {
            max_wait: 30.0,
            max_route_time: 300_000.0,
            max_iterations: 100,
            time_limit: Duration::from_secs(30),
        }
    }
}

/// Outcome classification of a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VrpStatus {
    Feasible,
    NoSolution,
}

/// A fleet assignment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VrpSolution {
    /// Per-vehicle location indices, depot at both ends. An unused vehicle
    /// keeps the trivial `[depot, depot]` route; an infeasible instance has
    /// empty routes throughout.
    pub routes: Vec<Vec<usize>>,
    /// Raw matrix distance of each route; infinite when a leg is unreachable.
    pub vehicle_distances: Vec<f64>,
    pub total_distance: f64,
    pub status: VrpStatus,
}

/// Greedy construction plus 2-opt improvement over a distance matrix.
pub struct VrpSolver {
    pub config: VrpConfig,
}

impl VrpSolver {
    pub fn new(config: VrpConfig) -> Self {
        Self { config }
    }

    /// Solve one instance. Validation failures are errors; an instance with
    /// no feasible assignment is a normal [`VrpStatus::NoSolution`] outcome.
    pub fn solve(&self, matrix: &Array2<f64>, params: &VrpParams) -> VrpResult<VrpSolution> {
        let locations = matrix.nrows();
        validate(locations, params)?;

        info!(
            "Solving VRP with {} locations, {} vehicles, depot at {}",
            locations, params.vehicle_count, params.depot
        );
        if let (Some(demands), Some(capacities)) = (&params.demands, &params.capacities) {
            debug!(
                "Capacity constraints: demands={:?}, capacities={:?}",
                demands, capacities
            );
        }
        if let Some(windows) = &params.time_windows {
            debug!("Time window constraints: {:?}", windows);
        }

        let deadline = Instant::now() + self.config.time_limit;
        match self.construct(matrix, params) {
            Some(mut routes) => {
                for route in &mut routes {
                    self.improve(matrix, route, params, deadline);
                }
                let vehicle_distances: Vec<f64> = routes
                    .iter()
                    .map(|route| route_distance(matrix, route))
                    .collect();
                let total_distance: f64 = vehicle_distances.iter().sum();
                let active = routes.iter().filter(|route| route.len() > 2).count();
                info!(
                    "Solution found: total_distance={:.2}, routes={}",
                    total_distance, active
                );
                Ok(VrpSolution {
                    routes,
                    vehicle_distances,
                    total_distance,
                    status: VrpStatus::Feasible,
                })
            }
            None => {
                error!("No solution found for VRP");
                Ok(VrpSolution {
                    routes: vec![Vec::new(); params.vehicle_count],
                    vehicle_distances: vec![f64::INFINITY; params.vehicle_count],
                    total_distance: f64::INFINITY,
                    status: VrpStatus::NoSolution,
                })
            }
        }
    }

    /// Fill routes vehicle by vehicle, always extending with the nearest
    /// still-feasible customer. `None` when customers remain unassigned after
    /// the whole fleet is routed.
    fn construct(&self, matrix: &Array2<f64>, params: &VrpParams) -> Option<Vec<Vec<usize>>> {
        let locations = matrix.nrows();
        let mut unassigned: Vec<usize> = (0..locations).filter(|&i| i != params.depot).collect();
        let mut routes = Vec::with_capacity(params.vehicle_count);

        for vehicle in 0..params.vehicle_count {
            let mut route = vec![params.depot];
            let mut load: u64 = 0;
            let mut clock = params
                .time_windows
                .as_ref()
                .map(|windows| windows[params.depot].0)
                .unwrap_or(0.0);

            loop {
                let current = route[route.len() - 1];
                // (position in unassigned, arc cost, service start at the candidate)
                let mut best: Option<(usize, f64, f64)> = None;

                for (position, &candidate) in unassigned.iter().enumerate() {
                    if let (Some(demands), Some(capacities)) =
                        (&params.demands, &params.capacities)
                    {
                        if load + u64::from(demands[candidate])
                            > u64::from(capacities[vehicle])
                        {
                            continue;
                        }
                    }

                    let mut service_start = clock;
                    if let Some(windows) = &params.time_windows {
                        let arrival = clock + arc_time(matrix, current, candidate);
                        let (open, close) = windows[candidate];
                        if arrival > close {
                            continue;
                        }
                        let start = arrival.max(open);
                        if start - arrival > self.config.max_wait {
                            continue;
                        }
                        if start > self.config.max_route_time {
                            continue;
                        }
                        // The vehicle must still make it home afterwards.
                        if start + arc_time(matrix, candidate, params.depot)
                            > self.config.max_route_time
                        {
                            continue;
                        }
                        service_start = start;
                    }

                    let cost = arc_cost(matrix, current, candidate);
                    if best.map_or(true, |(_, best_cost, _)| cost < best_cost) {
                        best = Some((position, cost, service_start));
                    }
                }

                match best {
                    Some((position, _, service_start)) => {
                        let candidate = unassigned.remove(position);
                        if let Some(demands) = &params.demands {
                            load += u64::from(demands[candidate]);
                        }
                        clock = service_start;
                        route.push(candidate);
                    }
                    None => break,
                }
            }

            route.push(params.depot);
            routes.push(route);
        }

        if unassigned.is_empty() {
            Some(routes)
        } else {
            None
        }
    }

    /// Best-improvement 2-opt within one route. Candidate routes are costed
    /// in full, which stays correct for asymmetric matrices, and must keep
    /// any time windows satisfiable.
    fn improve(
        &self,
        matrix: &Array2<f64>,
        route: &mut Vec<usize>,
        params: &VrpParams,
        deadline: Instant,
    ) {
        if route.len() < 4 {
            return;
        }
        for _ in 0..self.config.max_iterations {
            if Instant::now() >= deadline {
                return;
            }
            let current_cost = route_cost(matrix, route);
            let mut best: Option<(Vec<usize>, f64)> = None;

            for i in 1..route.len() - 2 {
                for j in i + 1..route.len() - 1 {
                    let mut candidate = route.clone();
                    candidate[i..=j].reverse();
                    let cost = route_cost(matrix, &candidate);
                    let to_beat = best.as_ref().map_or(current_cost, |(_, c)| *c);
                    if cost + IMPROVEMENT_EPS < to_beat
                        && self.time_feasible(matrix, &candidate, params)
                    {
                        best = Some((candidate, cost));
                    }
                }
            }

            match best {
                Some((candidate, _)) => *route = candidate,
                None => return,
            }
        }
    }

    /// Forward-simulate a depot-to-depot route against the time windows.
    fn time_feasible(&self, matrix: &Array2<f64>, route: &[usize], params: &VrpParams) -> bool {
        let Some(windows) = &params.time_windows else {
            return true;
        };
        let mut clock = windows[route[0]].0;
        for leg in route.windows(2) {
            let (from, to) = (leg[0], leg[1]);
            let arrival = clock + arc_time(matrix, from, to);
            if arrival > self.config.max_route_time {
                return false;
            }
            if to == params.depot {
                // Return leg: only the route-time cap applies.
                clock = arrival;
                continue;
            }
            let (open, close) = windows[to];
            if arrival > close {
                return false;
            }
            let start = arrival.max(open);
            if start - arrival > self.config.max_wait {
                return false;
            }
            if start > self.config.max_route_time {
                return false;
            }
            clock = start;
        }
        true
    }
}

/// Solve one instance with the given configuration.
pub fn solve_vrp(
    matrix: &Array2<f64>,
    params: &VrpParams,
    config: &VrpConfig,
) -> VrpResult<VrpSolution> {
    VrpSolver::new(config.clone()).solve(matrix, params)
}

fn validate(locations: usize, params: &VrpParams) -> VrpResult<()> {
    if params.depot >= locations {
        return Err(VrpError::DepotOutOfRange {
            depot: params.depot,
            locations,
        });
    }
    if let Some(demands) = &params.demands {
        if demands.len() != locations {
            return Err(VrpError::DemandsLength {
                got: demands.len(),
                expected: locations,
            });
        }
    }
    if let Some(capacities) = &params.capacities {
        if capacities.len() != params.vehicle_count {
            return Err(VrpError::CapacitiesLength {
                got: capacities.len(),
                expected: params.vehicle_count,
            });
        }
    }
    if let Some(windows) = &params.time_windows {
        if windows.len() != locations {
            return Err(VrpError::TimeWindowsLength {
                got: windows.len(),
                expected: locations,
            });
        }
    }
    Ok(())
}

fn arc_cost(matrix: &Array2<f64>, from: usize, to: usize) -> f64 {
    let distance = matrix[[from, to]];
    if distance.is_finite() {
        distance
    } else {
        UNREACHABLE_ARC_COST
    }
}

fn arc_time(matrix: &Array2<f64>, from: usize, to: usize) -> f64 {
    let distance = matrix[[from, to]];
    if distance.is_finite() {
        distance
    } else {
        UNREACHABLE_ARC_TIME
    }
}

/// Penalized cost used by the search.
fn route_cost(matrix: &Array2<f64>, route: &[usize]) -> f64 {
    route
        .windows(2)
        .map(|leg| arc_cost(matrix, leg[0], leg[1]))
        .sum()
}

/// Raw matrix distance reported to callers; infinity propagates.
fn route_distance(matrix: &Array2<f64>, route: &[usize]) -> f64 {
    route.windows(2).map(|leg| matrix[[leg[0], leg[1]]]).sum()
}
