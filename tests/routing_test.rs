//! End-to-end tests: network -> matrix -> VRP -> geometry.

use bmssp::{
    compute_matrix, compute_matrix_with_fallback, distances_from, route_geometry, solve_vrp,
    FallbackPolicy, RoadNetwork, SolverConfig, VrpConfig, VrpParams, VrpStatus,
};
use ndarray::arr2;

#[test]
fn sample_network_distance_matrix() {
    let network = RoadNetwork::sample();
    let matrix = compute_matrix(&network, &[0, 1, 2, 3, 4]).unwrap();
    let expected = arr2(&[
        [0.0, 2000.0, 1500.0, 1000.0, 800.0],
        [2000.0, 0.0, 3200.0, 1200.0, 2300.0],
        [1500.0, 3200.0, 0.0, 2000.0, 900.0],
        [1000.0, 1200.0, 2000.0, 0.0, 1100.0],
        [800.0, 2300.0, 900.0, 1100.0, 0.0],
    ]);
    assert_eq!(matrix, expected);
}

#[test]
fn single_source_distances_match_the_matrix_row() {
    let network = RoadNetwork::sample();
    let dist = distances_from(network.graph(), 0, &SolverConfig::default()).unwrap();
    assert_eq!(dist[&0], 0.0);
    assert_eq!(dist[&1], 2000.0);
    assert_eq!(dist[&2], 1500.0);
    assert_eq!(dist[&3], 1000.0);
    assert_eq!(dist[&4], 800.0);
}

#[test]
fn no_fallbacks_on_a_connected_network() {
    let network = RoadNetwork::sample();
    let locations = [0u64, 1, 2, 3, 4];
    let (matrix, metadata) =
        compute_matrix_with_fallback(&network, &locations, &FallbackPolicy::default()).unwrap();
    assert_eq!(metadata.fallback_counts.symmetric, 0);
    assert_eq!(metadata.fallback_counts.haversine, 0);
    assert_eq!(matrix, compute_matrix(&network, &locations).unwrap());
}

#[test]
fn matrix_to_vrp_to_geometry() {
    let network = RoadNetwork::sample();
    let locations = [0u64, 1, 2, 3, 4];
    let (matrix, _) =
        compute_matrix_with_fallback(&network, &locations, &FallbackPolicy::default()).unwrap();

    let solution = solve_vrp(&matrix, &VrpParams::default(), &VrpConfig::default()).unwrap();
    assert_eq!(solution.status, VrpStatus::Feasible);
    assert_eq!(solution.routes, vec![vec![0, 2, 4, 3, 1, 0]]);
    assert_eq!(solution.total_distance, 6700.0);

    // Map matrix indices back to node ids and trace the tour on the map.
    let stops: Vec<u64> = solution.routes[0]
        .iter()
        .map(|&stop| locations[stop])
        .collect();
    let geometry = route_geometry(&network, &stops);
    assert_eq!(geometry.len(), 6);
    assert_eq!(geometry.first(), geometry.last());
}

#[test]
fn fleet_of_two_on_the_sample_network() {
    let network = RoadNetwork::sample();
    let locations = [0u64, 1, 2, 3, 4];
    let matrix = compute_matrix(&network, &locations).unwrap();

    let params = VrpParams {
        vehicle_count: 2,
        ..VrpParams::default()
    };
    let solution = solve_vrp(&matrix, &params, &VrpConfig::default()).unwrap();
    assert_eq!(solution.status, VrpStatus::Feasible);
    assert_eq!(solution.routes.len(), 2);

    let mut served: Vec<usize> = solution
        .routes
        .iter()
        .flat_map(|route| route[1..route.len() - 1].iter().copied())
        .collect();
    served.sort_unstable();
    assert_eq!(served, vec![1, 2, 3, 4]);
}
