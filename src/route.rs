//! Shortest-path geometry extraction.

use tracing::warn;

use bmssp_solver::{shortest_path, NodeId};

use crate::network::RoadNetwork;

/// Node-by-node (lat, lon) polyline of the shortest path between two network
/// nodes. Empty when either endpoint is unknown or no path exists.
pub fn path_coordinates(network: &RoadNetwork, start: NodeId, end: NodeId) -> Vec<(f64, f64)> {
    if !network.contains(start) || !network.contains(end) {
        warn!("Nodes {} or {} not found in network", start, end);
        return Vec::new();
    }
    match shortest_path(network.graph(), start, end) {
        Some(result) => result
            .path
            .iter()
            .filter_map(|&node| network.node_coordinates(node))
            .collect(),
        None => {
            warn!("No path found between {} and {}", start, end);
            Vec::new()
        }
    }
}

/// Concatenated leg polylines for an ordered stop sequence.
///
/// Consecutive legs share their junction node; the duplicate point is dropped
/// so the geometry stays a single continuous polyline. Legs with no path
/// contribute nothing.
pub fn route_geometry(network: &RoadNetwork, stops: &[NodeId]) -> Vec<(f64, f64)> {
    let mut geometry: Vec<(f64, f64)> = Vec::new();
    for leg in stops.windows(2) {
        let segment = path_coordinates(network, leg[0], leg[1]);
        if segment.is_empty() {
            continue;
        }
        if geometry.last() == segment.first() {
            geometry.extend(segment.into_iter().skip(1));
        } else {
            geometry.extend(segment);
        }
    }
    geometry
}
