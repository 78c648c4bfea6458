//! Road network model: geographic nodes joined by directed weighted edges.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use bmssp_solver::{AdjacencyMap, NodeId};

use crate::geo::haversine_distance;

/// Errors from network mutation
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    /// Edge references a source node that doesn't exist
    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    /// Edge references a target node that doesn't exist
    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Node and edge counts of a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub node_count: usize,
    pub edge_count: usize,
}

/// A node returned by a radius query, with its distance from the query point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NearbyNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    /// Meters from the query point, rounded to centimeters.
    pub distance: f64,
}

/// Geographic road network.
///
/// Edge weights are lengths in meters. The adjacency is exposed as-is, so the
/// network feeds the solver without conversion.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoadNetwork {
    /// (lat, lon) per node
    coordinates: IndexMap<NodeId, (f64, f64)>,
    /// Outgoing edges per node
    adjacency: AdjacencyMap,
}

impl RoadNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a node at the given position.
    pub fn add_node(&mut self, id: NodeId, lat: f64, lon: f64) {
        self.coordinates.insert(id, (lat, lon));
        self.adjacency.ensure_node(id);
    }

    /// Add a directed edge of `length` meters. Both endpoints must already
    /// exist as nodes.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, length: f64) -> NetworkResult<()> {
        if !self.coordinates.contains_key(&from) {
            return Err(NetworkError::InvalidEdgeSource(from));
        }
        if !self.coordinates.contains_key(&to) {
            return Err(NetworkError::InvalidEdgeTarget(to));
        }
        self.adjacency.add_edge(from, to, length);
        Ok(())
    }

    /// Whether the network knows this node.
    pub fn contains(&self, node: NodeId) -> bool {
        self.coordinates.contains_key(&node)
    }

    /// (lat, lon) of a node.
    pub fn node_coordinates(&self, node: NodeId) -> Option<(f64, f64)> {
        self.coordinates.get(&node).copied()
    }

    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    /// The adjacency underlying this network, ready for the solver.
    pub fn graph(&self) -> &AdjacencyMap {
        &self.adjacency
    }

    /// Summary counts.
    pub fn stats(&self) -> NetworkStats {
        NetworkStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
        }
    }

    /// All nodes within `radius` meters of a point, nearest first.
    pub fn find_nodes_within(&self, lat: f64, lon: f64, radius: f64) -> Vec<NearbyNode> {
        let mut nearby: Vec<NearbyNode> = self
            .coordinates
            .iter()
            .filter_map(|(&id, &(node_lat, node_lon))| {
                let distance = haversine_distance(lat, lon, node_lat, node_lon);
                (distance <= radius).then(|| NearbyNode {
                    id,
                    lat: node_lat,
                    lon: node_lon,
                    distance: (distance * 100.0).round() / 100.0,
                })
            })
            .collect();
        nearby.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        debug!(
            "Found {} nodes within {}m of ({}, {})",
            nearby.len(),
            radius,
            lat,
            lon
        );
        nearby
    }

    /// Small fixed network around central Kuala Lumpur, bidirectional edges.
    /// Handy as a fixture and as a smoke-test world.
    pub fn sample() -> Self {
        let mut network = RoadNetwork::new();
        network.add_node(0, 3.139, 101.6869);
        network.add_node(1, 3.150, 101.7000);
        network.add_node(2, 3.130, 101.6800);
        network.add_node(3, 3.145, 101.6900);
        network.add_node(4, 3.135, 101.6850);

        for (from, to, length) in [
            (0, 1, 2000.0),
            (1, 0, 2000.0),
            (0, 2, 1500.0),
            (2, 0, 1500.0),
            (0, 3, 1000.0),
            (3, 0, 1000.0),
            (0, 4, 800.0),
            (4, 0, 800.0),
            (1, 3, 1200.0),
            (3, 1, 1200.0),
            (2, 4, 900.0),
            (4, 2, 900.0),
            (3, 4, 1100.0),
            (4, 3, 1100.0),
        ] {
            // Endpoints were all added above.
            network.adjacency.add_edge(from, to, length);
        }

        info!(
            "Sample network created with {} nodes and {} edges",
            network.node_count(),
            network.edge_count()
        );
        network
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_network_shape() {
        let network = RoadNetwork::sample();
        assert_eq!(network.node_count(), 5);
        assert_eq!(network.edge_count(), 14);
        assert_eq!(network.node_coordinates(0), Some((3.139, 101.6869)));
        assert!(network.contains(4));
        assert!(!network.contains(99));
    }

    #[test]
    fn add_edge_validates_endpoints() {
        let mut network = RoadNetwork::new();
        network.add_node(1, 3.0, 101.0);

        assert_eq!(
            network.add_edge(1, 2, 50.0),
            Err(NetworkError::InvalidEdgeTarget(2))
        );
        assert_eq!(
            network.add_edge(7, 1, 50.0),
            Err(NetworkError::InvalidEdgeSource(7))
        );

        network.add_node(2, 3.1, 101.1);
        assert!(network.add_edge(1, 2, 50.0).is_ok());
        assert_eq!(network.edge_count(), 1);
    }

    #[test]
    fn stats_reports_counts() {
        let stats = RoadNetwork::sample().stats();
        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.edge_count, 14);
    }

    #[test]
    fn nearby_nodes_sorted_by_distance() {
        let network = RoadNetwork::sample();
        let nearby = network.find_nodes_within(3.139, 101.6869, 1000.0);
        let ids: Vec<NodeId> = nearby.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 4, 3]);
        assert_eq!(nearby[0].distance, 0.0);
        assert!(nearby.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn nearby_nodes_respects_radius() {
        let network = RoadNetwork::sample();
        // Node 4 sits about 492 m out, node 3 about 751 m.
        let nearby = network.find_nodes_within(3.139, 101.6869, 600.0);
        let ids: Vec<NodeId> = nearby.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 4]);
    }
}
