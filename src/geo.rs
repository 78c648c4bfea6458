//! Geographic primitives.

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in decimal degrees, in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_distance(3.139, 101.6869, 3.139, 101.6869), 0.0);
    }

    #[test]
    fn one_degree_at_the_equator() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((distance - 111_194.9).abs() < 1.0);
    }

    #[test]
    fn short_hop_in_kuala_lumpur() {
        // Two sample-network nodes roughly half a kilometer apart.
        let distance = haversine_distance(3.139, 101.6869, 3.135, 101.6850);
        assert!((distance - 492.3).abs() < 1.0);
    }

    #[test]
    fn symmetric_in_its_arguments() {
        let forward = haversine_distance(3.139, 101.6869, 3.150, 101.7000);
        let backward = haversine_distance(3.150, 101.7000, 3.139, 101.6869);
        assert!((forward - backward).abs() < 1e-9);
    }
}
