//! Great-circle distance over a spherical Earth.
//!
//! This is the canonical weight function for the distance graph: every place
//! the pipeline needs a "geodesic distance" goes through
//! [`haversine_distance`].

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two WGS84 coordinates.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Unit-sphere Cartesian embedding of a WGS84 coordinate.
///
/// Euclidean distance between embeddings is the chord length, which is
/// monotonic in the great-circle distance, so nearest-neighbour queries over
/// embeddings rank candidates exactly as the geodesic would.
pub(crate) fn unit_sphere(latitude: f64, longitude: f64) -> [f64; 3] {
    let lat = latitude.to_radians();
    let lon = longitude.to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}
