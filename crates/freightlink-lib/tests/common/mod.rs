//! Common test fixtures: facility records around St. Petersburg and scripted
//! routable-network providers.

#![allow(dead_code)]

use freightlink_lib::{
    FacilityRecord, NetworkPath, NetworkSegment, NodeId, PathSegment, ProviderError, RoadNetwork,
    RoutableNetwork,
};
use serde_json::json;

/// Three facilities on a rough diagonal; the complete graph over them is a
/// triangle whose largest edge connects the first and last point.
pub fn diagonal_facilities() -> Vec<FacilityRecord> {
    vec![
        FacilityRecord::point(59.9, 30.3).with_attribute("name", json!("north-terminal")),
        FacilityRecord::point(59.8, 30.4).with_attribute("name", json!("mid-depot")),
        FacilityRecord::point(59.7, 30.5).with_attribute("name", json!("south-yard")),
    ]
}

/// Road chain whose nodes coincide with the diagonal facilities, with fixed
/// segment lengths so refined weights are exact.
pub fn diagonal_road_network() -> RoadNetwork {
    RoadNetwork::from_segments(&[
        NetworkSegment::with_length((59.9, 30.3), (59.8, 30.4), 15_000.0),
        NetworkSegment::with_length((59.8, 30.4), (59.7, 30.5), 16_000.0),
    ])
}

/// Provider that never finds a path between distinct nodes.
pub struct NoPathNetwork;

impl RoutableNetwork for NoPathNetwork {
    fn nearest_node(&self, latitude: f64, _longitude: f64) -> Result<NodeId, ProviderError> {
        Ok((latitude * 1000.0).round() as NodeId)
    }

    fn shortest_path(&self, _from: NodeId, _to: NodeId) -> Result<Option<NetworkPath>, ProviderError> {
        Ok(None)
    }
}

/// Provider that routes every pair with one segment of a fixed length.
pub struct FixedLengthNetwork {
    pub length_m: f64,
}

impl RoutableNetwork for FixedLengthNetwork {
    fn nearest_node(&self, latitude: f64, _longitude: f64) -> Result<NodeId, ProviderError> {
        Ok((latitude * 1000.0).round() as NodeId)
    }

    fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<Option<NetworkPath>, ProviderError> {
        Ok(Some(NetworkPath {
            nodes: vec![from, to],
            segments: vec![PathSegment {
                from,
                to,
                length_m: self.length_m,
            }],
        }))
    }
}

/// Provider suffering a total outage.
pub struct OutageNetwork;

impl RoutableNetwork for OutageNetwork {
    fn nearest_node(&self, _latitude: f64, _longitude: f64) -> Result<NodeId, ProviderError> {
        Err(ProviderError::Unavailable {
            message: "total outage".to_string(),
        })
    }

    fn shortest_path(&self, _from: NodeId, _to: NodeId) -> Result<Option<NetworkPath>, ProviderError> {
        Err(ProviderError::Unavailable {
            message: "total outage".to_string(),
        })
    }
}
