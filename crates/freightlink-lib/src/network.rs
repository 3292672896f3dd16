//! Routable network provider contract and the bundled road network.
//!
//! The refiner only sees the [`RoutableNetwork`] trait: nearest-node snapping
//! plus shortest-path queries returning per-segment lengths. [`RoadNetwork`]
//! implements it in-process over an undirected segment list, with a KD-tree
//! over unit-sphere embeddings for snapping and Dijkstra for routing.

use std::cmp::Ordering;
use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::Result;
use crate::geodesic::{haversine_distance, unit_sphere};

/// Index of a node within a routable network.
pub type NodeId = usize;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Result alias for provider queries.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Failure modes of a routable network provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// No network node could be resolved near the coordinate. Per-edge.
    #[error("no routable node near ({latitude}, {longitude})")]
    NoNearbyNode { latitude: f64, longitude: f64 },

    /// The provider cannot answer any query (total outage, empty network).
    #[error("routable network unavailable: {message}")]
    Unavailable { message: String },
}

impl ProviderError {
    /// Systemic errors degrade the whole refinement stage; everything else
    /// stays per-edge.
    pub fn is_systemic(&self) -> bool {
        matches!(self, ProviderError::Unavailable { .. })
    }
}

/// One traversed segment of a resolved path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub from: NodeId,
    pub to: NodeId,
    pub length_m: f64,
}

/// Ordered node sequence with per-segment lengths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkPath {
    pub nodes: Vec<NodeId>,
    pub segments: Vec<PathSegment>,
}

impl NetworkPath {
    /// Number of nodes visited. A usable path has at least two.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sum of the real segment lengths in meters.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|segment| segment.length_m).sum()
    }
}

/// External routable network contract consumed by the refiner.
pub trait RoutableNetwork: Send + Sync {
    /// Snap a coordinate to the nearest network node.
    fn nearest_node(&self, latitude: f64, longitude: f64) -> ProviderResult<NodeId>;

    /// Shortest path by length between two snapped nodes; `Ok(None)` means no
    /// path exists.
    fn shortest_path(&self, from: NodeId, to: NodeId) -> ProviderResult<Option<NetworkPath>>;
}

/// Undirected input segment for [`RoadNetwork`] construction.
///
/// Endpoints are `(latitude, longitude)`. A missing length defaults to the
/// geodesic distance between the endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSegment {
    pub a: (f64, f64),
    pub b: (f64, f64),
    pub length_m: Option<f64>,
}

impl NetworkSegment {
    pub fn between(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            a,
            b,
            length_m: None,
        }
    }

    pub fn with_length(a: (f64, f64), b: (f64, f64), length_m: f64) -> Self {
        Self {
            a,
            b,
            length_m: Some(length_m),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RoadNode {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, Copy)]
struct RoadEdge {
    target: NodeId,
    length_m: f64,
}

/// In-process routable road network.
///
/// Nodes are deduplicated by exact coordinate bits; every segment is
/// traversable in both directions.
pub struct RoadNetwork {
    nodes: Vec<RoadNode>,
    adjacency: Vec<Vec<RoadEdge>>,
    tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32>,
}

impl RoadNetwork {
    /// Build a network from undirected segments.
    ///
    /// Segments with a non-finite endpoint or identical endpoints are skipped
    /// with a warning; they cannot carry a route.
    pub fn from_segments(segments: &[NetworkSegment]) -> Self {
        let mut interned: HashMap<(u64, u64), NodeId> = HashMap::new();
        let mut nodes: Vec<RoadNode> = Vec::new();
        let mut adjacency: Vec<Vec<RoadEdge>> = Vec::new();
        let mut skipped = 0usize;

        for segment in segments {
            let ((lat_a, lon_a), (lat_b, lon_b)) = (segment.a, segment.b);
            if ![lat_a, lon_a, lat_b, lon_b].iter().all(|v| v.is_finite()) {
                skipped += 1;
                continue;
            }

            let from = intern_node(&mut interned, &mut nodes, &mut adjacency, lat_a, lon_a);
            let to = intern_node(&mut interned, &mut nodes, &mut adjacency, lat_b, lon_b);
            if from == to {
                skipped += 1;
                continue;
            }

            let length_m = segment
                .length_m
                .filter(|length| length.is_finite() && *length >= 0.0)
                .unwrap_or_else(|| haversine_distance(lat_a, lon_a, lat_b, lon_b));

            adjacency[from].push(RoadEdge {
                target: to,
                length_m,
            });
            adjacency[to].push(RoadEdge {
                target: from,
                length_m,
            });
        }

        if skipped > 0 {
            warn!(skipped, "skipped unroutable network segments");
        }

        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        for (index, node) in nodes.iter().enumerate() {
            tree.add(&unit_sphere(node.latitude, node.longitude), index);
        }

        debug!(
            nodes = nodes.len(),
            segments = segments.len() - skipped,
            "built road network"
        );
        Self {
            nodes,
            adjacency,
            tree,
        }
    }

    /// Load a network from GeoJSON text: every `LineString` /
    /// `MultiLineString` feature contributes its consecutive coordinate pairs
    /// as segments. Other geometry kinds are ignored with a warning.
    pub fn from_geojson(raw: &str) -> Result<Self> {
        let parsed: geojson::GeoJson = raw.parse()?;
        let features = match parsed {
            geojson::GeoJson::FeatureCollection(collection) => collection.features,
            geojson::GeoJson::Feature(feature) => vec![feature],
            geojson::GeoJson::Geometry(_) => {
                return Err(crate::error::Error::NotAFeatureCollection)
            }
        };

        let mut segments = Vec::new();
        for feature in features {
            let Some(geometry) = feature.geometry else {
                continue;
            };
            match geometry.value {
                geojson::Value::LineString(positions) => {
                    push_line_segments(&mut segments, &positions);
                }
                geojson::Value::MultiLineString(lines) => {
                    for positions in &lines {
                        push_line_segments(&mut segments, positions);
                    }
                }
                _ => {
                    warn!("ignoring non-line network feature");
                }
            }
        }
        Ok(Self::from_segments(&segments))
    }

    /// Number of nodes in the network.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Coordinate of a node as `(latitude, longitude)`, if it exists.
    pub fn node_position(&self, id: NodeId) -> Option<(f64, f64)> {
        self.nodes
            .get(id)
            .map(|node| (node.latitude, node.longitude))
    }
}

fn intern_node(
    interned: &mut HashMap<(u64, u64), NodeId>,
    nodes: &mut Vec<RoadNode>,
    adjacency: &mut Vec<Vec<RoadEdge>>,
    latitude: f64,
    longitude: f64,
) -> NodeId {
    *interned
        .entry((latitude.to_bits(), longitude.to_bits()))
        .or_insert_with(|| {
            nodes.push(RoadNode {
                latitude,
                longitude,
            });
            adjacency.push(Vec::new());
            nodes.len() - 1
        })
}

fn push_line_segments(segments: &mut Vec<NetworkSegment>, positions: &[Vec<f64>]) {
    for pair in positions.windows(2) {
        let (Some(a), Some(b)) = (position_to_lat_lon(&pair[0]), position_to_lat_lon(&pair[1]))
        else {
            continue;
        };
        segments.push(NetworkSegment::between(a, b));
    }
}

fn position_to_lat_lon(position: &[f64]) -> Option<(f64, f64)> {
    // GeoJSON positions are [longitude, latitude, ...].
    match position {
        [lon, lat, ..] => Some((*lat, *lon)),
        _ => None,
    }
}

impl RoutableNetwork for RoadNetwork {
    fn nearest_node(&self, latitude: f64, longitude: f64) -> ProviderResult<NodeId> {
        if self.nodes.is_empty() {
            return Err(ProviderError::Unavailable {
                message: "road network has no nodes".to_string(),
            });
        }
        let neighbour = self
            .tree
            .nearest_one::<SquaredEuclidean>(&unit_sphere(latitude, longitude));
        Ok(neighbour.item)
    }

    fn shortest_path(&self, from: NodeId, to: NodeId) -> ProviderResult<Option<NetworkPath>> {
        if from >= self.nodes.len() || to >= self.nodes.len() {
            return Ok(None);
        }
        if from == to {
            return Ok(Some(NetworkPath {
                nodes: vec![from],
                segments: Vec::new(),
            }));
        }

        let mut distances = vec![f64::INFINITY; self.nodes.len()];
        let mut parent_edge: Vec<Option<(NodeId, f64)>> = vec![None; self.nodes.len()];
        let mut queue = std::collections::BinaryHeap::new();

        distances[from] = 0.0;
        queue.push(QueueEntry::new(from, 0.0));

        while let Some(entry) = queue.pop() {
            if entry.cost.0 > distances[entry.node] {
                continue;
            }
            if entry.node == to {
                return Ok(Some(reconstruct_path(&parent_edge, from, to)));
            }

            for edge in &self.adjacency[entry.node] {
                let next_cost = entry.cost.0 + edge.length_m;
                if next_cost < distances[edge.target] {
                    distances[edge.target] = next_cost;
                    parent_edge[edge.target] = Some((entry.node, edge.length_m));
                    queue.push(QueueEntry::new(edge.target, next_cost));
                }
            }
        }

        Ok(None)
    }
}

fn reconstruct_path(parent_edge: &[Option<(NodeId, f64)>], from: NodeId, to: NodeId) -> NetworkPath {
    let mut nodes = vec![to];
    let mut segments = Vec::new();
    let mut current = to;
    while current != from {
        let Some((previous, length_m)) = parent_edge[current] else {
            break;
        };
        segments.push(PathSegment {
            from: previous,
            to: current,
            length_m,
        });
        nodes.push(previous);
        current = previous;
    }
    nodes.reverse();
    segments.reverse();
    NetworkPath { nodes, segments }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A short chain along one parallel: a - b - c.
    fn chain() -> RoadNetwork {
        RoadNetwork::from_segments(&[
            NetworkSegment::with_length((59.90, 30.30), (59.90, 30.32), 1_500.0),
            NetworkSegment::with_length((59.90, 30.32), (59.90, 30.34), 1_700.0),
        ])
    }

    #[test]
    fn shared_endpoints_are_deduplicated() {
        let network = chain();
        assert_eq!(network.len(), 3);
    }

    #[test]
    fn nearest_node_snaps_to_closest_coordinate() {
        let network = chain();
        let id = network.nearest_node(59.901, 30.321).expect("network usable");
        assert_eq!(network.node_position(id), Some((59.90, 30.32)));
    }

    #[test]
    fn shortest_path_sums_real_segment_lengths() {
        let network = chain();
        let start = network.nearest_node(59.90, 30.30).unwrap();
        let goal = network.nearest_node(59.90, 30.34).unwrap();
        let path = network
            .shortest_path(start, goal)
            .expect("network usable")
            .expect("path exists");
        assert_eq!(path.node_count(), 3);
        assert_eq!(path.total_length(), 3_200.0);
    }

    #[test]
    fn shortest_path_prefers_the_cheaper_branch() {
        // Diamond: two routes from a to d, one cheaper.
        let a = (59.0, 30.0);
        let b = (59.1, 30.0);
        let c = (59.0, 30.2);
        let d = (59.1, 30.2);
        let network = RoadNetwork::from_segments(&[
            NetworkSegment::with_length(a, b, 100.0),
            NetworkSegment::with_length(b, d, 100.0),
            NetworkSegment::with_length(a, c, 500.0),
            NetworkSegment::with_length(c, d, 500.0),
        ]);
        let start = network.nearest_node(a.0, a.1).unwrap();
        let goal = network.nearest_node(d.0, d.1).unwrap();
        let path = network.shortest_path(start, goal).unwrap().unwrap();
        assert_eq!(path.total_length(), 200.0);
    }

    #[test]
    fn disconnected_components_have_no_path() {
        let network = RoadNetwork::from_segments(&[
            NetworkSegment::between((59.0, 30.0), (59.0, 30.1)),
            NetworkSegment::between((45.0, 10.0), (45.0, 10.1)),
        ]);
        let here = network.nearest_node(59.0, 30.0).unwrap();
        let there = network.nearest_node(45.0, 10.0).unwrap();
        assert_eq!(network.shortest_path(here, there).unwrap(), None);
    }

    #[test]
    fn empty_network_is_systemically_unavailable() {
        let network = RoadNetwork::from_segments(&[]);
        let error = network.nearest_node(59.0, 30.0).unwrap_err();
        assert!(error.is_systemic());
    }

    #[test]
    fn same_node_path_has_a_single_node() {
        let network = chain();
        let node = network.nearest_node(59.90, 30.30).unwrap();
        let path = network.shortest_path(node, node).unwrap().unwrap();
        assert_eq!(path.node_count(), 1);
        assert_eq!(path.total_length(), 0.0);
    }

    #[test]
    fn loads_linestrings_from_geojson() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[30.30, 59.90], [30.32, 59.90], [30.34, 59.90]]
                    },
                    "properties": {"highway": "primary"}
                }
            ]
        }"#;
        let network = RoadNetwork::from_geojson(raw).expect("valid geojson");
        assert_eq!(network.len(), 3);
        let start = network.nearest_node(59.90, 30.30).unwrap();
        let goal = network.nearest_node(59.90, 30.34).unwrap();
        assert!(network.shortest_path(start, goal).unwrap().is_some());
    }
}
