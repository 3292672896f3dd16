//! Distance Graph Builder: complete geodesic graph over extracted points.

use serde::Serialize;
use tracing::debug;

use crate::extract::LocatedPoint;
use crate::geodesic::haversine_distance;

/// Undirected weighted edge between two point indices.
///
/// Invariant: `a < b` (canonical form) and `weight >= 0` meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedEdge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

impl WeightedEdge {
    /// Build a canonical edge; endpoint order is normalized to `a < b`.
    pub fn new(i: usize, j: usize, weight: f64) -> Self {
        debug_assert!(i != j, "self-loops are not representable");
        debug_assert!(weight >= 0.0, "edge weights are distances");
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        Self { a, b, weight }
    }
}

/// Set of point indices plus weighted edges between them.
#[derive(Debug, Clone, Default)]
pub struct DistanceGraph {
    node_count: usize,
    edges: Vec<WeightedEdge>,
}

impl DistanceGraph {
    pub fn from_parts(node_count: usize, edges: Vec<WeightedEdge>) -> Self {
        Self { node_count, edges }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }
}

/// Build the complete graph over `points`: one node per point, one edge per
/// unordered pair, weight = geodesic distance in meters.
///
/// O(n²) in the number of points, which is acceptable for facility counts in
/// a bounded region (tens to low hundreds). Sparsifying to a k-nearest
/// neighbour graph is a deliberate non-feature until that assumption breaks.
/// Zero or one point yields a graph with no edges.
pub fn build_complete_graph(points: &[LocatedPoint]) -> DistanceGraph {
    let n = points.len();
    let mut edges = Vec::with_capacity(n.saturating_sub(1) * n / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = haversine_distance(
                points[i].latitude,
                points[i].longitude,
                points[j].latitude,
                points[j].longitude,
            );
            edges.push(WeightedEdge::new(i, j, weight));
        }
    }

    debug!(nodes = n, edges = edges.len(), "built complete distance graph");
    DistanceGraph::from_parts(n, edges)
}
