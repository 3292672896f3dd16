//! Freightlink library entry points.
//!
//! This crate turns a set of logistics facility records into a minimum-cost
//! connectivity network: coordinates are extracted from heterogeneous
//! geometries, a complete geodesic distance graph is built over them, its
//! minimum spanning tree is computed, and each tree edge is optionally
//! refined with a real road-network shortest-path distance. Higher-level
//! consumers (CLI, web services) should only depend on the functions exported
//! here instead of reimplementing behavior.

#![deny(warnings)]

pub mod assemble;
pub mod cache;
pub mod error;
pub mod extract;
pub mod facility;
pub mod geodesic;
pub mod graph;
pub mod mst;
pub mod network;
pub mod pipeline;
pub mod refine;
pub mod region;

pub use assemble::{EdgeOutput, NetworkResult, NetworkStatus, PointOutput};
pub use cache::{CachedFeatureSource, FeatureSource};
pub use error::{Error, Result};
pub use extract::{extract_points, Extraction, GeometryPolicy, LocatedPoint};
pub use facility::{load_facilities, records_from_geojson, FacilityRecord, TransportMode};
pub use geodesic::haversine_distance;
pub use graph::{build_complete_graph, DistanceGraph, WeightedEdge};
pub use mst::minimum_spanning_tree;
pub use network::{
    NetworkPath, NetworkSegment, NodeId, PathSegment, ProviderError, RoadNetwork, RoutableNetwork,
};
pub use pipeline::{build_network, NetworkOptions};
pub use refine::{
    refine_edges, EdgeStatus, RefineOptions, RefinedEdge, Refinement, RefinementSummary,
};
pub use region::BoundingRegion;
