//! Network Assembler: merge points, refined edges and statistics into the
//! serializable result handed to the presentation layer.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::extract::LocatedPoint;
use crate::facility::TransportMode;
use crate::refine::{EdgeStatus, Refinement, RefinementSummary};
use crate::region::BoundingRegion;

/// Terminal state of a pipeline run.
///
/// `NoData` distinguishes "no facilities in the region" from a failure; both
/// states are successful results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Ok,
    NoData,
}

/// One facility in the output, attributes scrubbed for exact serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOutput {
    pub lat: f64,
    pub lon: f64,
    pub tags: BTreeMap<String, Value>,
}

/// One spanning-tree edge in the output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeOutput {
    pub from_index: usize,
    pub to_index: usize,
    /// Final weight in meters (road distance when refined, geodesic
    /// otherwise).
    pub distance: f64,
    pub status: EdgeStatus,
}

/// Serializable aggregate consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkResult {
    pub status: NetworkStatus,
    pub nodes_count: usize,
    pub edges_count: usize,
    /// Sum of final edge weights in meters.
    pub total_distance: f64,
    pub points: Vec<PointOutput>,
    pub edges: Vec<EdgeOutput>,
    pub refinement: RefinementSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TransportMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingRegion>,
}

/// Merge extracted points and refined edges into a [`NetworkResult`].
///
/// Zero points yields the `no_data` success state with zeroed counts.
pub fn assemble(
    points: Vec<LocatedPoint>,
    refinement: Refinement,
    mode: Option<TransportMode>,
    bbox: Option<BoundingRegion>,
) -> NetworkResult {
    let status = if points.is_empty() {
        NetworkStatus::NoData
    } else {
        NetworkStatus::Ok
    };

    let points: Vec<PointOutput> = points
        .into_iter()
        .map(|point| PointOutput {
            lat: point.latitude,
            lon: point.longitude,
            tags: scrub_attributes(point.attributes),
        })
        .collect();

    let edges: Vec<EdgeOutput> = refinement
        .edges
        .iter()
        .map(|edge| EdgeOutput {
            from_index: edge.a,
            to_index: edge.b,
            distance: edge.weight,
            status: edge.status,
        })
        .collect();

    let total_distance = edges.iter().map(|edge| edge.distance).sum();

    debug!(
        nodes = points.len(),
        edges = edges.len(),
        total_distance,
        "assembled network result"
    );
    NetworkResult {
        status,
        nodes_count: points.len(),
        edges_count: edges.len(),
        total_distance,
        points,
        edges,
        refinement: refinement.summary,
        mode,
        bbox,
    }
}

/// Scrub an attribute bag for exact serialization: JSON primitives pass
/// through unchanged, arrays and objects are stringified, and explicit nulls
/// are preserved so consumers see a stable schema.
fn scrub_attributes(attributes: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    attributes
        .into_iter()
        .map(|(key, value)| (key, scrub_value(value)))
        .collect()
}

fn scrub_value(value: Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value,
        // `Value`'s Display renders compact JSON.
        composite @ (Value::Array(_) | Value::Object(_)) => Value::String(composite.to_string()),
    }
}
