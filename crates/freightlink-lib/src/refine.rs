//! Route Refiner: replace geodesic MST weights with road-network distances.
//!
//! Each edge is resolved independently: snap both endpoints to the routable
//! network, query the shortest path by length, and sum the real segment
//! lengths. Any failure keeps the already-computed geodesic weight and tags
//! the edge [`EdgeStatus::Fallback`] — routing failures are expected and
//! never reach the caller. A systemic provider failure degrades the rest of
//! the stage to geodesic weights instead of failing the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::LocatedPoint;
use crate::graph::WeightedEdge;
use crate::network::{ProviderError, RoutableNetwork};

/// How an edge's final weight was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    /// Weight is a real-network shortest-path distance.
    Refined,
    /// Weight is the original geodesic distance.
    Fallback,
}

/// MST edge with its final weight and resolution status.
///
/// Refinement only rewrites weights and statuses; endpoint indices and edge
/// order always match the spanning tree input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedEdge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
    pub status: EdgeStatus,
}

impl RefinedEdge {
    fn fallback(edge: &WeightedEdge) -> Self {
        Self {
            a: edge.a,
            b: edge.b,
            weight: edge.weight,
            status: EdgeStatus::Fallback,
        }
    }
}

/// Aggregate outcome of a refinement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefinementSummary {
    /// Edges carrying a real-network distance.
    pub refined: usize,
    /// Edges keeping their geodesic distance.
    pub fallback: usize,
    /// Whether a systemic provider failure cut the stage short.
    pub degraded: bool,
}

/// Tuning knobs for the refinement stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineOptions {
    /// Worker cap for the per-edge fan-out. `Some(1)` forces a sequential
    /// pass; `None` uses the global rayon pool.
    pub parallelism: Option<usize>,
}

/// Refined edge sequence plus summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub edges: Vec<RefinedEdge>,
    pub summary: RefinementSummary,
}

impl Refinement {
    /// Resolve every edge to its geodesic weight without touching a provider.
    /// Used when the caller runs the pipeline without a routable network.
    pub fn geodesic_only(edges: &[WeightedEdge]) -> Self {
        let edges: Vec<RefinedEdge> = edges.iter().map(RefinedEdge::fallback).collect();
        let summary = RefinementSummary {
            refined: 0,
            fallback: edges.len(),
            degraded: false,
        };
        Self { edges, summary }
    }
}

#[derive(Debug, Error)]
enum RefineFailure {
    #[error("no path between snapped nodes")]
    NoPath,
    #[error("path has fewer than two nodes")]
    DegeneratePath,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl RefineFailure {
    fn is_systemic(&self) -> bool {
        matches!(self, RefineFailure::Provider(error) if error.is_systemic())
    }
}

/// Refine every MST edge against the routable network.
///
/// Per-edge queries are independent and run on a bounded rayon pool; each
/// result lands in the output slot of its own edge, joined at the end. Edge
/// topology is never changed, only weights and statuses.
pub fn refine_edges(
    edges: &[WeightedEdge],
    points: &[LocatedPoint],
    network: &dyn RoutableNetwork,
    options: &RefineOptions,
) -> Refinement {
    let degraded = AtomicBool::new(false);

    let resolve = |edge: &WeightedEdge| -> RefinedEdge {
        if degraded.load(Ordering::Relaxed) {
            return RefinedEdge::fallback(edge);
        }
        match resolve_edge(edge, points, network) {
            Ok(weight) => RefinedEdge {
                a: edge.a,
                b: edge.b,
                weight,
                status: EdgeStatus::Refined,
            },
            Err(failure) => {
                if failure.is_systemic() {
                    warn!(error = %failure, "provider failed; degrading to geodesic weights");
                    degraded.store(true, Ordering::Relaxed);
                } else {
                    debug!(a = edge.a, b = edge.b, error = %failure, "edge keeps geodesic weight");
                }
                RefinedEdge::fallback(edge)
            }
        }
    };

    let refined: Vec<RefinedEdge> = match options.parallelism {
        Some(1) => edges.iter().map(&resolve).collect(),
        Some(workers) => match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| edges.par_iter().map(&resolve).collect()),
            Err(error) => {
                warn!(%error, "falling back to the global worker pool");
                edges.par_iter().map(&resolve).collect()
            }
        },
        None => edges.par_iter().map(&resolve).collect(),
    };

    let summary = RefinementSummary {
        refined: refined
            .iter()
            .filter(|edge| edge.status == EdgeStatus::Refined)
            .count(),
        fallback: refined
            .iter()
            .filter(|edge| edge.status == EdgeStatus::Fallback)
            .count(),
        degraded: degraded.load(Ordering::Relaxed),
    };
    debug!(
        refined = summary.refined,
        fallback = summary.fallback,
        degraded = summary.degraded,
        "refined spanning tree edges"
    );
    Refinement {
        edges: refined,
        summary,
    }
}

fn resolve_edge(
    edge: &WeightedEdge,
    points: &[LocatedPoint],
    network: &dyn RoutableNetwork,
) -> Result<f64, RefineFailure> {
    let from = &points[edge.a];
    let to = &points[edge.b];
    let start = network.nearest_node(from.latitude, from.longitude)?;
    let goal = network.nearest_node(to.latitude, to.longitude)?;
    let path = network
        .shortest_path(start, goal)?
        .ok_or(RefineFailure::NoPath)?;
    // Both endpoints snapping to the same node yields a one-node "path";
    // that carries no usable road distance.
    if path.node_count() < 2 {
        return Err(RefineFailure::DegeneratePath);
    }
    Ok(path.total_length())
}
