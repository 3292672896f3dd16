//! End-to-end pipeline orchestration.
//!
//! Stages run strictly in order — extract, build, spanning tree, refine,
//! assemble — each consuming an immutable input and producing a new output.
//! The only parallelism lives inside the refinement stage.

use tracing::info;

use crate::assemble::{assemble, NetworkResult};
use crate::error::Result;
use crate::extract::{extract_points, GeometryPolicy};
use crate::facility::{FacilityRecord, TransportMode};
use crate::graph::build_complete_graph;
use crate::mst::minimum_spanning_tree;
use crate::network::RoutableNetwork;
use crate::refine::{refine_edges, RefineOptions, Refinement};
use crate::region::BoundingRegion;

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkOptions {
    /// How the extractor treats unusable records.
    pub geometry_policy: GeometryPolicy,
    /// Refinement stage tuning.
    pub refine: RefineOptions,
    /// Category mode echoed into the result, when known.
    pub mode: Option<TransportMode>,
    /// Query region echoed into the result, when known.
    pub region: Option<BoundingRegion>,
}

/// Run the full pipeline over already-loaded facility records.
///
/// When `network` is `None` refinement is skipped and every edge keeps its
/// geodesic weight. Zero surviving facilities produce a `no_data` result,
/// not an error.
pub fn build_network(
    records: &[FacilityRecord],
    network: Option<&dyn RoutableNetwork>,
    options: &NetworkOptions,
) -> Result<NetworkResult> {
    // Step 1: resolve every record to a representative coordinate.
    let extraction = extract_points(records, options.geometry_policy)?;
    if extraction.dropped > 0 {
        info!(dropped = extraction.dropped, "dropped unusable facility records");
    }

    // Step 2: no facilities is a valid terminal state.
    if extraction.points.is_empty() {
        info!("no facilities to connect");
        return Ok(assemble(
            Vec::new(),
            Refinement::geodesic_only(&[]),
            options.mode,
            options.region,
        ));
    }

    // Step 3: complete geodesic distance graph.
    let graph = build_complete_graph(&extraction.points);

    // Step 4: minimum spanning tree.
    let tree = minimum_spanning_tree(&graph);

    // Step 5: per-edge road refinement, when a provider is available.
    let refinement = match network {
        Some(provider) => refine_edges(&tree, &extraction.points, provider, &options.refine),
        None => Refinement::geodesic_only(&tree),
    };

    // Step 6: assemble the serializable result.
    let result = assemble(extraction.points, refinement, options.mode, options.region);
    info!(
        nodes = result.nodes_count,
        edges = result.edges_count,
        total_distance = result.total_distance,
        refined = result.refinement.refined,
        "built connectivity network"
    );
    Ok(result)
}
