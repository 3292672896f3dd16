//! Geometry Extractor: facility records to representative coordinates.
//!
//! Heterogeneous geometry is consumed through a single centroid-or-identity
//! resolution function: points pass through unchanged, polygons and
//! multi-polygons collapse to their planar area-weighted centroid (the `geo`
//! crate's `Centroid`, treating lon/lat as planar coordinates — the same
//! convention the surrounding service's geometry stack uses). Anything else
//! is unsupported and handled according to the configured policy.

use geo::algorithm::centroid::Centroid;
use geo_types::Geometry;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::facility::{Attributes, FacilityRecord};

/// A facility reduced to one representative WGS84 coordinate.
///
/// Identity is positional: edges reference points by their index in the
/// extracted sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub attributes: Attributes,
}

/// How the extractor treats records it cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryPolicy {
    /// Fail the whole extraction on the first unusable record.
    #[default]
    Strict,
    /// Drop unusable records and report how many were dropped.
    Skip,
}

/// Result of an extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Surviving points, in input order.
    pub points: Vec<LocatedPoint>,
    /// Records dropped under [`GeometryPolicy::Skip`]; always 0 under
    /// [`GeometryPolicy::Strict`].
    pub dropped: usize,
}

enum ResolveFailure {
    Unsupported(&'static str),
    NonFinite,
    OutOfRange { latitude: f64, longitude: f64 },
}

/// Extract one [`LocatedPoint`] per facility record, preserving input order.
///
/// A record whose resolved coordinate is non-finite or outside WGS84 bounds
/// never enters the result: depending on `policy` it either fails the call or
/// is dropped and counted.
pub fn extract_points(records: &[FacilityRecord], policy: GeometryPolicy) -> Result<Extraction> {
    let mut points = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for (index, record) in records.iter().enumerate() {
        match resolve_coordinate(&record.geometry) {
            Ok((latitude, longitude)) => points.push(LocatedPoint {
                latitude,
                longitude,
                attributes: record.attributes.clone(),
            }),
            Err(failure) => match policy {
                GeometryPolicy::Strict => return Err(failure.to_error(index)),
                GeometryPolicy::Skip => {
                    warn!(index, error = %failure.to_error(index), "dropping facility record");
                    dropped += 1;
                }
            },
        }
    }

    debug!(
        extracted = points.len(),
        dropped, "extracted facility coordinates"
    );
    Ok(Extraction { points, dropped })
}

/// Centroid-or-identity resolution for a single geometry.
fn resolve_coordinate(geometry: &Geometry<f64>) -> std::result::Result<(f64, f64), ResolveFailure> {
    let resolved = match geometry {
        Geometry::Point(point) => Some((point.y(), point.x())),
        Geometry::Polygon(polygon) => polygon.centroid().map(|c| (c.y(), c.x())),
        Geometry::MultiPolygon(multi) => multi.centroid().map(|c| (c.y(), c.x())),
        other => return Err(ResolveFailure::Unsupported(geometry_kind(other))),
    };

    // An empty polygon yields no centroid; treat it like a non-finite input.
    let Some((latitude, longitude)) = resolved else {
        return Err(ResolveFailure::NonFinite);
    };
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(ResolveFailure::NonFinite);
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ResolveFailure::OutOfRange {
            latitude,
            longitude,
        });
    }
    Ok((latitude, longitude))
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "point",
        Geometry::Line(_) => "line",
        Geometry::LineString(_) => "line-string",
        Geometry::Polygon(_) => "polygon",
        Geometry::MultiPoint(_) => "multi-point",
        Geometry::MultiLineString(_) => "multi-line-string",
        Geometry::MultiPolygon(_) => "multi-polygon",
        Geometry::GeometryCollection(_) => "geometry-collection",
        Geometry::Rect(_) => "rect",
        Geometry::Triangle(_) => "triangle",
    }
}

impl ResolveFailure {
    fn to_error(&self, index: usize) -> Error {
        match *self {
            ResolveFailure::Unsupported(kind) => Error::UnsupportedGeometry { index, kind },
            ResolveFailure::NonFinite => Error::NonFiniteCoordinate { index },
            ResolveFailure::OutOfRange {
                latitude,
                longitude,
            } => Error::CoordinateOutOfRange {
                index,
                latitude,
                longitude,
            },
        }
    }
}
