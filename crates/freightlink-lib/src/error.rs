use thiserror::Error;

/// Convenient result alias for the freightlink library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Geometry and input errors are fatal to a pipeline invocation; per-edge
/// routing failures never appear here (the refiner absorbs them, see
/// [`crate::refine`]).
#[derive(Debug, Error)]
pub enum Error {
    /// A facility record carries a geometry kind the extractor cannot resolve
    /// to a representative coordinate.
    #[error("record {index} has unsupported geometry kind: {kind}")]
    UnsupportedGeometry { index: usize, kind: &'static str },

    /// A facility record resolved to a NaN or infinite coordinate.
    #[error("record {index} resolved to a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    /// A facility record resolved outside WGS84 bounds.
    #[error("record {index} resolved outside WGS84 bounds (lat {latitude}, lon {longitude})")]
    CoordinateOutOfRange {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// A bounding region failed validation.
    #[error("invalid bounding region: {reason}")]
    InvalidRegion { reason: String },

    /// An unrecognized transport mode name was supplied.
    #[error("unknown transport mode: {name}")]
    UnknownMode { name: String },

    /// GeoJSON input was well-formed but not a feature collection or feature.
    #[error("expected a GeoJSON FeatureCollection or Feature")]
    NotAFeatureCollection,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for GeoJSON parsing and conversion errors.
    #[error(transparent)]
    Geojson(#[from] geojson::Error),
}
