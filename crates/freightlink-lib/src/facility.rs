//! Facility records and transport category modes.
//!
//! A [`FacilityRecord`] is one input feature: a tagged geometry (point,
//! polygon or multi-polygon) plus an opaque attribute bag. Records are
//! immutable once loaded; how they are fetched from a feature service is the
//! caller's concern, this module only converts already-downloaded GeoJSON.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use geo_types::Geometry;
use geojson::{Feature, GeoJson};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// Opaque per-facility attribute bag.
///
/// `BTreeMap` keeps iteration (and therefore serialized output) deterministic.
pub type Attributes = BTreeMap<String, Value>;

/// Transport categories a facility query can target.
///
/// Each mode maps to the feature-tag filter the surrounding service uses when
/// resolving facility records for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    RoadFreight,
    Air,
    Sea,
    Rail,
}

impl TransportMode {
    /// All supported modes, in display order.
    pub const ALL: [TransportMode; 4] = [
        TransportMode::RoadFreight,
        TransportMode::Air,
        TransportMode::Sea,
        TransportMode::Rail,
    ];

    /// Domain feature-tag filter for this mode: `(key, accepted values)`.
    pub fn feature_tags(self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            TransportMode::RoadFreight => &[("building", &["warehouse", "depot", "industrial"])],
            TransportMode::Air => &[("aeroway", &["terminal", "hangar", "cargo"])],
            TransportMode::Sea => &[("harbour", &[]), ("man_made", &["pier", "dock"])],
            TransportMode::Rail => &[("railway", &["station", "yard", "cargo_terminal"])],
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            TransportMode::RoadFreight => "road-freight",
            TransportMode::Air => "air",
            TransportMode::Sea => "sea",
            TransportMode::Rail => "rail",
        };
        f.write_str(value)
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    /// Parse a mode name. The legacy service names (`auto`, `aero`) are
    /// accepted as aliases.
    fn from_str(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "road-freight" | "road_freight" | "road" | "auto" => Ok(TransportMode::RoadFreight),
            "air" | "aero" => Ok(TransportMode::Air),
            "sea" => Ok(TransportMode::Sea),
            "rail" => Ok(TransportMode::Rail),
            _ => Err(Error::UnknownMode {
                name: raw.to_string(),
            }),
        }
    }
}

/// One input geometric feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    pub geometry: Geometry<f64>,
    pub attributes: Attributes,
}

impl FacilityRecord {
    pub fn new(geometry: Geometry<f64>, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// Convenience constructor for a point facility without attributes.
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Self {
            geometry: Geometry::Point(geo_types::Point::new(longitude, latitude)),
            attributes: Attributes::new(),
        }
    }

    /// Attach one attribute, consuming and returning the record.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Parse facility records from raw GeoJSON text.
///
/// Accepts a `FeatureCollection` or a single `Feature`. Features without a
/// geometry cannot become records and are skipped with a warning; geometry
/// kinds the extractor cannot handle are kept here and dealt with by the
/// extraction policy.
pub fn records_from_geojson(raw: &str) -> Result<Vec<FacilityRecord>> {
    let parsed: GeoJson = raw.parse()?;
    let features = match parsed {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => return Err(Error::NotAFeatureCollection),
    };

    let mut records = Vec::with_capacity(features.len());
    for (index, feature) in features.into_iter().enumerate() {
        match feature_to_record(feature)? {
            Some(record) => records.push(record),
            None => warn!(index, "skipping feature without geometry"),
        }
    }
    Ok(records)
}

/// Load facility records from a GeoJSON file on disk.
pub fn load_facilities(path: &Path) -> Result<Vec<FacilityRecord>> {
    let raw = fs::read_to_string(path)?;
    records_from_geojson(&raw)
}

fn feature_to_record(feature: Feature) -> Result<Option<FacilityRecord>> {
    let Some(geometry) = feature.geometry else {
        return Ok(None);
    };
    let geometry = Geometry::<f64>::try_from(geometry.value)?;
    let attributes = feature
        .properties
        .map(|properties| properties.into_iter().collect())
        .unwrap_or_default();
    Ok(Some(FacilityRecord::new(geometry, attributes)))
}
