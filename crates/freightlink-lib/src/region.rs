use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Geographic bounding region in WGS84 degrees.
///
/// Invariant: all bounds are finite, latitudes within `[-90, 90]`, longitudes
/// within `[-180, 180]`, `west < east` and `south < north`. Construct through
/// [`BoundingRegion::new`] to uphold it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingRegion {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingRegion {
    /// Build a validated bounding region.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        let region = Self {
            west,
            south,
            east,
            north,
        };
        region.validate()?;
        Ok(region)
    }

    fn validate(&self) -> Result<()> {
        let bounds = [self.west, self.south, self.east, self.north];
        if bounds.iter().any(|value| !value.is_finite()) {
            return Err(Error::InvalidRegion {
                reason: "bounds must be finite".to_string(),
            });
        }
        if self.west < -180.0 || self.east > 180.0 {
            return Err(Error::InvalidRegion {
                reason: format!(
                    "longitudes must lie within [-180, 180], got [{}, {}]",
                    self.west, self.east
                ),
            });
        }
        if self.south < -90.0 || self.north > 90.0 {
            return Err(Error::InvalidRegion {
                reason: format!(
                    "latitudes must lie within [-90, 90], got [{}, {}]",
                    self.south, self.north
                ),
            });
        }
        if self.west >= self.east {
            return Err(Error::InvalidRegion {
                reason: format!("west ({}) must be less than east ({})", self.west, self.east),
            });
        }
        if self.south >= self.north {
            return Err(Error::InvalidRegion {
                reason: format!(
                    "south ({}) must be less than north ({})",
                    self.south, self.north
                ),
            });
        }
        Ok(())
    }

    /// Center of the region as `(latitude, longitude)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Whether a coordinate falls inside the region (bounds inclusive).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.south
            && latitude <= self.north
            && longitude >= self.west
            && longitude <= self.east
    }
}

impl fmt::Display for BoundingRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.west, self.south, self.east, self.north
        )
    }
}

impl FromStr for BoundingRegion {
    type Err = Error;

    /// Parse `west,south,east,north` in degrees.
    fn from_str(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(Error::InvalidRegion {
                reason: format!("expected west,south,east,north, got {raw:?}"),
            });
        }
        let mut bounds = [0.0f64; 4];
        for (slot, part) in bounds.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| Error::InvalidRegion {
                reason: format!("{part:?} is not a number"),
            })?;
        }
        Self::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }
}
