//! Coordinate system labels for target coordinates.
//!
//! Targets are always matched against the dataset's native x/y axes as
//! entered. The selected system only drives labels, defaults and range
//! validation; no reprojection happens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ExtractError, ExtractResult};

/// Coordinate systems a caller may declare for the target point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// Irish Grid (easting/northing in metres)
    #[default]
    IrishGrid,
    /// British National Grid (easting/northing in metres)
    BritishNationalGrid,
    /// Geographic latitude/longitude in degrees
    LatLon,
}

impl CoordinateSystem {
    /// Check if this is a geographic (lat/lon) system.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CoordinateSystem::LatLon)
    }

    /// Labels for the (x, y) inputs.
    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            CoordinateSystem::IrishGrid | CoordinateSystem::BritishNationalGrid => {
                ("Easting", "Northing")
            }
            CoordinateSystem::LatLon => ("Longitude", "Latitude"),
        }
    }

    /// Default target as (x, y).
    pub fn default_target(&self) -> (f64, f64) {
        match self {
            CoordinateSystem::IrishGrid | CoordinateSystem::BritishNationalGrid => {
                (341914.1, 392651.1)
            }
            CoordinateSystem::LatLon => (-5.9, 54.5),
        }
    }

    /// Validate a target pair for this system.
    pub fn validate_target(&self, x: f64, y: f64) -> ExtractResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ExtractError::invalid_request(format!(
                "target coordinates must be finite numbers, got ({}, {})",
                x, y
            )));
        }
        if self.is_geographic() {
            if !(-180.0..=180.0).contains(&x) {
                return Err(ExtractError::invalid_request(format!(
                    "longitude {} outside [-180, 180]",
                    x
                )));
            }
            if !(-90.0..=90.0).contains(&y) {
                return Err(ExtractError::invalid_request(format!(
                    "latitude {} outside [-90, 90]",
                    y
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for CoordinateSystem {
    type Err = ExtractError;

    /// Accepts labels like "Irish Grid", "irish_grid", "EPSG:29903",
    /// "British National Grid", "bng", "EPSG:27700", "Latitude/Longitude",
    /// "latlon", "EPSG:4326".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ':')
            .collect();

        match normalized.as_str() {
            "irishgrid" | "ig" | "epsg:29902" | "epsg:29903" => Ok(CoordinateSystem::IrishGrid),
            "britishnationalgrid" | "bng" | "osgb" | "epsg:27700" => {
                Ok(CoordinateSystem::BritishNationalGrid)
            }
            "latitudelongitude" | "latlon" | "lonlat" | "wgs84" | "epsg:4326" => {
                Ok(CoordinateSystem::LatLon)
            }
            _ => Err(ExtractError::invalid_request(format!(
                "unknown coordinate system: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CoordinateSystem::IrishGrid => "Irish Grid",
            CoordinateSystem::BritishNationalGrid => "British National Grid",
            CoordinateSystem::LatLon => "Latitude/Longitude",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("Irish Grid".parse::<CoordinateSystem>().unwrap(), CoordinateSystem::IrishGrid);
        assert_eq!(
            "british_national_grid".parse::<CoordinateSystem>().unwrap(),
            CoordinateSystem::BritishNationalGrid
        );
        assert_eq!("EPSG:27700".parse::<CoordinateSystem>().unwrap(), CoordinateSystem::BritishNationalGrid);
        assert_eq!("Latitude/Longitude".parse::<CoordinateSystem>().unwrap(), CoordinateSystem::LatLon);
        assert!("mercator".parse::<CoordinateSystem>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for cs in [
            CoordinateSystem::IrishGrid,
            CoordinateSystem::BritishNationalGrid,
            CoordinateSystem::LatLon,
        ] {
            assert_eq!(cs.to_string().parse::<CoordinateSystem>().unwrap(), cs);
        }
    }

    #[test]
    fn test_latlon_range_validation() {
        let cs = CoordinateSystem::LatLon;
        assert!(cs.validate_target(-5.9, 54.5).is_ok());
        assert!(cs.validate_target(-5.9, 95.0).is_err());
        assert!(cs.validate_target(190.0, 54.5).is_err());
    }

    #[test]
    fn test_projected_targets_are_unbounded() {
        let cs = CoordinateSystem::IrishGrid;
        let (x, y) = cs.default_target();
        assert!(cs.validate_target(x, y).is_ok());
        assert!(cs.validate_target(1.0e9, -1.0e9).is_ok());
        assert!(cs.validate_target(f64::NAN, 0.0).is_err());
    }
}
