//! Core value types and errors shared by the transit models.

use crate::identifiers::*;

// ============================================================================
// Data Structures
// ============================================================================

/// A WGS84 position in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

// geo uses x = longitude, y = latitude
impl From<Coordinate> for geo::Point {
    fn from(coordinate: Coordinate) -> Self {
        geo::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<geo::Coord> for Coordinate {
    fn from(coord: geo::Coord) -> Self {
        Self::new(coord.y, coord.x)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Route not found: {0}")]
    RouteNotFound(RouteShortName),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
