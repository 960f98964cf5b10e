//! Route geometry: routes, pattern paths and pattern points.
//!
//! Routes are owned by whoever fetched them and are never mutated here.
//! Path and point order is drawing order and must be preserved.

use crate::identifiers::*;
use crate::models::types::Coordinate;

/// One vertex of a route's drawn shape, optionally a stop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PatternPoint {
    pub key: PointKey,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_stop: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_time_point: bool,
}

impl PatternPoint {
    /// A named stop. Time points are drawn as squares.
    pub fn stop(
        key: impl Into<PointKey>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        is_time_point: bool,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            latitude,
            longitude,
            is_stop: true,
            is_time_point,
        }
    }

    /// A shape-only point with no stop attached.
    pub fn waypoint(key: impl Into<PointKey>, latitude: f64, longitude: f64) -> Self {
        Self {
            key: key.into(),
            name: String::new(),
            latitude,
            longitude,
            is_stop: false,
            is_time_point: false,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Ordered polyline of pattern points.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternPath {
    #[cfg_attr(feature = "serde", serde(rename = "patternPoints"))]
    pub points: Vec<PatternPoint>,
}

impl PatternPath {
    pub fn new(points: Vec<PatternPoint>) -> Self {
        Self { points }
    }

    pub fn stops(&self) -> impl Iterator<Item = &PatternPoint> {
        self.points.iter().filter(|point| point.is_stop)
    }
}

/// A bus route (e.g., "01 Bonfire", "47 RELLIS Circulator")
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Route {
    pub short_name: RouteShortName,

    /// Hex RGB without the leading `#`, e.g. "500000"
    pub color: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub pattern_paths: Vec<PatternPath>,
}

impl Route {
    pub fn new(
        short_name: impl Into<RouteShortName>,
        color: impl Into<String>,
        pattern_paths: Vec<PatternPath>,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            color: color.into(),
            pattern_paths,
        }
    }

    /// Every point of every path, in drawing order.
    pub fn points(&self) -> impl Iterator<Item = &PatternPoint> {
        self.pattern_paths.iter().flat_map(|path| path.points.iter())
    }

    pub fn stops(&self) -> impl Iterator<Item = &PatternPoint> {
        self.pattern_paths.iter().flat_map(PatternPath::stops)
    }
}
