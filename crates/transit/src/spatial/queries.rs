//! Bounding-box queries for fitting the viewport.

use geo::{BoundingRect, MultiPoint, Point, Rect};

use crate::models::types::Coordinate;

/// Smallest axis-aligned rectangle enclosing every coordinate
///
/// Returns `None` for an empty slice. x is longitude, y is latitude.
pub fn bounding_rect(coordinates: &[Coordinate]) -> Option<Rect> {
    let points: MultiPoint = coordinates
        .iter()
        .copied()
        .map(Point::from)
        .collect::<Vec<_>>()
        .into();

    points.bounding_rect()
}
