//! Pure transforms from route shapes to drawable coordinates.
//!
//! Nothing here reorders or deduplicates: drawing order is the order the
//! route's paths and points arrive in.

use spirit_transit::{Coordinate, PatternPoint, Route, RouteShortName};

/// A stop point tagged with the route it was drawn for.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteStop {
    pub point: PatternPoint,
    pub route: RouteShortName,
    pub color: String,
}

/// Every point of every path of every route, concatenated in order.
pub fn route_coordinates<'a>(routes: impl IntoIterator<Item = &'a Route>) -> Vec<Coordinate> {
    routes
        .into_iter()
        .flat_map(Route::points)
        .map(PatternPoint::coordinate)
        .collect()
}

/// Stops of a single route, grouped per pattern path.
pub fn route_stops(route: &Route) -> Vec<Vec<RouteStop>> {
    route
        .pattern_paths
        .iter()
        .map(|path| {
            path.stops()
                .map(|point| RouteStop {
                    point: point.clone(),
                    route: route.short_name.clone(),
                    color: route.color.clone(),
                })
                .collect()
        })
        .collect()
}
