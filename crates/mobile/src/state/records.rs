//! Plain records crossing the FFI boundary, and their conversions to and
//! from the core map types.

use std::time::Duration;

use spirit_core::map::{
    BusMarker, BusSnapshot, CameraRegion, EdgePadding, FitRequest, MarkerShape, RoutePolyline,
    StopMarker,
};
use spirit_core::settings::DefaultRouteGroup;
use spirit_core::transit::{Bus, Coordinate, PatternPath, PatternPoint, Route};

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct CoordinateRecord {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinate> for CoordinateRecord {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }
    }
}

impl From<CoordinateRecord> for Coordinate {
    fn from(record: CoordinateRecord) -> Self {
        Coordinate::new(record.latitude, record.longitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct CameraRegionRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl From<CameraRegion> for CameraRegionRecord {
    fn from(region: CameraRegion) -> Self {
        Self {
            latitude: region.latitude,
            longitude: region.longitude,
            latitude_delta: region.latitude_delta,
            longitude_delta: region.longitude_delta,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct EdgePaddingRecord {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl From<EdgePadding> for EdgePaddingRecord {
    fn from(padding: EdgePadding) -> Self {
        Self {
            top: padding.top,
            right: padding.right,
            bottom: padding.bottom,
            left: padding.left,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct FitRequestRecord {
    pub coordinates: Vec<CoordinateRecord>,
    pub bounds: Option<CameraRegionRecord>,
    pub padding: EdgePaddingRecord,
    pub animated: bool,
}

impl From<FitRequest> for FitRequestRecord {
    fn from(request: FitRequest) -> Self {
        Self {
            coordinates: request.coordinates.into_iter().map(Into::into).collect(),
            bounds: request.bounds.map(Into::into),
            padding: request.padding.into(),
            animated: request.animated,
        }
    }
}

/// Milliseconds, saturating
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Routes and buses coming in from the host
// ============================================================================

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct PatternPointRecord {
    pub key: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_stop: bool,
    pub is_time_point: bool,
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct PatternPathRecord {
    pub points: Vec<PatternPointRecord>,
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct RouteRecord {
    pub short_name: String,
    /// Hex without the leading `#`
    pub color: String,
    pub pattern_paths: Vec<PatternPathRecord>,
}

impl From<PatternPointRecord> for PatternPoint {
    fn from(record: PatternPointRecord) -> Self {
        PatternPoint {
            key: record.key.into(),
            name: record.name,
            latitude: record.latitude,
            longitude: record.longitude,
            is_stop: record.is_stop,
            is_time_point: record.is_time_point,
        }
    }
}

impl From<RouteRecord> for Route {
    fn from(record: RouteRecord) -> Self {
        let paths = record
            .pattern_paths
            .into_iter()
            .map(|path| PatternPath::new(path.points.into_iter().map(Into::into).collect()))
            .collect();

        Route::new(record.short_name, record.color, paths)
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct BusRecord {
    pub key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub heading: Option<f64>,
}

impl From<BusRecord> for Bus {
    fn from(record: BusRecord) -> Self {
        Bus::new(record.key, record.latitude, record.longitude, record.heading)
    }
}

// ============================================================================
// Drawables going out to the host
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum MarkerShapeRecord {
    Round,
    Square,
}

impl From<MarkerShape> for MarkerShapeRecord {
    fn from(shape: MarkerShape) -> Self {
        match shape {
            MarkerShape::Round => Self::Round,
            MarkerShape::Square => Self::Square,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct PolylineRecord {
    pub key: String,
    pub coordinates: Vec<CoordinateRecord>,
    pub stroke_color: String,
    pub stroke_width: f32,
}

impl From<&RoutePolyline> for PolylineRecord {
    fn from(polyline: &RoutePolyline) -> Self {
        Self {
            key: polyline.key.to_string(),
            coordinates: polyline.coordinates.iter().copied().map(Into::into).collect(),
            stroke_color: polyline.stroke_color.clone(),
            stroke_width: polyline.stroke_width,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct StopMarkerRecord {
    pub key: String,
    pub coordinate: CoordinateRecord,
    pub name: String,
    pub route: String,
    pub fill_color: String,
    pub border_color: String,
    pub shape: MarkerShapeRecord,
}

impl From<&StopMarker> for StopMarkerRecord {
    fn from(marker: &StopMarker) -> Self {
        Self {
            key: marker.key.to_string(),
            coordinate: marker.coordinate.into(),
            name: marker.name.clone(),
            route: marker.route.to_string(),
            fill_color: marker.fill_color.clone(),
            border_color: marker.border_color.clone(),
            shape: marker.shape.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct BusMarkerRecord {
    pub key: String,
    pub coordinate: CoordinateRecord,
    pub heading: Option<f64>,
    pub route: String,
    pub fill_color: String,
    pub border_color: String,
    pub body_rotation: f64,
    pub glyph_rotation: f64,
}

impl From<&BusMarker> for BusMarkerRecord {
    fn from(marker: &BusMarker) -> Self {
        Self {
            key: marker.key.to_string(),
            coordinate: marker.coordinate.into(),
            heading: marker.heading,
            route: marker.route.to_string(),
            fill_color: marker.fill_color.clone(),
            border_color: marker.border_color.clone(),
            body_rotation: marker.body_rotation,
            glyph_rotation: marker.glyph_rotation,
        }
    }
}

/// The live buses of the drawn route, as pushed to the map after each poll
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct BusSnapshotRecord {
    pub route: Option<String>,
    pub buses: Vec<BusMarkerRecord>,

    /// Unix milliseconds of the fetch that produced `buses`
    pub updated_at_ms: Option<i64>,
}

impl BusSnapshotRecord {
    pub(crate) fn new(snapshot: &BusSnapshot, markers: &[BusMarker]) -> Self {
        Self {
            route: snapshot.route.as_ref().map(ToString::to_string),
            buses: markers.iter().map(Into::into).collect(),
            updated_at_ms: snapshot.updated_at.map(|at| at.timestamp_millis()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum DefaultRouteGroupRecord {
    AllRoutes,
    Favorites,
}

impl From<DefaultRouteGroup> for DefaultRouteGroupRecord {
    fn from(group: DefaultRouteGroup) -> Self {
        match group {
            DefaultRouteGroup::AllRoutes => Self::AllRoutes,
            DefaultRouteGroup::Favorites => Self::Favorites,
        }
    }
}

impl From<DefaultRouteGroupRecord> for DefaultRouteGroup {
    fn from(record: DefaultRouteGroupRecord) -> Self {
        match record {
            DefaultRouteGroupRecord::AllRoutes => Self::AllRoutes,
            DefaultRouteGroupRecord::Favorites => Self::Favorites,
        }
    }
}
