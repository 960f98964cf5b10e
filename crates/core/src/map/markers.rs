//! Render-ready descriptors for polylines, stop markers and bus markers.
//!
//! The map widget draws these as-is; all color and rotation math is done here.

use palette::{Hsl, IntoColor, Lighten, Srgb};
use spirit_transit::{Bus, BusKey, Coordinate, PointKey, Route, RouteShortName};

use crate::map::geometry::{RouteStop, route_coordinates};

/// HSL lightness added to a route color for marker borders
const BORDER_LIGHTEN: f32 = 0.35;

/// The bus glyph points up-left at zero rotation
const ICON_ROTATION_OFFSET: f64 = 135.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerShape {
    Round,
    Square,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutePolyline {
    pub key: RouteShortName,
    pub coordinates: Vec<Coordinate>,
    pub stroke_color: String,
    pub stroke_width: f32,
}

impl RoutePolyline {
    pub fn for_route(route: &Route, stroke_width: f32) -> Self {
        Self {
            key: route.short_name.clone(),
            coordinates: route_coordinates([route]),
            stroke_color: css_color(&route.color),
            stroke_width,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StopMarker {
    pub key: PointKey,
    pub coordinate: Coordinate,
    pub name: String,
    pub route: RouteShortName,
    pub fill_color: String,
    pub border_color: String,
    pub shape: MarkerShape,
}

impl From<&RouteStop> for StopMarker {
    fn from(stop: &RouteStop) -> Self {
        Self {
            key: stop.point.key.clone(),
            coordinate: stop.point.coordinate(),
            name: stop.point.name.clone(),
            route: stop.route.clone(),
            fill_color: css_color(&stop.color),
            border_color: css_color(&border_hex(&stop.color)),
            shape: if stop.point.is_time_point {
                MarkerShape::Square
            } else {
                MarkerShape::Round
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BusMarker {
    pub key: BusKey,
    pub coordinate: Coordinate,
    pub heading: Option<f64>,
    pub route: RouteShortName,
    pub fill_color: String,
    pub border_color: String,

    /// Rotation of the marker body, degrees; 0 without a heading
    pub body_rotation: f64,

    /// Counter-rotation that keeps the bus glyph upright, degrees; 0
    /// without a heading
    pub glyph_rotation: f64,
}

impl BusMarker {
    pub fn new(bus: &Bus, route: &Route) -> Self {
        let heading = bus.heading();

        Self {
            key: bus.key.clone(),
            coordinate: bus.coordinate(),
            heading,
            route: route.short_name.clone(),
            fill_color: css_color(&route.color),
            border_color: css_color(&border_hex(&route.color)),
            body_rotation: heading.map_or(0.0, icon_rotation),
            glyph_rotation: heading.map_or(0.0, |h| icon_rotation(-h - 90.0)),
        }
    }
}

pub fn css_color(hex: &str) -> String {
    format!("#{hex}")
}

/// Rounds half toward positive infinity before applying the icon offset.
pub fn icon_rotation(bearing: f64) -> f64 {
    (bearing + 0.5).floor() - ICON_ROTATION_OFFSET
}

/// A lighter variant of a hex color (no `#`), or `None` if it does not parse.
pub fn lighter_color(hex: &str) -> Option<String> {
    let rgb: Srgb<u8> = hex.parse().ok()?;
    let hsl: Hsl = rgb.into_format::<f32>().into_color();
    let lighter: Srgb = hsl.lighten(BORDER_LIGHTEN).into_color();
    let lighter: Srgb<u8> = lighter.into_format();

    Some(format!(
        "{:02X}{:02X}{:02X}",
        lighter.red, lighter.green, lighter.blue
    ))
}

fn border_hex(hex: &str) -> String {
    lighter_color(hex).unwrap_or_else(|| {
        tracing::warn!(color = hex, "route color is not valid hex; using it for the border as-is");
        hex.to_owned()
    })
}
