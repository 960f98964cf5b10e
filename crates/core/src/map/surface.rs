//! Viewport types and the collaborators the camera talks to.
//!
//! The map widget and the device location service live outside this crate;
//! they are reached only through [`MapSurface`] and [`GeolocationProvider`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spirit_transit::{Coordinate, bounding_rect};

/// A viewport: center plus span in degrees. Smaller deltas are more zoomed in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl CameraRegion {
    pub const fn new(
        latitude: f64,
        longitude: f64,
        latitude_delta: f64,
        longitude_delta: f64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        }
    }

    pub fn centered_on(center: Coordinate, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self::new(center.latitude, center.longitude, latitude_delta, longitude_delta)
    }

    /// The tightest region containing every coordinate, before padding.
    pub fn enclosing(coordinates: &[Coordinate]) -> Option<Self> {
        let rect = bounding_rect(coordinates)?;
        let center = rect.center();

        Some(Self::new(center.y, center.x, rect.height(), rect.width()))
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Screen-space insets applied when fitting to coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgePadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    RouteOverview,
    UserCentered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Location accuracy tiers, coarsest first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationAccuracy {
    Lowest,
    Low,
    #[default]
    Balanced,
    High,
    Highest,
    BestForNavigation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FitRequest {
    /// Every coordinate of every drawn route, in drawing order
    pub coordinates: Vec<Coordinate>,
    pub bounds: Option<CameraRegion>,
    pub padding: EdgePadding,
    pub animated: bool,
}

/// The map widget's camera
pub trait MapSurface: Send + Sync {
    fn animate_to_region(&self, region: CameraRegion, duration: Duration);
    fn fit_to_coordinates(&self, request: FitRequest);
}

/// Device location service. Both calls may take seconds.
pub trait GeolocationProvider: Send + Sync {
    fn request_permission<'a>(&'a self) -> Pin<Box<dyn Future<Output = Permission> + Send + 'a>>;

    /// `None` when no fix could be obtained
    fn current_position<'a>(
        &'a self,
        accuracy: LocationAccuracy,
    ) -> Pin<Box<dyn Future<Output = Option<Coordinate>> + Send + 'a>>;
}
