pub mod camera;
pub mod geometry;
pub mod markers;
pub mod poller;
pub mod surface;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::{CameraController, RecenterStep, RouteCategory, locate_user};
pub use markers::{BusMarker, MarkerShape, RoutePolyline, StopMarker};
pub use poller::{BusPoller, BusSnapshot, PollerState};
pub use surface::{
    CameraRegion, EdgePadding, FitRequest, GeolocationProvider, LocationAccuracy, MapSurface,
    Permission, ViewMode,
};
pub use view::ViewController;
