//! Camera control: default regions, follow-user and fit-to-routes.
//!
//! The controller owns the current [`ViewMode`]. Only [`CameraController::reset_to_default_region`]
//! and [`CameraController::show_user_position`] change it; fitting to routes
//! moves the camera but leaves the mode alone, so after a selection change
//! the view can be fitted to routes while still flagged as user-centered.

use std::sync::Arc;

use spirit_transit::Coordinate;

use crate::config::MapViewConfig;
use crate::map::surface::{
    CameraRegion, FitRequest, GeolocationProvider, LocationAccuracy, MapSurface, Permission,
    ViewMode,
};

/// Which group of routes the user is browsing; picks the default region.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::EnumString, strum::Display, strum::AsRefStr,
)]
pub enum RouteCategory {
    #[default]
    #[strum(serialize = "On Campus")]
    OnCampus,
    #[strum(serialize = "Off Campus")]
    OffCampus,
}

impl RouteCategory {
    /// Anything other than "Off Campus" is treated as on campus.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

/// What a recenter press needs after the camera has reacted to it
pub enum RecenterStep {
    ShowedDefault(CameraRegion),
    LocateUser {
        geolocation: Arc<dyn GeolocationProvider>,
        accuracy: LocationAccuracy,
    },
}

pub struct CameraController {
    surface: Arc<dyn MapSurface>,
    geolocation: Arc<dyn GeolocationProvider>,
    config: MapViewConfig,
    mode: ViewMode,
    last_region: Option<CameraRegion>,
}

impl CameraController {
    pub fn new(
        config: MapViewConfig,
        surface: Arc<dyn MapSurface>,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> Self {
        Self {
            surface,
            geolocation,
            config,
            mode: ViewMode::RouteOverview,
            last_region: None,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_view_centered_on_user(&self) -> bool {
        self.mode == ViewMode::UserCentered
    }

    /// The last region requested from the surface, if any
    pub fn last_region(&self) -> Option<CameraRegion> {
        self.last_region
    }

    pub fn geolocation(&self) -> Arc<dyn GeolocationProvider> {
        Arc::clone(&self.geolocation)
    }

    pub fn location_accuracy(&self) -> LocationAccuracy {
        self.config.location_accuracy
    }

    pub fn reset_to_default_region(&mut self, category: RouteCategory) -> CameraRegion {
        let region = self.config.default_region(category);
        self.animate_to(region);
        self.mode = ViewMode::RouteOverview;

        region
    }

    /// Ask for location permission and zoom in on the device.
    ///
    /// Returns `None`, with no camera or mode change, if permission is
    /// denied or no fix is available.
    pub async fn center_on_user(&mut self) -> Option<CameraRegion> {
        let position = locate_user(self.geolocation.as_ref(), self.config.location_accuracy).await?;

        Some(self.show_user_position(position))
    }

    /// Second half of [`Self::center_on_user`], for callers that located the
    /// device without holding the controller.
    pub fn show_user_position(&mut self, position: Coordinate) -> CameraRegion {
        let region = CameraRegion::centered_on(
            position,
            self.config.user_latitude_delta,
            self.config.user_longitude_delta,
        );
        self.animate_to(region);
        self.mode = ViewMode::UserCentered;

        region
    }

    /// Toggle between the default region and the user's position.
    pub async fn recenter(&mut self, category: RouteCategory) -> ViewMode {
        if let RecenterStep::LocateUser {
            geolocation,
            accuracy,
        } = self.begin_recenter(category)
        {
            if let Some(position) = locate_user(geolocation.as_ref(), accuracy).await {
                self.show_user_position(position);
            }
        }

        self.mode
    }

    /// The synchronous half of [`Self::recenter`]. Leaving the user-centered
    /// view happens here; otherwise the caller locates the device and hands
    /// the fix to [`Self::show_user_position`].
    pub fn begin_recenter(&mut self, category: RouteCategory) -> RecenterStep {
        match self.mode {
            ViewMode::UserCentered => {
                RecenterStep::ShowedDefault(self.reset_to_default_region(category))
            }
            ViewMode::RouteOverview => RecenterStep::LocateUser {
                geolocation: self.geolocation(),
                accuracy: self.location_accuracy(),
            },
        }
    }

    pub fn fit_to_coordinates(&mut self, coordinates: &[Coordinate]) {
        if self.mode == ViewMode::UserCentered {
            tracing::debug!("fitting to drawn routes while centered on user; view mode unchanged");
        }

        let bounds = CameraRegion::enclosing(coordinates);
        if bounds.is_some() {
            self.last_region = bounds;
        }

        self.surface.fit_to_coordinates(FitRequest {
            coordinates: coordinates.to_vec(),
            bounds,
            padding: self.config.fit_padding,
            animated: true,
        });
    }

    fn animate_to(&mut self, region: CameraRegion) {
        self.surface
            .animate_to_region(region, self.config.region_animation());
        self.last_region = Some(region);
    }
}

/// Request permission, then read the device position.
pub async fn locate_user(
    geolocation: &dyn GeolocationProvider,
    accuracy: LocationAccuracy,
) -> Option<Coordinate> {
    if geolocation.request_permission().await == Permission::Denied {
        tracing::debug!("location permission denied; leaving camera where it is");
        return None;
    }

    let position = geolocation.current_position(accuracy).await;
    if position.is_none() {
        tracing::debug!("no location fix available");
    }

    position
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::map::testing::{FakeGeolocation, RecordingSurface, SurfaceEvent};

    fn controller(geolocation: FakeGeolocation) -> (CameraController, Arc<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::default());
        let camera = CameraController::new(
            MapViewConfig::default(),
            surface.clone(),
            Arc::new(geolocation),
        );
        (camera, surface)
    }

    #[test]
    fn test_route_category_tags() {
        assert_eq!(RouteCategory::from_tag("Off Campus"), RouteCategory::OffCampus);
        assert_eq!(RouteCategory::from_tag("On Campus"), RouteCategory::OnCampus);
        assert_eq!(RouteCategory::from_tag("Gameday"), RouteCategory::OnCampus);
        assert_eq!(RouteCategory::OffCampus.to_string(), "Off Campus");
    }

    #[test]
    fn test_reset_uses_category_region() {
        let (mut camera, surface) = controller(FakeGeolocation::granted(30.0, -96.0));
        let config = MapViewConfig::default();

        let region = camera.reset_to_default_region(RouteCategory::OffCampus);

        assert_eq!(region, config.off_campus_region);
        assert_eq!(camera.mode(), ViewMode::RouteOverview);
        assert_eq!(
            surface.events(),
            vec![SurfaceEvent::Animate(region, Duration::from_millis(250))]
        );
    }

    #[tokio::test]
    async fn test_center_on_user_zooms_in() {
        let (mut camera, surface) = controller(FakeGeolocation::granted(30.62, -96.33));

        let region = camera.center_on_user().await.unwrap();

        assert_eq!(region.latitude, 30.62);
        assert_eq!(region.longitude, -96.33);
        assert_eq!(region.latitude_delta, 0.0005);
        assert_eq!(region.longitude_delta, 0.005);
        assert!(camera.is_view_centered_on_user());
        assert_eq!(surface.events().len(), 1);
    }

    #[tokio::test]
    async fn test_permission_denied_changes_nothing() {
        let geolocation = FakeGeolocation::denied();
        let (mut camera, surface) = controller(geolocation.clone());

        assert_eq!(camera.center_on_user().await, None);

        assert_eq!(camera.mode(), ViewMode::RouteOverview);
        assert_eq!(camera.last_region(), None);
        assert!(surface.events().is_empty());
        assert_eq!(geolocation.position_reads(), 0);
    }

    #[tokio::test]
    async fn test_missing_fix_changes_nothing() {
        let (mut camera, surface) = controller(FakeGeolocation::without_fix());

        assert_eq!(camera.center_on_user().await, None);
        assert_eq!(camera.mode(), ViewMode::RouteOverview);
        assert!(surface.events().is_empty());
    }

    #[tokio::test]
    async fn test_recenter_toggles() {
        let (mut camera, surface) = controller(FakeGeolocation::granted(30.62, -96.33));

        assert_eq!(camera.recenter(RouteCategory::OnCampus).await, ViewMode::UserCentered);
        assert_eq!(camera.recenter(RouteCategory::OnCampus).await, ViewMode::RouteOverview);
        assert_eq!(camera.recenter(RouteCategory::OnCampus).await, ViewMode::UserCentered);

        let events = surface.events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            SurfaceEvent::Animate(
                MapViewConfig::default().on_campus_region,
                Duration::from_millis(250)
            )
        );
    }

    #[tokio::test]
    async fn test_begin_recenter_defers_location_to_caller() {
        let (mut camera, surface) = controller(FakeGeolocation::granted(30.62, -96.33));

        let RecenterStep::LocateUser {
            geolocation,
            accuracy,
        } = camera.begin_recenter(RouteCategory::OnCampus)
        else {
            panic!("overview should ask for the user's position");
        };
        assert!(surface.events().is_empty());
        assert_eq!(camera.mode(), ViewMode::RouteOverview);

        let position = locate_user(geolocation.as_ref(), accuracy).await.unwrap();
        camera.show_user_position(position);
        assert!(camera.is_view_centered_on_user());

        let RecenterStep::ShowedDefault(region) = camera.begin_recenter(RouteCategory::OffCampus)
        else {
            panic!("user-centered view should go back to the default region");
        };
        assert_eq!(region, MapViewConfig::default().off_campus_region);
        assert_eq!(camera.mode(), ViewMode::RouteOverview);
    }

    #[tokio::test]
    async fn test_recenter_with_denied_permission_stays_in_overview() {
        let (mut camera, surface) = controller(FakeGeolocation::denied());

        assert_eq!(camera.recenter(RouteCategory::OnCampus).await, ViewMode::RouteOverview);
        assert!(surface.events().is_empty());
    }

    #[tokio::test]
    async fn test_fit_keeps_user_centered_flag() {
        let (mut camera, surface) = controller(FakeGeolocation::granted(30.62, -96.33));
        camera.center_on_user().await;

        let coords = [Coordinate::new(30.60, -96.35), Coordinate::new(30.64, -96.31)];
        camera.fit_to_coordinates(&coords);

        assert!(camera.is_view_centered_on_user());
        let Some(SurfaceEvent::Fit(request)) = surface.events().pop() else {
            panic!("expected a fit request");
        };
        assert_eq!(request.coordinates, coords.to_vec());
        assert_eq!(request.padding.bottom, 300.0);
        assert!(request.animated);
        assert!(request.bounds.is_some());
    }

    #[test]
    fn test_fit_with_no_coordinates() {
        let (mut camera, surface) = controller(FakeGeolocation::denied());

        camera.fit_to_coordinates(&[]);

        let Some(SurfaceEvent::Fit(request)) = surface.events().pop() else {
            panic!("expected a fit request");
        };
        assert!(request.coordinates.is_empty());
        assert_eq!(request.bounds, None);
        assert_eq!(camera.last_region(), None);
    }
}
