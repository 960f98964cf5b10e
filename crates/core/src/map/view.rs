//! The map view controller: wires selection changes to the camera, the bus
//! poller and the drawable geometry.

use std::sync::Arc;

use spirit_transit::{BusSource, Coordinate, Route};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::config::{ConfigError, MapViewConfig};
use crate::map::{
    camera::{CameraController, RecenterStep, RouteCategory},
    geometry::{route_coordinates, route_stops},
    markers::{BusMarker, RoutePolyline, StopMarker},
    poller::{BusPoller, BusSnapshot, PollerState},
    surface::{CameraRegion, GeolocationProvider, MapSurface, ViewMode},
};

pub struct ViewController {
    camera: CameraController,
    poller: BusPoller,
    category: RouteCategory,
    polyline_width: f32,

    selection: Vec<Arc<Route>>,
    coordinates: Vec<Coordinate>,
    polylines: Vec<RoutePolyline>,
    stops: Vec<StopMarker>,
}

impl ViewController {
    /// Fails if `config` does not validate; a zero poll interval would
    /// otherwise panic inside the poll task.
    pub fn new(
        config: MapViewConfig,
        surface: Arc<dyn MapSurface>,
        geolocation: Arc<dyn GeolocationProvider>,
        source: Arc<dyn BusSource>,
        runtime: Handle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let poller = BusPoller::new(source, runtime, config.poll_interval());
        let polyline_width = config.polyline_width;

        Ok(Self {
            camera: CameraController::new(config, surface, geolocation),
            poller,
            category: RouteCategory::default(),
            polyline_width,
            selection: Vec::new(),
            coordinates: Vec::new(),
            polylines: Vec::new(),
            stops: Vec::new(),
        })
    }

    /// React to a new set of drawn routes.
    ///
    /// Fits the camera to the routes even when the view is centered on the
    /// user, without touching the view mode.
    pub fn on_selection_changed(&mut self, routes: Vec<Arc<Route>>) -> PollerState {
        self.selection = routes;

        self.coordinates = route_coordinates(self.selection.iter().map(Arc::as_ref));
        self.camera.fit_to_coordinates(&self.coordinates);

        let state = self.poller.sync_selection(&self.selection);

        self.polylines = self
            .selection
            .iter()
            .map(|route| RoutePolyline::for_route(route, self.polyline_width))
            .collect();
        self.stops = match self.single_route() {
            Some(route) => route_stops(route)
                .iter()
                .flatten()
                .map(StopMarker::from)
                .collect(),
            None => Vec::new(),
        };

        tracing::debug!(
            routes = self.selection.len(),
            points = self.coordinates.len(),
            stops = self.stops.len(),
            ?state,
            "selection changed"
        );

        state
    }

    pub fn set_route_category(&mut self, category: RouteCategory) {
        self.category = category;
    }

    pub fn route_category(&self) -> RouteCategory {
        self.category
    }

    /// Move to the current category's default region.
    pub fn show_default_region(&mut self) -> CameraRegion {
        self.camera.reset_to_default_region(self.category)
    }

    /// The recenter button: toggles between the user and the default region.
    pub async fn recenter(&mut self) -> ViewMode {
        self.camera.recenter(self.category).await
    }

    /// Split form of [`Self::recenter`] for callers that must not hold the
    /// controller while the device is located.
    pub fn begin_recenter(&mut self) -> RecenterStep {
        self.camera.begin_recenter(self.category)
    }

    pub fn show_user_position(&mut self, position: Coordinate) -> CameraRegion {
        self.camera.show_user_position(position)
    }

    pub fn is_view_centered_on_user(&self) -> bool {
        self.camera.is_view_centered_on_user()
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn poller_state(&self) -> PollerState {
        self.poller.state()
    }

    pub fn selection(&self) -> &[Arc<Route>] {
        &self.selection
    }

    /// Every drawn coordinate, as last passed to the camera fit
    pub fn route_coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn polylines(&self) -> &[RoutePolyline] {
        &self.polylines
    }

    /// Stops of the selected route; empty unless exactly one route is drawn
    pub fn stop_markers(&self) -> &[StopMarker] {
        &self.stops
    }

    /// Live buses of the selected route; empty unless exactly one route is drawn
    pub fn bus_markers(&self) -> Vec<BusMarker> {
        let Some(route) = self.single_route() else {
            return Vec::new();
        };

        self.poller
            .buses()
            .iter()
            .map(|bus| BusMarker::new(bus, route))
            .collect()
    }

    pub fn bus_snapshot(&self) -> BusSnapshot {
        self.poller.snapshot()
    }

    pub fn subscribe_buses(&self) -> watch::Receiver<BusSnapshot> {
        self.poller.subscribe()
    }

    /// Stop polling. Also happens on drop.
    pub fn shutdown(&mut self) {
        tracing::info!("map view torn down; stopping bus poll");
        self.poller.stop();
    }

    fn single_route(&self) -> Option<&Route> {
        match self.selection.as_slice() {
            [route] => Some(route),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use spirit_transit::{Bus, PatternPath, PatternPoint, StaticBusProvider};

    use super::*;
    use crate::map::testing::{FakeGeolocation, RecordingSurface, SurfaceEvent, TimedSource, settle};

    struct Harness {
        view: ViewController,
        surface: Arc<RecordingSurface>,
        source: Arc<TimedSource>,
    }

    fn harness(geolocation: FakeGeolocation) -> Harness {
        let provider = StaticBusProvider::new();
        provider.set_buses("A", vec![Bus::new("a-1", 30.61, -96.34, 45.0)]);
        provider.set_buses("B", vec![Bus::new("b-1", 30.62, -96.33, 180.0)]);

        let surface = Arc::new(RecordingSurface::default());
        let source = Arc::new(TimedSource::new(provider));
        let view = ViewController::new(
            MapViewConfig::default(),
            surface.clone(),
            Arc::new(geolocation),
            source.clone(),
            Handle::current(),
        )
        .unwrap();

        Harness {
            view,
            surface,
            source,
        }
    }

    fn route_a() -> Arc<Route> {
        Arc::new(Route::new(
            "A",
            "FF0000",
            vec![PatternPath::new(vec![
                PatternPoint::waypoint("a1", 30.60, -96.35),
                PatternPoint::stop("a2", "Reed Arena", 30.61, -96.34, true),
                PatternPoint::waypoint("a3", 30.62, -96.33),
            ])],
        ))
    }

    fn route_b() -> Arc<Route> {
        Arc::new(Route::new(
            "B",
            "00FF00",
            vec![PatternPath::new(vec![
                PatternPoint::stop("b1", "Kyle Field", 30.61, -96.34, false),
                PatternPoint::waypoint("b2", 30.63, -96.32),
            ])],
        ))
    }

    #[tokio::test]
    async fn test_rejects_zero_poll_interval() {
        let config = MapViewConfig {
            poll_interval_ms: 0,
            ..MapViewConfig::default()
        };

        let result = ViewController::new(
            config,
            Arc::new(RecordingSurface::default()),
            Arc::new(FakeGeolocation::denied()),
            Arc::new(TimedSource::new(StaticBusProvider::new())),
            Handle::current(),
        );

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_route_draws_stops_and_buses() {
        let mut h = harness(FakeGeolocation::denied());

        let state = h.view.on_selection_changed(vec![route_a()]);
        assert_eq!(state, PollerState::Polling("A".into()));
        settle().await;

        assert_eq!(h.view.route_coordinates().len(), 3);
        assert_eq!(h.view.polylines().len(), 1);

        let stops = h.view.stop_markers();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].fill_color, "#FF0000");

        let buses = h.view.bus_markers();
        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].route.as_str(), "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_routes_draw_polylines_only() {
        let mut h = harness(FakeGeolocation::denied());

        h.view.on_selection_changed(vec![route_a()]);
        settle().await;
        assert!(!h.view.bus_markers().is_empty());

        let state = h.view.on_selection_changed(vec![route_a(), route_b()]);

        assert_eq!(state, PollerState::Idle);
        assert!(h.view.bus_markers().is_empty());
        assert!(h.view.stop_markers().is_empty());
        assert_eq!(h.view.polylines().len(), 2);
        assert_eq!(h.view.route_coordinates().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_selection_change_fits_camera() {
        let mut h = harness(FakeGeolocation::denied());

        h.view.on_selection_changed(vec![route_a()]);
        h.view.on_selection_changed(vec![route_a(), route_b()]);
        h.view.on_selection_changed(vec![]);

        let fits: Vec<FitRequestSummary> = h
            .surface
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Fit(request) => Some(FitRequestSummary {
                    points: request.coordinates.len(),
                    has_bounds: request.bounds.is_some(),
                }),
                SurfaceEvent::Animate(..) => None,
            })
            .collect();

        assert_eq!(
            fits,
            vec![
                FitRequestSummary { points: 3, has_bounds: true },
                FitRequestSummary { points: 5, has_bounds: true },
                FitRequestSummary { points: 0, has_bounds: false },
            ]
        );
    }

    #[derive(Debug, PartialEq)]
    struct FitRequestSummary {
        points: usize,
        has_bounds: bool,
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_change_keeps_user_centered_flag() {
        let mut h = harness(FakeGeolocation::granted(30.6, -96.3));

        assert_eq!(h.view.recenter().await, ViewMode::UserCentered);
        h.view.on_selection_changed(vec![route_b()]);

        assert!(h.view.is_view_centered_on_user());
        assert!(matches!(h.surface.events().last(), Some(SurfaceEvent::Fit(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recenter_uses_current_category() {
        let mut h = harness(FakeGeolocation::granted(30.6, -96.3));
        h.view.set_route_category(RouteCategory::OffCampus);

        h.view.recenter().await;
        assert_eq!(h.view.recenter().await, ViewMode::RouteOverview);

        assert_eq!(
            h.view.camera().last_region(),
            Some(MapViewConfig::default().off_campus_region)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_recenter_fires_no_region_change() {
        let mut h = harness(FakeGeolocation::denied());

        assert_eq!(h.view.recenter().await, ViewMode::RouteOverview);
        assert!(h.surface.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_polling() {
        let mut h = harness(FakeGeolocation::denied());

        h.view.on_selection_changed(vec![route_a()]);
        settle().await;
        h.view.shutdown();

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(h.source.call_count(), 1);
        assert_eq!(h.view.poller_state(), PollerState::Idle);
        assert!(h.view.bus_markers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_polling() {
        let h = harness(FakeGeolocation::denied());
        let Harness {
            mut view, source, ..
        } = h;

        view.on_selection_changed(vec![route_b()]);
        settle().await;
        drop(view);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(source.call_count(), 1);
    }
}
