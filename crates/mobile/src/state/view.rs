use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use spirit_core::config::{ConfigError, MapViewConfig};
use spirit_core::http::http_bus_source;
use spirit_core::map::{RecenterStep, RouteCategory, ViewController, locate_user};
use spirit_core::settings::{SettingsError, load_default_group, save_default_group};
use spirit_core::transit::{BusSource, Route};
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::state::foreign::{
    BusSourceCallback, DeferredSurface, ForeignBusSource, ForeignGeolocation, ForeignSettings,
    GeolocationCallback, MapSurfaceCallback, SettingsCallback,
};
use crate::state::records::{
    BusMarkerRecord, BusSnapshotRecord, DefaultRouteGroupRecord, PolylineRecord, RouteRecord,
    StopMarkerRecord,
};

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum MapViewError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("invalid routes: {0}")]
    InvalidRoutes(#[from] serde_json::Error),

    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// State shared with the tasks running on the map's runtime.
///
/// The controller lock is only held to read or update state. Host callbacks
/// always run with it released.
struct Shared {
    controller: Mutex<ViewController>,
    camera: Arc<DeferredSurface>,
    surface: Box<dyn MapSurfaceCallback>,
}

impl Shared {
    fn view(&self) -> MutexGuard<'_, ViewController> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand queued camera moves to the host. Never call with the view locked.
    fn flush_camera(&self) {
        for command in self.camera.take_pending() {
            command.deliver(self.surface.as_ref());
        }
    }

    fn bus_snapshot(&self) -> BusSnapshotRecord {
        let view = self.view();
        BusSnapshotRecord::new(&view.bus_snapshot(), &view.bus_markers())
    }

    fn push_buses(&self) {
        let snapshot = self.bus_snapshot();
        self.surface.show_buses(snapshot);
    }
}

/// The map screen. Owns the runtime its bus poll runs on; dropping it stops
/// polling.
#[derive(uniffi::Object)]
pub struct MapViewState {
    shared: Arc<Shared>,
    settings: ForeignSettings,
    bus_updates: JoinHandle<()>,
    centering: Mutex<Option<JoinHandle<()>>>,
    handle: Handle,
    runtime: Option<Runtime>,
}

#[uniffi::export]
impl MapViewState {
    /// Buses come from `bus_source`
    #[uniffi::constructor]
    pub fn new(
        surface: Box<dyn MapSurfaceCallback>,
        geolocation: Box<dyn GeolocationCallback>,
        settings: Box<dyn SettingsCallback>,
        bus_source: Box<dyn BusSourceCallback>,
        config_json: Option<String>,
    ) -> Result<Arc<Self>, MapViewError> {
        let config = parse_config(config_json)?;
        let source = Arc::new(ForeignBusSource(Arc::from(bus_source)));

        Self::build(surface, geolocation, settings, source, config)
    }

    /// Buses are fetched over HTTP from the config's `busUrlTemplate`
    #[uniffi::constructor]
    pub fn with_http_feed(
        surface: Box<dyn MapSurfaceCallback>,
        geolocation: Box<dyn GeolocationCallback>,
        settings: Box<dyn SettingsCallback>,
        config_json: String,
    ) -> Result<Arc<Self>, MapViewError> {
        let config = MapViewConfig::from_json(&config_json)?;
        let Some(template) = config.bus_url_template.clone() else {
            return Err(ConfigError::Invalid("busUrlTemplate is required".into()).into());
        };
        let source = Arc::new(http_bus_source(template));

        Self::build(surface, geolocation, settings, source, config)
    }

    /// "On Campus" or "Off Campus"; anything else is treated as on campus
    pub fn set_route_category(&self, category: String) {
        self.shared
            .view()
            .set_route_category(RouteCategory::from_tag(&category));
    }

    pub fn set_selected_routes(&self, routes: Vec<RouteRecord>) {
        self.select(routes.into_iter().map(|r| Arc::new(Route::from(r))).collect());
    }

    /// Same as [`Self::set_selected_routes`], from the transit API's JSON
    pub fn set_selected_routes_json(&self, json: String) -> Result<(), MapViewError> {
        let routes: Vec<Route> = serde_json::from_str(&json)?;
        self.select(routes.into_iter().map(Arc::new).collect());
        Ok(())
    }

    pub fn show_default_region(&self) {
        self.shared.view().show_default_region();
        self.shared.flush_camera();
    }

    /// The recenter button. Returns immediately; the camera moves once the
    /// location service answers. A newer press supersedes an older one.
    pub fn recenter(&self) {
        let shared = Arc::clone(&self.shared);

        let task = self.handle.spawn(async move {
            let step = shared.view().begin_recenter();
            shared.flush_camera();

            let RecenterStep::LocateUser {
                geolocation,
                accuracy,
            } = step
            else {
                return;
            };

            if let Some(position) = locate_user(geolocation.as_ref(), accuracy).await {
                shared.view().show_user_position(position);
                shared.flush_camera();
            }
        });

        if let Some(previous) = self.lock_centering().replace(task) {
            previous.abort();
        }
    }

    pub fn is_view_centered_on_user(&self) -> bool {
        self.shared.view().is_view_centered_on_user()
    }

    pub fn polylines(&self) -> Vec<PolylineRecord> {
        self.shared.view().polylines().iter().map(Into::into).collect()
    }

    pub fn stop_markers(&self) -> Vec<StopMarkerRecord> {
        self.shared
            .view()
            .stop_markers()
            .iter()
            .map(Into::into)
            .collect()
    }

    pub fn bus_markers(&self) -> Vec<BusMarkerRecord> {
        self.shared
            .view()
            .bus_markers()
            .iter()
            .map(Into::into)
            .collect()
    }

    /// The buses last pushed through `show_buses`, with their fetch time
    pub fn bus_snapshot(&self) -> BusSnapshotRecord {
        self.shared.bus_snapshot()
    }

    pub fn default_route_group(&self) -> Result<DefaultRouteGroupRecord, MapViewError> {
        Ok(load_default_group(&self.settings)?.into())
    }

    pub fn set_default_route_group(
        &self,
        group: DefaultRouteGroupRecord,
    ) -> Result<(), MapViewError> {
        save_default_group(&self.settings, group.into())?;
        Ok(())
    }

    /// Stop polling and drop any pending recenter.
    pub fn shutdown(&self) {
        if let Some(centering) = self.lock_centering().take() {
            centering.abort();
        }
        self.shared.view().shutdown();
    }
}

impl MapViewState {
    fn build(
        surface: Box<dyn MapSurfaceCallback>,
        geolocation: Box<dyn GeolocationCallback>,
        settings: Box<dyn SettingsCallback>,
        source: Arc<dyn BusSource>,
        config: MapViewConfig,
    ) -> Result<Arc<Self>, MapViewError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("spirit-map")
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();

        let camera = Arc::new(DeferredSurface::default());
        let controller = ViewController::new(
            config,
            camera.clone(),
            Arc::new(ForeignGeolocation(Arc::from(geolocation))),
            source,
            handle.clone(),
        )?;
        let mut updates = controller.subscribe_buses();

        let shared = Arc::new(Shared {
            controller: Mutex::new(controller),
            camera,
            surface,
        });

        let bus_updates = handle.spawn({
            let shared = Arc::clone(&shared);

            async move {
                while updates.changed().await.is_ok() {
                    shared.push_buses();
                }
            }
        });

        tracing::info!("map view created");

        Ok(Arc::new(Self {
            shared,
            settings: ForeignSettings(settings),
            bus_updates,
            centering: Mutex::new(None),
            handle,
            runtime: Some(runtime),
        }))
    }

    fn select(&self, routes: Vec<Arc<Route>>) {
        let (polylines, stops) = {
            let mut view = self.shared.view();
            view.on_selection_changed(routes);

            (
                view.polylines().iter().map(Into::into).collect(),
                view.stop_markers().iter().map(Into::into).collect(),
            )
        };

        self.shared.flush_camera();
        self.shared.surface.show_routes(polylines, stops);
    }

    fn lock_centering(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.centering
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for MapViewState {
    fn drop(&mut self) {
        self.bus_updates.abort();
        if let Some(centering) = self.lock_centering().take() {
            centering.abort();
        }
        self.shared.view().shutdown();

        // The last reference may go away inside a callback on a runtime thread
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn parse_config(json: Option<String>) -> Result<MapViewConfig, ConfigError> {
    match json {
        Some(json) => MapViewConfig::from_json(&json),
        None => Ok(MapViewConfig::default()),
    }
}
