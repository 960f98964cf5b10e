//! Host-implemented callbacks and their adapters onto the core traits.
//!
//! Foreign calls block the calling thread, so the async adapters move them
//! onto tokio's blocking pool. Camera moves are queued by [`DeferredSurface`]
//! and delivered only once the view controller is unlocked, so the host may
//! call back into the map from any callback.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use spirit_core::map::{
    CameraRegion, FitRequest, GeolocationProvider, LocationAccuracy, MapSurface, Permission,
};
use spirit_core::settings::{SettingsError, SettingsStore};
use spirit_core::transit::{BusFuture, BusSource, Coordinate, RouteShortName, TransitError};

use crate::state::records::{
    BusRecord, BusSnapshotRecord, CameraRegionRecord, CoordinateRecord, FitRequestRecord,
    PolylineRecord, StopMarkerRecord, duration_millis,
};

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum BusFeedError {
    #[error("{0}")]
    Failed(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for BusFeedError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Failed(error.reason)
    }
}

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum StorageError {
    #[error("{0}")]
    Failed(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for StorageError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Failed(error.reason)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum LocationAccuracyRecord {
    Lowest,
    Low,
    Balanced,
    High,
    Highest,
    BestForNavigation,
}

impl From<LocationAccuracy> for LocationAccuracyRecord {
    fn from(accuracy: LocationAccuracy) -> Self {
        match accuracy {
            LocationAccuracy::Lowest => Self::Lowest,
            LocationAccuracy::Low => Self::Low,
            LocationAccuracy::Balanced => Self::Balanced,
            LocationAccuracy::High => Self::High,
            LocationAccuracy::Highest => Self::Highest,
            LocationAccuracy::BestForNavigation => Self::BestForNavigation,
        }
    }
}

/// The native map widget
#[uniffi::export(callback_interface)]
pub trait MapSurfaceCallback: Send + Sync {
    fn animate_to_region(&self, region: CameraRegionRecord, duration_ms: u64);
    fn fit_to_coordinates(&self, request: FitRequestRecord);
    fn show_routes(&self, polylines: Vec<PolylineRecord>, stops: Vec<StopMarkerRecord>);
    fn show_buses(&self, snapshot: BusSnapshotRecord);
}

/// The platform location service. Both calls may block for seconds.
#[uniffi::export(callback_interface)]
pub trait GeolocationCallback: Send + Sync {
    /// Returns whether foreground location access was granted
    fn request_permission(&self) -> bool;
    fn current_position(&self, accuracy: LocationAccuracyRecord) -> Option<CoordinateRecord>;
}

/// Host key-value storage
#[uniffi::export(callback_interface)]
pub trait SettingsCallback: Send + Sync {
    fn get(&self, key: String) -> Result<Option<String>, StorageError>;
    fn set(&self, key: String, value: String) -> Result<(), StorageError>;
}

/// A bus feed the host already has a client for
#[uniffi::export(callback_interface)]
pub trait BusSourceCallback: Send + Sync {
    fn get_buses(&self, route: String) -> Result<Vec<BusRecord>, BusFeedError>;
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CameraCommand {
    Animate(CameraRegionRecord, u64),
    Fit(FitRequestRecord),
}

impl CameraCommand {
    pub fn deliver(self, surface: &dyn MapSurfaceCallback) {
        match self {
            Self::Animate(region, duration_ms) => surface.animate_to_region(region, duration_ms),
            Self::Fit(request) => surface.fit_to_coordinates(request),
        }
    }
}

/// The camera as the view controller sees it: requests are queued here and
/// handed to the host by [`DeferredSurface::take_pending`].
#[derive(Default)]
pub(crate) struct DeferredSurface {
    pending: Mutex<Vec<CameraCommand>>,
}

impl DeferredSurface {
    pub fn take_pending(&self) -> Vec<CameraCommand> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CameraCommand>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MapSurface for DeferredSurface {
    fn animate_to_region(&self, region: CameraRegion, duration: Duration) {
        self.lock()
            .push(CameraCommand::Animate(region.into(), duration_millis(duration)));
    }

    fn fit_to_coordinates(&self, request: FitRequest) {
        self.lock().push(CameraCommand::Fit(request.into()));
    }
}

pub(crate) struct ForeignGeolocation(pub Arc<dyn GeolocationCallback>);

impl GeolocationProvider for ForeignGeolocation {
    fn request_permission<'a>(&'a self) -> Pin<Box<dyn Future<Output = Permission> + Send + 'a>> {
        let callback = Arc::clone(&self.0);

        Box::pin(async move {
            match tokio::task::spawn_blocking(move || callback.request_permission()).await {
                Ok(true) => Permission::Granted,
                Ok(false) => Permission::Denied,
                Err(error) => {
                    tracing::warn!(%error, "permission request did not complete");
                    Permission::Denied
                }
            }
        })
    }

    fn current_position<'a>(
        &'a self,
        accuracy: LocationAccuracy,
    ) -> Pin<Box<dyn Future<Output = Option<Coordinate>> + Send + 'a>> {
        let callback = Arc::clone(&self.0);

        Box::pin(async move {
            tokio::task::spawn_blocking(move || callback.current_position(accuracy.into()))
                .await
                .inspect_err(|error| tracing::warn!(%error, "position request did not complete"))
                .ok()
                .flatten()
                .map(Coordinate::from)
        })
    }
}

pub(crate) struct ForeignSettings(pub Box<dyn SettingsCallback>);

impl SettingsStore for ForeignSettings {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        self.0
            .get(key.to_owned())
            .map_err(|e| SettingsError::Storage(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.0
            .set(key.to_owned(), value.to_owned())
            .map_err(|e| SettingsError::Storage(e.to_string()))
    }
}

pub(crate) struct ForeignBusSource(pub Arc<dyn BusSourceCallback>);

impl BusSource for ForeignBusSource {
    fn get_buses<'a>(&'a self, route: &'a RouteShortName) -> BusFuture<'a> {
        let callback = Arc::clone(&self.0);
        let route = route.to_string();

        Box::pin(async move {
            let buses = tokio::task::spawn_blocking(move || callback.get_buses(route))
                .await
                .map_err(|e| TransitError::Fetch(e.to_string()))?
                .map_err(|e| TransitError::Fetch(e.to_string()))?;

            Ok(buses.into_iter().map(Into::into).collect())
        })
    }
}
