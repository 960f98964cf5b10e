//! Test doubles for the map collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spirit_transit::{BusFuture, BusSource, Coordinate, RouteShortName, StaticBusProvider};
use tokio::time::Instant;

use crate::map::surface::{
    CameraRegion, FitRequest, GeolocationProvider, LocationAccuracy, MapSurface, Permission,
};

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceEvent {
    Animate(CameraRegion, Duration),
    Fit(FitRequest),
}

#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl MapSurface for RecordingSurface {
    fn animate_to_region(&self, region: CameraRegion, duration: Duration) {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Animate(region, duration));
    }

    fn fit_to_coordinates(&self, request: FitRequest) {
        self.events.lock().unwrap().push(SurfaceEvent::Fit(request));
    }
}

#[derive(Clone)]
pub struct FakeGeolocation {
    permission: Permission,
    position: Option<Coordinate>,
    reads: Arc<AtomicUsize>,
}

impl FakeGeolocation {
    pub fn granted(latitude: f64, longitude: f64) -> Self {
        Self {
            permission: Permission::Granted,
            position: Some(Coordinate::new(latitude, longitude)),
            reads: Arc::default(),
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: Permission::Denied,
            position: None,
            reads: Arc::default(),
        }
    }

    pub fn without_fix() -> Self {
        Self {
            permission: Permission::Granted,
            position: None,
            reads: Arc::default(),
        }
    }

    pub fn position_reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl GeolocationProvider for FakeGeolocation {
    fn request_permission<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Permission> + Send + 'a>> {
        Box::pin(std::future::ready(self.permission))
    }

    fn current_position<'a>(
        &'a self,
        _accuracy: LocationAccuracy,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Option<Coordinate>> + Send + 'a>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Box::pin(std::future::ready(self.position))
    }
}

/// Wraps a [`StaticBusProvider`], recording when each fetch starts and
/// optionally delaying its response.
pub struct TimedSource {
    pub inner: StaticBusProvider,
    delay: Duration,
    calls: Mutex<Vec<(RouteShortName, Instant)>>,
}

impl TimedSource {
    pub fn new(inner: StaticBusProvider) -> Self {
        Self::slow(inner, Duration::ZERO)
    }

    pub fn slow(inner: StaticBusProvider, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls_for(&self, route: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r.as_str() == route)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl BusSource for TimedSource {
    fn get_buses<'a>(&'a self, route: &'a RouteShortName) -> BusFuture<'a> {
        self.calls
            .lock()
            .unwrap()
            .push((route.clone(), Instant::now()));

        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.get_buses(route).await
        })
    }
}

/// Let spawned tasks run; with a paused clock this advances time by 1ms.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
