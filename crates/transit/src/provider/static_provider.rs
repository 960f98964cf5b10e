//! In-memory bus source.
//!
//! Serves fixed bus lists per route. Routes can be switched into a failing
//! state to exercise the silent-degrade path of the poller.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::identifiers::*;
use crate::models::{bus::Bus, types::*};
use crate::network::traits::{BusFuture, BusSource};

#[derive(Default)]
struct Fixtures {
    buses: HashMap<RouteShortName, Vec<Bus>>,
    failing: HashSet<RouteShortName>,
}

/// In-memory bus source keyed by route short name
///
/// This type is cheap to clone; clones share the same fixtures.
#[derive(Clone, Default)]
pub struct StaticBusProvider {
    fixtures: Arc<Mutex<Fixtures>>,
    requests: Arc<AtomicUsize>,
}

impl StaticBusProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(routes: Vec<(RouteShortName, Vec<Bus>)>) -> Self {
        let provider = Self::new();
        for (route, buses) in routes {
            provider.set_buses(route, buses);
        }
        provider
    }

    /// Replace the positions served for `route`
    pub fn set_buses(&self, route: impl Into<RouteShortName>, buses: Vec<Bus>) {
        let mut fixtures = self.fixtures.lock().unwrap_or_else(|e| e.into_inner());
        fixtures.buses.insert(route.into(), buses);
    }

    /// Make every request for `route` fail until switched back
    pub fn set_failing(&self, route: impl Into<RouteShortName>, failing: bool) {
        let mut fixtures = self.fixtures.lock().unwrap_or_else(|e| e.into_inner());
        let route = route.into();
        if failing {
            fixtures.failing.insert(route);
        } else {
            fixtures.failing.remove(&route);
        }
    }

    /// Number of `get_buses` calls served so far, failed ones included
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn lookup(&self, route: &RouteShortName) -> Result<Vec<Bus>> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let fixtures = self.fixtures.lock().unwrap_or_else(|e| e.into_inner());
        if fixtures.failing.contains(route) {
            return Err(TransitError::Fetch(format!("route {route} is unavailable")));
        }

        fixtures
            .buses
            .get(route)
            .cloned()
            .ok_or_else(|| TransitError::RouteNotFound(route.clone()))
    }
}

impl BusSource for StaticBusProvider {
    fn get_buses<'a>(&'a self, route: &'a RouteShortName) -> BusFuture<'a> {
        Box::pin(std::future::ready(self.lookup(route)))
    }
}
