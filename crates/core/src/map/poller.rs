//! Live bus polling for the selected route.
//!
//! The poller is either idle or polling exactly one route. Every transition
//! cancels the running task before anything new is spawned, and every
//! transition bumps the snapshot generation so a response from a cancelled
//! task can never be published.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use spirit_transit::{Bus, BusSource, Route, RouteShortName};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// The most recent bus positions and the poll they belong to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BusSnapshot {
    pub generation: u64,
    pub route: Option<RouteShortName>,
    pub buses: Vec<Bus>,

    /// When `buses` was last replaced by a successful fetch
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling(RouteShortName),
}

struct ActivePoll {
    route: RouteShortName,
    task: JoinHandle<()>,
}

pub struct BusPoller {
    source: Arc<dyn BusSource>,
    runtime: Handle,
    interval: Duration,
    active: Option<ActivePoll>,
    board: Arc<watch::Sender<BusSnapshot>>,
}

impl BusPoller {
    pub fn new(source: Arc<dyn BusSource>, runtime: Handle, interval: Duration) -> Self {
        let (board, _) = watch::channel(BusSnapshot::default());

        Self {
            source,
            runtime,
            interval,
            active: None,
            board: Arc::new(board),
        }
    }

    pub fn state(&self) -> PollerState {
        match &self.active {
            Some(active) => PollerState::Polling(active.route.clone()),
            None => PollerState::Idle,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.active.is_some()
    }

    pub fn buses(&self) -> Vec<Bus> {
        self.board.borrow().buses.clone()
    }

    pub fn snapshot(&self) -> BusSnapshot {
        self.board.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BusSnapshot> {
        self.board.subscribe()
    }

    /// Apply the polling rule to a new selection: poll iff exactly one route
    /// with a non-empty short name is selected.
    ///
    /// Reselecting the route already being polled keeps its schedule and
    /// does not trigger an extra immediate fetch.
    pub fn sync_selection(&mut self, selection: &[Arc<Route>]) -> PollerState {
        let target = match selection {
            [route] if !route.short_name.is_empty() => Some(route.short_name.clone()),
            _ => None,
        };

        match target {
            Some(route) if self.is_polling_route(&route) => {
                tracing::debug!(%route, "selection unchanged; keeping current poll");
            }
            Some(route) => {
                self.cancel();
                self.start(route);
            }
            None => self.stop(),
        }

        self.state()
    }

    /// Cancel any poll and clear the published buses.
    pub fn stop(&mut self) {
        self.cancel();

        self.board.send_if_modified(|snapshot| {
            if snapshot.route.is_none() && snapshot.buses.is_empty() {
                return false;
            }

            snapshot.generation += 1;
            snapshot.route = None;
            snapshot.buses.clear();
            snapshot.updated_at = None;
            true
        });
    }

    fn is_polling_route(&self, route: &RouteShortName) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| &active.route == route && !active.task.is_finished())
    }

    fn start(&mut self, route: RouteShortName) {
        let mut generation = 0;
        self.board.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.route = Some(route.clone());
            snapshot.buses.clear();
            snapshot.updated_at = None;
            generation = snapshot.generation;
        });

        tracing::debug!(%route, generation, "starting bus poll");

        let task = self.runtime.spawn(poll_route(
            Arc::clone(&self.source),
            Arc::clone(&self.board),
            route.clone(),
            generation,
            self.interval,
        ));

        self.active = Some(ActivePoll { route, task });
    }

    fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(route = %active.route, "cancelling bus poll");
            active.task.abort();
        }
    }
}

impl Drop for BusPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn poll_route(
    source: Arc<dyn BusSource>,
    board: Arc<watch::Sender<BusSnapshot>>,
    route: RouteShortName,
    generation: u64,
    period: Duration,
) {
    // first tick completes immediately; skipped ticks keep the original grid
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let buses = match source.get_buses(&route).await {
            Ok(buses) => buses,
            Err(error) => {
                tracing::warn!(%route, %error, "bus fetch failed; keeping previous positions");
                continue;
            }
        };

        let count = buses.len();
        let published = board.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }

            snapshot.buses = buses;
            snapshot.updated_at = Some(Utc::now());
            true
        });

        if !published {
            tracing::debug!(%route, generation, "dropping stale bus response");
            return;
        }

        tracing::trace!(%route, count, "published bus positions");
    }
}
