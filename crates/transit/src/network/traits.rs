//! Pluggable networking traits.
//!
//! The map core never talks to the network directly. External crates
//! implement these to supply live bus positions.

use std::future::Future;
use std::pin::Pin;

use crate::identifiers::RouteShortName;
use crate::models::bus::Bus;
use crate::models::types::Result;

pub type BusFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Bus>>> + Send + 'a>>;

/// Fetch raw bytes from a URL
pub trait DataFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;
}

/// The transit API as seen by the bus poller.
///
/// Implementations may be slow and may fail; callers treat an `Err` as
/// "no update this cycle".
pub trait BusSource: Send + Sync {
    /// Current positions of every bus running on `route`
    fn get_buses<'a>(&'a self, route: &'a RouteShortName) -> BusFuture<'a>;
}
