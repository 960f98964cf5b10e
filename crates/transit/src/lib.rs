//! # spirit-transit
//!
//! Transit domain model for the live bus map.
//!
//! ## Features
//!
//! - **Route geometry**: routes made of ordered pattern paths and pattern points
//! - **Live buses**: transient bus positions keyed by bus key
//! - **Pluggable networking**: implement [`DataFetcher`] or [`BusSource`] to
//!   supply live positions from anywhere
//! - **JSON feeds**: decode bus payloads from a URL template (`serde` feature)
//!
//! ## Example
//!
//! ```
//! use spirit_transit::prelude::*;
//!
//! let route = Route::new(
//!     "01",
//!     "500000",
//!     vec![PatternPath::new(vec![
//!         PatternPoint::stop("p1", "Commons", 30.6150, -96.3410, true),
//!         PatternPoint::waypoint("p2", 30.6172, -96.3389),
//!     ])],
//! );
//!
//! assert_eq!(route.points().count(), 2);
//! assert_eq!(route.stops().count(), 1);
//!
//! let coords: Vec<Coordinate> = route.points().map(PatternPoint::coordinate).collect();
//! let bounds = bounding_rect(&coords).unwrap();
//! assert!(bounds.width() > 0.0);
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{bus::*, route::*, types::*};
    pub use crate::network::traits::*;
    pub use crate::provider::static_provider::StaticBusProvider;
    #[cfg(feature = "serde")]
    pub use crate::provider::json::JsonBusSource;
    pub use crate::spatial::bounding_rect;
}

pub use prelude::*;
