//! Transit data models and error types.

pub mod bus;
pub mod route;
pub mod types;

// Re-exports for convenience
pub use bus::{Bus, BusLocation};
pub use route::{PatternPath, PatternPoint, Route};
pub use types::{Coordinate, Result, TransitError};
