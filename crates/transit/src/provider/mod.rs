//! Bus position providers.

#[cfg(feature = "serde")]
pub mod json;
pub mod static_provider;

#[cfg(feature = "serde")]
pub use json::{decode_buses, JsonBusSource};
pub use static_provider::StaticBusProvider;
