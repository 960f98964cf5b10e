pub mod config;
pub mod http;
pub mod map;
pub mod settings;

// Re-export transit from the transit crate
pub use spirit_transit as transit;
