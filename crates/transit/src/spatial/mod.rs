//! Spatial helpers over route and bus coordinates.

pub mod queries;

pub use queries::bounding_rect;
