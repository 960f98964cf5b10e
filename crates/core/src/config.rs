//! Tunables for the live map view.
//!
//! Every field has a default matching the shipped app; a JSON document only
//! needs the keys it wants to override.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::map::{
    camera::RouteCategory,
    surface::{CameraRegion, EdgePadding, LocationAccuracy},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not parse map config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid map config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapViewConfig {
    pub on_campus_region: CameraRegion,
    pub off_campus_region: CameraRegion,

    /// Zoom used when centering on the device
    pub user_latitude_delta: f64,
    pub user_longitude_delta: f64,

    pub region_animation_ms: u64,
    pub fit_padding: EdgePadding,
    pub poll_interval_ms: u64,
    pub location_accuracy: LocationAccuracy,
    pub polyline_width: f32,

    /// `{route}` is replaced by the route short name
    pub bus_url_template: Option<String>,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            on_campus_region: CameraRegion::new(30.615011, -96.342476, 0.03, 0.01),
            off_campus_region: CameraRegion::new(30.615011, -96.342476, 0.04, 0.04),
            user_latitude_delta: 0.0005,
            user_longitude_delta: 0.005,
            region_animation_ms: 250,
            // the bottom sheet covers the lower part of the map
            fit_padding: EdgePadding {
                top: 50.0,
                right: 20.0,
                bottom: 300.0,
                left: 20.0,
            },
            poll_interval_ms: 5_000,
            location_accuracy: LocationAccuracy::Balanced,
            polyline_width: 6.0,
            bus_url_template: None,
        }
    }
}

impl MapViewConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // tokio intervals panic on a zero period
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("pollIntervalMs must be positive".into()));
        }

        for (name, delta) in [
            ("userLatitudeDelta", self.user_latitude_delta),
            ("userLongitudeDelta", self.user_longitude_delta),
        ] {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn region_animation(&self) -> Duration {
        Duration::from_millis(self.region_animation_ms)
    }

    pub fn default_region(&self, category: RouteCategory) -> CameraRegion {
        match category {
            RouteCategory::OnCampus => self.on_campus_region,
            RouteCategory::OffCampus => self.off_campus_region,
        }
    }
}
