//! Live bus positions.
//!
//! A bus list is replaced wholesale on every poll; nothing here is updated
//! in place.

use crate::identifiers::BusKey;
use crate::models::types::Coordinate;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusLocation {
    pub latitude: f64,
    pub longitude: f64,

    /// Degrees clockwise from north; some feeds omit it
    #[cfg_attr(feature = "serde", serde(default))]
    pub heading: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bus {
    pub key: BusKey,
    pub location: BusLocation,
}

impl Bus {
    pub fn new(
        key: impl Into<BusKey>,
        latitude: f64,
        longitude: f64,
        heading: impl Into<Option<f64>>,
    ) -> Self {
        Self {
            key: key.into(),
            location: BusLocation {
                latitude,
                longitude,
                heading: heading.into(),
            },
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.location.latitude, self.location.longitude)
    }

    pub fn heading(&self) -> Option<f64> {
        self.location.heading
    }
}
