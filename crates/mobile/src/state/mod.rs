pub mod foreign;
pub mod records;
pub mod view;

pub use foreign::{
    BusFeedError, BusSourceCallback, GeolocationCallback, LocationAccuracyRecord,
    MapSurfaceCallback, SettingsCallback, StorageError,
};
pub use view::{MapViewError, MapViewState};
