//! Persisted user preferences.
//!
//! Storage itself is a small key-value store owned by the host app; this
//! module only knows the keys and how values are encoded.

/// Key under which the default route group is stored
pub const DEFAULT_GROUP_KEY: &str = "default-group";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings storage failed: {0}")]
    Storage(String),

    #[error("invalid value {value:?} for setting {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Host key-value storage
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Which route list the app opens on. Stored as its index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::FromRepr, strum::Display)]
#[repr(u8)]
pub enum DefaultRouteGroup {
    #[default]
    #[strum(serialize = "All Routes")]
    AllRoutes = 0,
    Favorites = 1,
}

impl DefaultRouteGroup {
    pub fn index(self) -> u8 {
        self as u8
    }
}

pub fn load_default_group(store: &dyn SettingsStore) -> Result<DefaultRouteGroup, SettingsError> {
    let Some(value) = store.get(DEFAULT_GROUP_KEY)? else {
        return Ok(DefaultRouteGroup::default());
    };

    value
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(DefaultRouteGroup::from_repr)
        .ok_or(SettingsError::InvalidValue {
            key: DEFAULT_GROUP_KEY,
            value,
        })
}

pub fn save_default_group(
    store: &dyn SettingsStore,
    group: DefaultRouteGroup,
) -> Result<(), SettingsError> {
    store.set(DEFAULT_GROUP_KEY, &group.index().to_string())
}
