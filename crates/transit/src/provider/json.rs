//! JSON bus feed decoding on top of a [`DataFetcher`].

use crate::identifiers::RouteShortName;
use crate::models::{bus::Bus, types::*};
use crate::network::traits::{BusFuture, BusSource, DataFetcher};

const ROUTE_PLACEHOLDER: &str = "{route}";

/// Decode a JSON array of buses
///
/// ```json
/// [{ "key": "1042", "location": { "latitude": 30.61, "longitude": -96.34, "heading": 270 } }]
/// ```
pub fn decode_buses(bytes: &[u8]) -> Result<Vec<Bus>> {
    serde_json::from_slice(bytes).map_err(|e| TransitError::SerializationError(e.to_string()))
}

/// Bus source that fetches `url_template` with `{route}` replaced by the
/// route short name.
pub struct JsonBusSource<F> {
    fetcher: F,
    url_template: String,
}

impl<F: DataFetcher> JsonBusSource<F> {
    pub fn new(fetcher: F, url_template: impl Into<String>) -> Self {
        Self {
            fetcher,
            url_template: url_template.into(),
        }
    }

    pub fn bus_url(&self, route: &RouteShortName) -> String {
        self.url_template.replace(ROUTE_PLACEHOLDER, route.as_str())
    }
}

impl<F: DataFetcher> BusSource for JsonBusSource<F> {
    fn get_buses<'a>(&'a self, route: &'a RouteShortName) -> BusFuture<'a> {
        Box::pin(async move {
            let url = self.bus_url(route);
            let bytes = self.fetcher.fetch(&url).await?;
            decode_buses(&bytes)
        })
    }
}
