pub mod advisory;
pub mod geocoding;
pub mod health;
pub mod weather;

use crate::services::cache::WeatherCache;
use crate::services::openweather::OpenWeatherClient;

/// Shared application state for the weather and advisory endpoints.
///
/// Created once at startup; tests build a fresh one per case.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) client: OpenWeatherClient,
    pub(crate) cache: WeatherCache,
}

/// State pointing the provider client at a mock server, with an empty cache.
#[cfg(test)]
pub(crate) fn test_state(base_url: &str) -> AppState {
    let config = crate::config::test_config(base_url);
    AppState {
        client: OpenWeatherClient::new(&config).unwrap(),
        cache: WeatherCache::new(),
    }
}
