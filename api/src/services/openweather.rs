//! OpenWeatherMap client.
//!
//! Three calls, all bounded by a per-request timeout:
//! - direct geocoding (`/direct`) for city suggestions
//! - current weather (`/weather`) by coordinates or city name
//! - One Call (`/onecall`) for the fields current weather lacks
//!
//! See: https://openweathermap.org/api

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::models::{GeocodeResult, LocationQuery, RawCity, WeatherPayload};

/// Failure talking to the provider, classified by transport outcome.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    /// Non-2xx response. `body` is kept for logging only.
    #[error("provider returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl ProviderError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout)
        } else if err.is_connect() || err.is_request() || err.is_body() {
            ProviderError::Connection(err.to_string())
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Other(err.to_string())
        }
    }
}

/// Fields the One Call endpoint adds on top of current weather.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub uvi: Option<f64>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    /// Precipitation probability of the first daily entry.
    pub pop: Option<f64>,
}

// --- One Call JSON response types ---

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: Option<OneCallCurrent>,
    daily: Option<Vec<OneCallDaily>>,
}

#[derive(Debug, Deserialize)]
struct OneCallCurrent {
    uvi: Option<f64>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OneCallDaily {
    pop: Option<f64>,
}

impl From<OneCallResponse> for Enrichment {
    fn from(r: OneCallResponse) -> Self {
        let current = r.current.as_ref();
        Self {
            uvi: current.and_then(|c| c.uvi),
            sunrise: current.and_then(|c| c.sunrise),
            sunset: current.and_then(|c| c.sunset),
            pop: r
                .daily
                .as_ref()
                .and_then(|d| d.first())
                .and_then(|d| d.pop),
        }
    }
}

/// Client for the OpenWeatherMap APIs.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    geocoding_url: String,
    units: String,
    lang: String,
    geocode_timeout: Duration,
    weather_timeout: Duration,
}

impl OpenWeatherClient {
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        // Every call must reach the provider live; the TTL cache is the only cache.
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            geocoding_url: config.geocoding_url.clone(),
            units: config.units.clone(),
            lang: config.lang.clone(),
            geocode_timeout: config.geocode_timeout(),
            weather_timeout: config.weather_timeout(),
        })
    }

    /// Search cities matching `query`, at most `limit` results.
    pub async fn geocode(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<GeocodeResult>, ProviderError> {
        let url = format!("{}/direct", self.geocoding_url);
        let params = [
            ("q", query.to_string()),
            ("limit", limit.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let cities: Vec<RawCity> = self
            .get_json(&url, &params, self.geocode_timeout, "Geocoding")
            .await?;

        Ok(cities.into_iter().map(GeocodeResult::from).collect())
    }

    /// Fetch current conditions for a location.
    pub async fn fetch_current_weather(
        &self,
        location: &LocationQuery,
    ) -> Result<WeatherPayload, ProviderError> {
        let url = format!("{}/weather", self.base_url);
        let mut params = vec![
            ("appid", self.api_key.clone()),
            ("units", self.units.clone()),
            ("lang", self.lang.clone()),
        ];
        match location {
            LocationQuery::Coordinates { lat, lon } => {
                params.push(("lat", lat.clone()));
                params.push(("lon", lon.clone()));
            }
            LocationQuery::City(city) => params.push(("q", city.clone())),
        }

        self.get_json(&url, &params, self.weather_timeout, "Weather")
            .await
    }

    /// Fetch UV index, sun times and precipitation probability for a coordinate.
    pub async fn fetch_enrichment(&self, lat: f64, lon: f64) -> Result<Enrichment, ProviderError> {
        let url = format!("{}/onecall", self.base_url);
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("exclude", "minutely,hourly,alerts".to_string()),
            ("appid", self.api_key.clone()),
            ("units", self.units.clone()),
            ("lang", self.lang.clone()),
        ];

        let response: OneCallResponse = self
            .get_json(&url, &params, self.weather_timeout, "One Call")
            .await?;

        Ok(Enrichment::from(response))
    }

    /// GET `url` with query `params`, returning the decoded JSON body.
    ///
    /// The URL is never logged because it carries the API key.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
        api_name: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("{} API error: {} - {}", api_name, status.as_u16(), body);
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))
    }
}
