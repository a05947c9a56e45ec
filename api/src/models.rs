//! Domain types shared by the provider client, the cache and the routes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::errors::AppError;

// ---------------------------------------------------------------------------
// Location query
// ---------------------------------------------------------------------------

/// Where to look up the weather: explicit coordinates or a city name.
///
/// Coordinates keep the caller's raw strings so the cache key and the
/// upstream request use exactly what was sent.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates { lat: String, lon: String },
    City(String),
}

impl LocationQuery {
    /// Build a query from raw request parameters.
    ///
    /// Empty strings count as absent. Coordinates win over `city` when both
    /// are given.
    pub fn from_params(
        lat: Option<&str>,
        lon: Option<&str>,
        city: Option<&str>,
    ) -> Result<Self, AppError> {
        if let (Some(lat), Some(lon)) = (non_empty(lat), non_empty(lon)) {
            if parse_coordinate(lat).is_none() || parse_coordinate(lon).is_none() {
                return Err(AppError::BadRequest(
                    "lat y lon deben ser números válidos".to_string(),
                ));
            }
            return Ok(Self::Coordinates {
                lat: lat.to_string(),
                lon: lon.to_string(),
            });
        }

        match non_empty(city) {
            Some(city) => Ok(Self::City(city.to_string())),
            None => Err(AppError::BadRequest(
                "Faltan parámetros de ubicación: indicá lat y lon, o city".to_string(),
            )),
        }
    }

    /// Cache key: `"lat,lon"` verbatim, or the raw city string.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Coordinates { lat, lon } => format!("{},{}", lat, lon),
            Self::City(city) => city.clone(),
        }
    }

    /// Parsed coordinates, if this is a coordinate query.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match self {
            Self::Coordinates { lat, lon } => Some((parse_coordinate(lat)?, parse_coordinate(lon)?)),
            Self::City(_) => None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Weather payload
// ---------------------------------------------------------------------------

/// Current-weather JSON exactly as the provider returned it, possibly
/// augmented with top-level `uvi`, `sunrise`, `sunset` and `pop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct WeatherPayload(Value);

impl WeatherPayload {
    #[cfg(test)]
    pub(crate) fn new(value: Value) -> Self {
        Self(value)
    }

    /// Non-null value at a nested path.
    fn field(&self, path: &[&str]) -> Option<&Value> {
        let mut current = &self.0;
        for key in path {
            current = current.get(*key)?;
        }
        (!current.is_null()).then_some(current)
    }

    fn number(&self, path: &[&str]) -> Option<f64> {
        self.field(path).and_then(Value::as_f64)
    }

    fn timestamp(&self, path: &[&str]) -> Option<i64> {
        let value = self.field(path)?;
        value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
    }

    /// Whether a top-level field is present and non-null.
    pub fn has(&self, key: &str) -> bool {
        self.field(&[key]).is_some()
    }

    /// Set a top-level field unless it already holds a non-null value.
    ///
    /// Returns whether the field was written. Non-object payloads are left
    /// untouched.
    pub fn set_if_absent(&mut self, key: &str, value: Value) -> bool {
        if self.has(key) {
            return false;
        }
        match self.0.as_object_mut() {
            Some(map) => {
                map.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn temp(&self) -> Option<f64> {
        self.number(&["main", "temp"])
    }

    pub fn feels_like(&self) -> Option<f64> {
        self.number(&["main", "feels_like"])
    }

    /// Condition category of the first `weather` entry (e.g. "Rain").
    pub fn condition(&self) -> Option<&str> {
        self.0
            .get("weather")
            .and_then(|w| w.get(0))
            .and_then(|w| w.get("main"))
            .and_then(Value::as_str)
    }

    pub fn coord(&self) -> Option<(f64, f64)> {
        Some((self.number(&["coord", "lat"])?, self.number(&["coord", "lon"])?))
    }

    pub fn sys_sunrise(&self) -> Option<i64> {
        self.timestamp(&["sys", "sunrise"])
    }

    pub fn sys_sunset(&self) -> Option<i64> {
        self.timestamp(&["sys", "sunset"])
    }

    /// Sunrise (unix seconds): enriched top-level value, else `sys.sunrise`.
    pub fn sunrise(&self) -> Option<i64> {
        self.timestamp(&["sunrise"]).or_else(|| self.sys_sunrise())
    }

    /// Sunset (unix seconds): enriched top-level value, else `sys.sunset`.
    pub fn sunset(&self) -> Option<i64> {
        self.timestamp(&["sunset"]).or_else(|| self.sys_sunset())
    }

    pub fn uvi(&self) -> Option<f64> {
        self.number(&["uvi"])
    }

    /// Probability of precipitation, 0.0 to 1.0.
    pub fn pop(&self) -> Option<f64> {
        self.number(&["pop"])
    }

    /// Location's offset from UTC in seconds.
    pub fn timezone_offset(&self) -> Option<i32> {
        self.timestamp(&["timezone"])
            .and_then(|secs| i32::try_from(secs).ok())
    }
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

/// City record as returned by the provider's direct geocoding endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCity {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

/// Compact city record for autocomplete suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GeocodeResult {
    /// City name (e.g. "Rosario")
    pub name: String,
    /// ISO 3166 country code (e.g. "AR")
    pub country: String,
    /// State or province, when the provider knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Latitude (WGS84)
    pub lat: f64,
    /// Longitude (WGS84)
    pub lon: f64,
    /// Display label: "name[, state], country"
    pub display: String,
}

impl From<RawCity> for GeocodeResult {
    fn from(city: RawCity) -> Self {
        let state = city.state.filter(|s| !s.is_empty());
        let display = match &state {
            Some(state) => format!("{}, {}, {}", city.name, state, city.country),
            None => format!("{}, {}", city.name, city.country),
        };
        Self {
            name: city.name,
            country: city.country,
            state,
            lat: city.lat,
            lon: city.lon,
            display,
        }
    }
}
