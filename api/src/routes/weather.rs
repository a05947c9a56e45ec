//! Current weather endpoint.
//!
//! - GET /api/weather?lat=..&lon=..
//! - GET /api/weather?city=..

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::models::{LocationQuery, WeatherPayload};
use crate::routes::AppState;
use crate::services::weather::resolve_weather;

/// Location parameters. Either `lat` and `lon`, or `city`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LocationParams {
    /// Latitude (WGS84), e.g. "-32.9"
    pub lat: Option<String>,
    /// Longitude (WGS84), e.g. "-60.6"
    pub lon: Option<String>,
    /// City name, e.g. "Rosario" or "Rosario,AR"
    pub city: Option<String>,
}

impl LocationParams {
    pub fn to_location(&self) -> Result<LocationQuery, AppError> {
        LocationQuery::from_params(
            self.lat.as_deref(),
            self.lon.as_deref(),
            self.city.as_deref(),
        )
    }
}

/// Get current weather for a coordinate or a city.
///
/// Served from a 10 minute in-memory cache when possible. When the provider
/// response lacks sunrise/sunset, a second request fills in sun times, UV
/// index and precipitation probability on a best-effort basis.
#[utoipa::path(
    get,
    path = "/api/weather",
    tag = "Weather",
    params(LocationParams),
    responses(
        (status = 200, description = "Provider weather payload, possibly enriched", body = WeatherPayload),
        (status = 400, description = "Missing or invalid location parameters", body = ErrorResponse),
        (status = 408, description = "Provider request timed out", body = ErrorResponse),
        (status = 503, description = "Provider unreachable", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse),
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<WeatherPayload>, AppError> {
    let location = params.to_location()?;
    let payload = resolve_weather(&state.client, &state.cache, &location).await?;
    Ok(Json(payload))
}
