//! City search endpoint.
//!
//! GET /api/geocoding?query=..&limit=.. is never cached, every call reaches
//! the provider.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::models::GeocodeResult;
use crate::routes::AppState;

/// Number of suggestions returned when `limit` is not given.
const DEFAULT_GEOCODING_LIMIT: u32 = 5;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GeocodingParams {
    /// Free-text city name, e.g. "Rosario"
    pub query: Option<String>,
    /// Maximum number of results (default 5)
    pub limit: Option<String>,
}

/// Search cities by name.
#[utoipa::path(
    get,
    path = "/api/geocoding",
    tag = "Geocoding",
    params(GeocodingParams),
    responses(
        (status = 200, description = "Matching cities", body = Vec<GeocodeResult>),
        (status = 400, description = "Missing query or invalid limit", body = ErrorResponse),
        (status = 408, description = "Provider request timed out", body = ErrorResponse),
        (status = 503, description = "Provider unreachable", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse),
    )
)]
pub async fn search_cities(
    State(state): State<AppState>,
    Query(params): Query<GeocodingParams>,
) -> Result<Json<Vec<GeocodeResult>>, AppError> {
    let query = params
        .query
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Falta el parámetro de búsqueda".to_string()))?;

    let limit = match params.limit.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_GEOCODING_LIMIT,
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            AppError::BadRequest(format!("limit debe ser un entero no negativo, se recibió '{}'", raw))
        })?,
    };

    let results = state
        .client
        .geocode(query, limit)
        .await
        .map_err(|e| AppError::from_provider(e, "Error al buscar ciudades"))?;

    Ok(Json(results))
}
