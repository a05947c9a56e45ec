//! GET /api/advisory: what to wear for the current weather at a location.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::weather::LocationParams;
use crate::routes::AppState;
use crate::services::advisory::{derive_advisory, Advisory};
use crate::services::weather::resolve_weather;

/// Get clothing, rain, UV and sun-time advice for a location.
///
/// Resolves the weather exactly like `/api/weather` (same cache, same
/// errors) and derives the advice as of now.
#[utoipa::path(
    get,
    path = "/api/advisory",
    tag = "Advisory",
    params(LocationParams),
    responses(
        (status = 200, description = "Advice for the current conditions", body = Advisory),
        (status = 400, description = "Missing or invalid location parameters", body = ErrorResponse),
        (status = 408, description = "Provider request timed out", body = ErrorResponse),
        (status = 503, description = "Provider unreachable", body = ErrorResponse),
        (status = 500, description = "Unexpected failure or payload without temperature", body = ErrorResponse),
    )
)]
pub async fn get_advisory(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Result<Json<Advisory>, AppError> {
    let location = params.to_location()?;
    let payload = resolve_weather(&state.client, &state.cache, &location).await?;

    let advisory = derive_advisory(&payload, Utc::now()).ok_or_else(|| {
        AppError::InternalError("Los datos del clima no incluyen temperatura".to_string())
    })?;

    Ok(Json(advisory))
}
