//! Best-effort enrichment of a current-weather payload with One Call data.

use serde_json::json;

use crate::models::WeatherPayload;
use crate::services::openweather::{Enrichment, OpenWeatherClient, ProviderError};

/// Enrichment is only worth a second request when the payload carries no sun
/// times of its own.
pub fn needs_enrichment(payload: &WeatherPayload) -> bool {
    payload.sys_sunrise().is_none() && payload.sys_sunset().is_none()
}

/// Merge enrichment fields into `payload` without overwriting anything the
/// primary response already provided.
pub fn merge_enrichment(payload: &mut WeatherPayload, enrichment: &Enrichment) {
    if let Some(uvi) = enrichment.uvi {
        payload.set_if_absent("uvi", json!(uvi));
    }
    if let Some(pop) = enrichment.pop {
        payload.set_if_absent("pop", json!(pop));
    }
    if payload.sunrise().is_none() {
        if let Some(sunrise) = enrichment.sunrise {
            payload.set_if_absent("sunrise", json!(sunrise));
        }
    }
    if payload.sunset().is_none() {
        if let Some(sunset) = enrichment.sunset {
            payload.set_if_absent("sunset", json!(sunset));
        }
    }
}

/// Fetch and merge enrichment for `payload`.
///
/// Returns `Ok(false)` when no request was needed or possible. Coordinates
/// come from the payload's `coord`, else from `fallback_coords`.
pub async fn enrich(
    client: &OpenWeatherClient,
    payload: &mut WeatherPayload,
    fallback_coords: Option<(f64, f64)>,
) -> Result<bool, ProviderError> {
    if !needs_enrichment(payload) {
        return Ok(false);
    }

    let Some((lat, lon)) = payload.coord().or(fallback_coords) else {
        tracing::debug!("Skipping enrichment: payload has no coordinates");
        return Ok(false);
    };

    let enrichment = client.fetch_enrichment(lat, lon).await?;
    merge_enrichment(payload, &enrichment);
    Ok(true)
}
