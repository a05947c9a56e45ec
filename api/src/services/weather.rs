//! Weather resolution: cache lookup, provider fetch, enrichment, cache store.

use crate::errors::AppError;
use crate::models::{LocationQuery, WeatherPayload};
use crate::services::cache::WeatherCache;
use crate::services::enrichment::enrich;
use crate::services::openweather::OpenWeatherClient;

/// Resolve current weather for a location.
///
/// A fresh cache entry short-circuits everything. On a miss the provider is
/// called, the payload is enriched on a best-effort basis and the result
/// replaces whatever the cache held for that key.
pub async fn resolve_weather(
    client: &OpenWeatherClient,
    cache: &WeatherCache,
    location: &LocationQuery,
) -> Result<WeatherPayload, AppError> {
    let key = location.cache_key();

    if let Some(payload) = cache.get(&key).await {
        tracing::debug!("Using cached weather for {}", key);
        return Ok(payload);
    }

    let mut payload = client
        .fetch_current_weather(location)
        .await
        .map_err(|e| AppError::from_provider(e, "Error al obtener datos del clima"))?;

    // Enrichment is best-effort: a failure leaves the primary payload as-is.
    if let Err(e) = enrich(client, &mut payload, location.coordinates()).await {
        tracing::warn!("Enrichment failed for {}, serving primary data: {}", key, e);
    }

    cache.put(key, payload.clone()).await;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::services::cache::ManualClock;
    use chrono::{DateTime, Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn start() -> DateTime<Utc> {
        "2026-03-01T12:00:00Z".parse().unwrap()
    }

    fn rosario() -> LocationQuery {
        LocationQuery::Coordinates {
            lat: "-32.9".to_string(),
            lon: "-60.6".to_string(),
        }
    }

    fn current_weather_with_sun() -> serde_json::Value {
        json!({
            "coord": { "lat": -32.9, "lon": -60.6 },
            "weather": [{ "main": "Clear" }],
            "main": { "temp": 24.0, "feels_like": 24.5 },
            "sys": { "sunrise": 1772356800, "sunset": 1772402400 },
            "name": "Rosario"
        })
    }

    fn current_weather_without_sun() -> serde_json::Value {
        json!({
            "coord": { "lat": -32.9, "lon": -60.6 },
            "weather": [{ "main": "Clouds" }],
            "main": { "temp": 18.0 },
            "sys": { "country": "AR" },
            "name": "Rosario"
        })
    }

    #[tokio::test]
    async fn test_second_lookup_within_ttl_is_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_with_sun()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(&test_config(&mock_server.uri())).unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let cache = WeatherCache::with_clock(clock.clone());

        let first = resolve_weather(&client, &cache, &rosario()).await.unwrap();
        clock.advance(Duration::minutes(9));
        let second = resolve_weather(&client, &cache, &rosario()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_lookup_after_ttl_refetches_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_with_sun()))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(&test_config(&mock_server.uri())).unwrap();
        let clock = Arc::new(ManualClock::new(start()));
        let cache = WeatherCache::with_clock(clock.clone());
        let key = rosario().cache_key();

        resolve_weather(&client, &cache, &rosario()).await.unwrap();
        assert_eq!(cache.fetched_at(&key).await, Some(start()));

        clock.advance(Duration::minutes(10) + Duration::seconds(1));
        resolve_weather(&client, &cache, &rosario()).await.unwrap();
        resolve_weather(&client, &cache, &rosario()).await.unwrap();

        assert_eq!(
            cache.fetched_at(&key).await,
            Some(start() + Duration::minutes(10) + Duration::seconds(1))
        );
    }

    #[tokio::test]
    async fn test_differently_formatted_coordinates_miss_the_cache() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_with_sun()))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(&test_config(&mock_server.uri())).unwrap();
        let cache = WeatherCache::new();
        let padded = LocationQuery::Coordinates {
            lat: "-32.90".to_string(),
            lon: "-60.60".to_string(),
        };

        resolve_weather(&client, &cache, &rosario()).await.unwrap();
        resolve_weather(&client, &cache, &padded).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_enrichment_when_sun_times_present() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_with_sun()))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(&test_config(&mock_server.uri())).unwrap();
        let payload = resolve_weather(&client, &WeatherCache::new(), &rosario())
            .await
            .unwrap();

        assert!(!payload.has("uvi"));
    }

    #[tokio::test]
    async fn test_enrichment_when_sun_times_missing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_weather_without_sun()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": { "uvi": 5.5, "sunrise": 1772356800, "sunset": 1772402400 },
                "daily": [{ "pop": 0.2 }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(&test_config(&mock_server.uri())).unwrap();
        let payload = resolve_weather(&client, &WeatherCache::new(), &rosario())
            .await
            .unwrap();

        assert_eq!(payload.uvi(), Some(5.5));
        assert_eq!(payload.pop(), Some(0.2));
        assert_eq!(payload.sunrise(), Some(1_772_356_800));
        assert_eq!(payload.sunset(), Some(1_772_402_400));
    }

    #[tokio::test]
    async fn test_enrichment_failure_still_succeeds_and_caches() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_weather_without_sun()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(&test_config(&mock_server.uri())).unwrap();
        let cache = WeatherCache::new();

        let payload = resolve_weather(&client, &cache, &rosario()).await.unwrap();

        assert_eq!(payload, WeatherPayload::new(current_weather_without_sun()));
        assert_eq!(cache.get(&rosario().cache_key()).await, Some(payload));
    }

    #[tokio::test]
    async fn test_primary_failure_is_not_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = OpenWeatherClient::new(&test_config(&mock_server.uri())).unwrap();
        let cache = WeatherCache::new();

        for _ in 0..2 {
            let err = resolve_weather(&client, &cache, &rosario()).await.unwrap_err();
            assert!(matches!(err, AppError::Upstream { status: 502, .. }));
        }
    }
}
