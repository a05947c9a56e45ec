use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenWeatherMap API key. Not validated locally; a bad key surfaces as
    /// an upstream 401.
    pub api_key: String,
    /// Base URL for the current-weather and One Call endpoints.
    pub base_url: String,
    /// Base URL for the geocoding endpoint.
    pub geocoding_url: String,
    pub geocode_timeout_ms: u64,
    pub weather_timeout_ms: u64,
    /// Unit system requested from the provider (advisory thresholds assume °C).
    pub units: String,
    /// Language for provider condition descriptions.
    pub lang: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENWEATHERMAP_API_KEY").unwrap_or_default(),
            base_url: env_or("OPENWEATHERMAP_API_URL", DEFAULT_BASE_URL),
            geocoding_url: env_or("OPENWEATHERMAP_GEOCODING_URL", DEFAULT_GEOCODING_URL),
            geocode_timeout_ms: parse_env("GEOCODE_TIMEOUT_MS", 5_000),
            weather_timeout_ms: parse_env("WEATHER_TIMEOUT_MS", 10_000),
            units: env_or("WEATHER_UNITS", "metric"),
            lang: env_or("WEATHER_LANG", "es"),
            port: parse_env("PORT", 8080),
        }
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_millis(self.weather_timeout_ms)
    }
}

/// Read an env var, treating unset and empty the same way.
fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} has invalid value '{}', using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Configuration pointing both provider URLs at a mock server.
#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        geocoding_url: base_url.to_string(),
        geocode_timeout_ms: 5_000,
        weather_timeout_ms: 10_000,
        units: "metric".to_string(),
        lang: "es".to_string(),
        port: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // NOTE: set_var/remove_var mutate process-global state. Only this test
        // touches these variables, so parallel test threads don't race on them.
        unsafe {
            std::env::remove_var("OPENWEATHERMAP_API_KEY");
            std::env::remove_var("OPENWEATHERMAP_API_URL");
            std::env::remove_var("OPENWEATHERMAP_GEOCODING_URL");
            std::env::remove_var("GEOCODE_TIMEOUT_MS");
            std::env::set_var("WEATHER_TIMEOUT_MS", "not-a-number");
            std::env::remove_var("PORT");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.geocoding_url, DEFAULT_GEOCODING_URL);
        assert_eq!(config.geocode_timeout(), Duration::from_secs(5));
        assert_eq!(config.weather_timeout(), Duration::from_secs(10));
        assert_eq!(config.port, 8080);

        unsafe {
            std::env::remove_var("WEATHER_TIMEOUT_MS");
        }
    }

    #[test]
    fn test_env_or_strips_trailing_slash() {
        unsafe {
            std::env::set_var("ABRIGO_TEST_URL", "http://localhost:9000/data/");
        }
        assert_eq!(
            env_or("ABRIGO_TEST_URL", DEFAULT_BASE_URL),
            "http://localhost:9000/data"
        );
        unsafe {
            std::env::remove_var("ABRIGO_TEST_URL");
        }
    }
}
