//! Clothing, rain, UV and sun-time advisories derived from a weather payload.
//!
//! Pure functions: the result depends only on the payload and the instant
//! passed in. Thresholds assume metric units (°C).

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::WeatherPayload;

/// Precipitation probability above which rain gear is advised.
const RAIN_POP_THRESHOLD: f64 = 0.4;

/// UV index above which sun protection is advised.
const UV_INDEX_THRESHOLD: f64 = 6.0;

/// Effective temperature above which a summer cap is suggested with the UV clause.
const HAT_TEMPERATURE_C: f64 = 20.0;

const RAIN_CONDITIONS: [&str; 3] = ["Rain", "Drizzle", "Thunderstorm"];

const RAIN_TEXT: &str = "Llevá paraguas. Hay probabilidad de lluvia.";
const RAIN_CLAUSE: &str = " Llevá un piloto o paraguas por la lluvia.";
const RAIN_KEYWORD: &str = "piloto impermeable";
const NO_RAIN_TEXT: &str = "No parece que llueva. Dejá el paraguas en casa.";

const UV_TEXT: &str = "El sol está heavy. Usá protector solar y gorro.";
const UV_CLAUSE: &str = " No olvides gorra y protector solar por el sol fuerte.";
const HAT_KEYWORD: &str = "gorra verano";
const LOW_UV_TEXT: &str = "El sol está tranqui. Igual, protector no viene mal.";

const NO_SUN_DATA_TEXT: &str = "No hay datos de amanecer y atardecer para esta ubicación.";

/// One temperature band with its literal texts.
struct CoatTier {
    /// Exclusive upper bound in °C; `None` for the warmest band.
    below_c: Option<f64>,
    coat: &'static str,
    clothing: &'static str,
    keyword: &'static str,
}

static COAT_TIERS: [CoatTier; 5] = [
    CoatTier {
        below_c: Some(10.0),
        coat: "Abrigo sí o sí. Hace mucho frío.",
        clothing: "Campera abrigada, bufanda y guantes. ¡Hace mucho frío!",
        keyword: "campera invierno",
    },
    CoatTier {
        below_c: Some(15.0),
        coat: "Sí, llevá abrigo. Está fresco.",
        clothing: "Abrigo o campera liviana. Está fresco.",
        keyword: "campera media estacion",
    },
    CoatTier {
        below_c: Some(20.0),
        coat: "Quizás un abrigo liviano. Está templado.",
        clothing: "Un buzo o sweater debería ser suficiente.",
        keyword: "buzo algodon",
    },
    CoatTier {
        below_c: Some(25.0),
        coat: "No hace falta abrigo. La temperatura es agradable.",
        clothing: "Remera manga larga o camisa liviana.",
        keyword: "remera manga larga",
    },
    CoatTier {
        below_c: None,
        coat: "Dejá el abrigo en casa. Hace calor.",
        clothing: "Remera liviana y ropa fresca.",
        keyword: "remera verano",
    },
];

/// Human-readable advice for the current conditions.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Advisory {
    /// Effective temperature used for the coat band (°C)
    pub effective_temperature_c: f64,
    /// Whether to take a coat
    pub coat_text: String,
    /// What to wear, with rain and UV clauses appended when they apply
    pub clothing_text: String,
    /// Rain advice
    pub rain_text: String,
    /// Sun protection advice
    pub uv_text: String,
    /// Sunrise/sunset narrative in the location's local time
    pub sun_time_text: String,
    /// Search keyword for matching clothing
    pub shopping_keyword: String,
}

/// Feels-like temperature if reported, else the raw temperature.
pub fn effective_temperature(payload: &WeatherPayload) -> Option<f64> {
    payload.feels_like().or_else(|| payload.temp())
}

/// Derive advisories for `payload` as of `now`.
///
/// Returns `None` when the payload carries no temperature at all.
pub fn derive_advisory(payload: &WeatherPayload, now: DateTime<Utc>) -> Option<Advisory> {
    let temperature = effective_temperature(payload)?;
    let tier = coat_tier(temperature);

    let mut clothing_text = tier.clothing.to_string();
    let mut keyword = tier.keyword.to_string();

    let rain_likely = payload.pop().unwrap_or(0.0) > RAIN_POP_THRESHOLD
        || payload
            .condition()
            .is_some_and(|c| RAIN_CONDITIONS.iter().any(|rain| *rain == c));
    let rain_text = if rain_likely {
        clothing_text.push_str(RAIN_CLAUSE);
        keyword = format!("{} {}", RAIN_KEYWORD, keyword);
        RAIN_TEXT
    } else {
        NO_RAIN_TEXT
    };

    let strong_uv = payload.uvi().unwrap_or(0.0) > UV_INDEX_THRESHOLD && is_daytime(payload, now);
    let uv_text = if strong_uv {
        clothing_text.push_str(UV_CLAUSE);
        if temperature > HAT_TEMPERATURE_C {
            keyword = format!("{} {}", HAT_KEYWORD, keyword);
        }
        UV_TEXT
    } else {
        LOW_UV_TEXT
    };

    Some(Advisory {
        effective_temperature_c: temperature,
        coat_text: tier.coat.to_string(),
        clothing_text,
        rain_text: rain_text.to_string(),
        uv_text: uv_text.to_string(),
        sun_time_text: sun_time_text(payload, now),
        shopping_keyword: keyword,
    })
}

fn coat_tier(temperature: f64) -> &'static CoatTier {
    COAT_TIERS
        .iter()
        .find(|t| t.below_c.map_or(true, |limit| temperature < limit))
        .unwrap_or(&COAT_TIERS[COAT_TIERS.len() - 1])
}

/// Strictly between sunrise and sunset. Missing sun data counts as daytime.
fn is_daytime(payload: &WeatherPayload, now: DateTime<Utc>) -> bool {
    match (payload.sunrise(), payload.sunset()) {
        (Some(sunrise), Some(sunset)) => {
            let ts = now.timestamp();
            sunrise < ts && ts < sunset
        }
        _ => true,
    }
}

fn sun_time_text(payload: &WeatherPayload, now: DateTime<Utc>) -> String {
    let (Some(sunrise), Some(sunset)) = (payload.sunrise(), payload.sunset()) else {
        return NO_SUN_DATA_TEXT.to_string();
    };
    let offset = payload
        .timezone_offset()
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    let (Some(sunrise_at), Some(sunset_at)) = (
        local_time(sunrise, offset),
        local_time(sunset, offset),
    ) else {
        return NO_SUN_DATA_TEXT.to_string();
    };

    let ts = now.timestamp();
    if ts <= sunrise {
        format!("Todavía es de noche. El sol sale a las {}.", sunrise_at)
    } else if ts < sunset {
        format!(
            "Es de día. Salió a las {} y se pone a las {}.",
            sunrise_at, sunset_at
        )
    } else {
        format!("Ya es de noche. El sol se puso a las {}.", sunset_at)
    }
}

/// Unix seconds rendered as `HH:MM` at `offset`.
fn local_time(unix_secs: i64, offset: FixedOffset) -> Option<String> {
    DateTime::from_timestamp(unix_secs, 0)
        .map(|dt| dt.with_timezone(&offset).format("%H:%M").to_string())
}
