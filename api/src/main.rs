// Abrigo API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::cache::WeatherCache;
use services::openweather::OpenWeatherClient;

/// Abrigo API OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Abrigo API",
        version = "0.1.0",
        description = "Weather lookup for \"¿Puedo salir sin abrigo?\". Proxies \
            OpenWeatherMap geocoding and current weather, caches weather for \
            10 minutes per location, fills in sun times, UV index and rain \
            probability when the current-weather response lacks them, and \
            derives clothing advice.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Geocoding", description = "City search"),
        (name = "Weather", description = "Current weather"),
        (name = "Advisory", description = "Clothing, rain, UV and sun-time advice"),
    ),
    paths(
        routes::health::health_check,
        routes::geocoding::search_cities,
        routes::weather::get_weather,
        routes::advisory::get_advisory,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            models::GeocodeResult,
            models::WeatherPayload,
            services::advisory::Advisory,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abrigo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    if config.api_key.is_empty() {
        tracing::warn!("OPENWEATHERMAP_API_KEY is not set; provider calls will be rejected");
    }

    let client = OpenWeatherClient::new(&config).expect("Failed to build HTTP client");

    // One cache per process, shared by the weather and advisory routes
    let app_state = AppState {
        client,
        cache: WeatherCache::new(),
    };

    // CORS: read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/geocoding", get(routes::geocoding::search_cities))
        .route("/api/weather", get(routes::weather::get_weather))
        .route("/api/advisory", get(routes::advisory::get_advisory))
        .with_state(app_state);

    let app = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
