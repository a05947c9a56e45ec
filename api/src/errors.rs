use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::openweather::ProviderError;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request timeout: {0}")]
    RequestTimeout(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Provider answered with a non-2xx status; the status is forwarded as-is.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Map a provider failure to the HTTP error returned to the caller.
    ///
    /// `context` prefixes the user-facing message for upstream and internal
    /// failures (e.g. "Error al obtener datos del clima").
    pub fn from_provider(err: ProviderError, context: &str) -> Self {
        match err {
            ProviderError::Timeout(after) => {
                tracing::warn!("{}: upstream timed out after {:?}", context, after);
                AppError::RequestTimeout(
                    "La solicitud ha excedido el tiempo de espera. Verifica tu conexión a internet.".to_string(),
                )
            }
            ProviderError::Connection(msg) => {
                tracing::error!("{}: connection failure: {}", context, msg);
                AppError::ServiceUnavailable(
                    "Error de conexión. Verifica tu conexión a internet.".to_string(),
                )
            }
            ProviderError::Upstream { status, .. } => AppError::Upstream {
                status,
                message: format!("{}: {}", context, status),
            },
            other => {
                tracing::error!("{}: {}", context, other);
                AppError::InternalError(format!("{}: {}", context, other))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::RequestTimeout(msg) => (StatusCode::REQUEST_TIMEOUT, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Upstream { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            ),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
