//! Relay error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;

/// Relay errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or missing required settings.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A query, ping, or sign-on failed in the runtime layer.
    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure reaches the client as the same opaque 500; the cause is
/// only logged.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Internal Server Error" })),
        )
            .into_response()
    }
}
