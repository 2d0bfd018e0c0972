//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, info};

use crate::remote::RemoteError;

/// Errors the HTTP API reports to its callers.
#[derive(Debug)]
pub enum StoryforgeError {
    /// Missing or blank input.
    BadRequest(String),
    /// The image backend failed; there is nothing to fall back to.
    ImageGeneration(RemoteError),
    /// A needed backend has no credentials.
    ServiceUnavailable(String),
}

impl std::fmt::Display for StoryforgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "Bad request: {message}"),
            Self::ImageGeneration(err) => write!(f, "Failed to generate image: {err}"),
            Self::ServiceUnavailable(message) => write!(f, "Service unavailable: {message}"),
        }
    }
}

impl std::error::Error for StoryforgeError {}

impl From<RemoteError> for StoryforgeError {
    fn from(err: RemoteError) -> Self {
        StoryforgeError::ImageGeneration(err)
    }
}

impl IntoResponse for StoryforgeError {
    fn into_response(self) -> axum::response::Response {
        match self {
            StoryforgeError::BadRequest(message) => {
                info!("Bad request received: {message}");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            StoryforgeError::ImageGeneration(err) => {
                error!("Error generating image: {err}");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({
                        "error": "Failed to generate image",
                        "details": err.details(),
                    })),
                )
                    .into_response()
            }
            StoryforgeError::ServiceUnavailable(message) => {
                error!("Service unavailable: {message}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}
