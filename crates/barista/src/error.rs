//! Error taxonomy for the webhook request path.
//!
//! Only the errors in [`FlowError`] ever reach the webhook caller; every
//! downstream integration or notification failure is logged by the detached
//! task that owns it and never crosses back into the response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Usage hint returned when the command text is blank.
pub const USAGE_HINT: &str = "Please provide a short description of your virtual coffee break. \
     Usage: /coffee [short description]. \
     Example: /coffee Coffee break to talk about music.";

/// Errors that abort the webhook response.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Request used a method other than POST
    #[error("Only POST requests are accepted")]
    MethodNotAllowed,

    /// Shared-secret token did not match
    #[error("Invalid credentials")]
    Unauthorized,

    /// Command text was blank
    #[error("{}", USAGE_HINT)]
    InvalidInput,

    /// The channel-creation call failed; nothing downstream can run
    #[error("Creating the coffee channel failed: {0}")]
    ChannelCreationFailed(#[from] slack::SlackError),
}

impl FlowError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ChannelCreationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let body = json!({
            "response_type": "in_channel",
            "text": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(FlowError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(FlowError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(FlowError::InvalidInput.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_unauthorized_message_is_exact() {
        assert_eq!(FlowError::Unauthorized.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_invalid_input_carries_usage_hint() {
        assert!(FlowError::InvalidInput.to_string().contains("/coffee [short description]"));
    }
}
