//! Error types for the Slack Web API client.

use thiserror::Error;

/// Errors that can occur when calling the Slack Web API.
#[derive(Debug, Error)]
pub enum SlackError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack accepted the request but reported an error in the envelope
    #[error("Slack {method} failed: {message}")]
    Api {
        /// API method that failed (e.g. `conversations.create`)
        method: &'static str,
        /// Error string from the `error` field, or the HTTP status line
        message: String,
    },

    /// Response was `ok` but missing fields the caller needs
    #[error("Slack {0} response was missing expected fields")]
    MalformedResponse(&'static str),
}
