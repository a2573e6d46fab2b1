//! Error type shared by the integration clients.

use thiserror::Error;

/// Errors that can occur when calling an external integration.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status
    #[error("{service} returned {status}: {body}")]
    Api {
        /// Service that rejected the call (e.g. `calendar`)
        service: &'static str,
        /// HTTP status line
        status: reqwest::StatusCode,
        /// Response body, if readable
        body: String,
    },

    /// Response decoded but was missing fields the caller needs
    #[error("{0} response was missing expected fields")]
    MalformedResponse(&'static str),
}
