//! PagerDuty integration for paging the on-call rotation.
//!
//! Uses the Events API v2 to trigger an incident when a coffee-break channel
//! is created.
//!
//! # Usage
//!
//! ```no_run
//! use integrations::pagerduty::{EventSeverity, PagerDutyClient, PagerDutyEvent};
//!
//! # async fn example() -> Result<(), integrations::IntegrationError> {
//! let client = PagerDutyClient::new("routing-key");
//!
//! let event = PagerDutyEvent::trigger("New incident 'DB outage' created by @alice", "C024BE91L")
//!     .with_severity(EventSeverity::Critical);
//!
//! client.send_event(&event).await?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::IntegrationError;

/// PagerDuty Events API v2 endpoint.
const EVENTS_API_URL: &str = "https://events.pagerduty.com/v2/enqueue";

/// PagerDuty client for Events API v2.
#[derive(Debug, Clone)]
pub struct PagerDutyClient {
    events_url: String,
    routing_key: String,
    client: reqwest::Client,
}

impl PagerDutyClient {
    /// Create a client with the given routing key.
    #[must_use]
    pub fn new(routing_key: impl Into<String>) -> Self {
        Self::with_events_url(routing_key, EVENTS_API_URL)
    }

    /// Create a client against a specific events URL (used by tests).
    #[must_use]
    pub fn with_events_url(routing_key: impl Into<String>, events_url: impl Into<String>) -> Self {
        Self {
            events_url: events_url.into(),
            routing_key: routing_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Send an event to PagerDuty. Returns the `dedup_key` PagerDuty
    /// assigned to the incident.
    ///
    /// # Errors
    /// Returns an error if the API request fails.
    pub async fn send_event(&self, event: &PagerDutyEvent) -> Result<String, IntegrationError> {
        let payload = ApiPayload {
            routing_key: &self.routing_key,
            event_action: "trigger",
            payload: &event.payload,
        };

        debug!(summary = %event.payload.summary, "Sending PagerDuty event");

        let response = self
            .client
            .post(&self.events_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                service: "pagerduty",
                status,
                body,
            });
        }

        let result: ApiResponse = response.json().await?;
        debug!(dedup_key = %result.dedup_key, "PagerDuty event sent");
        Ok(result.dedup_key)
    }
}

/// A trigger event for Events API v2.
#[derive(Debug, Clone, Serialize)]
pub struct PagerDutyEvent {
    /// Event payload
    pub payload: EventPayload,
}

/// Event payload.
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    /// Brief summary of the event
    pub summary: String,
    /// Source of the event (here: the incident channel id)
    pub source: String,
    /// Severity level
    pub severity: EventSeverity,
    /// Custom details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_details: Option<serde_json::Value>,
}

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    /// Critical severity
    Critical,
    /// Error severity
    Error,
    /// Warning severity
    Warning,
    /// Info severity
    Info,
}

impl PagerDutyEvent {
    /// Create a trigger event.
    #[must_use]
    pub fn trigger(summary: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            payload: EventPayload {
                summary: summary.into(),
                source: source.into(),
                severity: EventSeverity::Error,
                custom_details: None,
            },
        }
    }

    /// Set the severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.payload.severity = severity;
        self
    }

    /// Set custom details.
    #[must_use]
    pub fn with_custom_details(mut self, details: serde_json::Value) -> Self {
        self.payload.custom_details = Some(details);
        self
    }
}

// =============================================================================
// API types (internal)
// =============================================================================

#[derive(Debug, Serialize)]
struct ApiPayload<'a> {
    routing_key: &'a str,
    event_action: &'static str,
    payload: &'a EventPayload,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    dedup_key: String,
}
