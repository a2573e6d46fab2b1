//! Google Calendar integration for conference-call events.
//!
//! Creates a one-hour event with a conference bridge attached and extracts
//! the conferencing entry points (video link, dial-in numbers, "more
//! numbers" page) from the response.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::IntegrationError;

/// Google Calendar API v3 base URL.
const CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Client for creating conference-call events.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    base_url: String,
    token: String,
    calendar_id: String,
    client: reqwest::Client,
}

/// Conferencing access details extracted from an event's entry points.
#[derive(Debug, Clone, Default)]
pub struct ConferenceDetails {
    /// URI of the `video` entry point
    pub video_link: Option<String>,
    /// Dial-in numbers, in the order the API returned them
    pub phone_entries: Vec<PhoneEntry>,
    /// URI of the `more` entry point (full phone number list)
    pub more_numbers_link: Option<String>,
}

/// A single dial-in entry point.
#[derive(Debug, Clone)]
pub struct PhoneEntry {
    /// `tel:` URI
    pub uri: String,
    /// Human-readable number
    pub label: String,
    /// Meeting PIN, if the bridge requires one
    pub pin: Option<String>,
    /// Country/region code of the number
    pub region_code: Option<String>,
}

// =============================================================================
// API types (internal)
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    #[serde(rename = "conferenceData")]
    conference_data: Option<ConferenceData>,
}

#[derive(Debug, Deserialize)]
struct ConferenceData {
    #[serde(rename = "entryPoints", default)]
    entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Deserialize)]
struct EntryPoint {
    #[serde(rename = "entryPointType")]
    entry_point_type: String,
    uri: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    pin: Option<String>,
    #[serde(rename = "regionCode", default)]
    region_code: Option<String>,
}

impl CalendarClient {
    /// Create a client using the production Calendar API endpoint.
    #[must_use]
    pub fn new(token: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self::with_base_url(token, calendar_id, CALENDAR_API_URL)
    }

    /// Create a client against a specific base URL (used by tests).
    #[must_use]
    pub fn with_base_url(
        token: impl Into<String>,
        calendar_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            calendar_id: calendar_id.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a one-hour event starting now, with a conference bridge
    /// attached, and return the bridge's entry points.
    ///
    /// # Errors
    /// Returns an error if the request fails, the API rejects it, or the
    /// response carries no conference data.
    pub async fn create_conference_event(
        &self,
        summary: &str,
        request_id: &str,
    ) -> Result<ConferenceDetails, IntegrationError> {
        let start = Utc::now();
        let end = start + Duration::hours(1);

        let body = json!({
            "summary": summary,
            "start": EventTime { date_time: start.to_rfc3339() },
            "end": EventTime { date_time: end.to_rfc3339() },
            "conferenceData": {
                "createRequest": { "requestId": request_id }
            }
        });

        let url = format!(
            "{}/calendars/{}/events?conferenceDataVersion=1",
            self.base_url, self.calendar_id
        );

        debug!(summary, "Creating conference event");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                service: "calendar",
                status,
                body,
            });
        }

        let event: EventResponse = response.json().await?;
        let conference = event
            .conference_data
            .ok_or(IntegrationError::MalformedResponse("calendar event"))?;

        Ok(extract_details(conference.entry_points))
    }
}

fn extract_details(entry_points: Vec<EntryPoint>) -> ConferenceDetails {
    let mut details = ConferenceDetails::default();

    for entry in entry_points {
        match entry.entry_point_type.as_str() {
            "video" => details.video_link = Some(entry.uri),
            "phone" => details.phone_entries.push(PhoneEntry {
                label: entry.label.unwrap_or_else(|| entry.uri.clone()),
                uri: entry.uri,
                pin: entry.pin,
                region_code: entry.region_code,
            }),
            "more" => details.more_numbers_link = Some(entry.uri),
            _ => {}
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_event_parses_entry_points() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(query_param("conferenceDataVersion", "1"))
            .and(header("authorization", "Bearer g-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "evt1",
                "conferenceData": {
                    "entryPoints": [
                        { "entryPointType": "video", "uri": "https://meet.example/abc",
                          "label": "meet.example/abc" },
                        { "entryPointType": "phone", "uri": "tel:+1-555-0100",
                          "label": "+1 555 0100", "pin": "12345", "regionCode": "US" },
                        { "entryPointType": "more", "uri": "https://tel.example/abc" }
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CalendarClient::with_base_url("g-token", "primary", server.uri());
        let details = client
            .create_conference_event("DB outage", "incident-202608211430")
            .await
            .unwrap();

        assert_eq!(details.video_link.as_deref(), Some("https://meet.example/abc"));
        assert_eq!(details.phone_entries.len(), 1);
        assert_eq!(details.phone_entries[0].pin.as_deref(), Some("12345"));
        assert_eq!(details.phone_entries[0].region_code.as_deref(), Some("US"));
        assert_eq!(details.more_numbers_link.as_deref(), Some("https://tel.example/abc"));
    }

    #[tokio::test]
    async fn test_missing_conference_data_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "evt1" })))
            .mount(&server)
            .await;

        let client = CalendarClient::with_base_url("g-token", "primary", server.uri());
        let err = client
            .create_conference_event("DB outage", "incident-1")
            .await
            .unwrap_err();

        assert!(matches!(err, IntegrationError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = CalendarClient::with_base_url("bad-token", "primary", server.uri());
        let err = client
            .create_conference_event("DB outage", "incident-1")
            .await
            .unwrap_err();

        assert!(matches!(err, IntegrationError::Api { service: "calendar", .. }));
    }
}
