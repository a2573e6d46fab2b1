//! Post-mortem registrar integration.
//!
//! Registers a record linking the incident name, creation time, Jira issue,
//! and Slack channel with an external post-mortem service, so the
//! retrospective can find everything later.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::debug;

use crate::error::IntegrationError;

/// Client for the post-mortem registrar.
#[derive(Debug, Clone)]
pub struct PostmortemClient {
    url: String,
    key: String,
    client: reqwest::Client,
}

/// One incident record.
#[derive(Debug, Clone)]
pub struct PostmortemRecord {
    /// Incident name
    pub name: String,
    /// Creation time
    pub when: DateTime<Utc>,
    /// Jira issue key
    pub issue_key: String,
    /// Slack channel id
    pub channel_id: String,
}

impl PostmortemClient {
    /// Create a client for the given registrar endpoint.
    #[must_use]
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Register an incident record.
    ///
    /// # Errors
    /// Returns an error if the request fails or the registrar rejects it.
    pub async fn register(&self, record: &PostmortemRecord) -> Result<(), IntegrationError> {
        let body = json!({
            "key": self.key,
            "incident": {
                "name": record.name,
                "when": record.when.format("%Y-%m-%d %H:%M:%S").to_string(),
                "issueTracking": format!("jira:{}", record.issue_key),
                "channel": format!("slack:{}", record.channel_id),
            }
        });

        debug!(name = %record.name, issue = %record.issue_key, "Registering post-mortem record");

        let response = self
            .client
            .post(format!("{}/incident/create", self.url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                service: "postmortem",
                status,
                body,
            });
        }

        Ok(())
    }
}
