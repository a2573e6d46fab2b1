//! Jira integration for follow-ups epics.
//!
//! Creates one issue per incident in a configured project, carrying the
//! incident channel name in a custom field so the epic can be traced back to
//! the channel later.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::IntegrationError;

/// Custom field Jira projects use for the incident channel name.
const CHANNEL_CUSTOM_FIELD: &str = "customfield_10009";

/// Client for creating follow-ups epics.
#[derive(Debug, Clone)]
pub struct JiraClient {
    base_url: String,
    domain: String,
    user: String,
    api_key: String,
    project_id: String,
    issue_type_id: String,
    client: reqwest::Client,
}

/// A created issue: its key and the browse URL built from it.
#[derive(Debug, Clone)]
pub struct IssueRef {
    /// Issue key (e.g. `OPS-123`)
    pub key: String,
    /// Browse URL on the configured Jira site
    pub browse_url: String,
}

#[derive(Debug, Deserialize)]
struct CreateIssueResponse {
    key: String,
}

impl JiraClient {
    /// Create a client for the given Jira site.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        user: impl Into<String>,
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        issue_type_id: impl Into<String>,
    ) -> Self {
        let domain = domain.into();
        Self {
            base_url: format!("https://{domain}"),
            domain,
            user: user.into(),
            api_key: api_key.into(),
            project_id: project_id.into(),
            issue_type_id: issue_type_id.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a specific base URL (used by tests); browse URLs
    /// still use the configured domain.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create the follow-ups epic for an incident.
    ///
    /// # Errors
    /// Returns an error if the request fails or Jira rejects it.
    pub async fn create_epic(
        &self,
        summary: &str,
        channel_name: &str,
    ) -> Result<IssueRef, IntegrationError> {
        let body = json!({
            "fields": {
                "issuetype": { "id": self.issue_type_id },
                "project": { "id": self.project_id },
                "summary": summary,
                CHANNEL_CUSTOM_FIELD: channel_name,
            }
        });

        debug!(summary, channel_name, "Creating follow-ups epic");

        let response = self
            .client
            .post(format!("{}/rest/api/3/issue", self.base_url))
            .basic_auth(&self.user, Some(&self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                service: "jira",
                status,
                body,
            });
        }

        let issue: CreateIssueResponse = response.json().await?;
        let browse_url = format!("https://{}/browse/{}", self.domain, issue.key);

        Ok(IssueRef {
            key: issue.key,
            browse_url,
        })
    }
}
