//! Google Drive integration for incident notes documents.
//!
//! Creates an empty Google Doc inside a configured folder and returns the
//! shareable document URL.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::IntegrationError;

/// Google Drive API v3 base URL.
const DRIVE_API_URL: &str = "https://www.googleapis.com/drive/v3";

/// MIME type for a native Google Doc.
const DOC_MIME_TYPE: &str = "application/vnd.google-apps.document";

/// Client for creating notes documents.
#[derive(Debug, Clone)]
pub struct DriveClient {
    base_url: String,
    token: String,
    folder_id: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    id: String,
}

impl DriveClient {
    /// Create a client using the production Drive API endpoint.
    #[must_use]
    pub fn new(token: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self::with_base_url(token, folder_id, DRIVE_API_URL)
    }

    /// Create a client against a specific base URL (used by tests).
    #[must_use]
    pub fn with_base_url(
        token: impl Into<String>,
        folder_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            folder_id: folder_id.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a Google Doc with the given name inside the configured folder
    /// and return its document URL.
    ///
    /// # Errors
    /// Returns an error if the request fails or the API rejects it.
    pub async fn create_notes_document(&self, name: &str) -> Result<String, IntegrationError> {
        let body = json!({
            "name": name,
            "mimeType": DOC_MIME_TYPE,
            "parents": [self.folder_id],
        });

        debug!(name, folder = %self.folder_id, "Creating notes document");

        let response = self
            .client
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                service: "drive",
                status,
                body,
            });
        }

        let file: FileResponse = response.json().await?;
        Ok(format!("https://docs.google.com/document/d/{}/edit", file.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_document_returns_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .and(header("authorization", "Bearer g-token"))
            .and(body_partial_json(json!({
                "name": "incident-202608211430",
                "mimeType": "application/vnd.google-apps.document",
                "parents": ["folder123"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "doc456" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DriveClient::with_base_url("g-token", "folder123", server.uri());
        let url = client.create_notes_document("incident-202608211430").await.unwrap();

        assert_eq!(url, "https://docs.google.com/document/d/doc456/edit");
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/files"))
            .respond_with(ResponseTemplate::new(404).set_body_string("folder not found"))
            .mount(&server)
            .await;

        let client = DriveClient::with_base_url("g-token", "missing", server.uri());
        let err = client.create_notes_document("incident-1").await.unwrap_err();

        assert!(matches!(err, IntegrationError::Api { service: "drive", .. }));
    }
}
