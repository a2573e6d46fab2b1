//! Slack Web API client for Breakroom.
//!
//! Covers the handful of endpoints the provisioning flow needs: conversation
//! create / set-topic / invite / archive, message posting, and message
//! pinning. Every call is a bearer-authenticated POST with a JSON body, and
//! every response carries Slack's `ok` envelope: an HTTP 200 with
//! `ok: false` is still a failure and is surfaced as [`SlackError::Api`].
//!
//! # Usage
//!
//! ```no_run
//! use slack::{MessagePayload, SlackClient};
//!
//! # async fn example() -> Result<(), slack::SlackError> {
//! let client = SlackClient::new("xoxb-…");
//! let channel = client.create_channel("incident-202608211430").await?;
//! let message = MessagePayload::new("Coffee Break", ":coffee:")
//!     .with_text("Welcome!");
//! client.post_message(&channel.id, &message).await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod message;

pub use error::SlackError;
pub use message::{ActionButton, Attachment, AttachmentField, MessagePayload};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Slack Web API base URL.
const SLACK_API_URL: &str = "https://slack.com/api";

/// Client for the Slack Web API.
#[derive(Debug, Clone)]
pub struct SlackClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

/// A conversation as returned by `conversations.create`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelInfo {
    /// Channel identifier (e.g. `C024BE91L`)
    pub id: String,
    /// Channel name without the `#` prefix
    pub name: String,
}

/// The `ts`/`channel` pair identifying a posted message, used for pinning.
#[derive(Debug, Clone)]
pub struct PostedMessage {
    /// Message timestamp identifier
    pub ts: String,
    /// Channel the message landed in
    pub channel: String,
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
struct AckResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateChannelResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    channel: Option<ChannelInfo>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    ts: Option<String>,
    channel: Option<String>,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    #[serde(flatten)]
    message: &'a MessagePayload,
}

impl SlackClient {
    /// Create a client using the production Slack API endpoint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, SLACK_API_URL)
    }

    /// Create a client against a specific base URL (used by tests to point
    /// at a mock server).
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a public channel with the given name.
    ///
    /// # Errors
    /// Returns an error if the request fails or Slack rejects the name
    /// (taken, invalid characters, etc.).
    pub async fn create_channel(&self, name: &str) -> Result<ChannelInfo, SlackError> {
        let response: CreateChannelResponse = self
            .call("conversations.create", &json!({ "name": name }))
            .await?;

        if !response.ok {
            return Err(api_error("conversations.create", response.error));
        }

        response
            .channel
            .ok_or(SlackError::MalformedResponse("conversations.create"))
    }

    /// Set a channel's topic.
    ///
    /// # Errors
    /// Returns an error if the request fails or Slack reports `ok: false`.
    pub async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<(), SlackError> {
        self.call_ack(
            "conversations.setTopic",
            &json!({ "channel": channel_id, "topic": topic }),
        )
        .await
    }

    /// Invite a user into a channel.
    ///
    /// # Errors
    /// Returns an error if the request fails or Slack reports `ok: false`.
    pub async fn invite_user(&self, channel_id: &str, user_id: &str) -> Result<(), SlackError> {
        self.call_ack(
            "conversations.invite",
            &json!({ "channel": channel_id, "users": user_id }),
        )
        .await
    }

    /// Archive a channel.
    ///
    /// # Errors
    /// Returns an error if the request fails or Slack reports `ok: false`.
    pub async fn archive_channel(&self, channel_id: &str) -> Result<(), SlackError> {
        self.call_ack("conversations.archive", &json!({ "channel": channel_id }))
            .await
    }

    /// Post a message to a channel (or `#name` target).
    ///
    /// Returns the `ts`/`channel` pair Slack assigned, which
    /// [`pin_message`](Self::pin_message) needs.
    ///
    /// # Errors
    /// Returns an error if the request fails or Slack reports `ok: false`.
    pub async fn post_message(
        &self,
        channel: &str,
        message: &MessagePayload,
    ) -> Result<PostedMessage, SlackError> {
        let request = PostMessageRequest { channel, message };
        let response: PostMessageResponse = self.call("chat.postMessage", &request).await?;

        if !response.ok {
            return Err(api_error("chat.postMessage", response.error));
        }

        match (response.ts, response.channel) {
            (Some(ts), Some(channel)) => Ok(PostedMessage { ts, channel }),
            _ => Err(SlackError::MalformedResponse("chat.postMessage")),
        }
    }

    /// Pin a previously posted message.
    ///
    /// # Errors
    /// Returns an error if the request fails or Slack reports `ok: false`.
    pub async fn pin_message(&self, channel_id: &str, ts: &str) -> Result<(), SlackError> {
        self.call_ack("pins.add", &json!({ "channel": channel_id, "timestamp": ts }))
            .await
    }

    /// POST a JSON body to an API method and decode the response.
    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, SlackError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);

        debug!(method, "Calling Slack API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Api {
                method,
                message: format!("{status}: {body}"),
            });
        }

        Ok(response.json().await?)
    }

    /// Variant of [`call`](Self::call) for methods whose response is just the
    /// `ok` envelope.
    async fn call_ack<B>(&self, method: &'static str, body: &B) -> Result<(), SlackError>
    where
        B: Serialize + ?Sized,
    {
        let response: AckResponse = self.call(method, body).await?;
        if response.ok {
            Ok(())
        } else {
            Err(api_error(method, response.error))
        }
    }
}

fn api_error(method: &'static str, error: Option<String>) -> SlackError {
    SlackError::Api {
        method,
        message: error.unwrap_or_else(|| "unknown error".to_string()),
    }
}
