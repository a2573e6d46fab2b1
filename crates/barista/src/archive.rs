//! Timed self-archival of coffee channels.
//!
//! A detached task walks the channel through `Active → WarningSent →
//! Archived`: after [`LINGER`] it posts the farewell broadcast, after a
//! further [`GRACE`] it archives the channel. Once scheduled the timers
//! always fire; there is no cancellation and no retry. Failures at either
//! step are logged and the machine moves on.

use std::time::Duration;

use slack::SlackClient;
use tracing::{error, info};

use crate::messages;
use crate::notify::Notifier;

/// Time a channel stays open before the farewell is sent.
pub const LINGER: Duration = Duration::from_secs(15 * 60);

/// Time between the farewell and the archive call.
pub const GRACE: Duration = Duration::from_secs(30);

/// Where the channel is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchivalState {
    /// Channel is open and in use
    Active,
    /// Farewell has been sent; archival is imminent
    WarningSent,
    /// Archive call has been issued
    Archived,
}

/// Schedule the archival machine for a channel, detached from the request.
pub fn schedule(notifier: Notifier, slack: SlackClient, channel_id: String) {
    tokio::spawn(run(notifier, slack, channel_id, LINGER, GRACE));
}

/// Drive the machine with explicit delays (tests use short ones).
pub async fn run(
    notifier: Notifier,
    slack: SlackClient,
    channel_id: String,
    linger: Duration,
    grace: Duration,
) {
    let mut state = ArchivalState::Active;
    info!(channel = %channel_id, ?state, "Archival scheduled");

    tokio::time::sleep(linger).await;

    if let Err(e) = notifier.post(&channel_id, &messages::farewell()).await {
        error!(channel = %channel_id, error = %e, "Failed to send farewell");
    }
    state = ArchivalState::WarningSent;
    info!(channel = %channel_id, ?state, "Farewell sent, archiving soon");

    tokio::time::sleep(grace).await;

    if let Err(e) = slack.archive_channel(&channel_id).await {
        error!(channel = %channel_id, error = %e, "Failed to archive channel");
    }
    state = ArchivalState::Archived;
    info!(channel = %channel_id, ?state, "Channel archived");
}

#[cfg(test)]
mod tests {
    use super::*;
    use slack::SlackClient;
    use std::time::Instant;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_slack() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "ts": "1.2", "channel": "C123"
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/conversations.archive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true
            })))
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn test_farewell_then_archive_in_order() {
        let server = mock_slack().await;
        let slack = SlackClient::with_base_url("token", server.uri());
        let notifier = Notifier::new(slack.clone(), None, "T1", false);

        let linger = Duration::from_millis(80);
        let grace = Duration::from_millis(40);
        let start = Instant::now();

        run(notifier, slack, "C123".to_string(), linger, grace).await;

        // Both delays must have elapsed by the time the machine finishes
        assert!(start.elapsed() >= linger + grace);

        let requests = server.received_requests().await.unwrap();
        let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
        assert_eq!(paths, vec!["/chat.postMessage", "/conversations.archive"]);

        let farewell: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(farewell["username"], "barista");
        assert_eq!(farewell["channel"], "C123");
    }

    #[tokio::test]
    async fn test_farewell_not_sent_before_linger() {
        let server = mock_slack().await;
        let slack = SlackClient::with_base_url("token", server.uri());
        let notifier = Notifier::new(slack.clone(), None, "T1", false);

        let handle = tokio::spawn(run(
            notifier,
            slack,
            "C123".to_string(),
            Duration::from_millis(200),
            Duration::from_millis(10),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(server.received_requests().await.unwrap().is_empty());

        handle.await.unwrap();
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_archive_failure_is_swallowed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "ts": "1.2", "channel": "C123"
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/conversations.archive"))
            .and(body_partial_json(serde_json::json!({ "channel": "C123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false, "error": "already_archived"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let slack = SlackClient::with_base_url("token", server.uri());
        let notifier = Notifier::new(slack.clone(), None, "T1", false);

        // Completes despite the archive error
        run(
            notifier,
            slack,
            "C123".to_string(),
            Duration::from_millis(10),
            Duration::from_millis(10),
        )
        .await;
    }
}
