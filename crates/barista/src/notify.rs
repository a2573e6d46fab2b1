//! Message and paging dispatch.
//!
//! The [`Notifier`] owns the Slack client, the optional PagerDuty client,
//! and the dry-run flag, so callers never check configuration themselves.
//! In dry-run mode the would-be payload is logged and no network call is
//! made.

use integrations::{EventSeverity, PagerDutyClient, PagerDutyEvent};
use serde_json::json;
use slack::{MessagePayload, SlackClient, SlackError};
use tracing::{debug, error, info, warn};

use crate::flow::{ChannelHandle, IncidentRequest};
use crate::messages;

/// Dispatches Slack messages and PagerDuty pages.
#[derive(Clone)]
pub struct Notifier {
    slack: SlackClient,
    pagerduty: Option<PagerDutyClient>,
    team_id: String,
    dry_run: bool,
}

impl Notifier {
    /// Create a notifier.
    #[must_use]
    pub fn new(
        slack: SlackClient,
        pagerduty: Option<PagerDutyClient>,
        team_id: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            slack,
            pagerduty,
            team_id: team_id.into(),
            dry_run,
        }
    }

    /// Post a message to a channel (or `#name` target).
    ///
    /// # Errors
    /// Returns an error if the send fails. Never errors in dry-run mode.
    pub async fn post(&self, channel: &str, message: &MessagePayload) -> Result<(), SlackError> {
        if self.log_dry_run(channel, message) {
            return Ok(());
        }
        self.slack.post_message(channel, message).await?;
        Ok(())
    }

    /// Post a message and pin it. Pin failures are logged, not returned.
    ///
    /// # Errors
    /// Returns an error if the send itself fails.
    pub async fn post_and_pin(
        &self,
        channel: &str,
        message: &MessagePayload,
    ) -> Result<(), SlackError> {
        if self.log_dry_run(channel, message) {
            return Ok(());
        }
        let posted = self.slack.post_message(channel, message).await?;
        if let Err(e) = self.slack.pin_message(&posted.channel, &posted.ts).await {
            warn!(channel = %posted.channel, error = %e, "Failed to pin message");
        }
        Ok(())
    }

    /// Fire-and-forget post: spawn the send and log any failure.
    pub fn post_detached(&self, channel: impl Into<String>, message: MessagePayload) {
        let notifier = self.clone();
        let channel = channel.into();
        tokio::spawn(async move {
            if let Err(e) = notifier.post(&channel, &message).await {
                error!(channel = %channel, error = %e, "Failed to send message");
            }
        });
    }

    /// Page the on-call rotation about a new incident. Fire-and-forget;
    /// skipped when paging is unconfigured or dry-run is set.
    pub fn page(&self, incident: &IncidentRequest, channel: &ChannelHandle) {
        let Some(pagerduty) = &self.pagerduty else {
            debug!("PagerDuty not configured, skipping page");
            return;
        };
        if self.dry_run {
            debug!(channel = %channel.id, "Dry run: skipping PagerDuty page");
            return;
        }

        let event = PagerDutyEvent::trigger(
            format!(
                "New incident '{}' created by @{}",
                incident.name, incident.requester_handle
            ),
            &channel.id,
        )
        .with_severity(EventSeverity::Critical)
        .with_custom_details(json!({
            "slack_deep_link_url": messages::channel_redirect_link(&self.team_id, &channel.id),
            "slack_deep_link": messages::channel_deep_link(&self.team_id, &channel.id),
        }));

        let pagerduty = pagerduty.clone();
        let channel_id = channel.id.clone();
        tokio::spawn(async move {
            match pagerduty.send_event(&event).await {
                Ok(dedup_key) => info!(channel = %channel_id, %dedup_key, "Paged on-call"),
                Err(e) => error!(channel = %channel_id, error = %e, "Failed to page on-call"),
            }
        });
    }

    /// In dry-run mode, log the payload and report `true` (caller returns).
    fn log_dry_run(&self, channel: &str, message: &MessagePayload) -> bool {
        if !self.dry_run {
            return false;
        }
        let payload = serde_json::to_string(message).unwrap_or_else(|e| e.to_string());
        info!(channel, %payload, "Dry run: would send message");
        true
    }
}
