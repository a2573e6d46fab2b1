//! The provisioning flow.
//!
//! One awaited call creates the channel. Everything downstream (topic,
//! invite, paging, announcements, optional registrations, the archival
//! timer) is detached so the webhook caller gets its response as soon as
//! the channel exists.

use std::sync::Arc;

use chrono::Utc;
use slack::SlackClient;
use tracing::{debug, error, info};

use crate::archive;
use crate::config::Config;
use crate::error::FlowError;
use crate::messages;
use crate::notify::Notifier;
use crate::registrar::Registrar;

/// One incoming slash-command invocation. Immutable once built.
#[derive(Debug, Clone)]
pub struct IncidentRequest {
    /// Minute-precision creation timestamp (`%Y%m%d%H%M`, 12 digits)
    pub id: String,
    /// Free-text description from the requester
    pub name: String,
    /// Requester's Slack handle (for crediting and paging)
    pub requester_handle: String,
    /// Requester's Slack user id (for the invite)
    pub requester_id: String,
}

impl IncidentRequest {
    /// Build a request from the validated slash-command fields, stamping the
    /// incident id from the current UTC time.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        requester_handle: impl Into<String>,
        requester_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Utc::now().format("%Y%m%d%H%M").to_string(),
            name: name.into(),
            requester_handle: requester_handle.into(),
            requester_id: requester_id.into(),
        }
    }
}

/// The created channel, cloned into every downstream task.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    /// Channel identifier
    pub id: String,
    /// Channel name without the `#` prefix
    pub name: String,
}

/// Run the full provisioning flow for one incident.
///
/// Awaits only the channel creation; returns the handle once the detached
/// side effects are spawned.
///
/// # Errors
/// Returns [`FlowError::ChannelCreationFailed`] if the channel cannot be
/// created; no other step can fail the flow.
pub async fn provision(
    slack: &SlackClient,
    notifier: &Notifier,
    registrar: &Arc<Registrar>,
    config: &Config,
    incident: IncidentRequest,
) -> Result<ChannelHandle, FlowError> {
    let channel_name = format!("{}{}", config.channel_prefix, incident.id);

    let created = slack.create_channel(&channel_name).await?;
    let channel = ChannelHandle {
        id: created.id,
        name: created.name,
    };

    info!(
        channel = %channel.id,
        name = %channel.name,
        incident = %incident.name,
        "Coffee channel created"
    );

    spawn_channel_setup(slack.clone(), &incident, &channel);

    notifier.page(&incident, &channel);
    send_announcements(notifier, config, &incident, &channel);

    registrar.register_all(&incident, &channel);

    archive::schedule(notifier.clone(), slack.clone(), channel.id.clone());

    Ok(channel)
}

/// Set the topic and invite the requester, detached. Neither failure can
/// fail provisioning.
fn spawn_channel_setup(slack: SlackClient, incident: &IncidentRequest, channel: &ChannelHandle) {
    let topic = format!(
        "{}. Please join conference call to enjoy the break. See pinned message for details.",
        incident.name
    );
    let channel_id = channel.id.clone();
    let requester_id = incident.requester_id.clone();

    tokio::spawn(async move {
        if let Err(e) = slack.set_topic(&channel_id, &topic).await {
            error!(channel = %channel_id, error = %e, "Failed to set channel topic");
        }
        if let Err(e) = slack.invite_user(&channel_id, &requester_id).await {
            error!(channel = %channel_id, error = %e, "Failed to invite requester");
        }
    });
}

/// Announce the channel: the broadcast copy carries the join button, the
/// in-channel copy does not.
fn send_announcements(
    notifier: &Notifier,
    config: &Config,
    incident: &IncidentRequest,
    channel: &ChannelHandle,
) {
    if config.broadcast_channel.is_empty() {
        debug!("No broadcast channel configured, skipping broadcast announcement");
    } else {
        let broadcast = messages::announcement(incident, channel, &config.team_id, true);
        notifier.post_detached(format!("#{}", config.broadcast_channel), broadcast);
    }

    let in_channel = messages::announcement(incident, channel, &config.team_id, false);
    notifier.post_detached(channel.id.clone(), in_channel);
}
