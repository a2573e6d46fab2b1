//! Slack message composition.
//!
//! One function per notification the flow can send. Each returns a fresh
//! [`MessagePayload`]; the [`Notifier`](crate::notify::Notifier) merges in
//! the target channel at send time.

use integrations::ConferenceDetails;
use slack::{ActionButton, Attachment, AttachmentField, MessagePayload};

use crate::flow::{ChannelHandle, IncidentRequest};

/// Deep link opening a channel in the Slack app.
#[must_use]
pub fn channel_deep_link(team_id: &str, channel_id: &str) -> String {
    format!("slack://channel?team={team_id}&id={channel_id}")
}

/// Browser-safe redirect link to a channel.
#[must_use]
pub fn channel_redirect_link(team_id: &str, channel_id: &str) -> String {
    format!("https://slack.com/app_redirect?team={team_id}&channel={channel_id}")
}

/// The initial announcement. With `join_button`, carries a deep-link button
/// (the broadcast-channel copy); without, the plain copy for the incident
/// channel itself.
#[must_use]
pub fn announcement(
    incident: &IncidentRequest,
    channel: &ChannelHandle,
    team_id: &str,
    join_button: bool,
) -> MessagePayload {
    let mut attachment = Attachment::new(
        "#8f0000",
        &incident.name,
        format!("Coffee Channel: #{}", channel.name),
    )
    .with_fallback(format!("Join Coffee Channel #{}", channel.name))
    .with_footer(format!("coffee break needed by @{}", incident.requester_handle));

    if join_button {
        attachment = attachment.with_action(ActionButton::link(
            "Join Coffee Break",
            channel_deep_link(team_id, &channel.id),
        ));
    }

    MessagePayload::new("Coffee Break", ":coffee:").with_attachment(attachment)
}

/// Conference-call details, pinned to the incident channel.
#[must_use]
pub fn conference_message(details: &ConferenceDetails) -> MessagePayload {
    let video_link = details.video_link.clone().unwrap_or_default();

    let mut attachment = Attachment::new("#1F8456", "Join Conference Call", video_link.clone())
        .with_title_link(video_link.clone());

    for phone in &details.phone_entries {
        // Slack link markup dialing straight through the PIN
        let value = match &phone.pin {
            Some(pin) => format!("<{},,{pin}%23|{} PIN: {pin}#>", phone.uri, phone.label),
            None => format!("<{}|{}>", phone.uri, phone.label),
        };
        attachment = attachment.with_field(AttachmentField {
            title: "Join by phone".to_string(),
            value,
            short: false,
        });
    }

    if let Some(more) = &details.more_numbers_link {
        let region = details
            .phone_entries
            .first()
            .and_then(|p| p.region_code.as_deref())
            .unwrap_or("your region");
        attachment = attachment.with_footer(format!("Not in {region}? More phone numbers at {more}"));
    }

    attachment = attachment.with_action(ActionButton::link("Join Conference Call", video_link));

    MessagePayload::new("Conference Call Details", ":telephone_receiver:")
        .with_parse("none")
        .with_mrkdwn()
        .with_attachment(attachment)
}

/// Notes-document link for the incident channel.
#[must_use]
pub fn notes_message(doc_url: &str) -> MessagePayload {
    let attachment = Attachment::new("#3367d6", "Notes & Actions", doc_url)
        .with_title_link(doc_url)
        .with_footer(
            "Use this document to maintain a timeline of key events during an incident. \
             Document actions, and keep track of any followup items that will need to be \
             addressed.",
        );

    MessagePayload::new("During the incident", ":pencil:").with_attachment(attachment)
}

/// Follow-ups epic link for the incident channel.
#[must_use]
pub fn epic_message(epic_url: &str) -> MessagePayload {
    let attachment = Attachment::new("#FD6A02", "Discuss and track follow-up actions", epic_url)
        .with_title_link(epic_url)
        .with_footer("Remember: Don't Neglect the Post-Mortem!");

    MessagePayload::new("After the incident", ":dart:").with_attachment(attachment)
}

/// Farewell broadcast sent before the channel is archived.
#[must_use]
pub fn farewell() -> MessagePayload {
    MessagePayload::new("barista", ":coffee:").with_text(
        "@here, We hope you had a good break :) I have to clean the table for the next guests \
         and this channel will be archived. I hope to see you again soon in our cafe for \
         another break!",
    )
}
