//! Message payload value types.
//!
//! These model the legacy-attachment message format the Slack
//! `chat.postMessage` endpoint accepts: a posting persona (username + emoji),
//! optional plain text, and a list of colored attachments that may carry
//! links, fields, and link buttons. Payloads are built fresh for every
//! notification and never shared.

use serde::Serialize;

/// A complete message body, minus the target channel (the client merges the
/// channel in at send time).
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    /// Display name the message is posted under
    pub username: String,
    /// Emoji shortcode used as the avatar (e.g. `:coffee:`)
    pub icon_emoji: String,
    /// Plain message text, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Rich attachments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Linkify `@user` and `#channel` references
    pub link_names: bool,
    /// Slack-side parsing mode (`full` or `none`)
    pub parse: &'static str,
    /// Enable mrkdwn formatting (only sent when explicitly set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrkdwn: Option<bool>,
}

impl MessagePayload {
    /// Create a payload posted under the given persona, with full parsing
    /// and name linking on (the common case for broadcast-style messages).
    #[must_use]
    pub fn new(username: impl Into<String>, icon_emoji: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            icon_emoji: icon_emoji.into(),
            text: None,
            attachments: vec![],
            link_names: true,
            parse: "full",
            mrkdwn: None,
        }
    }

    /// Set the plain message text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Set the parse mode (`full` is the default).
    #[must_use]
    pub const fn with_parse(mut self, parse: &'static str) -> Self {
        self.parse = parse;
        self
    }

    /// Enable mrkdwn formatting.
    #[must_use]
    pub const fn with_mrkdwn(mut self) -> Self {
        self.mrkdwn = Some(true);
        self
    }
}

/// A colored attachment block.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    /// Hex color for the sidebar strip (e.g. `#8f0000`)
    pub color: String,
    /// Attachment title
    pub title: String,
    /// URL the title links to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    /// Attachment body text
    pub text: String,
    /// Plain-text fallback for notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// Key/value detail fields
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
    /// Footer line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Link buttons
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionButton>,
}

impl Attachment {
    /// Create an attachment with the required color, title and body text.
    #[must_use]
    pub fn new(
        color: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            color: color.into(),
            title: title.into(),
            title_link: None,
            text: text.into(),
            fallback: None,
            fields: vec![],
            footer: None,
            actions: vec![],
        }
    }

    /// Link the title to a URL.
    #[must_use]
    pub fn with_title_link(mut self, url: impl Into<String>) -> Self {
        self.title_link = Some(url.into());
        self
    }

    /// Set the notification fallback text.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Append a detail field.
    #[must_use]
    pub fn with_field(mut self, field: AttachmentField) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the footer line.
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Append a link button.
    #[must_use]
    pub fn with_action(mut self, action: ActionButton) -> Self {
        self.actions.push(action);
        self
    }
}

/// A key/value field inside an attachment.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentField {
    /// Field label
    pub title: String,
    /// Field value (may contain Slack markup)
    pub value: String,
    /// Render side by side with other short fields
    pub short: bool,
}

/// A primary-styled link button inside an attachment.
#[derive(Debug, Clone, Serialize)]
pub struct ActionButton {
    #[serde(rename = "type")]
    action_type: &'static str,
    /// Button label
    pub text: String,
    /// Target URL
    pub url: String,
    /// Visual style
    pub style: &'static str,
}

impl ActionButton {
    /// Create a primary link button.
    #[must_use]
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            action_type: "button",
            text: text.into(),
            url: url.into(),
            style: "primary",
        }
    }
}
