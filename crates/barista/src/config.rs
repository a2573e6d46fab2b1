//! Configuration for the Breakroom service.
//!
//! Everything comes from the environment and is read exactly once at
//! startup into an immutable [`Config`]. Optional integrations are modeled
//! as `Option<…>` sub-configs: present only when every variable that gates
//! the integration is set, so components never re-check the environment.

use std::env;

/// Breakroom service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Slack team id, used to build `slack://` deep links.
    pub team_id: String,
    /// Shared-secret token the slash command must present.
    pub command_token: String,
    /// Bearer token for the Slack Web API.
    pub api_token: String,
    /// Prefix for incident channel names.
    pub channel_prefix: String,
    /// Broadcast channel name (without `#`) for announcements.
    pub broadcast_channel: String,
    /// Suppress messaging and paging side effects, logging payloads instead.
    pub dry_run: bool,
    /// Google Calendar conference events, if configured.
    pub calendar: Option<CalendarConfig>,
    /// Google Drive notes documents, if configured.
    pub drive: Option<DriveConfig>,
    /// Jira follow-ups epics, if configured.
    pub jira: Option<JiraConfig>,
    /// PagerDuty routing key, if paging is configured.
    pub pagerduty_routing_key: Option<String>,
    /// Post-mortem registrar, if configured.
    pub postmortem: Option<PostmortemConfig>,
}

/// Google Calendar integration settings.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Bearer token for the Calendar API.
    pub token: String,
    /// Calendar to create conference events in.
    pub calendar_id: String,
}

/// Google Drive integration settings.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Bearer token for the Drive API.
    pub token: String,
    /// Folder to create notes documents in.
    pub folder_id: String,
}

/// Jira integration settings.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Jira site domain (e.g. `example.atlassian.net`).
    pub domain: String,
    /// Basic-auth user.
    pub user: String,
    /// Basic-auth API key.
    pub api_key: String,
    /// Project to create epics in.
    pub project_id: String,
    /// Issue type id for epics.
    pub issue_type_id: String,
}

/// Post-mortem registrar settings.
#[derive(Debug, Clone)]
pub struct PostmortemConfig {
    /// Registrar base URL.
    pub url: String,
    /// Registrar API key.
    pub key: String,
}

impl Config {
    /// Load configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let google_token = non_empty_var("GOOGLE_API_TOKEN");

        let calendar = match (google_token.clone(), non_empty_var("GOOGLE_CALENDAR_ID")) {
            (Some(token), Some(calendar_id)) => Some(CalendarConfig { token, calendar_id }),
            _ => None,
        };

        let drive = match (google_token, non_empty_var("GDRIVE_INCIDENT_NOTES_FOLDER")) {
            (Some(token), Some(folder_id)) => Some(DriveConfig { token, folder_id }),
            _ => None,
        };

        // The domain alone gates Jira; the remaining fields default to empty
        // and simply fail the API call if unset.
        let jira = non_empty_var("JIRA_DOMAIN").map(|domain| JiraConfig {
            domain,
            user: env::var("JIRA_USER").unwrap_or_default(),
            api_key: env::var("JIRA_API_KEY").unwrap_or_default(),
            project_id: env::var("JIRA_PROJECT_ID").unwrap_or_default(),
            issue_type_id: env::var("JIRA_ISSUE_TYPE_ID").unwrap_or_default(),
        });

        let postmortem = non_empty_var("POST_MORTEMS_URL").map(|url| PostmortemConfig {
            url,
            key: env::var("POST_MORTEMS_KEY").unwrap_or_default(),
        });

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            team_id: env::var("SLACK_TEAM_ID").unwrap_or_default(),
            command_token: env::var("SLACK_COMMAND_TOKEN").unwrap_or_default(),
            api_token: env::var("SLACK_API_TOKEN").unwrap_or_default(),
            channel_prefix: non_empty_var("SLACK_INCIDENT_CHANNEL_PREFIX")
                .unwrap_or_else(|| "incident-".to_string()),
            broadcast_channel: env::var("SLACK_INCIDENTS_CHANNEL").unwrap_or_default(),
            dry_run: env::var("DRY_RUN")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            calendar,
            drive,
            jira,
            pagerduty_routing_key: non_empty_var("PAGERDUTY_ROUTING_KEY"),
            postmortem,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}
