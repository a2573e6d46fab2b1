//! Optional side-resource registration.
//!
//! Each enabled integration is wrapped in a [`Registration`] capability
//! object at startup; the [`Registrar`] holds whichever ones configuration
//! turned on and fans them out as detached tasks. A registration that fails
//! logs its own error and cannot block a sibling or the webhook response.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use integrations::{CalendarClient, DriveClient, JiraClient, PostmortemClient, PostmortemRecord};
use tracing::{error, info};

use crate::config::Config;
use crate::flow::{ChannelHandle, IncidentRequest};
use crate::messages;
use crate::notify::Notifier;

/// One optional side resource: create it and notify the channel about it.
#[async_trait]
pub trait Registration: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Provision the resource for this incident and post its notification.
    async fn register(
        &self,
        incident: &IncidentRequest,
        channel: &ChannelHandle,
    ) -> anyhow::Result<()>;
}

/// The set of registrations enabled by configuration.
pub struct Registrar {
    registrations: Vec<Arc<dyn Registration>>,
}

impl Registrar {
    /// Build the registrar from configuration, keeping only the
    /// integrations whose gates are present.
    #[must_use]
    pub fn from_config(config: &Config, notifier: &Notifier) -> Self {
        let mut registrations: Vec<Arc<dyn Registration>> = vec![];

        if let Some(calendar) = &config.calendar {
            info!(calendar = %calendar.calendar_id, "Calendar integration enabled");
            registrations.push(Arc::new(CalendarRegistration {
                client: CalendarClient::new(&calendar.token, &calendar.calendar_id),
                notifier: notifier.clone(),
            }));
        }

        if let Some(drive) = &config.drive {
            info!(folder = %drive.folder_id, "Drive notes integration enabled");
            registrations.push(Arc::new(DriveRegistration {
                client: DriveClient::new(&drive.token, &drive.folder_id),
                notifier: notifier.clone(),
            }));
        }

        if let Some(jira) = &config.jira {
            info!(domain = %jira.domain, "Jira epic integration enabled");
            let postmortem = config.postmortem.as_ref().map(|pm| {
                info!(url = %pm.url, "Post-mortem registrar enabled");
                PostmortemClient::new(&pm.url, &pm.key)
            });
            registrations.push(Arc::new(JiraRegistration {
                client: JiraClient::new(
                    &jira.domain,
                    &jira.user,
                    &jira.api_key,
                    &jira.project_id,
                    &jira.issue_type_id,
                ),
                postmortem,
                notifier: notifier.clone(),
            }));
        }

        Self { registrations }
    }

    /// Build a registrar with explicit registrations (used by tests).
    #[must_use]
    pub fn with_registrations(registrations: Vec<Arc<dyn Registration>>) -> Self {
        Self { registrations }
    }

    /// Number of enabled registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether any registration is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Fan out every registration as its own detached task.
    pub fn register_all(&self, incident: &IncidentRequest, channel: &ChannelHandle) {
        for registration in &self.registrations {
            let registration = Arc::clone(registration);
            let incident = incident.clone();
            let channel = channel.clone();

            tokio::spawn(async move {
                match registration.register(&incident, &channel).await {
                    Ok(()) => info!(
                        integration = registration.name(),
                        channel = %channel.id,
                        "Registration complete"
                    ),
                    Err(e) => error!(
                        integration = registration.name(),
                        channel = %channel.id,
                        error = %e,
                        "Registration failed"
                    ),
                }
            });
        }
    }
}

/// Calendar event with a conference bridge; details get pinned.
struct CalendarRegistration {
    client: CalendarClient,
    notifier: Notifier,
}

#[async_trait]
impl Registration for CalendarRegistration {
    fn name(&self) -> &'static str {
        "calendar"
    }

    async fn register(
        &self,
        incident: &IncidentRequest,
        channel: &ChannelHandle,
    ) -> anyhow::Result<()> {
        let details = self
            .client
            .create_conference_event(&incident.name, &channel.name)
            .await
            .context("creating conference event")?;

        self.notifier
            .post_and_pin(&channel.id, &messages::conference_message(&details))
            .await
            .context("posting conference details")?;

        Ok(())
    }
}

/// Notes document in the configured Drive folder.
struct DriveRegistration {
    client: DriveClient,
    notifier: Notifier,
}

#[async_trait]
impl Registration for DriveRegistration {
    fn name(&self) -> &'static str {
        "drive"
    }

    async fn register(
        &self,
        _incident: &IncidentRequest,
        channel: &ChannelHandle,
    ) -> anyhow::Result<()> {
        let url = self
            .client
            .create_notes_document(&channel.name)
            .await
            .context("creating notes document")?;

        self.notifier
            .post(&channel.id, &messages::notes_message(&url))
            .await
            .context("posting notes link")?;

        Ok(())
    }
}

/// Follow-ups epic, chained with the post-mortem record when configured.
struct JiraRegistration {
    client: JiraClient,
    postmortem: Option<PostmortemClient>,
    notifier: Notifier,
}

#[async_trait]
impl Registration for JiraRegistration {
    fn name(&self) -> &'static str {
        "jira"
    }

    async fn register(
        &self,
        incident: &IncidentRequest,
        channel: &ChannelHandle,
    ) -> anyhow::Result<()> {
        let issue = self
            .client
            .create_epic(&incident.name, &channel.name)
            .await
            .context("creating follow-ups epic")?;

        // The epic exists at this point; a failed channel message must not
        // stop the post-mortem record from being registered.
        if let Err(e) = self
            .notifier
            .post(&channel.id, &messages::epic_message(&issue.browse_url))
            .await
        {
            error!(channel = %channel.id, error = %e, "Failed to post epic link");
        }

        if let Some(postmortem) = &self.postmortem {
            postmortem
                .register(&PostmortemRecord {
                    name: incident.name.clone(),
                    when: Utc::now(),
                    issue_key: issue.key,
                    channel_id: channel.id.clone(),
                })
                .await
                .context("registering post-mortem record")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalendarConfig, JiraConfig};
    use slack::SlackClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn notifier() -> Notifier {
        let slack = SlackClient::with_base_url("token", "http://127.0.0.1:1");
        Notifier::new(slack, None, "T1", true)
    }

    fn base_config() -> Config {
        Config {
            port: 8080,
            team_id: "T1".to_string(),
            command_token: "secret".to_string(),
            api_token: "token".to_string(),
            channel_prefix: "incident-".to_string(),
            broadcast_channel: "incidents".to_string(),
            dry_run: true,
            calendar: None,
            drive: None,
            jira: None,
            pagerduty_routing_key: None,
            postmortem: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_integrations_build_empty_registrar() {
        let registrar = Registrar::from_config(&base_config(), &notifier());
        assert!(registrar.is_empty());
    }

    #[tokio::test]
    async fn test_gated_integrations_are_independent() {
        let mut config = base_config();
        config.calendar = Some(CalendarConfig {
            token: "g-token".to_string(),
            calendar_id: "primary".to_string(),
        });

        let registrar = Registrar::from_config(&config, &notifier());
        assert_eq!(registrar.len(), 1);

        config.jira = Some(JiraConfig {
            domain: "example.atlassian.net".to_string(),
            user: "bot".to_string(),
            api_key: "key".to_string(),
            project_id: "10100".to_string(),
            issue_type_id: "10000".to_string(),
        });

        let registrar = Registrar::from_config(&config, &notifier());
        assert_eq!(registrar.len(), 2);
    }

    struct FailingRegistration {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Registration for FailingRegistration {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn register(
            &self,
            _incident: &IncidentRequest,
            _channel: &ChannelHandle,
        ) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        }
    }

    struct CountingRegistration {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Registration for CountingRegistration {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn register(
            &self,
            _incident: &IncidentRequest,
            _channel: &ChannelHandle,
        ) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_calendar_registration_pins_conference_details() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let slack_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(serde_json::json!({
                "channel": "C123",
                "username": "Conference Call Details"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "ts": "1.2", "channel": "C123"
            })))
            .expect(1)
            .mount(&slack_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/pins.add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true
            })))
            .expect(1)
            .mount(&slack_server)
            .await;

        let calendar_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "conferenceData": {
                    "entryPoints": [
                        { "entryPointType": "video", "uri": "https://meet.example/abc",
                          "label": "meet.example/abc" }
                    ]
                }
            })))
            .mount(&calendar_server)
            .await;

        let registration = CalendarRegistration {
            client: CalendarClient::with_base_url("g-token", "primary", calendar_server.uri()),
            notifier: Notifier::new(
                SlackClient::with_base_url("token", slack_server.uri()),
                None,
                "T1",
                false,
            ),
        };

        let incident = IncidentRequest::new("DB outage", "alice", "U1");
        let channel = ChannelHandle {
            id: "C123".to_string(),
            name: "incident-202608211430".to_string(),
        };

        registration.register(&incident, &channel).await.unwrap();
    }

    #[tokio::test]
    async fn test_jira_registration_chains_post_mortem() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let slack_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(serde_json::json!({
                "username": "After the incident"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "ts": "1.2", "channel": "C123"
            })))
            .expect(1)
            .mount(&slack_server)
            .await;

        let jira_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "key": "OPS-42"
            })))
            .expect(1)
            .mount(&jira_server)
            .await;

        let pm_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incident/create"))
            .and(body_partial_json(serde_json::json!({
                "key": "pm-key",
                "incident": {
                    "issueTracking": "jira:OPS-42",
                    "channel": "slack:C123"
                }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&pm_server)
            .await;

        let registration = JiraRegistration {
            client: JiraClient::new("example.atlassian.net", "bot", "key", "10100", "10000")
                .with_base_url(jira_server.uri()),
            postmortem: Some(PostmortemClient::new(pm_server.uri(), "pm-key")),
            notifier: Notifier::new(
                SlackClient::with_base_url("token", slack_server.uri()),
                None,
                "T1",
                false,
            ),
        };

        let incident = IncidentRequest::new("DB outage", "alice", "U1");
        let channel = ChannelHandle {
            id: "C123".to_string(),
            name: "incident-202608211430".to_string(),
        };

        registration.register(&incident, &channel).await.unwrap();
    }

    #[tokio::test]
    async fn test_jira_registration_registers_post_mortem_despite_failed_epic_message() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let slack_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false, "error": "channel_not_found"
            })))
            .expect(1)
            .mount(&slack_server)
            .await;

        let jira_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "key": "OPS-42"
            })))
            .mount(&jira_server)
            .await;

        let pm_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/incident/create"))
            .and(body_partial_json(serde_json::json!({
                "incident": { "issueTracking": "jira:OPS-42" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&pm_server)
            .await;

        let registration = JiraRegistration {
            client: JiraClient::new("example.atlassian.net", "bot", "key", "10100", "10000")
                .with_base_url(jira_server.uri()),
            postmortem: Some(PostmortemClient::new(pm_server.uri(), "pm-key")),
            notifier: Notifier::new(
                SlackClient::with_base_url("token", slack_server.uri()),
                None,
                "T1",
                false,
            ),
        };

        let incident = IncidentRequest::new("DB outage", "alice", "U1");
        let channel = ChannelHandle {
            id: "C123".to_string(),
            name: "incident-202608211430".to_string(),
        };

        // The failed message is logged; the record must still be registered
        registration.register(&incident, &channel).await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_registration_does_not_block_siblings() {
        let failing_calls = Arc::new(AtomicUsize::new(0));
        let counting_calls = Arc::new(AtomicUsize::new(0));

        let registrar = Registrar::with_registrations(vec![
            Arc::new(FailingRegistration {
                calls: Arc::clone(&failing_calls),
            }),
            Arc::new(CountingRegistration {
                calls: Arc::clone(&counting_calls),
            }),
        ]);

        let incident = IncidentRequest::new("DB outage", "alice", "U1");
        let channel = ChannelHandle {
            id: "C123".to_string(),
            name: "incident-202608211430".to_string(),
        };

        registrar.register_all(&incident, &channel);

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
        assert_eq!(counting_calls.load(Ordering::SeqCst), 1);
    }
}
