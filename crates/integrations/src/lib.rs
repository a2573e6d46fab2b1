//! Optional external-service clients for Breakroom.
//!
//! Each client in this crate backs one conditionally-enabled integration of
//! the provisioning flow:
//!
//! - [`CalendarClient`]: Google Calendar event with a conference bridge
//! - [`DriveClient`]: Google Drive notes document
//! - [`JiraClient`]: Jira follow-ups epic
//! - [`PagerDutyClient`]: PagerDuty Events API v2 paging
//! - [`PostmortemClient`]: post-mortem registrar record
//!
//! The clients are plain request/response wrappers: one HTTP call per
//! operation, a single attempt, errors surfaced as [`IntegrationError`] for
//! the caller to log. Whether an integration runs at all is decided by the
//! service's configuration, not in here.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod calendar;
pub mod drive;
pub mod error;
pub mod jira;
pub mod pagerduty;
pub mod postmortem;

pub use calendar::{CalendarClient, ConferenceDetails, PhoneEntry};
pub use drive::DriveClient;
pub use error::IntegrationError;
pub use jira::{IssueRef, JiraClient};
pub use pagerduty::{EventSeverity, PagerDutyClient, PagerDutyEvent};
pub use postmortem::{PostmortemClient, PostmortemRecord};
