//! Breakroom: slash-command driven coffee-break incident channels.
//!
//! A Slack slash command hits `/webhook`; Breakroom creates an ephemeral
//! channel, pages the on-call rotation, provisions whichever optional side
//! resources are configured (conference call, notes document, Jira epic,
//! post-mortem record), announces the channel, responds with a deep link,
//! and archives the channel after a fixed delay.
//!
//! Module map:
//!
//! - [`config`]: immutable environment-sourced configuration
//! - [`error`]: the request-path error taxonomy
//! - [`server`]: axum router and webhook handler
//! - [`flow`]: the provisioning sequence
//! - [`messages`]: Slack payload composition
//! - [`notify`]: message/paging dispatch and dry-run
//! - [`registrar`]: optional side-resource capability objects
//! - [`archive`]: the timed self-archival state machine

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod error;
pub mod flow;
pub mod messages;
pub mod notify;
pub mod registrar;
pub mod server;

pub use config::Config;
pub use error::FlowError;
pub use flow::{ChannelHandle, IncidentRequest};
pub use notify::Notifier;
pub use registrar::{Registrar, Registration};
pub use server::{build_router, AppState};
