//! HTTP server for the slash-command webhook.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use slack::SlackClient;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::FlowError;
use crate::flow::{self, IncidentRequest};
use crate::messages;
use crate::notify::Notifier;
use crate::registrar::Registrar;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Arc<Config>,
    /// Slack Web API client.
    pub slack: SlackClient,
    /// Message and paging dispatcher.
    pub notifier: Notifier,
    /// Enabled side-resource registrations.
    pub registrar: Arc<Registrar>,
}

/// Build the HTTP router for the webhook service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_check))
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Fields Slack sends with a slash command. Anything else is ignored and
/// missing fields decode as empty strings.
#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    /// Shared-secret verification token
    #[serde(default)]
    pub token: String,
    /// Free text after the command
    #[serde(default)]
    pub text: String,
    /// Requester's handle
    #[serde(default)]
    pub user_name: String,
    /// Requester's user id
    #[serde(default)]
    pub user_id: String,
}

/// Handle a slash-command webhook: validate, provision, respond with a deep
/// link into the new channel.
async fn webhook_handler(
    State(state): State<AppState>,
    Form(command): Form<SlashCommand>,
) -> Result<Json<Value>, FlowError> {
    if command.token != state.config.command_token {
        warn!(user = %command.user_name, "Slash command with invalid token");
        return Err(FlowError::Unauthorized);
    }
    if command.text.trim().is_empty() {
        return Err(FlowError::InvalidInput);
    }

    let incident = IncidentRequest::new(&command.text, &command.user_name, &command.user_id);
    info!(incident = %incident.name, requester = %incident.requester_handle, "Starting coffee flow");

    let channel = flow::provision(
        &state.slack,
        &state.notifier,
        &state.registrar,
        &state.config,
        incident,
    )
    .await?;

    let deep_link = messages::channel_deep_link(&state.config.team_id, &channel.id);
    Ok(Json(json!({
        "text": format!("Enjoy your coffee break :) Join coffee channel: {deep_link}"),
        "incident_channel_id": channel.id,
    })))
}

/// Wrong-method requests get the 405 body from the error taxonomy.
async fn method_not_allowed() -> FlowError {
    FlowError::MethodNotAllowed
}

/// Health check endpoint.
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
