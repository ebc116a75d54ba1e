//! HTTP surface under `/api/v1`

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::calendar::CalendarService;
use crate::calendar_client::CalendarClient;
use crate::client::GmailClient;
use crate::config::Config;
use crate::error::Result;
use crate::local_time::parse_local_date_time;
use crate::models::{CalendarEvent, ReplyRequest};
use crate::reader::MailReader;
use crate::reply::ReplyComposer;
use crate::triage::TriageService;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<MailReader>,
    pub triage: Arc<TriageService>,
    pub replies: Arc<ReplyComposer>,
    pub calendar: Arc<CalendarService>,
    pub timezone: Tz,
}

impl AppState {
    /// Wires the services from a validated config
    pub fn from_config(
        config: &Config,
        gmail: Arc<dyn GmailClient>,
        calendar: Arc<dyn CalendarClient>,
    ) -> Result<Self> {
        let timezone = config.timezone()?;

        Ok(Self {
            reader: Arc::new(MailReader::new(Arc::clone(&gmail), timezone)),
            triage: Arc::new(TriageService::new(
                Arc::clone(&gmail),
                config.labels.moved_label.clone(),
            )),
            replies: Arc::new(ReplyComposer::new(
                gmail,
                config.mailbox.user_email.clone(),
                config.labels.replied_label.clone(),
            )),
            calendar: Arc::new(CalendarService::new(
                calendar,
                timezone,
                config.calendar.upcoming_window_days,
                config.calendar.meeting_link_overrides_location,
            )),
            timezone,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/unread-emails", get(unread_emails))
        .route("/move-mail/{message_id}", put(move_mail))
        .route("/remove-label/{label}/{folder_name}", delete(remove_label))
        .route("/reply", post(reply))
        .route("/get-events", get(get_events))
        .route("/add-event", post(add_event));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(state)
}

/// Serves until Ctrl-C
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[derive(Debug, Deserialize)]
struct UnreadQuery {
    #[serde(rename = "localDateTime")]
    local_date_time: Option<String>,
}

async fn unread_emails(State(state): State<AppState>, Query(query): Query<UnreadQuery>) -> Response {
    let Some(raw) = query.local_date_time.filter(|v| !v.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "localDateTime is required").into_response();
    };

    let Some(after) = parse_local_date_time(&raw, &state.timezone) else {
        warn!(op = "fetch", "Rejected localDateTime: {}", raw);
        return (
            StatusCode::BAD_REQUEST,
            format!("Invalid localDateTime: {}", raw),
        )
            .into_response();
    };

    Json(state.reader.read_unread_since(after.timestamp()).await).into_response()
}

async fn move_mail(State(state): State<AppState>, Path(message_id): Path<String>) -> String {
    match state.triage.move_to_spam(&message_id).await {
        Ok(()) => "success".to_string(),
        Err(e) => {
            error!(op = "move", "Failed to move message {}: {}", message_id, e);
            "failure".to_string()
        }
    }
}

async fn remove_label(
    State(state): State<AppState>,
    Path((label, folder_name)): Path<(String, String)>,
) -> String {
    match state.triage.remove_label_and_restore(&label, &folder_name).await {
        Ok(result) => result.status_message(),
        Err(e) => {
            error!(op = "restore", "Failed to restore '{}' from '{}': {}", label, folder_name, e);
            format!("failure: {}", e)
        }
    }
}

async fn reply(State(state): State<AppState>, Json(request): Json<ReplyRequest>) -> String {
    match state.replies.reply(&request).await {
        Ok(_) => "SUCCESS".to_string(),
        Err(e) => {
            error!(
                op = "reply",
                "Failed to reply to {}: {}", request.original_message_id, e
            );
            format!("failure: {}", e)
        }
    }
}

async fn get_events(State(state): State<AppState>) -> Response {
    match state.calendar.list_upcoming_events().await {
        Ok(events) => Json(events).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn add_event(State(state): State<AppState>, Json(request): Json<CalendarEvent>) -> String {
    match state.calendar.create_event(&request).await {
        Ok(event_id) => event_id,
        Err(e) => {
            error!(op = "add_event", "Failed to create event: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_query_uses_camel_case_key() {
        let query: UnreadQuery =
            serde_json::from_str(r#"{"localDateTime":"2025-01-01T10:00:00"}"#).unwrap();
        assert_eq!(query.local_date_time.as_deref(), Some("2025-01-01T10:00:00"));
    }
}
