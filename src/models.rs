use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A single `Name: value` header from a Gmail message payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

impl MessageHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The parts of a fetched Gmail message this service reads
#[derive(Debug, Clone)]
pub struct MessageMetadata {
    pub id: String,
    pub thread_id: String,
    pub snippet: Option<String>,
    /// Vendor delivery timestamp (`internalDate`)
    pub internal_date: Option<DateTime<Utc>>,
    /// Headers in payload order, duplicates included
    pub headers: Vec<MessageHeader>,
}

impl MessageMetadata {
    /// First header with the given name, compared ASCII case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Transport view of an unread inbox message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub message_id: String,
    pub subject: String,
    pub from: String,
    pub recipients: Vec<String>,
    pub received_at: Option<DateTime<FixedOffset>>,
    pub snippet: Option<String>,
}

/// Body of `POST /api/v1/reply`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub original_message_id: String,
    pub body_text: String,
}

/// Calendar event as exchanged over HTTP, both for creation and listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub organizer_email: Option<String>,
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    #[serde(default)]
    pub start_date_time: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<String>,
    #[serde(default)]
    pub meeting_duration_minutes: Option<i64>,
}

/// Per-message result of moving a folder's messages back to the inbox
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub updated: Vec<String>,
    /// `(message id, error message)` for every message whose update failed
    pub failed: Vec<(String, String)>,
}

impl RestoreOutcome {
    pub fn total(&self) -> usize {
        self.updated.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
