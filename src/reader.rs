//! Unread inbox reader

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{error, info};

use crate::client::{GmailClient, INBOX};
use crate::error::Result;
use crate::models::{EmailSummary, MessageMetadata};

const NO_SUBJECT: &str = "(no subject)";
const UNKNOWN_SENDER: &str = "(unknown)";

/// Reads unread inbox mail and maps it to [`EmailSummary`] values
pub struct MailReader {
    client: Arc<dyn GmailClient>,
    timezone: Tz,
}

impl MailReader {
    pub fn new(client: Arc<dyn GmailClient>, timezone: Tz) -> Self {
        Self { client, timezone }
    }

    /// Unread inbox messages received after `after` (epoch seconds), in the
    /// order Gmail lists them
    ///
    /// Any failure while listing or fetching yields an empty list: callers
    /// get either every message or none.
    pub async fn read_unread_since(&self, after: i64) -> Vec<EmailSummary> {
        match self.try_read_unread_since(after).await {
            Ok(summaries) => summaries,
            Err(e) => {
                error!(op = "fetch", "Error reading emails: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_read_unread_since(&self, after: i64) -> Result<Vec<EmailSummary>> {
        let query = unread_after_query(after);
        let ids = self
            .client
            .list_message_ids(&query, &[INBOX.to_string()])
            .await?;

        if ids.is_empty() {
            info!(op = "fetch", "No unread messages found after {}", after);
            return Ok(Vec::new());
        }

        info!(op = "fetch", "Found {} unread messages received after {}", ids.len(), after);

        let mut summaries = Vec::with_capacity(ids.len());
        for id in &ids {
            let message = self.client.get_message(id).await?;
            summaries.push(to_summary(&message, &self.timezone));
        }
        Ok(summaries)
    }
}

/// Gmail search query for unread mail after an epoch-second bound
pub fn unread_after_query(after: i64) -> String {
    format!("is:unread after:{}", after)
}

/// Maps a fetched message onto the transport DTO
///
/// Recipients are the raw comma-split `To` header, without trimming or
/// de-duplication.
pub fn to_summary<Z: TimeZone>(message: &MessageMetadata, zone: &Z) -> EmailSummary {
    let recipients = message
        .header("To")
        .map(|to| to.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    EmailSummary {
        message_id: message.id.clone(),
        subject: message.header("Subject").unwrap_or(NO_SUBJECT).to_string(),
        from: message.header("From").unwrap_or(UNKNOWN_SENDER).to_string(),
        recipients,
        received_at: message
            .internal_date
            .map(|at: DateTime<Utc>| at.with_timezone(zone).fixed_offset()),
        snippet: message.snippet.clone(),
    }
}
