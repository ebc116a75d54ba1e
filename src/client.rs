//! Gmail API client seam
//!
//! Everything the mail side of the service needs from Gmail goes through the
//! [`GmailClient`] trait so the workflow code can be exercised without a network.

use async_trait::async_trait;
use chrono::DateTime;
use google_gmail1::api::{Label, Message, ModifyMessageRequest};
use std::io::Cursor;
use tracing::debug;

use crate::auth::GmailHub;
use crate::error::{AgentError, Result};
use crate::models::{MessageHeader, MessageMetadata};

const MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";
const LABELS_SCOPE: &str = "https://www.googleapis.com/auth/gmail.labels";

/// System label ids used by the triage workflow
pub const INBOX: &str = "INBOX";
pub const UNREAD: &str = "UNREAD";
pub const SPAM: &str = "SPAM";

/// Label info returned from Gmail API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    pub id: String,
    pub name: String,
}

/// Trait defining Gmail client operations for easier testing
#[async_trait]
pub trait GmailClient: Send + Sync {
    /// List message ids matching a search query (empty for none) and label ids.
    /// Only the first result page is returned.
    async fn list_message_ids(&self, query: &str, label_ids: &[String]) -> Result<Vec<String>>;

    /// Fetch a message in full format
    async fn get_message(&self, id: &str) -> Result<MessageMetadata>;

    /// List all labels in the mailbox
    async fn list_labels(&self) -> Result<Vec<LabelInfo>>;

    /// Create a new label visible in both the label list and message list
    async fn create_label(&self, name: &str) -> Result<String>;

    /// Add and remove label ids on a single message in one call
    async fn modify_labels(
        &self,
        message_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()>;

    /// Send an RFC 2822 message on an existing thread, returning the sent message id
    ///
    /// The bytes go out as a `message/rfc822` media upload, which takes the
    /// place of base64url-encoding them into the message's `raw` field.
    async fn send_raw(&self, thread_id: &str, raw: Vec<u8>) -> Result<String>;

    /// Email address of the mailbox owner
    async fn profile_email(&self) -> Result<String>;
}

/// Gmail client backed by the google-gmail1 hub
pub struct ProductionGmailClient {
    hub: GmailHub,
    user_id: String,
}

impl ProductionGmailClient {
    /// Create a new client acting on behalf of `user_id` (an address or `me`)
    pub fn new(hub: GmailHub, user_id: impl Into<String>) -> Self {
        Self {
            hub,
            user_id: user_id.into(),
        }
    }
}

/// Parse Gmail API Message into our MessageMetadata structure
pub(crate) fn parse_message_metadata(msg: Message) -> Result<MessageMetadata> {
    let id = msg
        .id
        .ok_or_else(|| AgentError::InvalidMessageFormat("Missing message ID".to_string()))?;

    let thread_id = msg
        .thread_id
        .ok_or_else(|| AgentError::InvalidMessageFormat("Missing thread ID".to_string()))?;

    let headers = msg
        .payload
        .and_then(|p| p.headers)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|h| match (h.name, h.value) {
            (Some(name), Some(value)) => Some(MessageHeader { name, value }),
            _ => None,
        })
        .collect();

    Ok(MessageMetadata {
        id,
        thread_id,
        snippet: msg.snippet,
        internal_date: msg.internal_date.and_then(DateTime::from_timestamp_millis),
        headers,
    })
}

#[async_trait]
impl GmailClient for ProductionGmailClient {
    async fn list_message_ids(&self, query: &str, label_ids: &[String]) -> Result<Vec<String>> {
        let mut call = self.hub.users().messages_list(&self.user_id);

        if !query.is_empty() {
            call = call.q(query);
        }
        for label_id in label_ids {
            call = call.add_label_ids(label_id);
        }

        let (_, response) = call.add_scope(MODIFY_SCOPE).doit().await?;

        let ids: Vec<String> = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        debug!(query, count = ids.len(), "Listed message ids");
        Ok(ids)
    }

    async fn get_message(&self, id: &str) -> Result<MessageMetadata> {
        let (_, msg) = self
            .hub
            .users()
            .messages_get(&self.user_id, id)
            .format("full")
            .add_scope(MODIFY_SCOPE)
            .doit()
            .await?;

        parse_message_metadata(msg)
    }

    async fn list_labels(&self) -> Result<Vec<LabelInfo>> {
        let (_, response) = self
            .hub
            .users()
            .labels_list(&self.user_id)
            .add_scope(LABELS_SCOPE)
            .doit()
            .await?;

        let labels: Vec<LabelInfo> = response
            .labels
            .unwrap_or_default()
            .into_iter()
            .filter_map(|label| match (label.id, label.name) {
                (Some(id), Some(name)) => Some(LabelInfo { id, name }),
                _ => None,
            })
            .collect();

        debug!("Successfully parsed {} labels", labels.len());
        Ok(labels)
    }

    async fn create_label(&self, name: &str) -> Result<String> {
        let label = Label {
            name: Some(name.to_string()),
            message_list_visibility: Some("show".to_string()),
            label_list_visibility: Some("labelShow".to_string()),
            ..Default::default()
        };

        let (_, created_label) = self
            .hub
            .users()
            .labels_create(label, &self.user_id)
            .add_scope(LABELS_SCOPE)
            .doit()
            .await?;

        created_label
            .id
            .ok_or_else(|| AgentError::LabelError("Created label has no ID".to_string()))
    }

    async fn modify_labels(
        &self,
        message_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()> {
        let modify_request = ModifyMessageRequest {
            add_label_ids: (!add_label_ids.is_empty()).then(|| add_label_ids.to_vec()),
            remove_label_ids: (!remove_label_ids.is_empty()).then(|| remove_label_ids.to_vec()),
        };

        self.hub
            .users()
            .messages_modify(modify_request, &self.user_id, message_id)
            .add_scope(MODIFY_SCOPE)
            .doit()
            .await?;

        Ok(())
    }

    // Media upload instead of the base64url `raw` field; same wire result
    async fn send_raw(&self, thread_id: &str, raw: Vec<u8>) -> Result<String> {
        let message = Message {
            thread_id: Some(thread_id.to_string()),
            ..Default::default()
        };
        let mime_type: mime::Mime = "message/rfc822"
            .parse()
            .map_err(|e| AgentError::ApiError(format!("Invalid upload MIME type: {}", e)))?;

        let (_, sent) = self
            .hub
            .users()
            .messages_send(message, &self.user_id)
            .add_scope(MODIFY_SCOPE)
            .upload(Cursor::new(raw), mime_type)
            .await?;

        sent.id
            .ok_or_else(|| AgentError::InvalidMessageFormat("Sent message has no ID".to_string()))
    }

    async fn profile_email(&self) -> Result<String> {
        let (_, profile) = self
            .hub
            .users()
            .get_profile(&self.user_id)
            .add_scope(MODIFY_SCOPE)
            .doit()
            .await?;

        profile
            .email_address
            .ok_or_else(|| AgentError::ApiError("Profile has no email address".to_string()))
    }
}
