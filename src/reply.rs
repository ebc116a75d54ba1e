//! Threaded replies to inbox messages

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::client::{GmailClient, INBOX, UNREAD};
use crate::error::{AgentError, Result};
use crate::label_manager::LabelManager;
use crate::models::{MessageMetadata, ReplyRequest};

/// Ids involved in a completed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub sent_message_id: String,
    pub thread_id: String,
}

/// Builds, sends and labels replies
pub struct ReplyComposer {
    client: Arc<dyn GmailClient>,
    labels: LabelManager,
    from_address: String,
    sender: OnceCell<String>,
    replied_label: String,
}

impl ReplyComposer {
    pub fn new(
        client: Arc<dyn GmailClient>,
        from_address: impl Into<String>,
        replied_label: impl Into<String>,
    ) -> Self {
        Self {
            labels: LabelManager::new(Arc::clone(&client)),
            client,
            from_address: from_address.into(),
            sender: OnceCell::new(),
            replied_label: replied_label.into(),
        }
    }

    /// Replies on the original message's thread
    ///
    /// After sending, the original leaves the inbox as read and the sent copy
    /// gets the replied label plus `UNREAD`. Failures after the send are
    /// reported as [`AgentError::PartialMutation`]; nothing is rolled back.
    pub async fn reply(&self, request: &ReplyRequest) -> Result<SentReply> {
        if request.original_message_id.trim().is_empty() {
            return Err(AgentError::Validation(
                "originalMessageId is required".to_string(),
            ));
        }

        let label_id = self.labels.resolve_or_create(&self.replied_label).await?;
        let original = self.client.get_message(&request.original_message_id).await?;

        let from = self.sender_address().await?;
        let raw = build_raw_reply(from, &original, &request.body_text);
        let sent_message_id = self
            .client
            .send_raw(&original.thread_id, raw.into_bytes())
            .await?;

        self.client
            .modify_labels(
                &original.id,
                &[],
                &[UNREAD.to_string(), INBOX.to_string()],
            )
            .await
            .map_err(|e| AgentError::partial("marking original message read", e))?;

        self.client
            .modify_labels(&sent_message_id, &[label_id, UNREAD.to_string()], &[])
            .await
            .map_err(|e| AgentError::partial("labeling sent reply", e))?;

        info!(
            op = "reply",
            "Replied to message {} with label: {}",
            original.id,
            self.replied_label
        );

        Ok(SentReply {
            sent_message_id,
            thread_id: original.thread_id,
        })
    }

    /// Address for the `From:` header
    ///
    /// A bare user id such as `me` is replaced by the mailbox's profile
    /// address, looked up on first use and kept for later replies.
    async fn sender_address(&self) -> Result<&str> {
        if self.from_address.contains('@') {
            return Ok(&self.from_address);
        }

        let address = self
            .sender
            .get_or_try_init(|| async {
                let address = self.client.profile_email().await?;
                info!("Resolved sender for '{}' to {}", self.from_address, address);
                Ok::<_, AgentError>(address)
            })
            .await?;
        Ok(address.as_str())
    }
}

/// `Re: ` prefix unless the subject already carries one
pub fn reply_subject(original: &str) -> String {
    let has_prefix = original
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("re:"));

    if has_prefix {
        original.to_string()
    } else {
        format!("Re: {}", original)
    }
}

/// Plain-text RFC 2822 reply with CRLF line endings
///
/// `In-Reply-To` and `References` are only written when the original has a
/// `Message-ID`; without them Gmail still threads by thread id.
pub fn build_raw_reply(from_address: &str, original: &MessageMetadata, body: &str) -> String {
    let subject = reply_subject(original.header("Subject").unwrap_or(""));
    let to = original.header("From").unwrap_or("");

    let mut raw = String::new();
    raw.push_str(&format!("From: {}\r\n", from_address));
    raw.push_str(&format!("To: {}\r\n", to));
    raw.push_str(&format!("Subject: {}\r\n", subject));
    if let Some(message_id) = original.header("Message-ID").filter(|id| !id.is_empty()) {
        raw.push_str(&format!("In-Reply-To: {}\r\n", message_id));
        raw.push_str(&format!("References: {}\r\n", message_id));
    }
    raw.push_str("Content-Type: text/plain; charset=\"UTF-8\"\r\n");
    raw.push_str("\r\n");
    raw.push_str(body);
    raw.push_str("\r\n");
    raw
}
