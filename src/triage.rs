//! Label-driven triage: spam tagging and restoring a folder to the inbox

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::{GmailClient, INBOX, SPAM, UNREAD};
use crate::error::{AgentError, Result};
use crate::label_manager::LabelManager;
use crate::models::RestoreOutcome;

/// Result of restoring a folder, before it is rendered for the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreResult {
    LabelNotFound(String),
    FolderNotFound(String),
    EmptyFolder(String),
    Restored(RestoreOutcome),
}

/// Spam triage and inbox restoration over Gmail labels
pub struct TriageService {
    client: Arc<dyn GmailClient>,
    labels: LabelManager,
    moved_label: String,
}

impl TriageService {
    pub fn new(client: Arc<dyn GmailClient>, moved_label: impl Into<String>) -> Self {
        Self {
            labels: LabelManager::new(Arc::clone(&client)),
            client,
            moved_label: moved_label.into(),
        }
    }

    /// Marks a message as unread spam and tags it with the moved label
    ///
    /// Two separate modify calls: if the second fails the message stays in
    /// spam without the tag, reported as [`AgentError::PartialMutation`].
    pub async fn move_to_spam(&self, message_id: &str) -> Result<()> {
        let label_id = self.labels.resolve_or_create(&self.moved_label).await?;

        self.client
            .modify_labels(
                message_id,
                &[SPAM.to_string(), UNREAD.to_string()],
                &[INBOX.to_string()],
            )
            .await?;

        self.client
            .modify_labels(message_id, &[label_id], &[])
            .await
            .map_err(|e| AgentError::partial("tagging spam message", e))?;

        info!(op = "move", "Moved message {} to spam with label: {}", message_id, self.moved_label);
        Ok(())
    }

    /// Moves every message under `folder_name` back to the inbox as unread,
    /// stripping both `label_name` and the folder label
    ///
    /// Names are matched against label display names or ids. Every message
    /// is attempted; failures are collected rather than aborting the loop.
    pub async fn remove_label_and_restore(
        &self,
        label_name: &str,
        folder_name: &str,
    ) -> Result<RestoreResult> {
        let resolved = self.labels.resolve_existing(&[label_name, folder_name]).await?;
        let (label_id, folder_id) = match (resolved[0].clone(), resolved[1].clone()) {
            (None, _) => return Ok(RestoreResult::LabelNotFound(label_name.to_string())),
            (_, None) => return Ok(RestoreResult::FolderNotFound(folder_name.to_string())),
            (Some(label_id), Some(folder_id)) => (label_id, folder_id),
        };

        let message_ids = self
            .client
            .list_message_ids("", std::slice::from_ref(&folder_id))
            .await?;
        if message_ids.is_empty() {
            return Ok(RestoreResult::EmptyFolder(folder_name.to_string()));
        }

        let add = [INBOX.to_string(), UNREAD.to_string()];
        let remove = [label_id, folder_id];
        let mut outcome = RestoreOutcome::default();

        for message_id in message_ids {
            match self.client.modify_labels(&message_id, &add, &remove).await {
                Ok(()) => outcome.updated.push(message_id),
                Err(e) => {
                    warn!(op = "restore", "Failed to restore message {}: {}", message_id, e);
                    outcome.failed.push((message_id, e.to_string()));
                }
            }
        }

        if outcome.is_complete() {
            info!(
                op = "restore",
                "Restored {} messages from '{}' to inbox",
                outcome.updated.len(),
                folder_name
            );
        } else {
            error!(
                op = "restore",
                "Restored {} of {} messages from '{}'",
                outcome.updated.len(),
                outcome.total(),
                folder_name
            );
        }

        Ok(RestoreResult::Restored(outcome))
    }
}

impl RestoreResult {
    /// Status line returned by the HTTP endpoint
    pub fn status_message(&self) -> String {
        match self {
            RestoreResult::LabelNotFound(label) => format!("Label not found: {}", label),
            RestoreResult::FolderNotFound(folder) => format!("Folder not found: {}", folder),
            RestoreResult::EmptyFolder(folder) => format!("No messages found in folder: {}", folder),
            RestoreResult::Restored(outcome) => match outcome.failed.first() {
                None => format!("success ({} messages updated)", outcome.updated.len()),
                Some((_, first_error)) => {
                    let failed_ids: Vec<&str> =
                        outcome.failed.iter().map(|(id, _)| id.as_str()).collect();
                    format!(
                        "failure: {} ({} of {} messages updated; failed: {})",
                        first_error,
                        outcome.updated.len(),
                        outcome.total(),
                        failed_ids.join(", ")
                    )
                }
            },
        }
    }
}
