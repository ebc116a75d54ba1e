//! Label lookup and lazy creation
//!
//! Labels are matched by display name without regard to case. Once resolved,
//! every mutation uses the vendor-assigned id, never the name.
use crate::client::{GmailClient, LabelInfo};
use crate::error::{AgentError, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves workflow labels against the mailbox, creating them on first use
///
/// Holds no cache: every call scans the current label list, so labels created
/// or deleted outside this service are picked up immediately.
#[derive(Clone)]
pub struct LabelManager {
    client: Arc<dyn GmailClient>,
}

impl LabelManager {
    pub fn new(client: Arc<dyn GmailClient>) -> Self {
        Self { client }
    }

    /// Returns the id of the label named `name`, creating it if missing
    ///
    /// Two concurrent callers asking for the same missing label can both
    /// create it; Gmail then rejects the second create with a conflict.
    pub async fn resolve_or_create(&self, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            return Err(AgentError::Validation(
                "Label name cannot be empty".to_string(),
            ));
        }

        let labels = self.client.list_labels().await?;
        if let Some(label) = find_by_name(&labels, name) {
            debug!("Label '{}' already exists with ID: {}", name, label.id);
            return Ok(label.id.clone());
        }

        info!("Creating label: {}", name);
        let label_id = self.client.create_label(name).await.map_err(|e| {
            AgentError::LabelError(format!("Failed to create label '{}': {}", name, e))
        })?;

        info!("Successfully created label '{}' with ID: {}", name, label_id);
        Ok(label_id)
    }

    /// Resolves each key against a single label listing, matching either the
    /// display name or the id
    pub async fn resolve_existing(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let labels = self.client.list_labels().await?;
        Ok(keys
            .iter()
            .map(|key| find_by_name_or_id(&labels, key).map(|l| l.id.clone()))
            .collect())
    }
}

/// Case-insensitive name match
pub fn find_by_name<'a>(labels: &'a [LabelInfo], name: &str) -> Option<&'a LabelInfo> {
    let name_lower = name.to_lowercase();
    labels.iter().find(|l| l.name.to_lowercase() == name_lower)
}

/// Case-insensitive match on display name or id; the last matching label wins
pub fn find_by_name_or_id<'a>(labels: &'a [LabelInfo], key: &str) -> Option<&'a LabelInfo> {
    let key_lower = key.to_lowercase();
    labels
        .iter()
        .rev()
        .find(|l| l.name.to_lowercase() == key_lower || l.id.to_lowercase() == key_lower)
}
