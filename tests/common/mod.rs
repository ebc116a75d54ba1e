//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gmail_agent_api::calendar_client::CalendarClient;
use gmail_agent_api::client::{GmailClient, LabelInfo};
use gmail_agent_api::error::{AgentError, Result};
use gmail_agent_api::models::{MessageHeader, MessageMetadata};
use google_calendar3::api::Event;
use mockall::mock;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

/// Create a test message with From/To/Subject headers
pub fn create_test_message(id: &str, from: &str, subject: &str) -> MessageMetadata {
    MessageMetadata {
        id: id.to_string(),
        thread_id: format!("thread_{}", id),
        snippet: Some(format!("Snippet of {}", subject)),
        internal_date: DateTime::from_timestamp(1_735_705_800, 0),
        headers: vec![
            MessageHeader::new("From", from),
            MessageHeader::new("To", "me@example.com"),
            MessageHeader::new("Subject", subject),
            MessageHeader::new("Message-ID", format!("<{}@mail.example.com>", id)),
        ],
    }
}

/// Create a test LabelInfo
pub fn create_test_label_info(id: &str, name: &str) -> LabelInfo {
    LabelInfo {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// Mock implementation of GmailClient for call-count expectations
mock! {
    pub GmailClient {}

    #[async_trait::async_trait]
    impl GmailClient for GmailClient {
        async fn list_message_ids(&self, query: &str, label_ids: &[String]) -> Result<Vec<String>>;
        async fn get_message(&self, id: &str) -> Result<MessageMetadata>;
        async fn list_labels(&self) -> Result<Vec<LabelInfo>>;
        async fn create_label(&self, name: &str) -> Result<String>;
        async fn modify_labels(
            &self,
            message_id: &str,
            add_label_ids: &[String],
            remove_label_ids: &[String],
        ) -> Result<()>;
        async fn send_raw(&self, thread_id: &str, raw: Vec<u8>) -> Result<String>;
        async fn profile_email(&self) -> Result<String>;
    }
}

mock! {
    pub CalendarClient {}

    #[async_trait::async_trait]
    impl CalendarClient for CalendarClient {
        async fn insert_event(&self, event: Event) -> Result<Event>;
        async fn list_events(
            &self,
            time_min: DateTime<Utc>,
            time_max: DateTime<Utc>,
        ) -> Result<Vec<Event>>;
    }
}

/// Address `FakeMailbox` reports as its owner
pub const OWNER: &str = "owner@example.com";

/// One recorded `modify_labels` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyCall {
    pub message_id: String,
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

/// A message sent through the fake
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub id: String,
    pub thread_id: String,
    pub raw: String,
}

#[derive(Default)]
struct MailboxState {
    labels: Vec<LabelInfo>,
    messages: HashMap<String, MessageMetadata>,
    message_labels: HashMap<String, BTreeSet<String>>,
    order: Vec<String>,
    sent: Vec<SentMessage>,
    modify_calls: Vec<ModifyCall>,
    list_queries: Vec<(String, Vec<String>)>,
    created_labels: Vec<String>,
    profile_lookups: usize,
    next_id: usize,
    fail_list: bool,
    fail_modify_for: HashSet<String>,
    fail_modify_call: Option<usize>,
}

/// In-memory mailbox honouring label membership
///
/// Search queries are recorded but only label filtering is applied.
#[derive(Default)]
pub struct FakeMailbox {
    state: Mutex<MailboxState>,
}

impl FakeMailbox {
    pub fn new() -> Self {
        let mailbox = Self::default();
        {
            let mut state = mailbox.state.lock().unwrap();
            for system in ["INBOX", "UNREAD", "SPAM"] {
                state.labels.push(create_test_label_info(system, system));
            }
        }
        mailbox
    }

    pub fn with_label(self, id: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .labels
            .push(create_test_label_info(id, name));
        self
    }

    pub fn with_message(self, message: MessageMetadata, labels: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.order.push(message.id.clone());
            state.message_labels.insert(
                message.id.clone(),
                labels.iter().map(|l| l.to_string()).collect(),
            );
            state.messages.insert(message.id.clone(), message);
        }
        self
    }

    pub fn fail_listing(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    /// Every modify on this message id fails
    pub fn fail_modify_on(self, message_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_modify_for
            .insert(message_id.to_string());
        self
    }

    /// The nth modify call (zero-based) fails
    pub fn fail_modify_call(self, index: usize) -> Self {
        self.state.lock().unwrap().fail_modify_call = Some(index);
        self
    }

    pub fn labels_of(&self, message_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .message_labels
            .get(message_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn label_id(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.id.clone())
    }

    pub fn label_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .labels
            .iter()
            .filter(|l| l.name.eq_ignore_ascii_case(name))
            .count()
    }

    pub fn created_labels(&self) -> Vec<String> {
        self.state.lock().unwrap().created_labels.clone()
    }

    pub fn modify_calls(&self) -> Vec<ModifyCall> {
        self.state.lock().unwrap().modify_calls.clone()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn profile_lookups(&self) -> usize {
        self.state.lock().unwrap().profile_lookups
    }

    pub fn list_queries(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().list_queries.clone()
    }
}

#[async_trait]
impl GmailClient for FakeMailbox {
    async fn list_message_ids(&self, query: &str, label_ids: &[String]) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state
            .list_queries
            .push((query.to_string(), label_ids.to_vec()));
        if state.fail_list {
            return Err(AgentError::NetworkError("connection reset".to_string()));
        }

        Ok(state
            .order
            .iter()
            .filter(|id| {
                state
                    .message_labels
                    .get(*id)
                    .is_some_and(|set| label_ids.iter().all(|l| set.contains(l)))
            })
            .cloned()
            .collect())
    }

    async fn get_message(&self, id: &str) -> Result<MessageMetadata> {
        self.state
            .lock()
            .unwrap()
            .messages
            .get(id)
            .cloned()
            .ok_or_else(|| AgentError::MessageNotFound(id.to_string()))
    }

    async fn list_labels(&self) -> Result<Vec<LabelInfo>> {
        Ok(self.state.lock().unwrap().labels.clone())
    }

    async fn create_label(&self, name: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if state.labels.iter().any(|l| l.name.eq_ignore_ascii_case(name)) {
            return Err(AgentError::LabelError(format!("Label name exists: {}", name)));
        }
        state.next_id += 1;
        let id = format!("Label_{}", state.next_id);
        state.labels.push(create_test_label_info(&id, name));
        state.created_labels.push(name.to_string());
        Ok(id)
    }

    async fn modify_labels(
        &self,
        message_id: &str,
        add_label_ids: &[String],
        remove_label_ids: &[String],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let call_index = state.modify_calls.len();
        state.modify_calls.push(ModifyCall {
            message_id: message_id.to_string(),
            add: add_label_ids.to_vec(),
            remove: remove_label_ids.to_vec(),
        });

        if state.fail_modify_call == Some(call_index) || state.fail_modify_for.contains(message_id) {
            return Err(AgentError::ServerError {
                status: 500,
                message: format!("modify failed for {}", message_id),
            });
        }

        let labels = state
            .message_labels
            .get_mut(message_id)
            .ok_or_else(|| AgentError::MessageNotFound(message_id.to_string()))?;
        for id in remove_label_ids {
            labels.remove(id);
        }
        for id in add_label_ids {
            labels.insert(id.clone());
        }
        Ok(())
    }

    async fn send_raw(&self, thread_id: &str, raw: Vec<u8>) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("sent_{}", state.next_id);
        state.sent.push(SentMessage {
            id: id.clone(),
            thread_id: thread_id.to_string(),
            raw: String::from_utf8_lossy(&raw).into_owned(),
        });
        state.message_labels.insert(id.clone(), strings(&["SENT"]).into_iter().collect());
        Ok(id)
    }

    async fn profile_email(&self) -> Result<String> {
        self.state.lock().unwrap().profile_lookups += 1;
        Ok(OWNER.to_string())
    }
}

/// In-memory calendar storing whatever is inserted
#[derive(Default)]
pub struct FakeCalendar {
    events: Mutex<Vec<Event>>,
    windows: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(self, event: Event) -> Self {
        self.events.lock().unwrap().push(event);
        self
    }

    pub fn inserted(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn windows(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarClient for FakeCalendar {
    async fn insert_event(&self, mut event: Event) -> Result<Event> {
        let mut events = self.events.lock().unwrap();
        event.id = Some(format!("evt_{}", events.len() + 1));
        event.html_link = Some("https://calendar.google.com/event".to_string());
        events.push(event.clone());
        Ok(event)
    }

    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        self.windows.lock().unwrap().push((time_min, time_max));
        Ok(self.events.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_message() {
        let msg = create_test_message("msg1", "test@example.com", "Test Subject");
        assert_eq!(msg.id, "msg1");
        assert_eq!(msg.thread_id, "thread_msg1");
        assert_eq!(msg.header("subject"), Some("Test Subject"));
    }

    #[tokio::test]
    async fn test_fake_mailbox_filters_by_label() {
        let mailbox = FakeMailbox::new()
            .with_message(create_test_message("a", "x@example.com", "A"), &["INBOX", "UNREAD"])
            .with_message(create_test_message("b", "y@example.com", "B"), &["INBOX"]);

        let ids = mailbox
            .list_message_ids("", &strings(&["UNREAD"]))
            .await
            .unwrap();
        assert_eq!(ids, vec!["a".to_string()]);
    }
}
