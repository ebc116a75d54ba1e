//! Gmail Agent API
//!
//! A small HTTP facade that lets an automation agent work a Gmail mailbox
//! and a Google Calendar without holding Google credentials itself.
//!
//! # Overview
//!
//! - **Reading**: unread inbox messages received after a local date-time
//! - **Triage**: move a message to spam with a tracking label, or restore a
//!   whole folder back to the inbox
//! - **Replies**: threaded plain-text replies, tagged after sending
//! - **Calendar**: create events and list the upcoming window
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use gmail_agent_api::{auth, config::Config, server};
//! use gmail_agent_api::calendar_client::ProductionCalendarClient;
//! use gmail_agent_api::client::ProductionGmailClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let hubs = auth::initialize_hubs(
//!         "credentials.json".as_ref(),
//!         ".gmail-agent/token.json".as_ref(),
//!     ).await?;
//!
//!     let gmail = Arc::new(ProductionGmailClient::new(hubs.gmail, "me"));
//!     let calendar = Arc::new(ProductionCalendarClient::new(hubs.calendar, "primary"));
//!     let state = server::AppState::from_config(&config, gmail, calendar)?;
//!
//!     let listener = tokio::net::TcpListener::bind(config.bind_address()?).await?;
//!     server::serve(listener, server::router(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 authentication and API hub initialization
//! - [`client`] - Gmail API client trait and production implementation
//! - [`calendar_client`] - Calendar API client trait and production implementation
//! - [`label_manager`] - Label lookup by name or id, create on demand
//! - [`reader`] - Unread message summaries
//! - [`triage`] - Spam moves and folder restoration
//! - [`reply`] - Reply composition and sending
//! - [`calendar`] - Event creation and listing
//! - [`server`] - HTTP routes
//! - [`cli`] - Command-line interface
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases

pub mod auth;
pub mod calendar;
pub mod calendar_client;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod label_manager;
pub mod local_time;
pub mod models;
pub mod reader;
pub mod reply;
pub mod server;
pub mod triage;

pub use error::{AgentError, Result};

pub use models::{CalendarEvent, EmailSummary, MessageMetadata, ReplyRequest, RestoreOutcome};

pub use config::Config;

pub use calendar_client::{CalendarClient, ProductionCalendarClient};
pub use client::{GmailClient, LabelInfo, ProductionGmailClient};

pub use calendar::CalendarService;
pub use label_manager::LabelManager;
pub use reader::MailReader;
pub use reply::{ReplyComposer, SentReply};
pub use triage::{RestoreResult, TriageService};

pub use cli::{Cli, Commands};
pub use server::{router, AppState};
