//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::auth;
use crate::calendar_client::ProductionCalendarClient;
use crate::client::ProductionGmailClient;
use crate::config::Config;
use crate::error::Result;
use crate::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "gmail-agent-api")]
#[command(version = "0.1.0")]
#[command(about = "HTTP facade over Gmail and Google Calendar", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 credentials file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to token cache file
    #[arg(long, default_value = ".gmail-agent/token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on, overrides server.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Authenticate with Gmail and Calendar
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// Loads config, authenticates and serves the API until shutdown
pub async fn run_server(cli: &Cli, bind: Option<String>) -> Result<()> {
    let mut config = Config::load(&cli.config).await?;
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    config.validate()?;
    let addr = config.bind_address()?;

    if let Some(parent) = cli.token_cache.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let hubs = auth::initialize_hubs(&cli.credentials, &cli.token_cache).await?;
    auth::secure_token_file(&cli.token_cache).await?;

    let gmail = Arc::new(ProductionGmailClient::new(
        hubs.gmail,
        config.mailbox.user_email.clone(),
    ));
    let calendar = Arc::new(ProductionCalendarClient::new(
        hubs.calendar,
        config.calendar_id(),
    ));
    let state = AppState::from_config(&config, gmail, calendar)?;

    info!(
        "Serving mailbox {} and calendar {} ({})",
        config.mailbox.user_email,
        config.calendar_id(),
        config.time.timezone
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::serve(listener, server::router(state)).await
}
