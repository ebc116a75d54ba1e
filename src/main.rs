use anyhow::Result;
use clap::Parser;
use gmail_agent_api::cli::{self, Cli, Commands};
use gmail_agent_api::client::{GmailClient, ProductionGmailClient};
use gmail_agent_api::config::Config;
use gmail_agent_api::error::AgentError;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        eprintln!("\nFor help, run: gmail-agent-api --help");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    // aws-lc-rs everywhere except Windows, where ring avoids the NASM/CMake toolchain
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_agent_api=debug,tower_http=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_agent_api=info,warn"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match &cli.command {
        Commands::Serve { bind } => {
            tracing::info!("Gmail agent API starting...");
            cli::run_server(&cli, bind.clone()).await?;
            Ok(())
        }

        Commands::Auth { force } => {
            tracing::info!("Authenticating with Gmail and Calendar APIs...");

            if let Some(parent) = cli.token_cache.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            if *force && cli.token_cache.exists() {
                tokio::fs::remove_file(&cli.token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            let config = Config::load(&cli.config).await?;
            let hubs =
                gmail_agent_api::auth::initialize_hubs(&cli.credentials, &cli.token_cache).await?;
            gmail_agent_api::auth::secure_token_file(&cli.token_cache).await?;

            println!("Successfully authenticated");
            println!("Token cached at: {:?}", cli.token_cache);

            let client = ProductionGmailClient::new(hubs.gmail, config.mailbox.user_email.clone());
            println!("Connected to account: {}", client.profile_email().await?);

            Ok(())
        }

        Commands::InitConfig { output, force } => {
            if output.exists() && !force {
                return Err(AgentError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nPlease edit this file to customize your settings.");
            println!("Key settings to review:");
            println!("  - mailbox.user_email: Account used for API calls and reply From:");
            println!("  - time.timezone: Zone for localDateTime and rendered timestamps");
            println!("  - labels.moved_label / labels.replied_label: Tags applied by the agent");
            println!("  - server.bind_address: Where the HTTP API listens");

            Ok(())
        }
    }
}
