//! OAuth2 authentication and Google API hub construction

use google_calendar3::CalendarHub;
use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use std::path::Path;

use crate::error::{AgentError, Result};

/// Scopes requested once at startup so every later call finds a cached token
///
/// - gmail.modify: read messages, change labels, send replies
/// - gmail.labels: list and create labels
/// - calendar.events: insert and list events
pub const REQUIRED_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/gmail.labels",
    "https://www.googleapis.com/auth/calendar.events",
];

type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;

/// Type alias for Gmail Hub to simplify type signatures
pub type GmailHub = Gmail<HttpsConnector>;

/// Type alias for the Calendar hub
pub type CalendarApiHub = CalendarHub<HttpsConnector>;

/// Both API hubs, sharing one authenticator and token cache
pub struct GoogleHubs {
    pub gmail: GmailHub,
    pub calendar: CalendarApiHub,
}

fn https_connector() -> Result<HttpsConnector> {
    // HTTP/1 only; the generated clients behave better with it
    Ok(hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| AgentError::AuthError(format!("Failed to load TLS roots: {}", e)))?
        .https_or_http()
        .enable_http1()
        .build())
}

/// Initialize the Gmail and Calendar hubs with OAuth2 authentication
///
/// Uses the installed-app flow. Tokens are persisted to `token_cache_path`
/// and refreshed automatically; the browser redirect only happens when no
/// usable token is cached.
pub async fn initialize_hubs(credentials_path: &Path, token_cache_path: &Path) -> Result<GoogleHubs> {
    let secret = yup_oauth2::read_application_secret(credentials_path)
        .await
        .map_err(|e| AgentError::AuthError(format!("Failed to read credentials: {}", e)))?;

    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::HTTPRedirect,
    )
    .persist_tokens_to_disk(token_cache_path)
    .build()
    .await
    .map_err(|e| AgentError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    // Pre-authenticate with every scope so the cached token covers both APIs
    auth.token(REQUIRED_SCOPES)
        .await
        .map_err(|e| AgentError::AuthError(format!("Failed to obtain token: {}", e)))?;

    let gmail_client =
        hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
            .build(https_connector()?);
    let calendar_client =
        hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
            .build(https_connector()?);

    Ok(GoogleHubs {
        gmail: Gmail::new(gmail_client, auth.clone()),
        calendar: CalendarHub::new(calendar_client, auth),
    })
}

/// Restrict the token cache to owner read/write
#[cfg(unix)]
pub async fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Windows relies on the profile directory ACLs
#[cfg(windows)]
pub async fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}
