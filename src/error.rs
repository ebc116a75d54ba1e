use thiserror::Error;

/// Type alias for Result with AgentError
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error types for the Gmail/Calendar facade
#[derive(Error, Debug)]
pub enum AgentError {
    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found (404)
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Vendor message is missing a field we rely on
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    /// Label-related errors
    #[error("Label error: {0}")]
    LabelError(String),

    /// Calendar API errors
    #[error("Calendar API error: {0}")]
    CalendarError(String),

    /// Caller input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A multi-call mutation failed after earlier calls had already been applied
    #[error("{stage} failed: {source}")]
    PartialMutation {
        stage: &'static str,
        #[source]
        source: Box<AgentError>,
    },

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// Wrap an error raised after some mutations already landed
    pub fn partial(stage: &'static str, source: AgentError) -> Self {
        AgentError::PartialMutation {
            stage,
            source: Box::new(source),
        }
    }
}

impl From<google_gmail1::Error> for AgentError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            // HTTP response with status code (non-success responses)
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    429 => AgentError::RateLimitExceeded(message),
                    404 => AgentError::MessageNotFound("Resource not found".to_string()),
                    400 => AgentError::BadRequest(message),
                    403 => AgentError::Forbidden(message),
                    500..=599 => AgentError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => AgentError::ApiError(message),
                }
            }
            google_gmail1::Error::BadRequest(ref err) => AgentError::BadRequest(format!("{}", err)),
            google_gmail1::Error::HttpError(ref err) => {
                AgentError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => AgentError::NetworkError(err.to_string()),
            _ => AgentError::ApiError(error.to_string()),
        }
    }
}
