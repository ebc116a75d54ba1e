use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{AgentError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub time: TimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Gmail user id for API calls and the `From:` address of replies
    #[serde(default = "default_user_email")]
    pub user_email: String,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            user_email: default_user_email(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar to read and write; empty means the mailbox address
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_upcoming_window_days")]
    pub upcoming_window_days: u32,
    /// When a meeting link is supplied it replaces the event location
    #[serde(default = "default_meeting_link_overrides_location")]
    pub meeting_link_overrides_location: bool,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            upcoming_window_days: default_upcoming_window_days(),
            meeting_link_overrides_location: default_meeting_link_overrides_location(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_moved_label")]
    pub moved_label: String,
    #[serde(default = "default_replied_label")]
    pub replied_label: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            moved_label: default_moved_label(),
            replied_label: default_replied_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// IANA zone used for caller-supplied local times and rendered timestamps
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_user_email() -> String {
    "me".to_string()
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_upcoming_window_days() -> u32 {
    7
}

fn default_meeting_link_overrides_location() -> bool {
    true
}

fn default_moved_label() -> String {
    "AI-AGENT-MOVED".to_string()
}

fn default_replied_label() -> String {
    "AI-AGENT-REPLIED".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AgentError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AgentError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AgentError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AgentError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| AgentError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.bind_address()?;

        if self.mailbox.user_email.trim().is_empty() {
            return Err(AgentError::ConfigError(
                "mailbox.user_email cannot be empty".to_string(),
            ));
        }

        if self.calendar.upcoming_window_days == 0 {
            return Err(AgentError::ConfigError(
                "calendar.upcoming_window_days must be at least 1".to_string(),
            ));
        }
        if self.calendar.upcoming_window_days > 365 {
            return Err(AgentError::ConfigError(
                "calendar.upcoming_window_days cannot exceed 365".to_string(),
            ));
        }

        if self.labels.moved_label.trim().is_empty() {
            return Err(AgentError::ConfigError(
                "labels.moved_label cannot be empty".to_string(),
            ));
        }
        if self.labels.replied_label.trim().is_empty() {
            return Err(AgentError::ConfigError(
                "labels.replied_label cannot be empty".to_string(),
            ));
        }
        if self
            .labels
            .moved_label
            .eq_ignore_ascii_case(&self.labels.replied_label)
        {
            return Err(AgentError::ConfigError(
                "labels.moved_label and labels.replied_label must differ".to_string(),
            ));
        }

        self.timezone()?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Parsed `server.bind_address`
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server.bind_address.parse().map_err(|e| {
            AgentError::ConfigError(format!(
                "Invalid server.bind_address '{}': {}",
                self.server.bind_address, e
            ))
        })
    }

    /// Parsed `time.timezone`
    pub fn timezone(&self) -> Result<Tz> {
        self.time.timezone.parse::<Tz>().map_err(|e| {
            AgentError::ConfigError(format!(
                "Invalid time.timezone '{}': {}",
                self.time.timezone, e
            ))
        })
    }

    /// Calendar to act on, falling back to the mailbox address
    pub fn calendar_id(&self) -> &str {
        if self.calendar.calendar_id.trim().is_empty() {
            &self.mailbox.user_email
        } else {
            &self.calendar.calendar_id
        }
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.mailbox.user_email, "me");
        assert_eq!(config.calendar.calendar_id, "primary");
        assert_eq!(config.calendar.upcoming_window_days, 7);
        assert!(config.calendar.meeting_link_overrides_location);
        assert_eq!(config.labels.moved_label, "AI-AGENT-MOVED");
        assert_eq!(config.labels.replied_label, "AI-AGENT-REPLIED");
        assert_eq!(config.time.timezone, "Asia/Kolkata");
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_bind_address() {
        let mut config = Config::default();
        config.server.bind_address = "not-an-address".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.bind_address"));
    }

    #[test]
    fn test_config_validation_empty_user_email() {
        let mut config = Config::default();
        config.mailbox.user_email = "  ".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mailbox.user_email cannot be empty"));
    }

    #[test]
    fn test_config_validation_window_bounds() {
        let mut config = Config::default();
        config.calendar.upcoming_window_days = 0;
        assert!(config.validate().is_err());

        config.calendar.upcoming_window_days = 366;
        assert!(config.validate().is_err());

        config.calendar.upcoming_window_days = 365;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_labels_must_differ() {
        let mut config = Config::default();
        config.labels.replied_label = "ai-agent-moved".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_config_validation_unknown_timezone() {
        let mut config = Config::default();
        config.time.timezone = "Mars/Olympus_Mons".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("time.timezone"));
    }

    #[test]
    fn test_calendar_id_falls_back_to_mailbox() {
        let mut config = Config::default();
        config.mailbox.user_email = "owner@example.com".to_string();
        assert_eq!(config.calendar_id(), "primary");

        config.calendar.calendar_id = String::new();
        assert_eq!(config.calendar_id(), "owner@example.com");
    }

    #[tokio::test]
    async fn test_config_load_save_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let mut config = Config::default();
        config.time.timezone = "Europe/Berlin".to_string();
        config.save(path).await.unwrap();

        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded.time.timezone, "Europe/Berlin");
        assert_eq!(loaded.labels.moved_label, config.labels.moved_label);
    }

    #[tokio::test]
    async fn test_config_load_nonexistent_returns_default() {
        let path = Path::new("/tmp/nonexistent-agent-config-12345.toml");

        let config = Config::load(path).await.unwrap();
        assert_eq!(config.calendar.upcoming_window_days, 7);
    }

    #[tokio::test]
    async fn test_config_load_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        tokio::fs::write(path, "this is not valid toml {[}]")
            .await
            .unwrap();

        let result = Config::load(path).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }

    #[tokio::test]
    async fn test_config_partial_with_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let partial_config = r#"
[mailbox]
user_email = "owner@example.com"

[calendar]
meeting_link_overrides_location = false
"#;
        tokio::fs::write(path, partial_config).await.unwrap();

        let config = Config::load(path).await.unwrap();

        assert_eq!(config.mailbox.user_email, "owner@example.com");
        assert!(!config.calendar.meeting_link_overrides_location);
        assert_eq!(config.calendar.upcoming_window_days, 7);
        assert_eq!(config.time.timezone, "Asia/Kolkata");
    }

    #[tokio::test]
    async fn test_config_create_example() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        Config::create_example(path).await.unwrap();

        let config = Config::load(path).await.unwrap();
        assert_eq!(config.labels.replied_label, "AI-AGENT-REPLIED");
    }
}
