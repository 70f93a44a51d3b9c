//! Configuration management for pulsewatch
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.
//!
//! Only [`TrackerConfig`] reaches the analytics core. Notification transport
//! settings and credentials stay in [`NotificationConfig`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::notifications::channels::webhook::WebhookConfig;
use crate::storage::CorruptRecordPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracked subject and series storage
    pub tracker: TrackerConfig,

    /// Report delivery configuration
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration handed to the tracking core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Identifier of the tracked profile (e.g. its handle)
    pub subject_id: String,

    /// Path of the CSV series file
    pub storage_path: PathBuf,

    /// What to do with unparsable records on load
    #[serde(default)]
    pub on_corrupt: CorruptRecordPolicy,
}

impl TrackerConfig {
    /// Create a tracker configuration with the default corrupt record policy
    pub fn new(subject_id: impl Into<String>, storage_path: impl Into<PathBuf>) -> Self {
        Self {
            subject_id: subject_id.into(),
            storage_path: storage_path.into(),
            on_corrupt: CorruptRecordPolicy::default(),
        }
    }
}

/// Report delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Print reports to stdout
    #[serde(default = "default_console")]
    pub console: bool,

    /// Optional webhook endpoint
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

fn default_console() -> bool {
    true
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            console: default_console(),
            webhook: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let subject_id = std::env::var("PULSEWATCH_SUBJECT").unwrap_or_default();

        let storage_path = std::env::var("PULSEWATCH_STORAGE_PATH")
            .unwrap_or_else(|_| String::from("data/metrics_history.csv"))
            .into();

        let on_corrupt = match std::env::var("PULSEWATCH_ON_CORRUPT") {
            Ok(raw) => raw
                .parse::<CorruptRecordPolicy>()
                .map_err(anyhow::Error::msg)
                .context("Invalid PULSEWATCH_ON_CORRUPT")?,
            Err(_) => CorruptRecordPolicy::default(),
        };

        let console = std::env::var("PULSEWATCH_CONSOLE")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let webhook = std::env::var("PULSEWATCH_WEBHOOK_URL").ok().map(|url| {
            let config = WebhookConfig::new(url);
            match std::env::var("PULSEWATCH_WEBHOOK_TOKEN") {
                Ok(token) => config.with_auth_token(token),
                Err(_) => config,
            }
        });

        let log_level =
            std::env::var("PULSEWATCH_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("PULSEWATCH_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            tracker: TrackerConfig {
                subject_id,
                storage_path,
                on_corrupt,
            },
            notifications: NotificationConfig { console, webhook },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from a file when given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first invalid setting.
    pub fn validate(&self) -> crate::Result<()> {
        if self.tracker.subject_id.trim().is_empty() {
            return Err(Error::config("subject_id must not be empty"));
        }

        if self.tracker.storage_path.as_os_str().is_empty() {
            return Err(Error::config("storage_path must not be empty"));
        }

        if let Some(webhook) = &self.notifications.webhook {
            webhook
                .validate()
                .map_err(|e| Error::config(format!("webhook: {e}")))?;
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::config(format!(
                "log format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::new("", "data/metrics_history.csv"),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulsewatchErrorTrait;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.tracker.subject_id = String::from("example_creator");
        config
    }

    #[test]
    fn test_default_config_requires_subject() {
        assert!(Config::default().validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_webhook_url() {
        let mut config = valid_config();
        config.notifications.webhook = Some(WebhookConfig::new("not a url"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = valid_config();
        config.logging.format = String::from("yaml");

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("yaml")));
        assert_eq!(err.category(), crate::error::ErrorCategory::Config);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [tracker]
            subject_id = "example_creator"
            storage_path = "metrics.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.tracker.on_corrupt, CorruptRecordPolicy::Abort);
        assert!(config.notifications.console);
        assert!(config.notifications.webhook.is_none());
        assert_eq!(config.logging.level, "info");
    }
}
