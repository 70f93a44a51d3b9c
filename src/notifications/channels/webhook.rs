//! Webhook channel
//!
//! POSTs every report as JSON:
//!
//! ```json
//! {
//!   "kind": "daily",
//!   "subject_id": "example_creator",
//!   "title": "example_creator daily report 2024-01-02: 1,010 followers (+10)",
//!   "body": "Daily report for example_creator (2024-01-02)\n...",
//!   "analysis": { "kind": "tracked", "daily": { "followers": 10, ... }, ... },
//!   "generated_at": "2024-01-02T08:00:00+00:00"
//! }
//! ```
//!
//! `analysis` is `null` for reports of runs that recorded nothing.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::{Channel, ChannelError, ChannelResult};
use crate::report::Report;

/// Webhook endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,

    /// Sent as a bearer token
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional attempts after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Check the URL scheme and timeout
    ///
    /// # Errors
    /// Returns `ChannelError::InvalidConfig` describing the problem.
    pub fn validate(&self) -> ChannelResult<()> {
        let url = url::Url::parse(&self.url)
            .map_err(|e| ChannelError::InvalidConfig(format!("bad url '{}': {e}", self.url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ChannelError::InvalidConfig(format!(
                "unsupported url scheme '{}'",
                url.scheme()
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ChannelError::InvalidConfig(
                "timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Delay before retry number `attempt` (1-based): 500ms, 1s, 2s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500u64.saturating_mul(1 << attempt.saturating_sub(1).min(10)))
}

/// Channel posting reports to an HTTP endpoint
pub struct WebhookChannel {
    config: WebhookConfig,
    client: Client,
}

impl WebhookChannel {
    /// # Errors
    /// Fails if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: WebhookConfig) -> ChannelResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Channel with default settings for `url`
    pub fn from_url(url: impl Into<String>) -> ChannelResult<Self> {
        Self::new(WebhookConfig::new(url))
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn payload(report: &Report) -> ChannelResult<serde_json::Value> {
        Ok(serde_json::json!({
            "kind": report.kind.as_str(),
            "subject_id": report.subject_id,
            "title": report.title,
            "body": report.body,
            "analysis": serde_json::to_value(&report.analysis)?,
            "generated_at": report.generated_at.to_rfc3339(),
        }))
    }

    /// One POST; any non-2xx answer is a rejection
    async fn post(&self, payload: &serde_json::Value) -> ChannelResult<()> {
        let mut request = self.client.post(&self.config.url).json(payload);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }
        for (name, value) in &self.config.headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ChannelError::Rejected { status, body })
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, report: &Report) -> ChannelResult<()> {
        let payload = Self::payload(report)?;

        let mut retries = 0;
        loop {
            match self.post(&payload).await {
                Ok(()) => {
                    tracing::info!(url = %self.config.url, retries, "Report posted to webhook");
                    return Ok(());
                }
                Err(err) if err.is_transient() && retries < self.config.max_retries => {
                    retries += 1;
                    let delay = backoff(retries);
                    tracing::warn!(
                        url = %self.config.url,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Webhook delivery failed, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
