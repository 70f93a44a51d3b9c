//! Delivery channels
//!
//! A channel takes a rendered [`Report`] somewhere and says whether it got
//! there. Turning channel errors into per-channel [`DeliveryStatus`] values
//! is the manager's job.

pub mod console;
pub mod webhook;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

use crate::report::Report;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Reasons a report did not reach its destination
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid channel configuration: {0}")]
    InvalidConfig(String),

    /// Connection, timeout or client setup failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("endpoint answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("could not write report: {0}")]
    Output(#[from] std::io::Error),

    #[error("could not encode report: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ChannelError {
    /// Whether sending the same report again may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::InvalidConfig(_) | Self::Output(_) | Self::Encoding(_) => false,
        }
    }
}

/// Outcome of handing one report to one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryStatus {
    pub channel: String,
    pub delivered: bool,
    /// Failure reason when not delivered
    pub reason: Option<String>,
}

impl DeliveryStatus {
    pub fn delivered(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            delivered: true,
            reason: None,
        }
    }

    pub fn failed(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            delivered: false,
            reason: Some(reason.into()),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reason, self.delivered) {
            (_, true) => write!(f, "{}: delivered", self.channel),
            (Some(reason), false) => write!(f, "{}: failed ({reason})", self.channel),
            (None, false) => write!(f, "{}: failed", self.channel),
        }
    }
}

/// Destination for rendered reports
#[async_trait]
pub trait Channel: Send + Sync {
    /// Short channel identifier used in logs and statuses
    fn name(&self) -> &str;

    /// Deliver one report
    async fn send(&self, report: &Report) -> ChannelResult<()>;
}
