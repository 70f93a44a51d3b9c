//! Report fan-out

use super::channels::console::ConsoleChannel;
use super::channels::webhook::WebhookChannel;
use super::channels::{Channel, ChannelResult, DeliveryStatus};
use crate::config::NotificationConfig;
use crate::report::Report;

/// Delivers each report to every registered channel
#[derive(Default)]
pub struct NotificationManager {
    channels: Vec<Box<dyn Channel>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the channels enabled in `config`
    ///
    /// # Errors
    /// Fails if the webhook configuration is invalid.
    pub fn from_config(config: &NotificationConfig) -> ChannelResult<Self> {
        let mut manager = Self::new();

        if config.console {
            manager.add_channel(Box::new(ConsoleChannel::new()));
        }
        if let Some(webhook) = &config.webhook {
            manager.add_channel(Box::new(WebhookChannel::new(webhook.clone())?));
        }

        Ok(manager)
    }

    pub fn add_channel(&mut self, channel: Box<dyn Channel>) {
        tracing::debug!(channel = channel.name(), "Notification channel registered");
        self.channels.push(channel);
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Send `report` through every channel, in registration order
    ///
    /// A failing channel never stops the others; its error comes back as a
    /// failed status.
    pub async fn deliver(&self, report: &Report) -> Vec<DeliveryStatus> {
        if self.channels.is_empty() {
            tracing::warn!(title = %report.title, "No notification channels configured");
        }

        let mut statuses = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            let status = match channel.send(report).await {
                Ok(()) => DeliveryStatus::delivered(channel.name()),
                Err(err) => {
                    tracing::warn!(channel = channel.name(), "Report delivery failed: {err}");
                    DeliveryStatus::failed(channel.name(), err.to_string())
                }
            };
            statuses.push(status);
        }
        statuses
    }
}
