//! Report delivery
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │      NotificationManager                   │
//! │  - Channel registration                    │
//! │  - Fan-out delivery                        │
//! └────────────────────────────────────────────┘
//!                     │
//!             ┌───────┴───────┐
//!             ▼               ▼
//!       ┌─────────┐     ┌─────────┐
//!       │ Console │     │ Webhook │
//!       │ Channel │     │ Channel │
//!       └─────────┘     └─────────┘
//! ```
//!
//! Delivery is best effort: one failing channel never prevents the others
//! from receiving the report, and failures come back as [`DeliveryStatus`]
//! values rather than errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulsewatch::notifications::{NotificationManager, WebhookChannel};
//!
//! let mut manager = NotificationManager::new();
//! manager.add_channel(Box::new(WebhookChannel::from_url("https://hooks.example.com/reports")?));
//!
//! let statuses = manager.deliver(&report).await;
//! ```

pub mod channels;
mod manager;

// Re-exports
pub use channels::console::ConsoleChannel;
pub use channels::webhook::{WebhookChannel, WebhookConfig};
pub use channels::{Channel, ChannelError, ChannelResult, DeliveryStatus};
pub use manager::NotificationManager;
