//! pulsewatch - Daily social profile engagement tracker
//!
//! Records one engagement snapshot per day into an append-only series,
//! compares it with the previous day and week, and renders a report.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`source`] - Observation sources (manual values, JSON snapshots)
//! - [`storage`] - Append-only CSV time-series store
//! - [`analytics`] - Daily/weekly deltas and 7-day trend
//! - [`tracker`] - One load → analyze → append cycle per run
//! - [`pipeline`] - Source → tracker → report → delivery for one run
//! - [`report`] - Handlebars report rendering
//! - [`notifications`] - Report delivery channels
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`utils`] - Formatting helpers
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use pulsewatch::config::TrackerConfig;
//! use pulsewatch::models::Observation;
//! use pulsewatch::tracker::Tracker;
//!
//! fn main() -> pulsewatch::Result<()> {
//!     let config = TrackerConfig::new("example_creator", "data/metrics_history.csv");
//!     let mut tracker = Tracker::from_config(config);
//!
//!     let date = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
//!     let analysis = tracker.run(Observation::new(date, 1010, 50, 5100, 300))?;
//!     println!("first run: {}", analysis.is_first_run());
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod notifications;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod storage;
pub mod tracker;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{analyze, Analysis, Trend, TrendDirection};
    pub use crate::config::{Config, TrackerConfig};
    pub use crate::error::{Error, ErrorCategory, PulsewatchErrorTrait, Result};
    pub use crate::models::{Observation, RawObservation};
    pub use crate::notifications::NotificationManager;
    pub use crate::pipeline::RunOutcome;
    pub use crate::report::{Report, ReportRenderer};
    pub use crate::storage::{CsvSeriesStore, SeriesStore};
    pub use crate::tracker::Tracker;
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use models::{Observation, RawObservation};
