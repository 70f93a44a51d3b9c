//! Run-level entry point of the tracking core
//!
//! One [`Tracker::run`] performs exactly one load → analyze → append cycle:
//!
//! 1. Load the full prior series from the store.
//! 2. Reject an observation whose date is already recorded, or earlier than
//!    the last recorded date. Nothing is written in that case.
//! 3. Analyze it against the prior series. Invalid input fails closed.
//! 4. Append it to the store.
//!
//! The tracker never notifies anyone; callers decide what to do with the
//! returned [`Analysis`] or error.

use chrono::NaiveDate;
use thiserror::Error;

use crate::analytics::{analyze, Analysis};
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::models::Observation;
use crate::storage::{CsvSeriesStore, SeriesStore};

/// Errors raised by the append policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// An observation for this date is already recorded
    #[error("An observation for {0} is already recorded")]
    DuplicateDate(NaiveDate),

    /// The observation predates the last recorded one
    #[error("Observation for {date} is older than the last recorded date {last}")]
    OutOfOrderDate { date: NaiveDate, last: NaiveDate },
}

/// Tracks one subject's daily observations
pub struct Tracker<S: SeriesStore> {
    config: TrackerConfig,
    store: S,
}

impl Tracker<CsvSeriesStore> {
    /// Create a tracker backed by the configured CSV file
    pub fn from_config(config: TrackerConfig) -> Self {
        let store = CsvSeriesStore::new(&config.storage_path).with_policy(config.on_corrupt);
        Self { config, store }
    }
}

impl<S: SeriesStore> Tracker<S> {
    /// Create a tracker over an arbitrary store
    pub fn with_store(config: TrackerConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Identifier of the tracked subject
    pub fn subject_id(&self) -> &str {
        &self.config.subject_id
    }

    /// Get the tracker configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record today's observation and analyze it against the prior series
    ///
    /// # Errors
    /// Fails on store errors, on a duplicate or out-of-order date, and on
    /// analysis validation errors. The observation is only appended once
    /// analysis succeeded.
    pub fn run(&mut self, current: Observation) -> Result<Analysis> {
        let history = self.store.load_all()?;
        check_append_order(&history, &current)?;

        let analysis = analyze(&history, &current)?;
        self.store.append(&current)?;

        tracing::info!(
            subject = %self.config.subject_id,
            date = %current.date,
            prior_observations = history.len(),
            first_run = analysis.is_first_run(),
            "Observation recorded"
        );
        Ok(analysis)
    }

    /// Re-analyze the latest stored observation without writing anything
    ///
    /// Returns `None` if the series is empty.
    pub fn preview(&self) -> Result<Option<Analysis>> {
        let history = self.store.load_all()?;
        let Some((latest, prior)) = history.split_last() else {
            return Ok(None);
        };

        Ok(Some(analyze(prior, latest)?))
    }

    /// Load the full stored series
    pub fn history(&self) -> Result<Vec<Observation>> {
        Ok(self.store.load_all()?)
    }
}

/// Dedup policy applied before appending
fn check_append_order(history: &[Observation], current: &Observation) -> Result<()> {
    if let Some(last) = history.last() {
        if current.date == last.date {
            return Err(TrackerError::DuplicateDate(current.date).into());
        }
        if current.date < last.date {
            return Err(TrackerError::OutOfOrderDate {
                date: current.date,
                last: last.date,
            }
            .into());
        }
    }
    Ok(())
}
