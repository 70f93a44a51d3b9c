//! Observation sources
//!
//! A source hands the core exactly one [`RawObservation`] per run. How the
//! numbers are obtained (browser automation, an API, a human) is outside this
//! crate; the sources here accept values typed on the command line or a JSON
//! snapshot written by an external scraper.
//!
//! # Snapshot format
//!
//! ```json
//! {
//!   "date": "2024-01-02",
//!   "followers": 1010,
//!   "following": 50,
//!   "likes": 5100,
//!   "latest_post_views": 300
//! }
//! ```
//!
//! `date` is optional and defaults to the run date.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::RawObservation;

/// Errors that can occur while obtaining an observation
#[derive(Debug, Error)]
pub enum SourceError {
    /// Snapshot could not be read
    #[error("Failed to read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot is not a valid observation (missing or non-numeric fields)
    #[error("Malformed snapshot {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Something that produces one observation per run
pub trait ObservationSource {
    /// Get the source name
    fn name(&self) -> &str;

    /// Produce this run's observation
    fn observe(&self) -> Result<RawObservation, SourceError>;
}

/// Source for values given directly, e.g. on the command line
#[derive(Debug, Clone)]
pub struct ManualSource {
    observation: RawObservation,
}

impl ManualSource {
    /// Create a manual source
    pub fn new(observation: RawObservation) -> Self {
        Self { observation }
    }
}

impl ObservationSource for ManualSource {
    fn name(&self) -> &str {
        "manual"
    }

    fn observe(&self) -> Result<RawObservation, SourceError> {
        Ok(self.observation.clone())
    }
}

/// Source reading a JSON snapshot file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source for the given snapshot file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the snapshot path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ObservationSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    fn observe(&self) -> Result<RawObservation, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let observation =
            serde_json::from_str(&content).map_err(|source| SourceError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), "Snapshot loaded");
        Ok(observation)
    }
}
