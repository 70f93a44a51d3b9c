//! Unified error handling for the pulsewatch crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`PulsewatchErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! The core (store, analytics, tracker) only ever returns these errors; deciding
//! whether a failure gets reported to someone is left to the caller.

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::analytics::AnalysisError;
pub use crate::source::SourceError;
pub use crate::storage::StoreError;
pub use crate::tracker::TrackerError;

/// Common trait for all pulsewatch error types
pub trait PulsewatchErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later run may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Reading or writing the series failed
    Storage,
    /// Persisted data could not be parsed
    Corruption,
    /// Input observation or history was rejected
    Validation,
    /// Observation source failed
    Source,
    /// Configuration errors
    Config,
}

impl ErrorCategory {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Corruption => "corruption",
            Self::Validation => "validation",
            Self::Source => "source",
            Self::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PulsewatchErrorTrait for StoreError {
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Persistence { .. } => ErrorCategory::Storage,
            Self::CorruptRecord { .. } => ErrorCategory::Corruption,
        }
    }
}

impl PulsewatchErrorTrait for AnalysisError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

impl PulsewatchErrorTrait for TrackerError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

impl PulsewatchErrorTrait for SourceError {
    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } => ErrorCategory::Source,
            Self::Malformed { .. } => ErrorCategory::Validation,
        }
    }
}

/// Unified error type for the pulsewatch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Series storage errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Analysis and input validation errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Append policy errors
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Observation source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),
}

impl PulsewatchErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_recoverable(),
            Self::Analysis(e) => e.is_recoverable(),
            Self::Tracker(e) => e.is_recoverable(),
            Self::Source(e) => e.is_recoverable(),
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Store(e) => e.category(),
            Self::Analysis(e) => e.category(),
            Self::Tracker(e) => e.category(),
            Self::Source(e) => e.category(),
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
