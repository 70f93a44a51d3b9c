//! Day-over-day, week-over-week and 7-day trend analysis
//!
//! [`analyze`] compares the newest observation against the persisted history
//! (which never includes the newest observation itself):
//!
//! - **daily**: signed delta against the last history entry. Latest post
//!   views are carried as an absolute value since consecutive days may refer
//!   to different posts.
//! - **weekly**: signed delta against the entry seven positions back, or
//!   against the last entry while fewer than seven exist.
//! - **trend**: average of the six day-over-day steps inside the last seven
//!   history entries, rounded half away from zero. Only available once seven
//!   entries exist.
//!
//! Every delta must fit in an `i64`. A pair of counts whose difference does
//! not fit fails the whole analysis instead of being clamped.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Metric, Observation};

/// Number of history entries in the trend window
pub const TREND_WINDOW: usize = 7;

/// How many entries back the weekly comparison looks
pub const WEEKLY_LOOKBACK: usize = 7;

/// Errors that can occur during analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Signed per-metric deltas for the cumulative metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricDeltas {
    pub followers: i64,
    pub following: i64,
    pub likes: i64,
}

impl MetricDeltas {
    /// Compute `current - baseline` for followers, following and likes
    ///
    /// # Errors
    /// Returns `AnalysisError::Validation` if a delta does not fit in an `i64`.
    pub fn between(current: &Observation, baseline: &Observation) -> AnalysisResult<Self> {
        Ok(Self {
            followers: metric_delta(current, baseline, Metric::Followers)?,
            following: metric_delta(current, baseline, Metric::Following)?,
            likes: metric_delta(current, baseline, Metric::Likes)?,
        })
    }
}

/// Day-over-day comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyDeltas {
    pub followers: i64,
    pub following: i64,
    pub likes: i64,
    /// Absolute view count of the latest post, not a delta
    pub latest_post_views: u64,
}

impl DailyDeltas {
    fn between(current: &Observation, yesterday: &Observation) -> AnalysisResult<Self> {
        let deltas = MetricDeltas::between(current, yesterday)?;
        Ok(Self {
            followers: deltas.followers,
            following: deltas.following,
            likes: deltas.likes,
            latest_post_views: current.latest_post_views,
        })
    }
}

/// Trend direction indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

impl TrendDirection {
    /// Determine trend direction from an average daily growth
    #[must_use]
    pub fn from_average(average: i64) -> Self {
        match average.signum() {
            1 => Self::Rising,
            -1 => Self::Falling,
            _ => Self::Flat,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Flat => "flat",
        }
    }

    /// Get emoji representation
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Rising => "📈",
            Self::Falling => "📉",
            Self::Flat => "➡️",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Computed 7-day trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendSummary {
    pub avg_daily_follower_growth: i64,
    pub avg_daily_like_growth: i64,
    /// Derived from the rounded follower average
    pub direction: TrendDirection,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
}

/// 7-day trend, or a marker explaining why none is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Trend {
    InsufficientData { available: usize, required: usize },
    Computed(TrendSummary),
}

impl Trend {
    /// Get the computed summary, if any
    #[must_use]
    pub fn summary(&self) -> Option<&TrendSummary> {
        match self {
            Self::Computed(summary) => Some(summary),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Comparison of the newest observation against prior history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub current: Observation,
    /// Date of the most recent prior observation
    pub previous_date: NaiveDate,
    pub daily: DailyDeltas,
    pub weekly: MetricDeltas,
    /// Date of the observation the weekly deltas are measured against
    pub weekly_baseline: NaiveDate,
    pub trend: Trend,
    /// Number of prior observations
    pub history_len: usize,
}

/// Outcome of analyzing one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    /// No prior history existed
    FirstRun { current: Observation },
    /// At least one prior observation existed
    Tracked(Comparison),
}

impl Analysis {
    /// True iff the history was empty before this run
    #[must_use]
    pub fn is_first_run(&self) -> bool {
        matches!(self, Self::FirstRun { .. })
    }

    /// The observation this analysis was computed for
    #[must_use]
    pub fn current(&self) -> &Observation {
        match self {
            Self::FirstRun { current } => current,
            Self::Tracked(comparison) => &comparison.current,
        }
    }

    /// Get the comparison, absent on first run
    #[must_use]
    pub fn comparison(&self) -> Option<&Comparison> {
        match self {
            Self::Tracked(comparison) => Some(comparison),
            Self::FirstRun { .. } => None,
        }
    }

    #[must_use]
    pub fn daily(&self) -> Option<&DailyDeltas> {
        self.comparison().map(|c| &c.daily)
    }

    #[must_use]
    pub fn weekly(&self) -> Option<&MetricDeltas> {
        self.comparison().map(|c| &c.weekly)
    }

    #[must_use]
    pub fn trend(&self) -> Option<&Trend> {
        self.comparison().map(|c| &c.trend)
    }
}

/// Analyze the newest observation against its prior history
///
/// # Arguments
/// * `history` - Prior observations, strictly ascending by date
/// * `current` - The newest observation, dated after every history entry
///
/// # Errors
/// Returns `AnalysisError::Validation` if the dates are not strictly
/// ascending, or if a delta does not fit in an `i64`. No partial analysis
/// is ever produced.
pub fn analyze(history: &[Observation], current: &Observation) -> AnalysisResult<Analysis> {
    validate_order(history, current)?;

    let Some(yesterday) = history.last() else {
        return Ok(Analysis::FirstRun { current: *current });
    };

    let week_ago = if history.len() >= WEEKLY_LOOKBACK {
        &history[history.len() - WEEKLY_LOOKBACK]
    } else {
        yesterday
    };

    Ok(Analysis::Tracked(Comparison {
        current: *current,
        previous_date: yesterday.date,
        daily: DailyDeltas::between(current, yesterday)?,
        weekly: MetricDeltas::between(current, week_ago)?,
        weekly_baseline: week_ago.date,
        trend: compute_trend(history)?,
        history_len: history.len(),
    }))
}

/// Compute the 7-day trend over the tail of the history
///
/// The six steps inside the window telescope, so their sum is the change
/// between the first and last window entries.
///
/// # Errors
/// Returns `AnalysisError::Validation` if the window growth does not fit in
/// an `i64`.
pub fn compute_trend(history: &[Observation]) -> AnalysisResult<Trend> {
    if history.len() < TREND_WINDOW {
        return Ok(Trend::InsufficientData {
            available: history.len(),
            required: TREND_WINDOW,
        });
    }

    let window = &history[history.len() - TREND_WINDOW..];
    let (first, last) = (&window[0], &window[TREND_WINDOW - 1]);
    let steps = (TREND_WINDOW - 1) as i64;

    let avg_followers =
        round_half_away_from_zero(metric_delta(last, first, Metric::Followers)?, steps);
    let avg_likes = round_half_away_from_zero(metric_delta(last, first, Metric::Likes)?, steps);

    Ok(Trend::Computed(TrendSummary {
        avg_daily_follower_growth: avg_followers,
        avg_daily_like_growth: avg_likes,
        direction: TrendDirection::from_average(avg_followers),
        window_start: first.date,
        window_end: last.date,
    }))
}

/// Integer division rounded to nearest, ties away from zero
///
/// `denominator` must be positive.
#[must_use]
pub fn round_half_away_from_zero(numerator: i64, denominator: i64) -> i64 {
    debug_assert!(denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if 2 * remainder.abs() >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

/// Exact `current - baseline`, or `None` if it does not fit in an `i64`
#[must_use]
pub fn checked_delta(current: u64, baseline: u64) -> Option<i64> {
    i64::try_from(i128::from(current) - i128::from(baseline)).ok()
}

fn metric_delta(current: &Observation, baseline: &Observation, metric: Metric) -> AnalysisResult<i64> {
    let (now, then) = (current.metric(metric), baseline.metric(metric));
    checked_delta(now, then).ok_or_else(|| {
        AnalysisError::Validation(format!(
            "{metric} change from {then} ({}) to {now} ({}) is out of range",
            baseline.date, current.date
        ))
    })
}

fn validate_order(history: &[Observation], current: &Observation) -> AnalysisResult<()> {
    if let Some(pair) = history.windows(2).find(|pair| pair[0].date >= pair[1].date) {
        return Err(AnalysisError::Validation(format!(
            "history is not in ascending date order: {} is followed by {}",
            pair[0].date, pair[1].date
        )));
    }

    if let Some(last) = history.last() {
        if current.date <= last.date {
            return Err(AnalysisError::Validation(format!(
                "current observation {} is not after the last recorded date {}",
                current.date, last.date
            )));
        }
    }

    Ok(())
}
