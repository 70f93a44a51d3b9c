// Core data structures for pulsewatch

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalysisError;

/// Largest count a stored observation may hold
///
/// Any two counts up to this bound differ by an amount that fits in an `i64`.
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// One calendar day's snapshot of a profile's engagement metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate, // Unique key within a series
    pub followers: u64,
    pub following: u64,
    pub likes: u64,             // Cumulative likes across all posts
    pub latest_post_views: u64, // Views on the most recent post only
}

impl Observation {
    /// Create a new observation
    #[must_use]
    pub fn new(
        date: NaiveDate,
        followers: u64,
        following: u64,
        likes: u64,
        latest_post_views: u64,
    ) -> Self {
        Self {
            date,
            followers,
            following,
            likes,
            latest_post_views,
        }
    }

    /// Get the value of a single metric
    #[must_use]
    pub fn metric(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Followers => self.followers,
            Metric::Following => self.following,
            Metric::Likes => self.likes,
            Metric::LatestPostViews => self.latest_post_views,
        }
    }
}

/// Tracked engagement metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Followers,
    Following,
    Likes,
    LatestPostViews,
}

impl Metric {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
            Self::Likes => "likes",
            Self::LatestPostViews => "latest_post_views",
        }
    }

    /// Get all metrics in storage column order
    pub fn all() -> [Self; 4] {
        [
            Self::Followers,
            Self::Following,
            Self::Likes,
            Self::LatestPostViews,
        ]
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unvalidated observation as handed over by an observation source
///
/// Metrics are signed so that a source reporting a negative count can be
/// rejected with a clear message instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Observation date; the run date is used when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub followers: i64,
    pub following: i64,
    pub likes: i64,
    #[serde(alias = "latest_video_views")]
    pub latest_post_views: i64,
}

impl RawObservation {
    /// Validate metrics and resolve the observation date
    ///
    /// # Errors
    /// Returns `AnalysisError::Validation` if any metric is negative.
    pub fn into_observation(self, run_date: NaiveDate) -> Result<Observation, AnalysisError> {
        let non_negative = |metric: Metric, value: i64| -> Result<u64, AnalysisError> {
            u64::try_from(value).map_err(|_| {
                AnalysisError::Validation(format!("{metric} must be non-negative, got {value}"))
            })
        };

        Ok(Observation {
            date: self.date.unwrap_or(run_date),
            followers: non_negative(Metric::Followers, self.followers)?,
            following: non_negative(Metric::Following, self.following)?,
            likes: non_negative(Metric::Likes, self.likes)?,
            latest_post_views: non_negative(Metric::LatestPostViews, self.latest_post_views)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_metric_accessor() {
        let obs = Observation::new(date("2024-01-01"), 1000, 50, 5000, 200);
        assert_eq!(obs.metric(Metric::Followers), 1000);
        assert_eq!(obs.metric(Metric::Following), 50);
        assert_eq!(obs.metric(Metric::Likes), 5000);
        assert_eq!(obs.metric(Metric::LatestPostViews), 200);
    }

    #[test]
    fn test_raw_observation_uses_run_date_when_missing() {
        let raw = RawObservation {
            date: None,
            followers: 10,
            following: 2,
            likes: 30,
            latest_post_views: 4,
        };

        let obs = raw.into_observation(date("2024-03-05")).unwrap();
        assert_eq!(obs.date, date("2024-03-05"));
        assert_eq!(obs.followers, 10);
    }

    #[test]
    fn test_raw_observation_keeps_explicit_date() {
        let raw = RawObservation {
            date: Some(date("2024-03-01")),
            followers: 1,
            following: 1,
            likes: 1,
            latest_post_views: 1,
        };

        let obs = raw.into_observation(date("2024-03-05")).unwrap();
        assert_eq!(obs.date, date("2024-03-01"));
    }

    #[test]
    fn test_raw_observation_rejects_negative() {
        let raw = RawObservation {
            date: None,
            followers: 10,
            following: 2,
            likes: -1,
            latest_post_views: 4,
        };

        let err = raw.into_observation(date("2024-03-05")).unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(ref msg) if msg.contains("likes")));
    }

    #[test]
    fn test_raw_observation_accepts_legacy_views_key() {
        let json = r#"{"followers": 5, "following": 1, "likes": 9, "latest_video_views": 12}"#;
        let raw: RawObservation = serde_json::from_str(json).unwrap();
        assert_eq!(raw.latest_post_views, 12);
        assert!(raw.date.is_none());
    }

    #[test]
    fn test_raw_observation_rejects_non_numeric() {
        let json = r#"{"followers": "many", "following": 1, "likes": 9, "latest_post_views": 12}"#;
        assert!(serde_json::from_str::<RawObservation>(json).is_err());
    }
}
