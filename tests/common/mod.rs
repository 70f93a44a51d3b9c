//! Common test utilities

use chrono::NaiveDate;
use pulsewatch::models::Observation;

/// First day of every generated series
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Date `offset` days after [`start_date`]
#[allow(dead_code)]
pub fn day(offset: u64) -> NaiveDate {
    start_date() + chrono::Days::new(offset)
}

/// Create an observation with fixed following/likes/views
#[allow(dead_code)]
pub fn create_observation(offset: u64, followers: u64) -> Observation {
    Observation::new(day(offset), followers, 50, 5000 + offset * 100, 200 + offset)
}

/// Create a consecutive daily series from follower counts
#[allow(dead_code)]
pub fn create_series(followers: &[u64]) -> Vec<Observation> {
    followers
        .iter()
        .enumerate()
        .map(|(i, &f)| create_observation(i as u64, f))
        .collect()
}
