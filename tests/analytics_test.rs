//! Integration tests for delta and trend analysis

mod common;

use common::{create_observation, create_series, day};
use proptest::prelude::*;
use pulsewatch::analytics::{analyze, Analysis, Trend, TrendDirection, TREND_WINDOW};
use pulsewatch::models::Observation;

#[test]
fn test_scenario_single_prior_day() {
    let history = vec![Observation::new(day(0), 1000, 50, 5000, 200)];
    let current = Observation::new(day(1), 1010, 50, 5100, 300);

    let analysis = analyze(&history, &current).unwrap();
    let daily = analysis.daily().unwrap();
    assert_eq!(daily.followers, 10);
    assert_eq!(daily.following, 0);
    assert_eq!(daily.likes, 100);
    assert_eq!(daily.latest_post_views, 300);

    let weekly = analysis.weekly().unwrap();
    assert_eq!(weekly.followers, 10);
    assert_eq!(weekly.following, 0);
    assert_eq!(weekly.likes, 100);

    assert!(matches!(
        analysis.trend(),
        Some(Trend::InsufficientData { available: 1, .. })
    ));
}

#[test]
fn test_scenario_full_week() {
    let history = create_series(&[1000, 1005, 1010, 1012, 1020, 1025, 1030]);
    let current = create_observation(7, 1040);

    let analysis = analyze(&history, &current).unwrap();
    assert_eq!(analysis.daily().unwrap().followers, 10);
    assert_eq!(analysis.weekly().unwrap().followers, 40);

    let summary = analysis.trend().and_then(Trend::summary).unwrap();
    assert_eq!(summary.avg_daily_follower_growth, 5);
    assert_eq!(summary.direction, TrendDirection::Rising);
    assert_eq!(summary.window_start, day(0));
    assert_eq!(summary.window_end, day(6));
}

#[test]
fn test_empty_history_is_first_run() {
    let current = create_observation(0, 1000);
    let analysis = analyze(&[], &current).unwrap();

    assert!(analysis.is_first_run());
    assert!(analysis.daily().is_none());
    assert!(analysis.weekly().is_none());
    assert!(analysis.trend().is_none());
}

#[test]
fn test_follower_loss_reports_negative_deltas() {
    let history = create_series(&[1000, 990, 980, 970, 960, 950, 940]);
    let current = create_observation(7, 930);

    let analysis = analyze(&history, &current).unwrap();
    assert_eq!(analysis.daily().unwrap().followers, -10);
    assert_eq!(analysis.weekly().unwrap().followers, -70);

    let summary = analysis.trend().and_then(Trend::summary).unwrap();
    assert_eq!(summary.avg_daily_follower_growth, -10);
    assert_eq!(summary.direction, TrendDirection::Falling);
}

#[test]
fn test_unordered_history_fails_closed() {
    let mut history = create_series(&[1000, 1005]);
    history.swap(0, 1);

    assert!(analyze(&history, &create_observation(2, 1010)).is_err());
    assert!(analyze(&create_series(&[1000, 1005]), &create_observation(1, 1010)).is_err());
}

fn followers_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..10_000_000, 1..20)
}

proptest! {
    #[test]
    fn prop_daily_delta_matches_last_entry(followers in followers_strategy(), today in 0u64..10_000_000) {
        let history = create_series(&followers);
        let current = create_observation(history.len() as u64, today);
        let last = history.last().unwrap();

        let analysis = analyze(&history, &current).unwrap();
        let daily = analysis.daily().unwrap();

        prop_assert_eq!(daily.followers, today as i64 - last.followers as i64);
        prop_assert_eq!(daily.likes, current.likes as i64 - last.likes as i64);
        prop_assert_eq!(daily.latest_post_views, current.latest_post_views);
    }

    #[test]
    fn prop_weekly_baseline_falls_back_to_last_entry(followers in followers_strategy(), today in 0u64..10_000_000) {
        let history = create_series(&followers);
        let current = create_observation(history.len() as u64, today);

        let Analysis::Tracked(comparison) = analyze(&history, &current).unwrap() else {
            panic!("non-empty history must produce a comparison");
        };

        let baseline = if history.len() >= 7 {
            history[history.len() - 7]
        } else {
            *history.last().unwrap()
        };

        prop_assert_eq!(comparison.weekly_baseline, baseline.date);
        prop_assert_eq!(comparison.weekly.followers, today as i64 - baseline.followers as i64);
        if history.len() < 7 {
            prop_assert_eq!(comparison.weekly.followers, comparison.daily.followers);
        }
    }

    #[test]
    fn prop_trend_requires_full_window(followers in followers_strategy()) {
        let history = create_series(&followers);
        let current = create_observation(history.len() as u64, 0);

        let analysis = analyze(&history, &current).unwrap();
        match analysis.trend().unwrap() {
            Trend::InsufficientData { available, required } => {
                prop_assert!(history.len() < TREND_WINDOW);
                prop_assert_eq!(*available, history.len());
                prop_assert_eq!(*required, TREND_WINDOW);
            }
            Trend::Computed(summary) => {
                prop_assert!(history.len() >= TREND_WINDOW);

                let window = &followers[followers.len() - TREND_WINDOW..];
                let steps: Vec<i64> = window.windows(2).map(|w| w[1] as i64 - w[0] as i64).collect();
                let min = *steps.iter().min().unwrap();
                let max = *steps.iter().max().unwrap();
                prop_assert!(summary.avg_daily_follower_growth >= min);
                prop_assert!(summary.avg_daily_follower_growth <= max);

                let expected = match summary.avg_daily_follower_growth {
                    a if a > 0 => TrendDirection::Rising,
                    a if a < 0 => TrendDirection::Falling,
                    _ => TrendDirection::Flat,
                };
                prop_assert_eq!(summary.direction, expected);
            }
        }
    }
}
