//! Analytics over the daily observation series

pub mod engine;

pub use engine::{
    analyze, checked_delta, compute_trend, round_half_away_from_zero, Analysis, AnalysisError,
    AnalysisResult, Comparison, DailyDeltas, MetricDeltas, Trend, TrendDirection, TrendSummary,
    TREND_WINDOW, WEEKLY_LOOKBACK,
};
