//! Report rendering with Handlebars template engine
//!
//! Turns an [`Analysis`] into a plain-text [`Report`] that notification
//! channels can deliver. The structured analysis travels along with the text
//! so machine-facing channels (webhooks) do not have to parse it back.

use chrono::{DateTime, NaiveDate, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::analytics::{Analysis, Trend};
use crate::models::Observation;
use crate::utils::{format_count, format_signed, truncate_text};

/// Default report template
const DEFAULT_TEMPLATE: &str = include_str!("../../templates/report.hbs");

const TEMPLATE_NAME: &str = "report";

/// Errors that can occur while rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid report template: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Failed to render report: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Kind of report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Regular daily analysis
    Daily,
    /// The run failed before an analysis was produced
    Failure,
}

impl ReportKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Failure => "failure",
        }
    }
}

/// Rendered report ready for delivery
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub subject_id: String,
    /// Short one-line summary (e.g. an email subject)
    pub title: String,
    /// Rendered plain-text body
    pub body: String,
    /// Structured analysis, present for daily reports
    pub analysis: Option<Analysis>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Build a failure report for a run that recorded nothing
    pub fn failure(subject_id: &str, date: NaiveDate, error: &dyn std::fmt::Display) -> Self {
        let message = error.to_string();
        Self {
            kind: ReportKind::Failure,
            subject_id: subject_id.to_string(),
            title: format!(
                "{subject_id}: tracking failed on {date} ({})",
                truncate_text(&message, 60)
            ),
            body: format!(
                "Tracking run for {subject_id} on {date} failed.\n\nError: {message}\n\nNo observation was recorded for this run.\n"
            ),
            analysis: None,
            generated_at: Utc::now(),
        }
    }

    /// Build a failure report for a run whose observation was recorded but
    /// whose daily report could not be rendered
    ///
    /// Carries the analysis of the recorded observation.
    pub fn unrendered(
        subject_id: &str,
        analysis: &Analysis,
        error: &dyn std::fmt::Display,
    ) -> Self {
        let current = analysis.current();
        Self {
            kind: ReportKind::Failure,
            subject_id: subject_id.to_string(),
            title: format!(
                "{subject_id}: observation for {} recorded, report rendering failed",
                current.date
            ),
            body: format!(
                "The observation for {subject_id} on {} was recorded ({} followers), \
                 but the daily report could not be rendered.\n\nError: {error}\n\n\
                 Do not record this date again. Fix the template and preview the report instead.\n",
                current.date,
                format_count(current.followers)
            ),
            analysis: Some(analysis.clone()),
            generated_at: Utc::now(),
        }
    }
}

/// Template data for rendering
#[derive(Debug, Serialize)]
struct ReportTemplateData {
    subject_id: String,
    date: String,
    first_run: bool,
    current: CurrentView,
    previous_date: Option<String>,
    daily: Option<DailyView>,
    weekly_baseline: Option<String>,
    weekly: Option<WeeklyView>,
    trend: Option<TrendView>,
}

#[derive(Debug, Serialize)]
struct CurrentView {
    followers: String,
    following: String,
    likes: String,
    latest_post_views: String,
}

impl From<&Observation> for CurrentView {
    fn from(observation: &Observation) -> Self {
        Self {
            followers: format_count(observation.followers),
            following: format_count(observation.following),
            likes: format_count(observation.likes),
            latest_post_views: format_count(observation.latest_post_views),
        }
    }
}

#[derive(Debug, Serialize)]
struct DailyView {
    followers: String,
    following: String,
    likes: String,
    latest_post_views: String,
}

#[derive(Debug, Serialize)]
struct WeeklyView {
    followers: String,
    following: String,
    likes: String,
}

#[derive(Debug, Serialize)]
struct TrendView {
    computed: bool,
    direction: Option<String>,
    emoji: Option<String>,
    follower_growth: Option<String>,
    like_growth: Option<String>,
    window_start: Option<String>,
    window_end: Option<String>,
    available: Option<usize>,
    required: Option<usize>,
}

impl From<&Trend> for TrendView {
    fn from(trend: &Trend) -> Self {
        match trend {
            Trend::Computed(summary) => Self {
                computed: true,
                direction: Some(summary.direction.as_str().to_string()),
                emoji: Some(summary.direction.emoji().to_string()),
                follower_growth: Some(format_signed(summary.avg_daily_follower_growth)),
                like_growth: Some(format_signed(summary.avg_daily_like_growth)),
                window_start: Some(summary.window_start.to_string()),
                window_end: Some(summary.window_end.to_string()),
                available: None,
                required: None,
            },
            Trend::InsufficientData {
                available,
                required,
            } => Self {
                computed: false,
                direction: None,
                emoji: None,
                follower_growth: None,
                like_growth: None,
                window_start: None,
                window_end: None,
                available: Some(*available),
                required: Some(*required),
            },
        }
    }
}

impl ReportTemplateData {
    fn new(subject_id: &str, analysis: &Analysis) -> Self {
        let current = analysis.current();
        let comparison = analysis.comparison();

        Self {
            subject_id: subject_id.to_string(),
            date: current.date.to_string(),
            first_run: analysis.is_first_run(),
            current: CurrentView::from(current),
            previous_date: comparison.map(|c| c.previous_date.to_string()),
            daily: comparison.map(|c| DailyView {
                followers: format_signed(c.daily.followers),
                following: format_signed(c.daily.following),
                likes: format_signed(c.daily.likes),
                latest_post_views: format_count(c.daily.latest_post_views),
            }),
            weekly_baseline: comparison.map(|c| c.weekly_baseline.to_string()),
            weekly: comparison.map(|c| WeeklyView {
                followers: format_signed(c.weekly.followers),
                following: format_signed(c.weekly.following),
                likes: format_signed(c.weekly.likes),
            }),
            trend: comparison.map(|c| TrendView::from(&c.trend)),
        }
    }
}

/// Report renderer with Handlebars template engine
pub struct ReportRenderer<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> ReportRenderer<'a> {
    /// Create a renderer with the built-in template
    pub fn new() -> Result<Self, ReportError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(TEMPLATE_NAME, DEFAULT_TEMPLATE)?;

        Ok(Self { handlebars })
    }

    /// Create a renderer with a custom template file
    ///
    /// # Arguments
    /// * `template_path` - Path to custom Handlebars template
    pub fn with_template(template_path: &Path) -> Result<Self, ReportError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_file(TEMPLATE_NAME, template_path)?;

        Ok(Self { handlebars })
    }

    /// Render a daily report for an analysis
    pub fn render(&self, subject_id: &str, analysis: &Analysis) -> Result<Report, ReportError> {
        let data = ReportTemplateData::new(subject_id, analysis);
        let body = self.handlebars.render(TEMPLATE_NAME, &data)?;

        Ok(Report {
            kind: ReportKind::Daily,
            subject_id: subject_id.to_string(),
            title: title_for(subject_id, analysis),
            body,
            analysis: Some(analysis.clone()),
            generated_at: Utc::now(),
        })
    }
}

fn title_for(subject_id: &str, analysis: &Analysis) -> String {
    let current = analysis.current();
    match analysis.daily() {
        Some(daily) => format!(
            "{subject_id} daily report {}: {} followers ({})",
            current.date,
            format_count(current.followers),
            format_signed(daily.followers)
        ),
        None => format!(
            "{subject_id} daily report {}: {} followers (first run)",
            current.date,
            format_count(current.followers)
        ),
    }
}
