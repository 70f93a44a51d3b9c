use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::Path;

use pulsewatch::config::Config;
use pulsewatch::notifications::NotificationManager;
use pulsewatch::pipeline::{self, RunOutcome};
use pulsewatch::report::ReportRenderer;
use pulsewatch::source::ObservationSource;
use pulsewatch::tracker::Tracker;

/// Record one observation and deliver the resulting report
pub async fn record(
    config: &Config,
    source: &dyn ObservationSource,
    date: Option<NaiveDate>,
    template: Option<&Path>,
) -> Result<()> {
    let renderer = match template {
        Some(path) => ReportRenderer::with_template(path)
            .with_context(|| format!("Failed to load report template: {}", path.display()))?,
        None => ReportRenderer::new().context("Failed to load built-in report template")?,
    };
    let notifier = NotificationManager::from_config(&config.notifications)
        .context("Failed to set up notification channels")?;

    let run_date = date.unwrap_or_else(|| Local::now().date_naive());
    let mut tracker = Tracker::from_config(config.tracker.clone());

    let outcome = pipeline::record(&mut tracker, source, run_date, &renderer, &notifier).await;

    for status in outcome.statuses() {
        if status.delivered {
            tracing::info!(channel = %status.channel, "{status}");
        } else {
            tracing::warn!(channel = %status.channel, "{status}");
        }
    }

    let undelivered = outcome.undelivered();
    match outcome {
        RunOutcome::Reported { .. } if undelivered => {
            anyhow::bail!("Observation recorded but the report could not be delivered")
        }
        RunOutcome::Reported { .. } => Ok(()),
        RunOutcome::Unrendered { error, .. } => Err(anyhow::Error::new(error)
            .context("Observation recorded but the report could not be rendered")),
        RunOutcome::Failed { error, .. } => Err(error.into()),
    }
}
