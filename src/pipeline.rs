//! One recording run, from observation source to delivered report
//!
//! [`record`] ends in one of three ways, and the report it sends says which:
//!
//! - nothing recorded: a failure report built by [`Report::failure`];
//! - recorded and rendered: the daily report;
//! - recorded but not rendered: a failure report built by
//!   [`Report::unrendered`] that still carries the analysis.

use chrono::NaiveDate;

use crate::analytics::Analysis;
use crate::error::{PulsewatchErrorTrait, Result};
use crate::models::Observation;
use crate::notifications::{DeliveryStatus, NotificationManager};
use crate::report::{Report, ReportError, ReportRenderer};
use crate::source::ObservationSource;
use crate::storage::SeriesStore;
use crate::tracker::Tracker;

/// How a recording run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Observation recorded and the daily report handed to every channel
    Reported {
        analysis: Analysis,
        statuses: Vec<DeliveryStatus>,
    },
    /// Observation recorded, but the daily report could not be rendered
    Unrendered {
        analysis: Analysis,
        error: ReportError,
        statuses: Vec<DeliveryStatus>,
    },
    /// Nothing was recorded
    Failed {
        error: crate::Error,
        statuses: Vec<DeliveryStatus>,
    },
}

impl RunOutcome {
    /// Delivery statuses of whichever report was sent
    pub fn statuses(&self) -> &[DeliveryStatus] {
        match self {
            Self::Reported { statuses, .. }
            | Self::Unrendered { statuses, .. }
            | Self::Failed { statuses, .. } => statuses,
        }
    }

    /// Whether this run appended an observation
    pub fn recorded(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// True if at least one channel exists and none of them got the report
    pub fn undelivered(&self) -> bool {
        let statuses = self.statuses();
        !statuses.is_empty() && statuses.iter().all(|s| !s.delivered)
    }
}

/// Observe, track, render and deliver
///
/// `run_date` dates observations whose source gives no date, and failure
/// reports of runs that never got an observation.
pub async fn record<S: SeriesStore>(
    tracker: &mut Tracker<S>,
    source: &dyn ObservationSource,
    run_date: NaiveDate,
    renderer: &ReportRenderer<'_>,
    notifier: &NotificationManager,
) -> RunOutcome {
    let subject_id = tracker.subject_id().to_string();

    let analysis = match observe(source, run_date).and_then(|obs| tracker.run(obs)) {
        Ok(analysis) => analysis,
        Err(error) => {
            tracing::error!(
                category = %error.category(),
                recoverable = error.is_recoverable(),
                "Tracking run failed: {error}"
            );
            let statuses = notifier
                .deliver(&Report::failure(&subject_id, run_date, &error))
                .await;
            return RunOutcome::Failed { error, statuses };
        }
    };

    match renderer.render(&subject_id, &analysis) {
        Ok(report) => {
            tracing::debug!(channels = ?notifier.channel_names(), "Delivering daily report");
            let statuses = notifier.deliver(&report).await;
            RunOutcome::Reported { analysis, statuses }
        }
        Err(error) => {
            tracing::error!(
                date = %analysis.current().date,
                "Observation recorded but the report could not be rendered: {error}"
            );
            let statuses = notifier
                .deliver(&Report::unrendered(&subject_id, &analysis, &error))
                .await;
            RunOutcome::Unrendered {
                analysis,
                error,
                statuses,
            }
        }
    }
}

fn observe(source: &dyn ObservationSource, run_date: NaiveDate) -> Result<Observation> {
    let raw = source.observe()?;
    tracing::debug!(source = source.name(), "Observation received");
    Ok(raw.into_observation(run_date)?)
}
