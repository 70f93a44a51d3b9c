use anyhow::{Context, Result};
use std::path::Path;

use pulsewatch::config::Config;
use pulsewatch::notifications::ConsoleChannel;
use pulsewatch::report::ReportRenderer;
use pulsewatch::tracker::Tracker;

/// Print the report for the latest stored observation without recording anything
pub fn preview(config: &Config, template: Option<&Path>) -> Result<()> {
    let tracker = Tracker::from_config(config.tracker.clone());

    let Some(analysis) = tracker.preview()? else {
        println!(
            "No observations recorded yet for {} in {}",
            config.tracker.subject_id,
            config.tracker.storage_path.display()
        );
        return Ok(());
    };

    let renderer = match template {
        Some(path) => ReportRenderer::with_template(path)
            .with_context(|| format!("Failed to load report template: {}", path.display()))?,
        None => ReportRenderer::new().context("Failed to load built-in report template")?,
    };

    let report = renderer.render(tracker.subject_id(), &analysis)?;
    println!("{}", ConsoleChannel::format(&report));
    Ok(())
}
