use anyhow::Result;

use pulsewatch::config::Config;
use pulsewatch::storage::CsvSeriesStore;
use pulsewatch::utils::{format_count, format_delta};

/// Print the stored series, oldest first
pub fn history(config: &Config, last: Option<usize>) -> Result<()> {
    let store = CsvSeriesStore::new(&config.tracker.storage_path)
        .with_policy(config.tracker.on_corrupt);
    let report = store.load_report()?;
    let observations = &report.observations;

    if observations.is_empty() {
        println!("No observations recorded yet in {}", store.path().display());
        return Ok(());
    }

    let start = last.map_or(0, |n| observations.len().saturating_sub(n));

    println!(
        "{:<12} {:>14} {:>10} {:>10} {:>16} {:>16}",
        "date", "followers", "change", "following", "likes", "latest views"
    );
    println!("{}", "-".repeat(83));

    for (i, obs) in observations.iter().enumerate().skip(start) {
        let change = match i.checked_sub(1).map(|p| &observations[p]) {
            Some(prev) => format_delta(obs.followers, prev.followers),
            None => String::from("-"),
        };
        println!(
            "{:<12} {:>14} {:>10} {:>10} {:>16} {:>16}",
            obs.date.to_string(),
            format_count(obs.followers),
            change,
            format_count(obs.following),
            format_count(obs.likes),
            format_count(obs.latest_post_views),
        );
    }

    println!(
        "\n{} of {} observations shown",
        observations.len() - start,
        observations.len()
    );

    if !report.skipped_lines.is_empty() {
        println!("Skipped corrupt lines: {:?}", report.skipped_lines);
    }

    Ok(())
}
