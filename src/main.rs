use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulsewatch::config::Config;
use pulsewatch::models::RawObservation;
use pulsewatch::source::{JsonFileSource, ManualSource, ObservationSource};

mod commands;

#[derive(Parser)]
#[command(
    name = "pulsewatch",
    version,
    about = "Daily social profile engagement tracker with delta and trend reports",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to PULSEWATCH_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record today's observation, analyze it and deliver the report
    #[command(allow_negative_numbers = true)]
    Record {
        /// Follower count
        #[arg(long, conflicts_with = "input")]
        followers: Option<i64>,

        /// Following count
        #[arg(long, conflicts_with = "input")]
        following: Option<i64>,

        /// Cumulative like count
        #[arg(long, conflicts_with = "input")]
        likes: Option<i64>,

        /// View count of the latest post
        #[arg(long, alias = "latest-post-views", conflicts_with = "input")]
        views: Option<i64>,

        /// Observation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// JSON snapshot written by an external scraper
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Custom Handlebars report template
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Re-analyze the latest stored observation without recording anything
    Preview {
        /// Custom Handlebars report template
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Print the stored series
    History {
        /// Only show the most recent N observations
        #[arg(short = 'n', long)]
        last: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    config.validate()?;

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "run",
        run_id = %run_id,
        subject = %config.tracker.subject_id
    );

    tracing::info!("pulsewatch starting");
    dispatch(cli.command, &config).instrument(span).await?;
    tracing::info!("pulsewatch completed successfully");
    Ok(())
}

async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Record {
            followers,
            following,
            likes,
            views,
            date,
            input,
            template,
        } => {
            let source: Box<dyn ObservationSource> = match input {
                Some(path) => Box::new(JsonFileSource::new(path)),
                None => {
                    let (Some(followers), Some(following), Some(likes), Some(views)) =
                        (followers, following, likes, views)
                    else {
                        anyhow::bail!(
                            "record needs either --input or all of --followers, --following, --likes and --views"
                        );
                    };
                    Box::new(ManualSource::new(RawObservation {
                        date,
                        followers,
                        following,
                        likes,
                        latest_post_views: views,
                    }))
                }
            };

            tracing::info!(
                source = source.name(),
                date = ?date,
                "Starting record command"
            );
            commands::record(config, source.as_ref(), date, template.as_deref()).await
        }

        Commands::Preview { template } => {
            tracing::info!("Starting preview command");
            commands::preview(config, template.as_deref())
        }

        Commands::History { last } => {
            tracing::info!(last = ?last, "Starting history command");
            commands::history(config, last)
        }
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("pulsewatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("pulsewatch={level},warn")))
    };

    // Logs go to stderr so reports printed on stdout stay clean
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}
