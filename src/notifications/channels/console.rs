//! Console notification channel
//!
//! Prints reports to standard output, which is also what a cron mailer picks
//! up when the binary runs unattended.

use async_trait::async_trait;
use std::io::Write;

use super::{Channel, ChannelResult};
use crate::report::Report;

/// Console channel writing reports to stdout
#[derive(Debug, Clone, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    /// Create a new console channel
    pub fn new() -> Self {
        Self
    }

    /// Format a report the way it is printed
    pub fn format(report: &Report) -> String {
        let rule = "=".repeat(report.title.chars().count().min(72));
        format!("{}\n{rule}\n{}", report.title, report.body)
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, report: &Report) -> ChannelResult<()> {
        write_stdout(&Self::format(report))?;
        Ok(())
    }
}

fn write_stdout(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}
