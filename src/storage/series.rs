//! Append-only daily observation log
//!
//! Observations are persisted as plain CSV, one record per line:
//!
//! ```text
//! date,followers,following,likes,latest_video_views
//! 2024-01-01,1000,50,5000,200
//! 2024-01-02,1010,50,5100,300
//! ```
//!
//! The header is written exactly once, before the first data row. Records are
//! only ever appended; nothing is rewritten or deleted. The store does not
//! deduplicate dates, that is the appending caller's job.
//!
//! # Corrupt records
//!
//! What happens to a line that cannot be parsed is decided by
//! [`CorruptRecordPolicy`]:
//!
//! - [`CorruptRecordPolicy::Abort`] (default) fails the whole load with
//!   [`StoreError::CorruptRecord`] at the first bad line.
//! - [`CorruptRecordPolicy::Skip`] drops the bad line, logs a warning and
//!   reports its line number in [`LoadReport::skipped_lines`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Metric, Observation, MAX_COUNT};

/// Fixed header line of the series file
pub const HEADER: &str = "date,followers,following,likes,latest_video_views";

/// Date format used in the series file
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const FIELD_COUNT: usize = 5;

/// Errors that can occur while reading or writing a series
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing medium could not be read or written
    #[error("Failed to {action} series file {}: {source}", path.display())]
    Persistence {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persisted record could not be parsed into an observation
    #[error("Corrupt record at line {line}: {reason}")]
    CorruptRecord { line: usize, reason: String },
}

impl StoreError {
    fn persistence(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Persistence {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Policy for records that cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptRecordPolicy {
    /// Fail the load at the first corrupt record
    #[default]
    Abort,
    /// Skip corrupt records with a warning
    Skip,
}

impl CorruptRecordPolicy {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Skip => "skip",
        }
    }
}

impl FromStr for CorruptRecordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown corrupt record policy '{other}' (expected 'abort' or 'skip')"
            )),
        }
    }
}

impl std::fmt::Display for CorruptRecordPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a full series load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Parsed observations in file order
    pub observations: Vec<Observation>,

    /// 1-based line numbers dropped under [`CorruptRecordPolicy::Skip`]
    pub skipped_lines: Vec<usize>,
}

/// Append-only storage for a daily observation series
pub trait SeriesStore {
    /// Append an observation to the end of the persisted series
    ///
    /// # Errors
    /// Returns `StoreError::Persistence` if the medium cannot be written.
    fn append(&mut self, observation: &Observation) -> Result<(), StoreError>;

    /// Load every previously persisted observation, oldest first
    ///
    /// An empty or missing series is not an error.
    ///
    /// # Errors
    /// Returns `StoreError::Persistence` if the medium cannot be read, or
    /// `StoreError::CorruptRecord` under [`CorruptRecordPolicy::Abort`].
    fn load_all(&self) -> Result<Vec<Observation>, StoreError>;
}

/// CSV file backed series store
#[derive(Debug, Clone)]
pub struct CsvSeriesStore {
    path: PathBuf,
    policy: CorruptRecordPolicy,
}

impl CsvSeriesStore {
    /// Create a store for the given file; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: CorruptRecordPolicy::default(),
        }
    }

    /// Set the corrupt record policy
    #[must_use]
    pub fn with_policy(mut self, policy: CorruptRecordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the series file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the corrupt record policy
    pub fn policy(&self) -> CorruptRecordPolicy {
        self.policy
    }

    /// Load the series along with the lines skipped while parsing
    ///
    /// A missing file is an empty series.
    ///
    /// # Errors
    /// Returns `StoreError::Persistence` if the file exists but cannot be
    /// read, and `StoreError::CorruptRecord` for the first unparsable line
    /// under [`CorruptRecordPolicy::Abort`].
    pub fn load_report(&self) -> Result<LoadReport, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Series file not found, starting empty");
            return Ok(LoadReport::default());
        }

        let text = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::persistence("read", &self.path, e))?;

        let report = parse_series(&text, self.policy)?;

        tracing::debug!(
            path = %self.path.display(),
            records = report.observations.len(),
            skipped = report.skipped_lines.len(),
            "Series loaded"
        );
        Ok(report)
    }

    /// Text that must precede the next record in an already opened file
    ///
    /// A file with no non-blank content gets the header, whatever its length.
    /// Existing text never ends up sharing a line with the new record.
    fn pending_prefix(file: &mut File) -> io::Result<String> {
        let mut existing = String::new();
        file.read_to_string(&mut existing)?;

        let mut prefix = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            prefix.push('\n');
        }
        if existing.trim().is_empty() {
            prefix.push_str(HEADER);
            prefix.push('\n');
        }
        Ok(prefix)
    }
}

impl SeriesStore for CsvSeriesStore {
    fn append(&mut self, observation: &Observation) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::persistence("create directory for", &self.path, e))?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| StoreError::persistence("open", &self.path, e))?;

        let mut buffer = Self::pending_prefix(&mut file)
            .map_err(|e| StoreError::persistence("read", &self.path, e))?;
        let header_written = buffer.contains(HEADER);
        buffer.push_str(&format_record(observation));
        buffer.push('\n');

        file.write_all(buffer.as_bytes())
            .and_then(|()| file.sync_data())
            .map_err(|e| StoreError::persistence("write", &self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            date = %observation.date,
            header_written,
            "Observation appended"
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Observation>, StoreError> {
        self.load_report().map(|report| report.observations)
    }
}

/// In-memory series store
#[derive(Debug, Clone, Default)]
pub struct MemorySeriesStore {
    observations: Vec<Observation>,
}

impl MemorySeriesStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl SeriesStore for MemorySeriesStore {
    fn append(&mut self, observation: &Observation) -> Result<(), StoreError> {
        self.observations.push(*observation);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Observation>, StoreError> {
        Ok(self.observations.clone())
    }
}

/// Format an observation as a CSV record (without line terminator)
pub fn format_record(observation: &Observation) -> String {
    format!(
        "{},{},{},{},{}",
        observation.date.format(DATE_FORMAT),
        observation.followers,
        observation.following,
        observation.likes,
        observation.latest_post_views,
    )
}

/// Parse a single CSV record into an observation
///
/// Returns a human-readable reason on failure.
pub fn parse_record(record: &str) -> Result<Observation, String> {
    let fields: Vec<&str> = record.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        ));
    }

    let date = NaiveDate::parse_from_str(fields[0], DATE_FORMAT)
        .map_err(|e| format!("invalid date '{}': {e}", fields[0]))?;

    let mut values = [0u64; 4];
    for ((value, metric), raw) in values.iter_mut().zip(Metric::all()).zip(&fields[1..]) {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid {metric} value '{raw}'"));
        }
        *value = raw
            .parse::<u64>()
            .ok()
            .filter(|v| *v <= MAX_COUNT)
            .ok_or_else(|| format!("{metric} value '{raw}' is out of range"))?;
    }

    Ok(Observation::new(
        date, values[0], values[1], values[2], values[3],
    ))
}

/// Parse the full contents of a series file
///
/// Blank lines are ignored. The first non-blank line must be [`HEADER`].
pub fn parse_series(text: &str, policy: CorruptRecordPolicy) -> Result<LoadReport, StoreError> {
    let mut report = LoadReport::default();
    let mut header_seen = false;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let parsed = if header_seen {
            parse_record(line)
        } else {
            header_seen = true;
            if line.trim() == HEADER {
                continue;
            }
            Err(format!("expected header '{HEADER}', found '{line}'"))
        };

        match parsed {
            Ok(observation) => report.observations.push(observation),
            Err(reason) => match policy {
                CorruptRecordPolicy::Abort => {
                    return Err(StoreError::CorruptRecord {
                        line: line_no,
                        reason,
                    });
                }
                CorruptRecordPolicy::Skip => {
                    tracing::warn!(line = line_no, reason = %reason, "Skipping corrupt series record");
                    report.skipped_lines.push(line_no);
                }
            },
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn obs(day: &str, followers: u64) -> Observation {
        Observation::new(date(day), followers, 50, 5000, 200)
    }

    #[test]
    fn test_format_and_parse_record() {
        let record = format_record(&obs("2024-01-01", 1000));
        assert_eq!(record, "2024-01-01,1000,50,5000,200");
        assert_eq!(parse_record(&record).unwrap(), obs("2024-01-01", 1000));
    }

    #[test]
    fn test_parse_record_rejects_bad_fields() {
        assert!(parse_record("2024-01-01,1000,50,5000").is_err());
        assert!(parse_record("2024-13-01,1000,50,5000,200").is_err());
        assert!(parse_record("2024-01-01,1,000,50,5000,200").is_err());
        assert!(parse_record("2024-01-01,-5,50,5000,200").is_err());
        assert!(parse_record("2024-01-01,abc,50,5000,200")
            .unwrap_err()
            .contains("followers"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = CsvSeriesStore::new(temp_dir.path().join("missing.csv"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_header_written_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/series.csv");
        let mut store = CsvSeriesStore::new(&path);

        store.append(&obs("2024-01-01", 1000)).unwrap();
        store.append(&obs("2024-01-02", 1010)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches(HEADER).count(), 1);
        assert_eq!(
            text,
            format!("{HEADER}\n2024-01-01,1000,50,5000,200\n2024-01-02,1010,50,5000,200\n")
        );
    }

    #[test]
    fn test_append_repairs_missing_trailing_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("series.csv");
        fs::write(&path, format!("{HEADER}\n2024-01-01,1000,50,5000,200")).unwrap();

        let mut store = CsvSeriesStore::new(&path);
        store.append(&obs("2024-01-02", 1010)).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![obs("2024-01-01", 1000), obs("2024-01-02", 1010)]);
    }

    #[test]
    fn test_header_written_into_blank_file() {
        let temp_dir = TempDir::new().unwrap();

        for existing in ["\n", "\n\n", "  ", " \r\n"] {
            let path = temp_dir.path().join("blank.csv");
            fs::write(&path, existing).unwrap();

            let mut store = CsvSeriesStore::new(&path);
            store.append(&obs("2024-01-01", 1)).unwrap();
            store.append(&obs("2024-01-02", 2)).unwrap();

            let text = fs::read_to_string(&path).unwrap();
            assert_eq!(text.matches(HEADER).count(), 1, "existing text {existing:?}");
            assert_eq!(
                store.load_all().unwrap(),
                vec![obs("2024-01-01", 1), obs("2024-01-02", 2)]
            );
        }
    }

    #[test]
    fn test_parse_record_rejects_counts_beyond_i64() {
        let max = format!("2024-01-01,{},0,0,0", i64::MAX);
        assert_eq!(parse_record(&max).unwrap().followers, MAX_COUNT);

        let over = format!("2024-01-01,0,0,{},0", MAX_COUNT + 1);
        assert!(parse_record(&over).unwrap_err().contains("likes"));
        assert!(parse_record("2024-01-01,0,0,0,99999999999999999999").is_err());
    }

    #[test]
    fn test_abort_policy_reports_line() {
        let text = format!("{HEADER}\n2024-01-01,1000,50,5000,200\n2024-01-02,oops,50,5000,200\n");
        let err = parse_series(&text, CorruptRecordPolicy::Abort).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRecord { line: 3, .. }));
    }

    #[test]
    fn test_skip_policy_drops_bad_lines() {
        let text = format!(
            "{HEADER}\n2024-01-01,1000,50,5000,200\n2024-01-02,oops,50,5000,200\n\n2024-01-03,1020,50,5000,200\n"
        );
        let report = parse_series(&text, CorruptRecordPolicy::Skip).unwrap();
        assert_eq!(report.skipped_lines, vec![3]);
        assert_eq!(
            report.observations,
            vec![obs("2024-01-01", 1000), obs("2024-01-03", 1020)]
        );
    }

    #[test]
    fn test_missing_header_is_corrupt() {
        let text = "2024-01-01,1000,50,5000,200\n";
        let err = parse_series(text, CorruptRecordPolicy::Abort).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRecord { line: 1, .. }));

        let report = parse_series(text, CorruptRecordPolicy::Skip).unwrap();
        assert_eq!(report.skipped_lines, vec![1]);
        assert!(report.observations.is_empty());
    }

    #[test]
    fn test_crlf_lines_are_accepted() {
        let text = format!("{HEADER}\r\n2024-01-01,1000,50,5000,200\r\n");
        let report = parse_series(&text, CorruptRecordPolicy::Abort).unwrap();
        assert_eq!(report.observations, vec![obs("2024-01-01", 1000)]);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("abort".parse::<CorruptRecordPolicy>().unwrap(), CorruptRecordPolicy::Abort);
        assert_eq!(" SKIP ".parse::<CorruptRecordPolicy>().unwrap(), CorruptRecordPolicy::Skip);
        assert!("ignore".parse::<CorruptRecordPolicy>().is_err());
    }

    #[test]
    fn test_memory_store_append_order() {
        let mut store = MemorySeriesStore::new();
        store.append(&obs("2024-01-01", 1)).unwrap();
        store.append(&obs("2024-01-02", 2)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.load_all().unwrap(), store.load_all().unwrap());
        assert_eq!(store.load_all().unwrap()[1].followers, 2);
    }
}
