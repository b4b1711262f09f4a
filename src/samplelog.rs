//! # Sample Log Module
//!
//! Durable, append-only log of operator-annotated samples.
//!
//! This module handles:
//! - Reading the newest buffered sample at the moment of the request
//! - Appending one 5-field CSV row per request: timestamp, note, roll,
//!   pitch, yaw (empty strings when the history is empty)
//!
//! Rows are only ever appended, never rewritten, and the field order is
//! stable across versions so existing readers keep working. Logging is
//! best-effort with respect to ingestion: the momentary `latest()` read is
//! not transactionally consistent with concurrent appends, and that is fine.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::telemetry::history::{OrientationSample, SharedHistory};

/// Timestamp format for log rows (ISO-8601-like, local time)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One durable log record
///
/// Orientation fields are `None` when the history was empty at request time;
/// they serialize as empty strings so the row shape never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub note: String,
    pub roll_deg: Option<f64>,
    pub pitch_deg: Option<f64>,
    pub yaw_deg: Option<f64>,
}

impl LogEntry {
    /// Build an entry from the newest sample (if any) and an operator note
    pub fn from_latest(latest: Option<OrientationSample>, note: &str) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            note: note.to_string(),
            roll_deg: latest.map(|s| s.roll_deg),
            pitch_deg: latest.map(|s| s.pitch_deg),
            yaw_deg: latest.map(|s| s.yaw_deg),
        }
    }

    fn fields(&self) -> [String; 5] {
        [
            self.timestamp.clone(),
            self.note.clone(),
            format_angle(self.roll_deg),
            format_angle(self.pitch_deg),
            format_angle(self.yaw_deg),
        ]
    }
}

fn format_angle(angle: Option<f64>) -> String {
    angle.map(|a| a.to_string()).unwrap_or_default()
}

/// Append-only CSV logger for annotated samples
#[derive(Debug, Clone)]
pub struct SampleLogger {
    path: PathBuf,
}

impl SampleLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log the newest buffered sample with an operator note
    ///
    /// Always available once the session exists: an empty history produces a
    /// row with empty orientation fields rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `Io` or `LogWrite` if the filesystem append fails; neither
    /// affects ingestion or dispatch.
    pub fn log_latest(&self, history: &SharedHistory, note: &str) -> Result<()> {
        let entry = LogEntry::from_latest(history.latest(), note);
        self.append(&entry)
    }

    fn append(&self, entry: &LogEntry) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(entry.fields())?;
        writer.flush()?;

        debug!("appended log entry to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    fn sample(roll_deg: f64) -> OrientationSample {
        OrientationSample {
            elapsed_s: 12.5,
            roll_deg,
            pitch_deg: -3.25,
            yaw_deg: 179.0,
        }
    }

    #[test]
    fn test_entry_from_empty_history_has_empty_fields() {
        let entry = LogEntry::from_latest(None, "pre-flight check");
        assert_eq!(entry.note, "pre-flight check");
        assert_eq!(entry.roll_deg, None);

        let fields = entry.fields();
        assert_eq!(&fields[2..], &["", "", ""]);
    }

    #[test]
    fn test_log_latest_records_newest_sample() {
        let dir = tempdir().unwrap();
        let logger = SampleLogger::new(dir.path().join("log.csv"));
        let history = SharedHistory::with_capacity(50);
        history.append(sample(10.0));
        history.append(sample(45.5));

        logger.log_latest(&history, "hover test 1").unwrap();

        let rows = read_rows(logger.path());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), 5, "row must keep the stable 5-field shape");
        assert_eq!(row[1], "hover test 1");
        assert_eq!(row[2], "45.5");
        assert_eq!(row[3], "-3.25");
        assert_eq!(row[4], "179");
    }

    #[test]
    fn test_log_latest_on_empty_history_is_not_an_error() {
        let dir = tempdir().unwrap();
        let logger = SampleLogger::new(dir.path().join("log.csv"));
        let history = SharedHistory::with_capacity(50);

        logger.log_latest(&history, "no telemetry yet").unwrap();

        let rows = read_rows(logger.path());
        assert_eq!(rows[0][1], "no telemetry yet");
        assert_eq!(rows[0][2], "");
        assert_eq!(rows[0][3], "");
        assert_eq!(rows[0][4], "");
    }

    #[test]
    fn test_appends_never_rewrite_prior_entries() {
        let dir = tempdir().unwrap();
        let logger = SampleLogger::new(dir.path().join("log.csv"));
        let history = SharedHistory::with_capacity(50);

        history.append(sample(1.0));
        logger.log_latest(&history, "first").unwrap();
        history.append(sample(2.0));
        logger.log_latest(&history, "second").unwrap();

        let rows = read_rows(logger.path());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "first");
        assert_eq!(rows[0][2], "1");
        assert_eq!(rows[1][1], "second");
        assert_eq!(rows[1][2], "2");
    }

    #[test]
    fn test_timestamp_is_iso_8601_like() {
        let entry = LogEntry::from_latest(None, "x");
        // e.g. "2025-04-17 14:03:22.123"
        assert_eq!(entry.timestamp.len(), 23);
        assert_eq!(&entry.timestamp[4..5], "-");
        assert_eq!(&entry.timestamp[10..11], " ");
    }

    #[test]
    fn test_write_to_unwritable_path_is_recoverable_error() {
        let logger = SampleLogger::new("/nonexistent-dir-xyz/log.csv");
        let history = SharedHistory::with_capacity(50);

        let err = logger.log_latest(&history, "x").unwrap_err();
        assert!(!err.is_fatal(), "log failures must not end the session");
    }
}
