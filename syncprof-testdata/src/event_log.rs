// Syncprof Testdata - Event log structures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Event log structures and I/O operations.
//!
//! The CSV form has one row per update, in arrival order:
//!
//! ```text
//! source,timestamp,value
//! bpm1,1706745600.000000,0.000000
//! bpm2,1706745600.002000,0.000000
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const CSV_HEADER: &str = "source,timestamp,value";

/// Event log error types.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Empty event log")]
    Empty,
}

/// One source update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Source name.
    pub source: String,
    /// Wall-clock arrival time in seconds.
    pub emitted_at: f64,
    /// Timestamp reported by the source, in seconds.
    pub timestamp: f64,
    /// Reported value.
    pub value: f64,
}

/// Ordered stream of updates from a set of sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    /// Source names in registry order.
    pub sources: Vec<String>,
    /// Updates in arrival order.
    pub events: Vec<Event>,
    /// Generation seed, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl EventLog {
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            events: Vec::new(),
            seed: None,
        }
    }

    pub fn push(&mut self, event: Event) {
        if !self.sources.iter().any(|s| s == &event.source) {
            self.sources.push(event.source.clone());
        }
        self.events.push(event);
    }

    pub fn source_names(&self) -> &[String] {
        &self.sources
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Updates from one source, in order.
    pub fn for_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.source == source)
    }

    /// Seconds between the first and last arrival.
    pub fn duration_secs(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.emitted_at - first.emitted_at,
            _ => 0.0,
        }
    }

    /// Export to CSV file.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), EventLogError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", CSV_HEADER)?;
        for event in &self.events {
            writeln!(
                writer,
                "{},{:.6},{:.6}",
                event.source, event.timestamp, event.value
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Import from CSV file.
    ///
    /// The `value` column is optional. Arrival times are taken from the
    /// reported timestamps.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, EventLogError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = lines.next().ok_or(EventLogError::Empty)??;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let source_col = column_index(&columns, "source")?;
        let timestamp_col = column_index(&columns, "timestamp")?;
        let value_col = columns.iter().position(|c| *c == "value");

        let mut log = EventLog::default();

        for (line_num, line_result) in lines.enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let line_no = line_num + 2;

            let source = fields
                .get(source_col)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| EventLogError::CsvParse {
                    line: line_no,
                    message: "Missing source".to_string(),
                })?
                .to_string();

            let timestamp: f64 = fields
                .get(timestamp_col)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| EventLogError::CsvParse {
                    line: line_no,
                    message: "Invalid timestamp".to_string(),
                })?;

            let value = match value_col.and_then(|i| fields.get(i)) {
                Some(s) if !s.is_empty() => s.parse().map_err(|_| EventLogError::CsvParse {
                    line: line_no,
                    message: format!("Invalid value for {}", source),
                })?,
                _ => 0.0,
            };

            log.push(Event {
                source,
                emitted_at: timestamp,
                timestamp,
                value,
            });
        }

        Ok(log)
    }

    /// Export to JSON file.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<(), EventLogError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Import from JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, EventLogError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn column_index(columns: &[&str], name: &str) -> Result<usize, EventLogError> {
    columns
        .iter()
        .position(|c| *c == name)
        .ok_or_else(|| EventLogError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_log() -> EventLog {
        let mut log = EventLog::new(vec!["a".into(), "b".into()]);
        for (source, t) in [("a", 1.0), ("b", 1.1), ("a", 2.0), ("b", 2.3)] {
            log.push(Event {
                source: source.to_string(),
                emitted_at: t,
                timestamp: t,
                value: t * 10.0,
            });
        }
        log
    }

    #[test]
    fn test_push_tracks_sources() {
        let mut log = EventLog::default();
        log.push(Event {
            source: "x".into(),
            emitted_at: 0.0,
            timestamp: 0.0,
            value: 0.0,
        });
        assert_eq!(log.source_names(), &["x".to_string()]);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_csv_roundtrip() {
        let log = sample_log();
        let file = NamedTempFile::new().unwrap();
        log.to_csv(file.path()).unwrap();

        let loaded = EventLog::from_csv(file.path()).unwrap();
        assert_eq!(loaded.source_names(), log.source_names());
        assert_eq!(loaded.len(), 4);
        assert!((loaded.events()[3].timestamp - 2.3).abs() < 1e-9);
        assert!((loaded.events()[3].value - 23.0).abs() < 1e-9);
        assert!((loaded.duration_secs() - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_csv_without_value_column() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "source,timestamp\na,1.0\nb,1.5\n").unwrap();

        let loaded = EventLog::from_csv(file.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.events()[1].value, 0.0);
    }

    #[test]
    fn test_csv_bad_timestamp() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "source,timestamp\na,soon\n").unwrap();

        let err = EventLog::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, EventLogError::CsvParse { line: 2, .. }));
    }

    #[test]
    fn test_csv_missing_column() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "name,time\na,1.0\n").unwrap();

        let err = EventLog::from_csv(file.path()).unwrap_err();
        assert!(matches!(err, EventLogError::MissingColumn(ref c) if c == "source"));
    }

    #[test]
    fn test_json_roundtrip() {
        let log = sample_log();
        let file = NamedTempFile::new().unwrap();
        log.to_json(file.path()).unwrap();

        let loaded = EventLog::from_json(file.path()).unwrap();
        assert_eq!(loaded.events, log.events);
    }

    #[test]
    fn test_for_source() {
        let log = sample_log();
        let times: Vec<f64> = log.for_source("b").map(|e| e.timestamp).collect();
        assert_eq!(times, vec![1.1, 2.3]);
    }
}
