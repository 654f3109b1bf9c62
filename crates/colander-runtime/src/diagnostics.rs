//! Append-only diagnostic log.
//!
//! Every rejection and anomaly leaves one line: ISO-8601 timestamp, category
//! label, free-text payload. The log is write-only for the pipeline - nothing
//! in the system ever reads it back - and must tolerate concurrent writers,
//! so each entry is a single formatted line appended and flushed under one
//! lock acquisition.

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Category label attached to a diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogCategory {
    /// Question failed the charset gate.
    InvalidQuestion,
    /// Question matched no domain keyword or template.
    NonRecipe,
    /// Raw generator output failed the charset gate.
    NonEnglish,
    /// Generator-side failure.
    Error,
    /// Endpoint- or tool-specific error label.
    Other(String),
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogCategory::InvalidQuestion => f.write_str("Invalid question"),
            LogCategory::NonRecipe => f.write_str("Non-recipe"),
            LogCategory::NonEnglish => f.write_str("Non-English"),
            LogCategory::Error => f.write_str("Error"),
            LogCategory::Other(label) => f.write_str(label),
        }
    }
}

/// Append-only diagnostic sink.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. A log that cannot be opened
/// degrades to a no-op sink - the pipeline must keep answering even when the
/// log directory is unwritable.
pub struct DiagnosticLog {
    writer: Option<Mutex<BufWriter<File>>>,
    path: PathBuf,
}

impl DiagnosticLog {
    /// Open (or create) the log at the given path, in append mode.
    ///
    /// Creates parent directories if needed.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(
                        "Could not create diagnostic log directory {}: {}",
                        parent.display(),
                        e
                    );
                    return Self { writer: None, path };
                }
            }
        }

        let file = match OpenOptions::new().append(true).create(true).open(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open diagnostic log {}: {}", path.display(), e);
                return Self { writer: None, path };
            }
        };

        Self {
            writer: Some(Mutex::new(BufWriter::new(file))),
            path,
        }
    }

    /// A sink that drops every entry.
    pub fn disabled() -> Self {
        Self {
            writer: None,
            path: PathBuf::new(),
        }
    }

    /// Path the log writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Embedded newlines in the payload are escaped so an
    /// entry is always exactly one line.
    pub fn append(&self, category: LogCategory, payload: &str) {
        let Some(writer) = &self.writer else {
            return;
        };

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let payload = payload.replace('\n', "\\n");
        let line = format!("{} - {}: {}", timestamp, category, payload);

        let mut writer = writer.lock();
        let _ = writeln!(writer, "{}", line);
        let _ = writer.flush();
    }
}

impl Drop for DiagnosticLog {
    fn drop(&mut self) {
        if let Some(writer) = &self.writer {
            let _ = writer.lock().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_log_writes_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.log");
        let log = DiagnosticLog::open(&path);

        log.append(LogCategory::InvalidQuestion, "soup; rm -rf");
        log.append(LogCategory::NonRecipe, "what is rust?");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" - Invalid question: soup; rm -rf"));
        assert!(lines[1].contains(" - Non-recipe: what is rust?"));

        // Each line starts with a parseable RFC 3339 timestamp.
        for line in lines {
            let ts = line.split(" - ").next().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp: {ts}");
        }
    }

    #[test]
    fn test_log_appends_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.log");

        DiagnosticLog::open(&path).append(LogCategory::Error, "first");
        DiagnosticLog::open(&path).append(LogCategory::Error, "second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim().lines().count(), 2);
    }

    #[test]
    fn test_payload_newlines_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.log");
        let log = DiagnosticLog::open(&path);

        log.append(LogCategory::NonEnglish, "line one\nline two");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim().lines().count(), 1);
        assert!(content.contains("line one\\nline two"));
    }

    #[test]
    fn test_disabled_sink_is_silent() {
        let log = DiagnosticLog::disabled();
        // Must not panic or create files.
        log.append(LogCategory::Error, "dropped");
    }

    #[test]
    fn test_concurrent_writers_keep_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.log");
        let log = Arc::new(DiagnosticLog::open(&path));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        log.append(LogCategory::Error, &format!("writer {} entry {}", i, j));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(Arc::try_unwrap(log).ok());

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 8 * 50);
        for line in lines {
            assert!(line.contains(" - Error: writer "), "torn line: {line}");
        }
    }
}
