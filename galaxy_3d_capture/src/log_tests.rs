//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the global
//! logger slot used by the capture_* macros.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Logger that keeps every entry for later inspection
#[derive(Clone, Default)]
struct RecordingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLogger {
    fn entries_from(&self, source: &str) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.source == source)
            .cloned()
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::capture::FramePacker".to_string(),
        message: "depth readback failed".to_string(),
        file: Some("frame_packer.rs"),
        line: Some(42),
    };

    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.file, Some("frame_packer.rs"));
    assert_eq!(entry.line, Some(42));
}

#[test]
fn test_default_logger_prints_both_formats() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "galaxy3d::capture::test".to_string(),
        message: "plain".to_string(),
        file: None,
        line: None,
    });
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::capture::test".to_string(),
        message: "detailed".to_string(),
        file: Some("log_tests.rs"),
        line: Some(1),
    });
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_receives_macro_output() {
    let recorder = RecordingLogger::default();
    log::set_logger(recorder.clone());

    crate::capture_info!("galaxy3d::capture::log_test_info", "prepared {}x{}", 64, 32);
    crate::capture_warn!("galaxy3d::capture::log_test_info", "leaked");

    log::reset_logger();

    let entries = recorder.entries_from("galaxy3d::capture::log_test_info");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].severity, LogSeverity::Info);
    assert_eq!(entries[0].message, "prepared 64x32");
    assert!(entries[0].file.is_none());
    assert_eq!(entries[1].severity, LogSeverity::Warn);
}

#[test]
#[serial]
fn test_error_macro_records_file_and_line() {
    let recorder = RecordingLogger::default();
    log::set_logger(recorder.clone());

    crate::capture_error!("galaxy3d::capture::log_test_error", "readback failed");

    log::reset_logger();

    let entries = recorder.entries_from("galaxy3d::capture::log_test_error");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Error);
    assert!(entries[0].file.unwrap().ends_with("log_tests.rs"));
    assert!(entries[0].line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let recorder = RecordingLogger::default();
    log::set_logger(recorder.clone());
    log::reset_logger();

    crate::capture_debug!("galaxy3d::capture::log_test_reset", "after reset");

    assert!(recorder.entries_from("galaxy3d::capture::log_test_reset").is_empty());
}
