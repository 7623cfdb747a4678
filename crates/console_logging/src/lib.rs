#![deny(missing_docs)]
//! Shared logging utilities for the records console workspace.
//!
//! This crate provides the `console_*` logging macros used across the codebase,
//! a minimal test initializer for the global logger, and a capturing logger for
//! tests that assert on what was logged.

use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! console_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! console_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! console_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

/// One log line recorded by the capture logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    /// Severity of the line.
    pub level: Level,
    /// Module path the line was logged from.
    pub target: String,
    /// Rendered message.
    pub message: String,
}

/// Global logger that keeps every line in memory.
///
/// Only useful when it is the first logger installed in the process, so tests
/// relying on it live in their own integration test binary.
#[derive(Debug, Default)]
pub struct CapturedLogs {
    lines: Mutex<Vec<CapturedLine>>,
}

impl CapturedLogs {
    /// Returns a copy of the lines captured so far.
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Returns captured lines at `level` or more severe.
    pub fn at_least(&self, level: Level) -> Vec<CapturedLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.level <= level)
            .collect()
    }

    /// Drops all captured lines.
    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl Log for CapturedLogs {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(CapturedLine {
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

static CAPTURE: OnceLock<CapturedLogs> = OnceLock::new();

/// Installs the capture logger as the global logger and returns it.
///
/// Repeated calls return the same instance. If a different logger was already
/// installed, the returned capture stays empty.
pub fn initialize_capture_for_tests() -> &'static CapturedLogs {
    let capture = CAPTURE.get_or_init(CapturedLogs::default);
    if log::set_logger(capture).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    capture
}
