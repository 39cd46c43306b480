//! Log level resolution and subscriber setup
//!
//! Logs go to a daily-rotated file in the data directory, optionally echoed
//! to stderr with `--echo-logging`.

use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::cli::RuntimeArgs;
use crate::constants::logging::MAX_LOG_FILES;
use crate::error::{BootError, Result};

/// Parse a level name; `fatal` maps to ERROR
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" | "fatal" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

/// Pick the effective level from the runtime flags
/// Priority: --log-level > --debug/--test > --verbose > error
pub fn resolve_level(args: &RuntimeArgs) -> LevelFilter {
    if let Some(given) = args.log_level.as_deref() {
        return parse_level(given).unwrap_or_else(|| {
            // No subscriber yet, so this can't go through tracing
            eprintln!("Unsupported log level: {given}");
            LevelFilter::ERROR
        });
    }

    if args.debug || args.test_mode {
        LevelFilter::DEBUG
    } else if args.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::ERROR
    }
}

/// Install the global subscriber writing to `log_path`
///
/// Returns `None` when a global subscriber is already installed; the
/// existing one is kept. The returned guard must be held until exit so
/// buffered records are flushed.
pub fn init(log_path: &Path, level: LevelFilter, echo: bool) -> Result<Option<WorkerGuard>> {
    let log_dir = log_path.parent().unwrap_or(Path::new("."));
    let prefix = log_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("app.log");

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| BootError::io(log_dir, std::io::Error::other(e)))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // Source locations only at debug and more verbose
    let with_source = level >= LevelFilter::DEBUG;
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_file(with_source)
        .with_line_number(with_source);
    let stderr_layer = echo.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(with_source)
            .with_line_number(with_source)
    });

    match tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(level)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(f: impl FnOnce(&mut RuntimeArgs)) -> RuntimeArgs {
        let mut args = RuntimeArgs::default();
        f(&mut args);
        args
    }

    #[test]
    fn test_parse_level_names() {
        assert_eq!(parse_level("TRACE"), Some(LevelFilter::TRACE));
        assert_eq!(parse_level("Info"), Some(LevelFilter::INFO));
        assert_eq!(parse_level("fatal"), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_default_level_is_error() {
        assert_eq!(resolve_level(&RuntimeArgs::default()), LevelFilter::ERROR);
    }

    #[test]
    fn test_debug_and_test_mode_imply_debug() {
        assert_eq!(resolve_level(&args(|a| a.debug = true)), LevelFilter::DEBUG);
        assert_eq!(resolve_level(&args(|a| a.test_mode = true)), LevelFilter::DEBUG);
    }

    #[test]
    fn test_verbose_implies_info() {
        assert_eq!(resolve_level(&args(|a| a.verbose = true)), LevelFilter::INFO);
    }

    #[test]
    fn test_explicit_level_wins() {
        let a = args(|a| {
            a.debug = true;
            a.log_level = Some("warn".into());
        });
        assert_eq!(resolve_level(&a), LevelFilter::WARN);
    }

    #[test]
    fn test_unsupported_level_falls_back_to_error() {
        let a = args(|a| {
            a.verbose = true;
            a.log_level = Some("chatty".into());
        });
        assert_eq!(resolve_level(&a), LevelFilter::ERROR);
    }

    #[test]
    fn test_init_writes_rotated_file() {
        let tmp = tempfile::tempdir().unwrap();
        let log_path = tmp.path().join("demo.log");

        let guard = init(&log_path, LevelFilter::INFO, false).unwrap();
        tracing::info!("logging initialized");
        drop(guard);

        let found = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("demo.log"));
        assert!(found);

        // A second install keeps the existing subscriber
        assert!(init(&log_path, LevelFilter::INFO, false).unwrap().is_none());
    }
}
