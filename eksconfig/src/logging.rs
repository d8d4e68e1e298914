//! Logging setup for the eksconfig library and CLI.
//!
//! The library itself only emits records through the `log` facade. This
//! module provides the level names accepted by the `log-level` configuration
//! field and a small stderr [`Logger`] the CLI installs at startup.

use std::env;
use std::fmt;
use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable consulted by [`init_logger`] when no flag is given.
pub const LOG_LEVEL_ENV: &str = "AWS_K8S_TESTER_EKS_LOG_LEVEL";

/// Level name used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted values of the `log-level` configuration field.
///
/// Ordered from most to least verbose.
///
/// # Examples
///
/// ```
/// use eksconfig::LogLevel;
///
/// assert!(LogLevel::Debug < LogLevel::Info);
/// assert!(LogLevel::Error < LogLevel::Fatal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// `debug`
    Debug,
    /// `info`
    Info,
    /// `warn`
    Warn,
    /// `error`
    Error,
    /// `dpanic`
    DPanic,
    /// `panic`
    Panic,
    /// `fatal`
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::DPanic => "dpanic",
            Self::Panic => "panic",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

impl LogLevel {
    /// Parses a level name.
    ///
    /// Matching is exact; the configuration file uses lower-case names.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not one of the seven levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksconfig::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("warn").unwrap(), LogLevel::Warn);
    /// assert!(LogLevel::parse("WARN").is_err());
    /// assert!(LogLevel::parse("verbose").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "dpanic" => Ok(Self::DPanic),
            "panic" => Ok(Self::Panic),
            "fatal" => Ok(Self::Fatal),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The `log` crate filter for this level. The panic levels map to `Error`.
    #[must_use]
    pub const fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::Debug,
            Self::Info => LevelFilter::Info,
            Self::Warn => LevelFilter::Warn,
            Self::Error | Self::DPanic | Self::Panic | Self::Fatal => LevelFilter::Error,
        }
    }
}

/// A stderr logger for the `log` facade.
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a logger that passes records at `level` and above.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level.to_level_filter()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}: {}", record.level(), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Picks the level from CLI flags, then [`LOG_LEVEL_ENV`], then `info`.
///
/// `verbose` wins over `quiet`. An unparseable environment value is ignored.
///
/// # Examples
///
/// ```
/// use eksconfig::{logging::resolve_level, LogLevel};
///
/// assert_eq!(resolve_level(true, true), LogLevel::Debug);
/// assert_eq!(resolve_level(false, true), LogLevel::Error);
/// ```
#[must_use]
pub fn resolve_level(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Debug;
    }
    if quiet {
        return LogLevel::Error;
    }
    env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|v| LogLevel::parse(&v).ok())
        .unwrap_or(LogLevel::Info)
}

/// Installs a [`Logger`] as the global `log` backend and returns its level.
///
/// Only the first call installs a logger; later calls leave the installed
/// one in place and still return the level they resolved.
pub fn init_logger(verbose: bool, quiet: bool) -> LogLevel {
    let level = resolve_level(verbose, quiet);
    if log::set_boxed_logger(Box::new(Logger::new(level))).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_display_round_trips() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::DPanic,
            LogLevel::Panic,
            LogLevel::Fatal,
        ] {
            assert_eq!(LogLevel::parse(&level.to_string()).unwrap(), level);
        }
    }

    #[test]
    fn test_log_level_parse_rejects_unknown() {
        assert!(LogLevel::parse("").is_err());
        assert!(LogLevel::parse("trace").is_err());
        assert!(LogLevel::parse("Info").is_err());
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Debug.to_level_filter(), LevelFilter::Debug);
        assert_eq!(LogLevel::Warn.to_level_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Fatal.to_level_filter(), LevelFilter::Error);
    }

    #[test]
    fn test_logger_enabled() {
        let logger = Logger::new(LogLevel::Warn);
        let warn = Metadata::builder().level(log::Level::Warn).build();
        let info = Metadata::builder().level(log::Level::Info).build();
        assert!(logger.enabled(&warn));
        assert!(!logger.enabled(&info));
    }

    #[test]
    fn test_logger_default() {
        assert_eq!(Logger::default().level(), LogLevel::Info);
    }

    #[test]
    fn test_resolve_level_flags() {
        assert_eq!(resolve_level(true, false), LogLevel::Debug);
        assert_eq!(resolve_level(false, true), LogLevel::Error);
        assert_eq!(resolve_level(true, true), LogLevel::Debug);
    }

    #[test]
    fn test_default_log_level_parses() {
        assert_eq!(LogLevel::parse(DEFAULT_LOG_LEVEL).unwrap(), LogLevel::Info);
    }
}
