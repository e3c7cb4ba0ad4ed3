//! Structured logging.

use crate::config::LoggingSettings;
use std::path::PathBuf;

const DEFAULT_LEVEL: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name; unknown names are pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub filter: String,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_LEVEL.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::from_settings_with(settings, verbose, |key| std::env::var(key).ok())
    }

    /// [`Self::from_settings`] with an injectable environment.
    ///
    /// Filter precedence: `-v` (debug), `NEWSFLOW_LOG`, `RUST_LOG`, the
    /// configured level, `info`.
    #[must_use]
    pub fn from_settings_with<F>(settings: Option<&LoggingSettings>, verbose: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup("NEWSFLOW_LOG_FORMAT")
            .or_else(|| settings.and_then(|s| s.format.clone()))
            .map_or_else(LogFormat::default, |f| LogFormat::parse(&f));

        let filter = if verbose {
            "debug".to_string()
        } else {
            lookup("NEWSFLOW_LOG")
                .or_else(|| lookup("RUST_LOG"))
                .filter(|f| !f.trim().is_empty())
                .or_else(|| settings.and_then(|s| s.level.clone()))
                .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
        };

        Self {
            format,
            filter,
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}
