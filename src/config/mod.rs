//! Configuration management.
//!
//! Every key is optional. A config file that cannot be read or parsed is
//! reported as a warning and the built-in defaults are used instead; only
//! values that cannot be defaulted (an unusable table name, a zero or
//! unbounded poll interval or debounce window) are hard errors.
//!
//! # File format
//!
//! TOML (`*.toml`) or JSON (`*.json`, the legacy layout) with the same
//! sections:
//!
//! ```toml
//! output_json_file = "data/news_data.json"
//!
//! [data_paths]
//! input_dir = "data/raw"
//! output_dir = "data/processed"
//! archive_dir = "data/archive"
//!
//! [integration]
//! target_db_file = "news_database.db"
//! table_name = "news_articles"
//!
//! [watcher]
//! check_interval_seconds = 30
//! raw_debounce_seconds = 3
//! snapshot_debounce_seconds = 2
//! ```
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `NEWSFLOW_CONFIG_PATH` | Config file used when `--config` is absent |
//! | `NEWSFLOW_INPUT_DIR` | Overrides `data_paths.input_dir` |
//! | `NEWSFLOW_DB_FILE` | Overrides `integration.target_db_file` |
//! | `NEWSFLOW_SNAPSHOT_PATH` | Overrides `output_json_file` |

use crate::state::MarkPolicy;
use crate::storage::{DEFAULT_TABLE, is_valid_table_name};
use crate::watch::MAX_WINDOW;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "newsflow.toml";

const DEFAULT_POLL_SECONDS: u64 = 30;
const DEFAULT_RAW_DEBOUNCE_SECONDS: f64 = 3.0;
const DEFAULT_SNAPSHOT_DEBOUNCE_SECONDS: f64 = 2.0;
const DEFAULT_METRICS_PORT: u16 = 9090;

/// Longest accepted fallback poll interval.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Resolved pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Directory watched for inbound files.
    pub input_dir: PathBuf,
    /// Landing directory for processed CSV files.
    pub output_dir: PathBuf,
    /// Destination for raw files once imported.
    pub archive_dir: PathBuf,
    /// Destination for processed CSV files once imported, if any.
    pub imported_dir: Option<PathBuf>,
    /// `SQLite` database file.
    pub db_path: PathBuf,
    /// Table holding the records.
    pub table_name: String,
    /// Snapshot JSON file.
    pub snapshot_path: PathBuf,
    /// Dedup marker map.
    pub processed_records_path: PathBuf,
    /// File fingerprint map.
    pub raw_state_path: PathBuf,
    /// Fallback poll period.
    pub poll_interval: Duration,
    /// Keep watching after the first pass.
    pub run_continuously: bool,
    /// Quiet period for input directory notifications.
    pub raw_debounce: Duration,
    /// Quiet period for snapshot notifications.
    pub snapshot_debounce: Duration,
    /// Downstream program and arguments.
    pub downstream_command: Option<Vec<String>>,
    /// When dedup markers become final.
    pub mark_policy: MarkPolicy,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// Logging section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Default filter directive.
    pub level: Option<String>,
    /// Log file; stderr when absent.
    pub file: Option<PathBuf>,
}

/// Metrics section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder.
    pub enabled: bool,
    /// Port for the scrape endpoint in watch mode.
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: DEFAULT_METRICS_PORT,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    /// Directory layout.
    pub data_paths: ConfigFileDataPaths,
    /// Scheduling.
    pub processing: ConfigFileProcessing,
    /// Record store.
    pub integration: ConfigFileIntegration,
    /// Snapshot path.
    pub output_json_file: Option<String>,
    /// Watcher state and timing.
    pub watcher: ConfigFileWatcher,
    /// Downstream hand-off.
    pub downstream: ConfigFileDownstream,
    /// Logging.
    pub logging: ConfigFileLogging,
    /// Metrics.
    pub metrics: ConfigFileMetrics,
}

/// `[data_paths]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFileDataPaths {
    /// Input directory.
    pub input_dir: Option<String>,
    /// Processed CSV directory.
    pub output_dir: Option<String>,
    /// Raw file archive.
    pub archive_dir: Option<String>,
    /// Processed CSV archive.
    pub imported_dir: Option<String>,
}

/// `[processing]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFileProcessing {
    /// Poll period in minutes.
    pub interval_minutes: Option<f64>,
    /// Keep watching after the first pass.
    pub run_continuously: Option<bool>,
}

/// `[integration]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFileIntegration {
    /// Database file.
    pub target_db_file: Option<String>,
    /// Table name.
    pub table_name: Option<String>,
}

/// `[watcher]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFileWatcher {
    /// Poll period in seconds.
    pub check_interval_seconds: Option<f64>,
    /// Dedup marker file.
    pub processed_records_file: Option<String>,
    /// Fingerprint file.
    pub raw_files_state_file: Option<String>,
    /// Input directory debounce window.
    pub raw_debounce_seconds: Option<f64>,
    /// Snapshot debounce window.
    pub snapshot_debounce_seconds: Option<f64>,
}

/// `[downstream]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFileDownstream {
    /// Program and arguments.
    pub command: Option<Vec<String>>,
    /// `after_handoff` or `eager`.
    pub mark_policy: Option<String>,
}

/// `[logging]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFileLogging {
    /// Output format.
    pub format: Option<String>,
    /// Filter directive.
    pub level: Option<String>,
    /// Log file.
    pub file: Option<String>,
}

/// `[metrics]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFileMetrics {
    /// Install the recorder.
    pub enabled: Option<bool>,
    /// Scrape port.
    pub port: Option<u16>,
}

/// A loaded configuration and the problems found while loading it.
///
/// Warnings are returned rather than logged because logging is configured
/// from the result.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    /// The configuration.
    pub config: PipelineConfig,
    /// File the configuration came from, if any.
    pub source: Option<PathBuf>,
    /// Non-fatal problems.
    pub warnings: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/processed"),
            archive_dir: PathBuf::from("data/archive"),
            imported_dir: None,
            db_path: PathBuf::from("news_database.db"),
            table_name: DEFAULT_TABLE.to_string(),
            snapshot_path: PathBuf::from("data/news_data.json"),
            processed_records_path: PathBuf::from("data/processed_records.json"),
            raw_state_path: PathBuf::from("data/raw_files_state.json"),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECONDS),
            run_continuously: false,
            raw_debounce: Duration::from_secs_f64(DEFAULT_RAW_DEBOUNCE_SECONDS),
            snapshot_debounce: Duration::from_secs_f64(DEFAULT_SNAPSHOT_DEBOUNCE_SECONDS),
            downstream_command: None,
            mark_policy: MarkPolicy::default(),
            logging: LoggingSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// The format follows the extension: `.json` is parsed as JSON,
    /// anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file: ConfigFile = if is_json {
            serde_json::from_str(&contents)
                .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?
        } else {
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?
        };

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `NEWSFLOW_CONFIG_PATH`, then `newsflow.toml` in the working
    /// directory. Returns the default configuration if neither is usable.
    #[must_use]
    pub fn load_default() -> Self {
        locate(None, |key| std::env::var(key).ok())
            .and_then(|path| Self::load_from_file(&path).ok())
            .unwrap_or_default()
    }

    /// Loads the configuration the CLI runs with.
    ///
    /// Lookup order: `explicit`, `NEWSFLOW_CONFIG_PATH`, `newsflow.toml`,
    /// defaults. A file that cannot be loaded becomes a warning. Environment
    /// overrides are applied last, then the result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the resolved configuration is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoad> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`Self::load`] with an injectable environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the resolved configuration is invalid.
    pub fn load_with<F>(explicit: Option<&Path>, lookup: F) -> Result<ConfigLoad>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let source = locate(explicit, &lookup);

        let mut config = match &source {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                warnings.push(format!("{e}; using defaults"));
                Self::default()
            }),
            None => Self::default(),
        };
        config.apply_env_overrides_from(lookup);
        config.validate()?;

        Ok(ConfigLoad {
            config,
            source,
            warnings,
        })
    }

    /// Applies `NEWSFLOW_*` path overrides read through `lookup`.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = non_empty("NEWSFLOW_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(db) = non_empty("NEWSFLOW_DB_FILE") {
            self.db_path = PathBuf::from(db);
        }
        if let Some(snapshot) = non_empty("NEWSFLOW_SNAPSHOT_PATH") {
            self.snapshot_path = PathBuf::from(snapshot);
        }
    }

    /// Checks the values that have no safe fallback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a table name that is not a plain SQL
    /// identifier, a zero or over-long poll interval, or a debounce window
    /// longer than [`MAX_WINDOW`].
    pub fn validate(&self) -> Result<()> {
        if !is_valid_table_name(&self.table_name) {
            return Err(Error::Config(format!(
                "table name '{}' is not a plain identifier",
                self.table_name
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be positive".to_string()));
        }
        if self.poll_interval > MAX_POLL_INTERVAL {
            return Err(Error::Config(format!(
                "poll interval must not exceed {}s",
                MAX_POLL_INTERVAL.as_secs()
            )));
        }
        for (key, window) in [
            ("raw_debounce_seconds", self.raw_debounce),
            ("snapshot_debounce_seconds", self.snapshot_debounce),
        ] {
            if window > MAX_WINDOW {
                return Err(Error::Config(format!(
                    "{key} must not exceed {}s",
                    MAX_WINDOW.as_secs()
                )));
            }
        }
        Ok(())
    }

    /// Converts a `ConfigFile` to `PipelineConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        let paths = file.data_paths;
        if let Some(dir) = paths.input_dir {
            config.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = paths.output_dir {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = paths.archive_dir {
            config.archive_dir = PathBuf::from(dir);
        }
        config.imported_dir = paths.imported_dir.map(PathBuf::from);

        if let Some(db) = file.integration.target_db_file {
            config.db_path = PathBuf::from(db);
        }
        if let Some(table) = file.integration.table_name {
            config.table_name = table;
        }
        if let Some(snapshot) = file.output_json_file {
            config.snapshot_path = PathBuf::from(snapshot);
        }

        let watcher = file.watcher;
        if let Some(markers) = watcher.processed_records_file {
            config.processed_records_path = PathBuf::from(markers);
            // The fingerprint map lives next to the marker map unless placed explicitly.
            config.raw_state_path = sibling(&config.processed_records_path, "raw_files_state.json");
        }
        if let Some(state) = watcher.raw_files_state_file {
            config.raw_state_path = PathBuf::from(state);
        }

        let poll_seconds = watcher
            .check_interval_seconds
            .or_else(|| file.processing.interval_minutes.map(|m| m * 60.0));
        if let Some(seconds) = poll_seconds {
            config.poll_interval = seconds_to_duration("poll interval", seconds)?;
        }
        if let Some(seconds) = watcher.raw_debounce_seconds {
            config.raw_debounce = seconds_to_duration("raw_debounce_seconds", seconds)?;
        }
        if let Some(seconds) = watcher.snapshot_debounce_seconds {
            config.snapshot_debounce = seconds_to_duration("snapshot_debounce_seconds", seconds)?;
        }
        if let Some(flag) = file.processing.run_continuously {
            config.run_continuously = flag;
        }

        config.downstream_command = file.downstream.command;
        if let Some(policy) = file.downstream.mark_policy {
            config.mark_policy = policy.parse()?;
        }

        config.logging = LoggingSettings {
            format: file.logging.format,
            level: file.logging.level,
            file: file.logging.file.map(PathBuf::from),
        };
        config.metrics = MetricsSettings {
            enabled: file.metrics.enabled.unwrap_or(false),
            port: file.metrics.port.unwrap_or(DEFAULT_METRICS_PORT),
        };

        Ok(config)
    }

    /// Sets the input directory.
    #[must_use]
    pub fn with_input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = path.into();
        self
    }

    /// Places every file and directory the pipeline uses under `root`.
    ///
    /// Used by tests and by `newsflow` invocations that want a
    /// self-contained workspace.
    #[must_use]
    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.input_dir = root.join("data/raw");
        self.output_dir = root.join("data/processed");
        self.archive_dir = root.join("data/archive");
        self.imported_dir = self.imported_dir.map(|_| root.join("data/imported"));
        self.db_path = root.join("news_database.db");
        self.snapshot_path = root.join("data/news_data.json");
        self.processed_records_path = root.join("data/processed_records.json");
        self.raw_state_path = root.join("data/raw_files_state.json");
        self
    }
}

/// Finds the config file to load.
fn locate<F>(explicit: Option<&Path>, lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = lookup("NEWSFLOW_CONFIG_PATH").filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    path.parent().map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
}

fn seconds_to_duration(key: &str, seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| Error::Config(format!("{key} must be a non-negative number, got {seconds}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("data/raw"));
        assert_eq!(config.table_name, "news_articles");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.raw_debounce, Duration::from_secs(3));
        assert_eq!(config.mark_policy, MarkPolicy::AfterHandoff);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "newsflow.toml",
            r#"
output_json_file = "out/news.json"

[data_paths]
input_dir = "inbox"

[integration]
table_name = "articles"

[watcher]
processed_records_file = "state/markers.json"
raw_debounce_seconds = 0.5

[downstream]
command = ["notify-send", "news"]
mark_policy = "eager"

[metrics]
enabled = true
"#,
        );

        let config = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("inbox"));
        assert_eq!(config.output_dir, PathBuf::from("data/processed"));
        assert_eq!(config.table_name, "articles");
        assert_eq!(config.snapshot_path, PathBuf::from("out/news.json"));
        assert_eq!(config.raw_state_path, PathBuf::from("state/raw_files_state.json"));
        assert_eq!(config.raw_debounce, Duration::from_millis(500));
        assert_eq!(config.mark_policy, MarkPolicy::Eager);
        assert_eq!(
            config.downstream_command,
            Some(vec!["notify-send".to_string(), "news".to_string()])
        );
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9090);
    }

    #[test]
    fn test_legacy_json_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.json",
            r#"{
                "data_paths": {"input_dir": "raw", "archive_dir": "old"},
                "processing": {"interval_minutes": 2, "run_continuously": true},
                "integration": {"target_db_file": "news.db"}
            }"#,
        );

        let config = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("raw"));
        assert_eq!(config.archive_dir, PathBuf::from("old"));
        assert_eq!(config.db_path, PathBuf::from("news.db"));
        assert_eq!(config.poll_interval, Duration::from_secs(120));
        assert!(config.run_continuously);
    }

    #[test]
    fn test_check_interval_wins_over_minutes() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "c.toml",
            "[processing]\ninterval_minutes = 5\n[watcher]\ncheck_interval_seconds = 7\n",
        );
        let config = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(7));
    }

    #[test]
    fn test_unparsable_file_falls_back_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.toml", "[data_paths\ninput_dir = ");

        let load = PipelineConfig::load_with(Some(&path), no_env).unwrap();
        assert_eq!(load.config, PipelineConfig::default());
        assert_eq!(load.warnings.len(), 1);
        assert_eq!(load.source, Some(path));
    }

    #[test]
    fn test_missing_explicit_file_falls_back() {
        let load =
            PipelineConfig::load_with(Some(Path::new("/nonexistent/newsflow.toml")), no_env).unwrap();
        assert_eq!(load.config, PipelineConfig::default());
        assert_eq!(load.warnings.len(), 1);
    }

    #[test]
    fn test_env_overrides() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "c.toml", "[data_paths]\ninput_dir = \"from-file\"\n");
        let env: HashMap<&str, &str> = HashMap::from([
            ("NEWSFLOW_CONFIG_PATH", path.to_str().unwrap()),
            ("NEWSFLOW_INPUT_DIR", "from-env"),
            ("NEWSFLOW_DB_FILE", "env.db"),
            ("NEWSFLOW_SNAPSHOT_PATH", ""),
        ]);

        let load = PipelineConfig::load_with(None, |k| env.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(load.source.as_deref(), Some(path.as_path()));
        assert_eq!(load.config.input_dir, PathBuf::from("from-env"));
        assert_eq!(load.config.db_path, PathBuf::from("env.db"));
        assert_eq!(load.config.snapshot_path, PathBuf::from("data/news_data.json"));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let dir = TempDir::new().unwrap();

        let bad_table = write(&dir, "t.toml", "[integration]\ntable_name = \"news; DROP\"\n");
        let err = PipelineConfig::load_with(Some(&bad_table), no_env).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 2);

        let zero_poll = write(&dir, "p.toml", "[watcher]\ncheck_interval_seconds = 0\n");
        assert!(PipelineConfig::load_with(Some(&zero_poll), no_env).is_err());
    }

    #[test]
    fn test_negative_window_rejected_in_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "n.toml", "[watcher]\nraw_debounce_seconds = -1\n");
        assert!(matches!(
            PipelineConfig::load_from_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_oversized_windows_are_config_errors() {
        let dir = TempDir::new().unwrap();

        let huge_debounce = write(&dir, "d.toml", "[watcher]\nraw_debounce_seconds = 1e18\n");
        let err = PipelineConfig::load_with(Some(&huge_debounce), no_env).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("raw_debounce_seconds")));

        let huge_snapshot = write(&dir, "s.toml", "[watcher]\nsnapshot_debounce_seconds = 86401\n");
        assert!(PipelineConfig::load_with(Some(&huge_snapshot), no_env).is_err());

        let huge_poll = write(&dir, "p.toml", "[watcher]\ncheck_interval_seconds = 1e12\n");
        assert!(PipelineConfig::load_with(Some(&huge_poll), no_env).is_err());

        let at_limit = write(&dir, "ok.toml", "[watcher]\nraw_debounce_seconds = 86400\n");
        assert!(PipelineConfig::load_with(Some(&at_limit), no_env).is_ok());
    }

    #[test]
    fn test_rooted_at() {
        let config = PipelineConfig::default().rooted_at(Path::new("/srv/news"));
        assert_eq!(config.input_dir, PathBuf::from("/srv/news/data/raw"));
        assert_eq!(config.db_path, PathBuf::from("/srv/news/news_database.db"));
        assert_eq!(config.imported_dir, None);
    }
}
