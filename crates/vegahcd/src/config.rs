//! Daemon configuration.
//!
//! Values come from three layers, highest precedence first: command-line
//! flags, an optional TOML file, built-in defaults.
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [targets]
//! core_url = "http://localhost:3003"
//! data_node_url = "http://localhost:3008"
//! explorer_url = "http://localhost:1515"
//!
//! [schedule]
//! check_interval = "30s"
//! block_increase_period = "30s"
//! blocking_block_check = false
//!
//! [probe]
//! timeout = "5s"
//!
//! [thresholds]
//! slow_request = "3s"
//! max_data_node_lag = 50
//! max_time_diff = "60s"
//! min_block_height = 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use vegahc_checks::Thresholds;
use vegahc_monitor::DEFAULT_CHECK_INTERVAL;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CORE_URL: &str = "http://localhost:3003";
pub const DEFAULT_DATA_NODE_URL: &str = "http://localhost:3008";
pub const DEFAULT_EXPLORER_URL: &str = "http://localhost:1515";
pub const DEFAULT_BLOCK_INCREASE_PERIOD: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid duration {value:?} for {field}")]
    Duration { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub targets: TargetsSection,
    pub schedule: ScheduleSection,
    pub probe: ProbeSection,
    pub thresholds: ThresholdsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetsSection {
    pub core_url: Option<String>,
    pub data_node_url: Option<String>,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleSection {
    pub check_interval: Option<String>,
    pub block_increase_period: Option<String>,
    pub blocking_block_check: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSection {
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdsSection {
    pub slow_request: Option<String>,
    pub max_data_node_lag: Option<u64>,
    pub max_time_diff: Option<String>,
    pub min_block_height: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Flags given on the command line. `None` means the flag was absent.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub check_interval: Option<Duration>,
    pub block_increase_period: Option<Duration>,
    pub blocking_block_check: Option<bool>,
}

/// Settings shared by every subcommand, after merging all layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub check_interval: Duration,
    pub block_increase_period: Duration,
    pub blocking_block_check: bool,
    pub probe_timeout: Duration,
    pub thresholds: Thresholds,
}

impl Settings {
    pub fn resolve(file: &FileConfig, overrides: &Overrides) -> Result<Self, ConfigError> {
        let defaults = Thresholds::default();
        let t = &file.thresholds;

        let check_interval = match overrides.check_interval {
            Some(d) => d,
            None => file_duration("schedule.check_interval", &file.schedule.check_interval)?
                .unwrap_or(DEFAULT_CHECK_INTERVAL),
        };
        if check_interval.is_zero() {
            return Err(ConfigError::Zero {
                field: "check interval",
            });
        }

        let block_increase_period = match overrides.block_increase_period {
            Some(d) => d,
            None => file_duration(
                "schedule.block_increase_period",
                &file.schedule.block_increase_period,
            )?
            .unwrap_or(DEFAULT_BLOCK_INCREASE_PERIOD),
        };

        let probe_timeout = file_duration("probe.timeout", &file.probe.timeout)?
            .unwrap_or(vegahc_probe::DEFAULT_TIMEOUT);
        if probe_timeout.is_zero() {
            return Err(ConfigError::Zero {
                field: "probe timeout",
            });
        }

        let thresholds = Thresholds {
            slow_request: file_duration("thresholds.slow_request", &t.slow_request)?
                .unwrap_or(defaults.slow_request),
            max_data_node_lag: t.max_data_node_lag.unwrap_or(defaults.max_data_node_lag),
            max_time_diff: file_duration("thresholds.max_time_diff", &t.max_time_diff)?
                .unwrap_or(defaults.max_time_diff),
            min_block_height: t.min_block_height.unwrap_or(defaults.min_block_height),
        };

        Ok(Self {
            port: overrides
                .port
                .or(file.server.port)
                .unwrap_or(DEFAULT_PORT),
            check_interval,
            block_increase_period,
            blocking_block_check: overrides
                .blocking_block_check
                .or(file.schedule.blocking_block_check)
                .unwrap_or(false),
            probe_timeout,
            thresholds,
        })
    }
}

/// Pick a target URL: flag, then file, then default.
pub fn resolve_url(flag: Option<&str>, file: Option<&str>, default: &str) -> String {
    flag.or(file).unwrap_or(default).to_string()
}

fn file_duration(field: &'static str, value: &Option<String>) -> Result<Option<Duration>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_duration(raw).map(Some).ok_or_else(|| ConfigError::Duration {
            field,
            value: raw.clone(),
        }),
    }
}

/// Parse a duration string like "500ms", "5s", "2m", "1h" or a bare
/// number of seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok()?.checked_mul(60).map(Duration::from_secs)
    } else if let Some(hours) = s.strip_suffix('h') {
        hours.parse::<u64>().ok()?.checked_mul(3600).map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// `parse_duration` for clap value parsers.
pub fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).ok_or_else(|| format!("invalid duration {s:?}, expected e.g. 500ms, 30s, 2m"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("1.5s"), None);
    }

    #[test]
    fn parse_duration_overflow_is_rejected() {
        assert_eq!(parse_duration("9999999999999999h"), None);
        assert_eq!(parse_duration("999999999999999999m"), None);
        assert!(parse_duration_arg("9999999999999999h").is_err());
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::resolve(&FileConfig::default(), &Overrides::default()).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.check_interval, Duration::from_secs(30));
        assert_eq!(settings.block_increase_period, Duration::from_secs(30));
        assert!(!settings.blocking_block_check);
        assert_eq!(settings.probe_timeout, Duration::from_secs(5));
        assert_eq!(settings.thresholds, Thresholds::default());
    }

    #[test]
    fn file_values_apply() {
        let file: FileConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [schedule]
            check_interval = "10s"
            blocking_block_check = true

            [probe]
            timeout = "2s"

            [thresholds]
            slow_request = "1500ms"
            max_data_node_lag = 20
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(&file, &Overrides::default()).unwrap();
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.check_interval, Duration::from_secs(10));
        assert!(settings.blocking_block_check);
        assert_eq!(settings.probe_timeout, Duration::from_secs(2));
        assert_eq!(settings.thresholds.slow_request, Duration::from_millis(1500));
        assert_eq!(settings.thresholds.max_data_node_lag, 20);
        assert_eq!(settings.thresholds.min_block_height, 100);
    }

    #[test]
    fn flags_beat_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [server]
            port = 9090
            [schedule]
            check_interval = "10s"
            "#,
        )
        .unwrap();
        let overrides = Overrides {
            port: Some(7070),
            check_interval: Some(Duration::from_secs(5)),
            ..Overrides::default()
        };

        let settings = Settings::resolve(&file, &overrides).unwrap();
        assert_eq!(settings.port, 7070);
        assert_eq!(settings.check_interval, Duration::from_secs(5));
    }

    #[test]
    fn flag_can_disable_blocking_check_enabled_in_file() {
        let file: FileConfig =
            toml::from_str("[schedule]\nblocking_block_check = true\n").unwrap();

        let settings = Settings::resolve(&file, &Overrides::default()).unwrap();
        assert!(settings.blocking_block_check);

        let overrides = Overrides {
            blocking_block_check: Some(false),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&file, &overrides).unwrap();
        assert!(!settings.blocking_block_check);
    }

    #[test]
    fn bad_duration_in_file_is_reported_with_field() {
        let file: FileConfig = toml::from_str("[probe]\ntimeout = \"forever\"\n").unwrap();
        let err = Settings::resolve(&file, &Overrides::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid duration \"forever\" for probe.timeout");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let overrides = Overrides {
            check_interval: Some(Duration::ZERO),
            ..Overrides::default()
        };
        let err = Settings::resolve(&FileConfig::default(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Zero { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("[server]\nhost = \"0.0.0.0\"\n").is_err());
    }

    #[test]
    fn url_precedence() {
        assert_eq!(resolve_url(Some("http://a"), Some("http://b"), "http://c"), "http://a");
        assert_eq!(resolve_url(None, Some("http://b"), "http://c"), "http://b");
        assert_eq!(resolve_url(None, None, "http://c"), "http://c");
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[targets]\ncore_url = \"http://core:3003\"").unwrap();

        let config = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.targets.core_url.as_deref(), Some("http://core:3003"));
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
