//! # Settings
//!
//! Operator settings for the `dedupe` binary.
//!
//! ## Sources (later wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults           database_path = ./saleguard.db, ...             │
//! │  2. TOML file          --config <path> (default saleguard.toml)        │
//! │  3. Environment        SALEGUARD_DATABASE_PATH,                        │
//! │                        SALEGUARD_DETECTION__MIN_SCORE, ...             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example `saleguard.toml`
//! ```toml
//! database_path = "/var/lib/saleguard/store.db"
//! tenant_id = "00000000-0000-0000-0000-000000000001"
//! report_utc_offset_minutes = -180
//!
//! [detection]
//! window_secs = 300
//! close_time_ms = 60000
//! min_score = 15
//! ```
//!
//! The default file is optional. A file passed with `--config` must exist.

use std::path::{Path, PathBuf};

use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use saleguard_core::duplicates::{DEFAULT_CLOSE_TIME_MS, DEFAULT_MIN_SCORE, DEFAULT_WINDOW_MINUTES};
use saleguard_core::report::DEFAULT_UTC_OFFSET_MINUTES;
use saleguard_core::{DetectionConfig, ReportFormatter, DEFAULT_TENANT_ID};
use saleguard_db::DbConfig;

/// File read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "saleguard.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "SALEGUARD";

/// Offsets beyond a full day are rejected.
const MAX_OFFSET_MINUTES: u32 = 24 * 60;

/// Longest accepted detection window: one day.
const MAX_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Longest accepted close-time threshold: one day.
const MAX_CLOSE_TIME_MS: i64 = MAX_WINDOW_SECS * 1000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Tunables for the detector, in plain units for TOML and env vars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub window_secs: i64,
    pub close_time_ms: i64,
    pub min_score: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        DetectionSettings {
            window_secs: DEFAULT_WINDOW_MINUTES * 60,
            close_time_ms: DEFAULT_CLOSE_TIME_MS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file holding the sales history.
    pub database_path: PathBuf,
    /// Tenant whose sales are scanned.
    pub tenant_id: String,
    /// Offset used for dates in the `.txt` report.
    pub report_utc_offset_minutes: i32,
    pub detection: DetectionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_path: PathBuf::from("./saleguard.db"),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            report_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            detection: DetectionSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings from the optional file and `SALEGUARD_*` variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, SettingsError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        Self::load_with(config_path, env)
    }

    fn load_with(config_path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let required = config_path.is_some();
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        debug!(path = %path.display(), required, "Loading settings");

        let settings = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(env)
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the detector or report cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(SettingsError::invalid("database_path", "must not be empty"));
        }

        if self.tenant_id.trim().is_empty() {
            return Err(SettingsError::invalid("tenant_id", "must not be empty"));
        }

        if self.report_utc_offset_minutes.unsigned_abs() >= MAX_OFFSET_MINUTES {
            return Err(SettingsError::invalid(
                "report_utc_offset_minutes",
                format!("must be within ±{MAX_OFFSET_MINUTES}"),
            ));
        }

        if !(1..=MAX_WINDOW_SECS).contains(&self.detection.window_secs) {
            return Err(SettingsError::invalid(
                "detection.window_secs",
                format!("must be between 1 and {MAX_WINDOW_SECS}"),
            ));
        }

        if !(0..=MAX_CLOSE_TIME_MS).contains(&self.detection.close_time_ms) {
            return Err(SettingsError::invalid(
                "detection.close_time_ms",
                format!("must be between 0 and {MAX_CLOSE_TIME_MS}"),
            ));
        }

        Ok(())
    }

    /// Detector configuration. Fails on durations chrono cannot represent,
    /// for settings that were built without [`Settings::validate`].
    pub fn detection_config(&self) -> Result<DetectionConfig, SettingsError> {
        let window = Duration::try_seconds(self.detection.window_secs)
            .ok_or_else(|| SettingsError::invalid("detection.window_secs", "out of range"))?;
        let close_time = Duration::try_milliseconds(self.detection.close_time_ms)
            .ok_or_else(|| SettingsError::invalid("detection.close_time_ms", "out of range"))?;

        Ok(DetectionConfig::default()
            .window(window)
            .close_time(close_time)
            .min_score(self.detection.min_score))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }

    pub fn report_formatter(&self) -> ReportFormatter {
        ReportFormatter::new(self.report_utc_offset_minutes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        // an explicit path must exist
        assert!(Settings::load_with(Some(&missing), env(&[])).is_err());

        // the default file is optional
        let settings = Settings::load_with(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.database_path, PathBuf::from("./saleguard.db"));
        assert_eq!(settings.tenant_id, DEFAULT_TENANT_ID);
        assert_eq!(settings.report_utc_offset_minutes, -180);
        assert_eq!(settings.detection_config().unwrap(), DetectionConfig::default());
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saleguard.toml");
        std::fs::write(
            &path,
            r#"
database_path = "/data/loja.db"
report_utc_offset_minutes = 0

[detection]
window_secs = 120
min_score = 18
"#,
        )
        .unwrap();

        let settings = Settings::load_with(
            Some(&path),
            env(&[
                ("SALEGUARD_TENANT_ID", "loja-42"),
                ("SALEGUARD_DETECTION__MIN_SCORE", "20"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.database_path, PathBuf::from("/data/loja.db"));
        assert_eq!(settings.tenant_id, "loja-42");
        assert_eq!(settings.report_utc_offset_minutes, 0);
        assert_eq!(settings.detection.window_secs, 120);
        assert_eq!(settings.detection.close_time_ms, DEFAULT_CLOSE_TIME_MS);
        assert_eq!(settings.detection.min_score, 20);

        let config = settings.detection_config().unwrap();
        assert_eq!(config.window, Duration::minutes(2));
        assert_eq!(config.min_score, 20);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[detection]\nwindow_secs = 0\n").unwrap();

        let err = Settings::load_with(Some(&path), env(&[])).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "detection.window_secs",
                ..
            }
        ));

        let mut settings = Settings::default();
        settings.tenant_id = " ".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.report_utc_offset_minutes = 24 * 60;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.report_utc_offset_minutes = i32::MIN;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                field: "report_utc_offset_minutes",
                ..
            })
        ));

        let mut settings = Settings::default();
        settings.detection.close_time_ms = i64::MAX;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_oversized_window_from_env_is_rejected() {
        let err = Settings::load_with(
            None,
            env(&[("SALEGUARD_DETECTION__WINDOW_SECS", "10000000000000000")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "detection.window_secs",
                ..
            }
        ));

        let err = Settings::load_with(
            None,
            env(&[("SALEGUARD_REPORT_UTC_OFFSET_MINUTES", "-2147483648")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "report_utc_offset_minutes",
                ..
            }
        ));

        // unvalidated settings still fail without panicking
        let mut settings = Settings::default();
        settings.detection.window_secs = i64::MAX;
        assert!(settings.detection_config().is_err());
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "database_path = [\n").unwrap();

        let err = Settings::load_with(Some(&path), env(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::Load(_)));
    }
}
