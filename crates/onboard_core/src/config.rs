//! Onboarding station configuration.
//!
//! # Responsibility
//! - Carry the registration center, workstation and language the client was
//!   provisioned with.
//! - Load and validate that configuration from JSON.
//!
//! # Invariants
//! - A constructed/loaded `OnboardConfig` has passed `validate()`.
//! - `language_code` is stored lowercase.

use crate::logging::{init_logging, LoggingConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

static STATION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,36}$").expect("valid station id regex"));
static LANGUAGE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{3}$").expect("valid language code regex"));

/// Configuration loading/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read onboarding config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse onboarding config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Provisioned identity of this registration client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardConfig {
    pub center_id: String,
    pub station_id: String,
    /// ISO 639-2 code, e.g. `eng`.
    pub language_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl OnboardConfig {
    /// Builds a validated config without logging settings.
    pub fn new(
        center_id: impl Into<String>,
        station_id: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self {
            center_id: center_id.into(),
            station_id: station_id.into(),
            language_code: language_code.into(),
            logging: None,
        };
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Checks id shapes and language code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_station_id("centerId", &self.center_id)?;
        check_station_id("stationId", &self.station_id)?;
        if !LANGUAGE_CODE_RE.is_match(&self.language_code) {
            return Err(ConfigError::Invalid {
                field: "languageCode",
                reason: format!(
                    "expected a three-letter language code, got `{}`",
                    self.language_code
                ),
            });
        }
        Ok(())
    }

    /// Starts file logging from the `logging` section.
    ///
    /// Returns `Ok(false)` when the config carries no logging section.
    pub fn start_logging(&self) -> Result<bool, String> {
        match &self.logging {
            Some(logging) => init_logging(logging).map(|()| true),
            None => Ok(false),
        }
    }

    fn normalize(&mut self) {
        self.center_id = self.center_id.trim().to_string();
        self.station_id = self.station_id.trim().to_string();
        self.language_code = self.language_code.trim().to_ascii_lowercase();
    }
}

/// Reads and validates a JSON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<OnboardConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    OnboardConfig::from_json_str(&raw)
}

fn check_station_id(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if STATION_ID_RE.is_match(value) {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field,
        reason: format!("expected 1-36 characters of [A-Za-z0-9_-], got `{value}`"),
    })
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, OnboardConfig};
    use std::io::Write;

    #[test]
    fn new_normalizes_language_code() {
        let config = OnboardConfig::new(" 10011 ", "10002", "ENG").unwrap();
        assert_eq!(config.center_id, "10011");
        assert_eq!(config.language_code, "eng");
        assert!(config.logging.is_none());
    }

    #[test]
    fn start_logging_without_section_is_a_no_op() {
        let config = OnboardConfig::new("10011", "10002", "eng").unwrap();
        assert_eq!(config.start_logging(), Ok(false));
    }

    #[test]
    fn rejects_malformed_station_id() {
        let err = OnboardConfig::new("10011", "station 2", "eng").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "stationId",
                ..
            }
        ));
    }

    #[test]
    fn rejects_two_letter_language_code() {
        let err = OnboardConfig::new("10011", "10002", "en").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "languageCode",
                ..
            }
        ));
    }

    #[test]
    fn parses_json_with_logging_section() {
        let config = OnboardConfig::from_json_str(
            r#"{
                "centerId": "10011",
                "stationId": "10002",
                "languageCode": "ara",
                "logging": { "level": "warn", "logDir": "/tmp/onboard-logs" }
            }"#,
        )
        .unwrap();
        let logging = config.logging.expect("logging section should be present");
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.log_dir, "/tmp/onboard-logs");
    }

    #[test]
    fn reports_parse_errors() {
        let err = OnboardConfig::from_json_str(r#"{"centerId": 5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"centerId":"10011","stationId":"10002","languageCode":"fra"}}"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.language_code, "fra");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
