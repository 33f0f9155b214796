use crate::csv_io::export::DEFAULT_EXPORT_PREFIX;
use crate::summary::ConfidenceLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "PERT_ESTIMATOR_CONFIG";
/// Environment variable holding the tracing filter for the binaries.
pub const LOG_ENV: &str = "PERT_LOG";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "could not read config: {err}"),
            ConfigError::Parse(err) => write!(f, "invalid config json: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default = "ConfidenceLevel::defaults")]
    pub confidence_levels: Vec<ConfidenceLevel>,
    #[serde(default = "default_export_prefix")]
    pub export_file_prefix: String,
}

fn default_export_prefix() -> String {
    DEFAULT_EXPORT_PREFIX.to_string()
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            confidence_levels: ConfidenceLevel::defaults(),
            export_file_prefix: default_export_prefix(),
        }
    }
}

impl EstimatorConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: EstimatorConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reads the file named by `PERT_ESTIMATOR_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(path = %path, "loading estimator config");
                Self::from_json_file(path.trim())
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for level in &self.confidence_levels {
            if level.label.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "confidence level label must not be empty".into(),
                ));
            }
            if !level.z.is_finite() || level.z < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "confidence level '{}' has invalid z {}",
                    level.label, level.z
                )));
            }
        }
        if self.export_file_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "export_file_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = EstimatorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EstimatorConfig::default());
    }

    #[test]
    fn custom_levels_are_kept_in_order() {
        let config = EstimatorConfig::from_json_str(
            r#"{"confidence_levels":[{"label":"99.7%","z":3.0},{"label":"68%","z":1.0}]}"#,
        )
        .unwrap();
        assert_eq!(config.confidence_levels[0].label, "99.7%");
        assert_eq!(config.export_file_prefix, "pert_estimation");
    }

    #[test]
    fn negative_z_is_rejected() {
        let err = EstimatorConfig::from_json_str(r#"{"confidence_levels":[{"label":"x","z":-1}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
