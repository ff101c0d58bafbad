//! Experiment configuration, stored as [ron]. Every field is optional in the
//! file and falls back to its default, so a config can be as small as
//!
//! ```text
//! (device: Some("/dev/ttyACM0"), start_trial: 50)
//! ```
//!
//! Trials are numbered from 1 unless `start_trial` says otherwise. The lab's
//! original sessions started at trial 50, so set `start_trial: 50` to carry
//! on that numbering.

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt, fs, path::Path, path::PathBuf};

use crate::{accuracy::DEFAULT_MAX_DISTANCE, spiral::SpiralParams};

/// Settings for a run of the tracing experiment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Folder that trace files are written to
    pub out_dir: PathBuf,
    /// Serial device to read encoders from. When absent the user picks one.
    pub device: Option<String>,
    /// Baud rate of the serial device
    pub baud: u32,
    /// Number of the first trial of this session
    pub start_trial: u32,
    /// How long a trial records for, in milliseconds
    pub trial_duration_ms: u64,
    /// How long the countdown before a trial lasts, in milliseconds
    pub countdown_ms: u64,
    /// Shape of the spiral being traced
    pub spiral: SpiralParams,
    /// Mean distance, in pixels, that scores 0%
    pub max_distance: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("trace_data"),
            device: None,
            baud: 9600,
            start_trial: 1,
            trial_duration_ms: 10_000,
            countdown_ms: 3_000,
            spiral: SpiralParams::default(),
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

/// Errors from loading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// Returned when the file cannot be read.
    IoError(std::io::Error),

    /// Returned when the file is not valid RON for [ExperimentConfig].
    RonSpannedError(ron::de::SpannedError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ConfigError::IoError(error) => Cow::from(format!("io error: {}", error)),
            ConfigError::RonSpannedError(error) => {
                Cow::from(format!("ron spanning error: {}", error))
            }
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for ConfigError {}

impl ExperimentConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(ConfigError::RonSpannedError)
    }

    /// Load a configuration from the path provided.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_ron(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(
            ExperimentConfig::from_ron("()").unwrap(),
            ExperimentConfig::default()
        );
    }

    #[test]
    fn partial_config_overrides_only_what_it_names() {
        let cfg = ExperimentConfig::from_ron(
            r#"(device: Some("/dev/ttyACM0"), start_trial: 50, spiral: (b: 15.0))"#,
        )
        .unwrap();

        assert_eq!(cfg.device.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(cfg.start_trial, 50);
        assert_eq!(cfg.spiral.b, 15.0);
        assert_eq!(cfg.spiral.a, 10.0);
        assert_eq!(cfg.baud, 9600);
        assert_eq!(cfg.trial_duration_ms, 10_000);
    }

    #[test]
    fn trials_start_at_one_unless_configured() {
        assert_eq!(ExperimentConfig::default().start_trial, 1);
        let cfg = ExperimentConfig::from_ron("(start_trial: 50)").unwrap();
        assert_eq!(cfg.start_trial, 50);
    }

    #[test]
    fn bad_config_is_reported() {
        assert!(matches!(
            ExperimentConfig::from_ron("(baud: \"fast\")"),
            Err(ConfigError::RonSpannedError(_))
        ));
    }

    #[test]
    fn config_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.ron");
        fs::write(&path, "(countdown_ms: 1000)").unwrap();

        let cfg = ExperimentConfig::from_path(&path).unwrap();
        assert_eq!(cfg.countdown_ms, 1000);
        assert!(matches!(
            ExperimentConfig::from_path(dir.path().join("missing.ron")),
            Err(ConfigError::IoError(_))
        ));
    }
}
