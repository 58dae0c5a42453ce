//! Typed settings for storage, logging and dose selection.
//!
//! # Responsibility
//! - Provide defaults for every setting.
//! - Load overrides from a TOML file, then from `DAILYDOSE_*` environment
//!   variables (`__` separates nested keys, e.g. `DAILYDOSE_SELECTION__ALPHA`).
//!
//! # Invariants
//! - `alpha` is finite and positive.
//! - `digest_size` is at least 1.
//! - `digest_timings` holds at least one `HH:MM` value (enforced by
//!   `DigestTimings` itself).

use crate::logging::default_log_level;
use crate::selection::timings::DigestTimings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "DAILYDOSE_";
const ENV_NESTED_DELIMITER: &str = "__";
const DEFAULT_DB_PATH: &str = "./dump/daily_dose.db";

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for `{key}`: {reason}")]
    InvalidEnv { key: String, reason: String },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Knobs of the selection algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Weight of quota pressure relative to staleness.
    pub alpha: f64,
    /// Slots per digest; mandatory doses may exceed it.
    pub digest_size: usize,
    pub digest_timings: DigestTimings,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            alpha: 10.0,
            digest_size: 5,
            digest_timings: DigestTimings::default(),
        }
    }
}

impl SelectionSettings {
    pub fn validate(&self) -> SettingsResult<()> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "selection.alpha",
                reason: format!("must be a finite number greater than 0, got {}", self.alpha),
            });
        }
        if self.digest_size == 0 {
            return Err(SettingsError::Invalid {
                field: "selection.digest_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
    pub selection: SelectionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            selection: SelectionSettings::default(),
        }
    }
}

impl Settings {
    /// Loads defaults, then `path` (if any), then process environment.
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env_overrides(std::env::vars())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> SettingsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> SettingsResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `DAILYDOSE_*` overrides from `vars`; other keys are ignored.
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> SettingsResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path: Vec<String> = name
                .split(ENV_NESTED_DELIMITER)
                .map(str::to_ascii_lowercase)
                .collect();
            let path: Vec<&str> = path.iter().map(String::as_str).collect();
            let invalid = |reason: String| SettingsError::InvalidEnv {
                key: key.clone(),
                reason,
            };

            match path.as_slice() {
                ["db_path"] => self.db_path = PathBuf::from(value),
                ["log_level"] => self.log_level = value,
                ["log_dir"] => {
                    self.log_dir = Some(PathBuf::from(value)).filter(|dir| !dir.as_os_str().is_empty())
                }
                ["selection", "alpha"] => {
                    self.selection.alpha = value
                        .trim()
                        .parse()
                        .map_err(|err| invalid(format!("{err}")))?;
                }
                ["selection", "digest_size"] => {
                    self.selection.digest_size = value
                        .trim()
                        .parse()
                        .map_err(|err| invalid(format!("{err}")))?;
                }
                ["selection", "digest_timings"] => {
                    self.selection.digest_timings =
                        DigestTimings::parse(value.split(',').filter(|part| !part.trim().is_empty()))
                            .map_err(|err| invalid(err.to_string()))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        self.selection.validate()
    }
}
