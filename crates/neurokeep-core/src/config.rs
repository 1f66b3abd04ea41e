//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::clock::{CivilClock, DEFAULT_UTC_OFFSET_HOURS};

pub const ENV_DB_PATH: &str = "NEUROKEEP_DB_PATH";
pub const ENV_UTC_OFFSET_HOURS: &str = "NEUROKEEP_UTC_OFFSET_HOURS";
pub const ENV_SEED_DEMO: &str = "NEUROKEEP_SEED_DEMO";

pub const DEFAULT_DB_PATH: &str = "./data/neurokeep.db";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    #[error("UTC offset out of range (-12..=14): {0}")]
    OffsetOutOfRange(i32),
}

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Civil UTC offset in whole hours
    pub utc_offset_hours: i32,
    /// Seed demo data on startup when the database has no doctor
    pub seed_demo: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            seed_demo: false,
        }
    }
}

impl CoreConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup. Unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup(ENV_DB_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let utc_offset_hours = match lookup(ENV_UTC_OFFSET_HOURS) {
            Some(raw) => raw.trim().parse::<i32>().map_err(|_| ConfigError::InvalidValue {
                var: ENV_UTC_OFFSET_HOURS.to_string(),
                value: raw.clone(),
            })?,
            None => defaults.utc_offset_hours,
        };
        if CivilClock::with_offset_hours(utc_offset_hours).is_none() {
            return Err(ConfigError::OffsetOutOfRange(utc_offset_hours));
        }

        let seed_demo = match lookup(ENV_SEED_DEMO) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                var: ENV_SEED_DEMO.to_string(),
                value: raw.clone(),
            })?,
            None => defaults.seed_demo,
        };

        info!(
            db_path = %db_path.display(),
            utc_offset_hours,
            seed_demo,
            "loaded configuration"
        );

        Ok(Self {
            db_path,
            utc_offset_hours,
            seed_demo,
        })
    }

    /// Clock for the configured offset. An offset that bypassed
    /// [`CoreConfig::from_lookup`] validation falls back to the default.
    pub fn clock(&self) -> CivilClock {
        CivilClock::with_offset_hours(self.utc_offset_hours).unwrap_or_default()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
