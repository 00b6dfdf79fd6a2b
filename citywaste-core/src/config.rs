//! Configuration schema for one monitored household.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::Condition;

/// Sensor name prefix used when none is configured.
pub const DEFAULT_NAME: &str = "Citywaste";

/// Default interval at which the host triggers updates.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Configuration values that deserialize but cannot be used.
pub enum ConfigError {
    /// `tagprintcd` is blank.
    #[error("tagprintcd must not be empty")]
    EmptyTagCode,
    /// `aptdong` is zero.
    #[error("aptdong must be a positive integer")]
    InvalidDong,
    /// `apthono` is zero.
    #[error("apthono must be a positive integer")]
    InvalidHo,
    /// `monitored_conditions` is an empty list.
    #[error("monitored_conditions must name at least one condition")]
    NoConditions,
    /// `scan_interval_secs` is zero.
    #[error("scan_interval_secs must be a positive integer")]
    InvalidScanInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
/// Settings for one household and the sensors exposed for it.
pub struct CityWasteConfig {
    /// Tag code printed on the waste card.
    pub tagprintcd: String,
    /// Building section number.
    pub aptdong: u32,
    /// Unit number.
    pub apthono: u32,
    /// Prefix for every sensor name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Conditions exposed as sensors. Accepts a single name or a list.
    #[serde(
        default = "Condition::default_set",
        deserialize_with = "one_or_many"
    )]
    pub monitored_conditions: Vec<Condition>,
    /// Seconds between host-triggered updates.
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    /// Override of the service endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    /// File receiving log output while the dashboard is running.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl CityWasteConfig {
    /// Configuration with defaults for every optional key.
    #[must_use]
    pub fn new<S: Into<String>>(tagprintcd: S, aptdong: u32, apthono: u32) -> Self {
        Self {
            tagprintcd: tagprintcd.into(),
            aptdong,
            apthono,
            name: default_name(),
            monitored_conditions: Condition::default_set(),
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            base_url: None,
            log_file: None,
        }
    }

    /// Check the constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tagprintcd.trim().is_empty() {
            return Err(ConfigError::EmptyTagCode);
        }
        if self.aptdong == 0 {
            return Err(ConfigError::InvalidDong);
        }
        if self.apthono == 0 {
            return Err(ConfigError::InvalidHo);
        }
        if self.monitored_conditions.is_empty() {
            return Err(ConfigError::NoConditions);
        }
        if self.scan_interval_secs == 0 {
            return Err(ConfigError::InvalidScanInterval);
        }
        Ok(())
    }
}

fn default_name() -> String {
    DEFAULT_NAME.to_owned()
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Condition),
        Many(Vec<Condition>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(condition) => vec![condition],
        OneOrMany::Many(conditions) => conditions,
    })
}
