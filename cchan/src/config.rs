// src/config.rs
// Monitor policies. Durations accept humantime strings ("250ms", "1s", "2m").

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating monitor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to parse monitor configuration: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidValue { field: &'static str, message: String },
}

/// A specialized `Result` type for configuration loading.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

fn de_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

fn ensure_non_zero(field: &'static str, value: Duration) -> Result<()> {
  if value.is_zero() {
    return Err(ConfigError::InvalidValue {
      field,
      message: "duration must be greater than zero".to_string(),
    });
  }
  Ok(())
}

/// Breaker policy: trip when the last `threshold` errors all arrived within
/// `window` of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorRatePolicy {
  pub threshold: usize,
  #[serde(deserialize_with = "de_duration")]
  pub window: Duration,
}

impl ErrorRatePolicy {
  pub const fn new(threshold: usize, window: Duration) -> Self {
    Self { threshold, window }
  }

  pub fn validate(&self) -> Result<()> {
    if self.threshold == 0 {
      return Err(ConfigError::InvalidValue {
        field: "error_rate.threshold",
        message: "threshold must be at least 1".to_string(),
      });
    }
    ensure_non_zero("error_rate.window", self.window)
  }
}

/// Watchdog policy: `initial` applies until the first progress signal,
/// `steady` from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchdogPolicy {
  #[serde(deserialize_with = "de_duration")]
  pub initial: Duration,
  #[serde(deserialize_with = "de_duration")]
  pub steady: Duration,
}

impl WatchdogPolicy {
  pub const fn new(initial: Duration, steady: Duration) -> Self {
    Self { initial, steady }
  }

  /// Same duration before and after the first progress signal.
  pub const fn uniform(period: Duration) -> Self {
    Self::new(period, period)
  }

  pub fn validate(&self) -> Result<()> {
    ensure_non_zero("watchdog.initial", self.initial)?;
    ensure_non_zero("watchdog.steady", self.steady)
  }
}

/// Top-level monitor configuration, typically one section of a larger
/// application config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
  #[serde(default)]
  pub error_rate: Option<ErrorRatePolicy>,
  #[serde(default)]
  pub watchdog: Option<WatchdogPolicy>,
}

impl MonitorConfig {
  /// Parses and validates a YAML document.
  pub fn from_yaml_str(source: &str) -> Result<Self> {
    let config: MonitorConfig = serde_yaml::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if let Some(policy) = &self.error_rate {
      policy.validate()?;
    }
    if let Some(policy) = &self.watchdog {
      policy.validate()?;
    }
    Ok(())
  }
}
