use crate::error::Error;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogRecord`](crate::LogRecord). Serialized as the upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
  Fatal,
  Error,
  Warn,
  #[default]
  Info,
  Debug,
}

impl Level {
  pub const ALL: [Level; 5] = [Level::Fatal, Level::Error, Level::Warn, Level::Info, Level::Debug];

  pub const fn as_str(&self) -> &'static str {
    match self {
      Level::Fatal => "FATAL",
      Level::Error => "ERROR",
      Level::Warn => "WARN",
      Level::Info => "INFO",
      Level::Debug => "DEBUG",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Level {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Level::ALL
      .into_iter()
      .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| Error::UnknownLevel(s.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_case_insensitively() {
    assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
    assert_eq!(" FATAL ".parse::<Level>().unwrap(), Level::Fatal);
    assert!(matches!("trace".parse::<Level>(), Err(Error::UnknownLevel(_))));
  }

  #[test]
  fn serializes_upper_case() {
    assert_eq!(serde_json::to_string(&Level::Debug).unwrap(), "\"DEBUG\"");
    assert_eq!(Level::default(), Level::Info);
  }
}
