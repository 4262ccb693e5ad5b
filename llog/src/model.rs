use crate::level::Level;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key-value payload carried by a record.
pub type Fields = BTreeMap<String, Value>;

/// An immutable, timestamped log record as handed to a [`Sink`](crate::Sink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
  pub level: Level,
  pub msg: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
  /// Process-wide values configured on the logger.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub metadata: Fields,
  /// Context values merged with the data set on the builder.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub datas: Fields,
  #[serde(serialize_with = "ser_rfc3339_nanos", deserialize_with = "de_rfc3339")]
  pub created_at: DateTime<Utc>,
}

fn ser_rfc3339_nanos<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

fn de_rfc3339<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  DateTime::parse_from_rfc3339(&raw)
    .map(|at| at.with_timezone(&Utc))
    .map_err(serde::de::Error::custom)
}
