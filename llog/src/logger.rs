use crate::builder::LogBuilder;
use crate::context::LogContext;
use crate::model::{Fields, LogRecord};
use crate::sink::Sink;

use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Turns builders into records and writes them to a sink.
///
/// Carries the process-wide settings that every record picks up: default
/// tags, static metadata, and the context keys worth copying from a
/// [`LogContext`].
#[derive(Clone)]
pub struct Logger {
  sink: Arc<dyn Sink>,
  default_tags: Vec<String>,
  metadata: Fields,
  context_keys: Vec<String>,
}

impl Logger {
  pub fn new(sink: impl Sink + 'static) -> Self {
    Self::with_shared_sink(Arc::new(sink))
  }

  pub fn with_shared_sink(sink: Arc<dyn Sink>) -> Self {
    Self {
      sink,
      default_tags: Vec::new(),
      metadata: Fields::new(),
      context_keys: Vec::new(),
    }
  }

  /// Tags appended to every record that does not already carry them.
  pub fn default_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.default_tags = tags.into_iter().map(Into::into).collect();
    self
  }

  pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.metadata.insert(key.into(), value.into());
    self
  }

  /// Context keys copied into a record's data when present.
  pub fn context_keys<I, S>(mut self, keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.context_keys = keys.into_iter().map(Into::into).collect();
    self
  }

  /// Stamps a record. Unset level means `Info`; builder data wins over
  /// context data under the same key.
  pub fn build(&self, builder: LogBuilder, ctx: &LogContext) -> LogRecord {
    let LogBuilder {
      level,
      msg,
      mut tags,
      datas,
    } = builder;

    for tag in &self.default_tags {
      if !tags.contains(tag) {
        tags.push(tag.clone());
      }
    }

    let mut merged = Fields::new();
    for key in &self.context_keys {
      if let Some(value) = ctx.get(key) {
        merged.insert(key.clone(), value.clone());
      }
    }
    merged.extend(datas);

    LogRecord {
      level: level.unwrap_or_default(),
      msg,
      tags,
      metadata: self.metadata.clone(),
      datas: merged,
      created_at: Utc::now(),
    }
  }

  pub fn log(&self, builder: LogBuilder, ctx: &LogContext) -> crate::Result<()> {
    let record = self.build(builder, ctx);
    self.sink.write(&record)?;
    Ok(())
  }
}

impl fmt::Debug for Logger {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Logger")
      .field("default_tags", &self.default_tags)
      .field("metadata", &self.metadata)
      .field("context_keys", &self.context_keys)
      .finish_non_exhaustive()
  }
}
