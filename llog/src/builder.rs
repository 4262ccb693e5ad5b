use crate::context::LogContext;
use crate::level::Level;
use crate::logger::Logger;
use crate::model::Fields;

use serde_json::Value;

/// Fluent accumulator for one log record.
///
/// Nothing is stamped or validated until [`Logger::build`] (or
/// [`LogBuilder::log`]) turns it into a [`LogRecord`](crate::LogRecord).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogBuilder {
  pub(crate) level: Option<Level>,
  pub(crate) msg: String,
  pub(crate) tags: Vec<String>,
  pub(crate) datas: Fields,
}

impl LogBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn level(mut self, level: Level) -> Self {
    self.level = Some(level);
    self
  }

  pub fn msg(mut self, msg: impl Into<String>) -> Self {
    self.msg = msg.into();
    self
  }

  /// Appends `tag` unless it is already present.
  pub fn tag(mut self, tag: impl Into<String>) -> Self {
    let tag = tag.into();
    if !self.tags.contains(&tag) {
      self.tags.push(tag);
    }
    self
  }

  /// Replaces every tag set so far.
  pub fn tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.tags = tags.into_iter().map(Into::into).collect();
    self
  }

  /// Sets one data entry, overwriting an earlier value under the same key.
  pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.datas.insert(key.into(), value.into());
    self
  }

  /// Replaces every data entry set so far.
  pub fn datas<I, K, V>(mut self, datas: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
  {
    self.datas = datas.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    self
  }

  /// Builds the record with `logger` and writes it to the logger's sink.
  pub fn log(self, logger: &Logger, ctx: &LogContext) -> crate::Result<()> {
    logger.log(self, ctx)
  }
}

// Shorthand entry points, so call sites can start the chain from any field.

pub fn level(level: Level) -> LogBuilder {
  LogBuilder::new().level(level)
}

pub fn msg(msg: impl Into<String>) -> LogBuilder {
  LogBuilder::new().msg(msg)
}

pub fn tag(tag: impl Into<String>) -> LogBuilder {
  LogBuilder::new().tag(tag)
}

pub fn tags<I, S>(tags: I) -> LogBuilder
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  LogBuilder::new().tags(tags)
}

pub fn data(key: impl Into<String>, value: impl Into<Value>) -> LogBuilder {
  LogBuilder::new().data(key, value)
}

pub fn datas<I, K, V>(datas: I) -> LogBuilder
where
  I: IntoIterator<Item = (K, V)>,
  K: Into<String>,
  V: Into<Value>,
{
  LogBuilder::new().datas(datas)
}
