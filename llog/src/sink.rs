// src/sink.rs
// Destinations for finished records.

use crate::error::SinkError;
use crate::level::Level;
use crate::model::LogRecord;

use parking_lot::Mutex;
use std::fmt;
use std::io::Write;

/// Receives finished records. Implementations may fail; the error is handed
/// back to whoever called [`Logger::log`](crate::Logger::log).
pub trait Sink: Send + Sync {
  fn write(&self, record: &LogRecord) -> Result<(), SinkError>;
}

impl<F> Sink for F
where
  F: Fn(&LogRecord) -> Result<(), SinkError> + Send + Sync,
{
  fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
    self(record)
  }
}

/// Writes one JSON document per line.
pub struct JsonLinesSink<W> {
  writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
  pub fn new(writer: W) -> Self {
    Self {
      writer: Mutex::new(writer),
    }
  }

  pub fn into_inner(self) -> W {
    self.writer.into_inner()
  }
}

impl JsonLinesSink<std::io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }
}

impl<W: Write + Send> Sink for JsonLinesSink<W> {
  fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    let mut writer = self.writer.lock();
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
  }
}

impl<W> fmt::Debug for JsonLinesSink<W> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("JsonLinesSink").finish_non_exhaustive()
  }
}

/// Keeps every record in memory. Handy for tests and for buffering before a
/// real sink is available.
#[derive(Debug, Default)]
pub struct MemorySink {
  records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn records(&self) -> Vec<LogRecord> {
    self.records.lock().clone()
  }

  pub fn take(&self) -> Vec<LogRecord> {
    std::mem::take(&mut *self.records.lock())
  }
}

impl Sink for MemorySink {
  fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
    self.records.lock().push(record.clone());
    Ok(())
  }
}

/// Re-emits records as `tracing` events under the `llog` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl Sink for TracingSink {
  fn write(&self, record: &LogRecord) -> Result<(), SinkError> {
    let tags = record.tags.join(",");
    let datas = serde_json::to_string(&record.datas)?;
    let created_at = record.created_at.to_rfc3339();
    match record.level {
      Level::Fatal | Level::Error => {
        tracing::error!(target: "llog", level = %record.level, %tags, %datas, %created_at, "{}", record.msg)
      }
      Level::Warn => tracing::warn!(target: "llog", %tags, %datas, %created_at, "{}", record.msg),
      Level::Info => tracing::info!(target: "llog", %tags, %datas, %created_at, "{}", record.msg),
      Level::Debug => tracing::debug!(target: "llog", %tags, %datas, %created_at, "{}", record.msg),
    }
    Ok(())
  }
}
