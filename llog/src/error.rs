use thiserror::Error;

/// Failure reported by a [`Sink`](crate::Sink).
#[derive(Debug, Error)]
pub enum SinkError {
  #[error("Failed to write log record: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to serialize log record: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("Sink rejected log record: {0}")]
  Rejected(String),
}

/// The main error type for the `llog` library.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Sink(#[from] SinkError),

  #[error("Unknown log level '{0}'")]
  UnknownLevel(String),
}

/// A specialized `Result` type for `llog` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
