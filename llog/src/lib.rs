//! Structured log records built fluently and handed to a pluggable sink.
//!
//! ```
//! use llog::{msg, Level, LogContext, Logger, MemorySink};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = Logger::with_shared_sink(sink.clone())
//!   .default_tags(["ingest"])
//!   .context_keys(["request_id"]);
//!
//! let ctx = LogContext::new().with("request_id", "r-17");
//! msg("batch rejected")
//!   .level(Level::Warn)
//!   .data("rows", 120)
//!   .log(&logger, &ctx)
//!   .unwrap();
//!
//! let record = &sink.records()[0];
//! assert_eq!(record.tags, vec!["ingest"]);
//! assert_eq!(record.datas["request_id"], "r-17");
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod level;
pub mod logger;
pub mod model;
pub mod sink;

pub use builder::{data, datas, level, msg, tag, tags, LogBuilder};
pub use context::LogContext;
pub use error::{Error, Result, SinkError};
pub use level::Level;
pub use logger::Logger;
pub use model::{Fields, LogRecord};
pub use sink::{JsonLinesSink, MemorySink, Sink, TracingSink};
