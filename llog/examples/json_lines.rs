// examples/json_lines.rs

use llog::{data, msg, tag, JsonLinesSink, Level, LogContext, Logger};

fn main() -> llog::Result<()> {
  let logger = Logger::new(JsonLinesSink::stdout())
    .default_tags(["demo"])
    .metadata("host", "localhost")
    .context_keys(["request_id"]);

  let ctx = LogContext::new().with("request_id", "req-001");

  msg("service starting").log(&logger, &ctx)?;

  tag("db")
    .msg("slow query")
    .level(Level::Warn)
    .data("elapsed_ms", 812)
    .log(&logger, &ctx)?;

  data("attempt", 3)
    .data("reason", "connection reset")
    .msg("giving up")
    .level(Level::Error)
    .log(&logger, &ctx.with("request_id", "req-002"))?;

  Ok(())
}
