use crate::chan::Receiver;
use crate::config::ErrorRatePolicy;

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Sliding window over the most recent error timestamps.
///
/// Holds at most `threshold` entries. Each recorded occurrence that fills the
/// window is evaluated against the span of the window, then the oldest entry
/// is evicted, so the window slides by exactly one occurrence at a time.
#[derive(Debug, Clone)]
pub struct ErrorWindow {
  threshold: usize,
  window: Duration,
  stamps: VecDeque<Instant>,
}

impl ErrorWindow {
  /// A `threshold` of zero behaves like one.
  pub fn new(policy: ErrorRatePolicy) -> Self {
    let threshold = policy.threshold.max(1);
    Self {
      threshold,
      window: policy.window,
      stamps: VecDeque::with_capacity(threshold.min(1024)),
    }
  }

  /// Records one occurrence at `at`. Returns `true` if the last `threshold`
  /// occurrences, this one included, span less than the configured window.
  pub fn record(&mut self, at: Instant) -> bool {
    self.stamps.push_back(at);
    if self.stamps.len() < self.threshold {
      return false;
    }
    let (Some(&oldest), Some(&newest)) = (self.stamps.front(), self.stamps.back()) else {
      return false;
    };
    let span = newest
      .checked_duration_since(oldest)
      .unwrap_or_else(|| oldest.duration_since(newest));
    self.stamps.pop_front();
    span < self.window
  }

  /// Number of timestamps currently retained.
  pub fn len(&self) -> usize {
    self.stamps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stamps.is_empty()
  }
}

/// Watches an error stream and calls `on_breach` every time the most recent
/// `policy.threshold` errors arrived within `policy.window` of each other.
///
/// Only the arrival of an error matters, not its content. Runs until the
/// channel closes, then calls `on_closed` once and returns. Intended to be
/// spawned next to the pipeline it supervises; `on_breach` typically fires the
/// pipeline's [`Quit`](crate::Quit).
pub async fn too_much_error<E, B, C>(
  policy: ErrorRatePolicy,
  errors: Receiver<E>,
  mut on_breach: B,
  on_closed: C,
) where
  B: FnMut(),
  C: FnOnce(),
{
  let mut window = ErrorWindow::new(policy);
  while errors.recv().await.is_ok() {
    if window.record(Instant::now()) {
      warn!(
        threshold = policy.threshold,
        window_ms = policy.window.as_millis() as u64,
        "error rate threshold breached"
      );
      on_breach();
    }
  }
  debug!("error stream closed, error-rate monitor stopping");
  on_closed();
}
