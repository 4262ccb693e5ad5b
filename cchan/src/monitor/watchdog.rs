use crate::chan::Receiver;
use crate::config::WatchdogPolicy;

use std::time::Duration;
use tracing::{debug, trace, warn};

/// Wait-duration state of an idle watchdog.
///
/// Starts on the initial grace period and collapses to the steady period for
/// good once the first progress signal is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watchdog {
  policy: WatchdogPolicy,
  warmed_up: bool,
}

impl Watchdog {
  pub fn new(policy: WatchdogPolicy) -> Self {
    Self {
      policy,
      warmed_up: false,
    }
  }

  /// How long the next timer should run.
  #[inline]
  pub fn current(&self) -> Duration {
    if self.warmed_up {
      self.policy.steady
    } else {
      self.policy.initial
    }
  }

  pub fn observe_progress(&mut self) {
    self.warmed_up = true;
  }

  /// `true` once at least one progress signal has been observed.
  pub fn is_warmed_up(&self) -> bool {
    self.warmed_up
  }
}

/// Calls `on_timeout` whenever no progress signal arrives within the current
/// wait duration, then re-arms with that duration again.
///
/// The alarm is recurring: it keeps firing every period for as long as the
/// stream stays silent, until the callback arranges for the stream to close.
/// Every progress signal restarts the timer and, from the first one on, the
/// steady period replaces the initial one. Once the progress channel closes,
/// `on_closed` is called once and the function returns.
pub async fn timeout<D, T, C>(
  policy: WatchdogPolicy,
  progress: Receiver<D>,
  mut on_timeout: T,
  on_closed: C,
) where
  T: FnMut(),
  C: FnOnce(),
{
  let mut watchdog = Watchdog::new(policy);
  loop {
    let wait = watchdog.current();
    tokio::select! {
      biased;
      signal = progress.recv() => match signal {
        Ok(_) => {
          trace!("progress observed, watchdog re-armed");
          watchdog.observe_progress();
        }
        Err(_) => break,
      },
      () = tokio::time::sleep(wait) => {
        warn!(
          idle_ms = wait.as_millis() as u64,
          warmed_up = watchdog.is_warmed_up(),
          "no progress within watchdog period"
        );
        on_timeout();
      }
    }
  }
  debug!("progress stream closed, watchdog stopping");
  on_closed();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn grace_period_collapses_after_first_signal() {
    let mut watchdog = Watchdog::new(WatchdogPolicy::new(
      Duration::from_secs(1),
      Duration::from_millis(500),
    ));
    assert_eq!(watchdog.current(), Duration::from_secs(1));
    watchdog.observe_progress();
    assert_eq!(watchdog.current(), Duration::from_millis(500));
    watchdog.observe_progress();
    assert_eq!(watchdog.current(), Duration::from_millis(500));
    assert!(watchdog.is_warmed_up());
  }
}
