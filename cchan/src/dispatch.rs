//! Routing a stage's output to its result or error channel.
//!
//! The combinators never inspect or wrap the error; it travels as ordinary
//! data. A `false` return always means cancellation (or a closed output
//! channel) was observed, never that the error path was taken.

use crate::chan::Sender;
use crate::ops::send_or_quit;
use crate::quit::QuitSignal;

/// Forwards `Ok` values to `results` and `Err` values to `errors`.
///
/// Exactly one of the two channels is written to per call. Returns whether the
/// value was delivered before `quit` fired.
pub async fn send_result<T, E, Q>(
  outcome: Result<T, E>,
  results: &Sender<T>,
  errors: &Sender<E>,
  quit: &Q,
) -> bool
where
  Q: QuitSignal + ?Sized,
{
  match outcome {
    Ok(value) => send_or_quit(value, results, quit).await,
    Err(err) => send_or_quit(err, errors, quit).await,
  }
}

/// Forwards every element of an `Ok` batch to `results` in order, or a single
/// `Err` to `errors`.
///
/// Stops at the first element that is not delivered and returns `false`;
/// everything already sent stays sent, nothing after it is attempted. Returns
/// `true` only if the whole batch (or the error) was delivered.
pub async fn send_results<I, T, E, Q>(
  outcome: Result<I, E>,
  results: &Sender<T>,
  errors: &Sender<E>,
  quit: &Q,
) -> bool
where
  I: IntoIterator<Item = T>,
  Q: QuitSignal + ?Sized,
{
  let batch = match outcome {
    Ok(batch) => batch,
    Err(err) => return send_or_quit(err, errors, quit).await,
  };
  for value in batch {
    if !send_or_quit(value, results, quit).await {
      return false;
    }
  }
  true
}
