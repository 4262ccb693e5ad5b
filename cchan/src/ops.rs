//! Quit-aware send and receive.
//!
//! Both operations check the quit signal before touching the data channel, so a
//! cancellation that is already pending always wins even if the channel is
//! ready too. While waiting, the quit signal is polled ahead of the channel on
//! every wakeup.

use crate::chan::{Receiver, Sender};
use crate::error::RecvError;
use crate::quit::QuitSignal;

use futures_util::future::{self, Either};
use futures_util::pin_mut;

/// Outcome of [`receive_or_quit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received<T> {
  /// An item was taken off the channel.
  Item(T),
  /// The channel is closed and drained.
  Closed,
  /// The quit signal fired first. Nothing was taken off the channel.
  Canceled,
}

impl<T> Received<T> {
  /// Returns `true` only for [`Received::Item`].
  #[inline]
  pub fn delivered(&self) -> bool {
    matches!(self, Received::Item(_))
  }

  /// Returns `true` for [`Received::Canceled`].
  #[inline]
  pub fn is_canceled(&self) -> bool {
    matches!(self, Received::Canceled)
  }

  /// Converts into the received item, if any.
  #[inline]
  pub fn into_item(self) -> Option<T> {
    match self {
      Received::Item(item) => Some(item),
      Received::Closed | Received::Canceled => None,
    }
  }
}

/// Sends `item` unless `quit` fires first.
///
/// Returns `true` once the item is enqueued. Returns `false`, with the item
/// dropped and the channel untouched, if `quit` had already fired, fires while
/// waiting for room, or if the channel is closed.
pub async fn send_or_quit<T, Q>(item: T, tx: &Sender<T>, quit: &Q) -> bool
where
  Q: QuitSignal + ?Sized,
{
  if quit.is_signaled() {
    return false;
  }
  let fired = quit.fired();
  let send = tx.send(item);
  pin_mut!(fired);
  match future::select(fired, send).await {
    Either::Left(((), _abandoned)) => false,
    Either::Right((sent, _)) => sent.is_ok(),
  }
}

/// Receives the next item unless `quit` fires first.
pub async fn receive_or_quit<T, Q>(rx: &Receiver<T>, quit: &Q) -> Received<T>
where
  Q: QuitSignal + ?Sized,
{
  if quit.is_signaled() {
    return Received::Canceled;
  }
  let fired = quit.fired();
  let recv = rx.recv();
  pin_mut!(fired);
  pin_mut!(recv);
  match future::select(fired, recv).await {
    Either::Left(((), _)) => Received::Canceled,
    Either::Right((Ok(item), _)) => Received::Item(item),
    Either::Right((Err(RecvError::Disconnected), _)) => Received::Closed,
  }
}
