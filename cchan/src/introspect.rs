//! Draining, probing and closing channels.
//!
//! [`wait_closed`] and [`is_closed`] both take items off the channel. Use
//! [`Lookahead`] when a caller needs to look without losing anything.

use crate::chan::{Receiver, Sender};
use crate::error::{RecvError, TryRecvError};

use tracing::trace;

/// Receives until the channel closes and returns everything seen, in arrival
/// order.
///
/// Competes with any other receiver of the same channel; items they take are
/// not in the returned vector.
pub async fn wait_closed<T>(rx: &Receiver<T>) -> Vec<T> {
  let mut items = Vec::new();
  while let Ok(item) = rx.recv().await {
    items.push(item);
  }
  items
}

/// Result of [`is_closed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
  /// An item was buffered. It has been taken off the channel.
  Item(T),
  /// The channel is closed and drained.
  Closed,
  /// The channel is open with nothing buffered.
  Empty,
}

impl<T> Probe<T> {
  /// Returns `true` only for [`Probe::Closed`].
  #[inline]
  pub fn is_closed(&self) -> bool {
    matches!(self, Probe::Closed)
  }

  /// Splits into a `(closed, item)` pair.
  pub fn into_parts(self) -> (bool, Option<T>) {
    match self {
      Probe::Item(item) => (false, Some(item)),
      Probe::Closed => (true, None),
      Probe::Empty => (false, None),
    }
  }
}

/// Non-blocking probe. Consumes one buffered item if there is one.
pub fn is_closed<T>(rx: &Receiver<T>) -> Probe<T> {
  match rx.try_recv() {
    Ok(item) => Probe::Item(item),
    Err(TryRecvError::Disconnected) => Probe::Closed,
    Err(TryRecvError::Empty) => Probe::Empty,
  }
}

/// Closes the channel unless it is already closed. Never panics, never blocks.
///
/// Returns `true` if this call closed it.
pub fn safe_close<T>(tx: &Sender<T>) -> bool {
  match tx.close() {
    Ok(()) => true,
    Err(_) => {
      trace!("safe_close on an already closed channel");
      false
    }
  }
}

/// A receiver with a one-item read-ahead slot.
///
/// [`Lookahead::peek`] moves the next item into the slot instead of handing it
/// out, and every receive serves the slot first, so looking never loses data.
#[derive(Debug)]
pub struct Lookahead<T> {
  rx: Receiver<T>,
  slot: Option<T>,
}

impl<T> Lookahead<T> {
  pub fn new(rx: Receiver<T>) -> Self {
    Self { rx, slot: None }
  }

  /// Returns the next item without consuming it, or `None` if nothing is
  /// buffered right now.
  pub fn peek(&mut self) -> Option<&T> {
    if self.slot.is_none() {
      self.slot = self.rx.try_recv().ok();
    }
    self.slot.as_ref()
  }

  /// Non-destructive closed check: `true` only once the channel is closed and
  /// nothing is left, including the read-ahead slot.
  pub fn is_closed(&mut self) -> bool {
    if self.slot.is_some() {
      return false;
    }
    match self.rx.try_recv() {
      Ok(item) => {
        self.slot = Some(item);
        false
      }
      Err(TryRecvError::Disconnected) => true,
      Err(TryRecvError::Empty) => false,
    }
  }

  pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
    match self.slot.take() {
      Some(item) => Ok(item),
      None => self.rx.try_recv(),
    }
  }

  pub async fn recv(&mut self) -> Result<T, RecvError> {
    match self.slot.take() {
      Some(item) => Ok(item),
      None => self.rx.recv().await,
    }
  }

  /// Returns the receiver and whatever sat in the read-ahead slot.
  pub fn into_parts(self) -> (Receiver<T>, Option<T>) {
    (self.rx, self.slot)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chan::unbounded;

  #[tokio::test]
  async fn wait_closed_collects_in_order() {
    let (tx, rx) = unbounded();
    let producer = tokio::spawn(async move {
      for i in 0..20 {
        tx.send(i).await.unwrap();
        if i % 5 == 0 {
          tokio::task::yield_now().await;
        }
      }
    });
    let items = wait_closed(&rx).await;
    producer.await.unwrap();
    assert_eq!(items, (0..20).collect::<Vec<_>>());
    assert!(rx.is_empty());
  }

  #[test]
  fn probe_reports_all_three_states() {
    let (tx, rx) = unbounded();
    assert_eq!(is_closed(&rx), Probe::Empty);

    tx.try_send(4).unwrap();
    assert_eq!(is_closed(&rx).into_parts(), (false, Some(4)));
    assert!(rx.is_empty(), "probe consumes the item it reports");

    tx.try_send(5).unwrap();
    safe_close(&tx);
    assert_eq!(is_closed(&rx), Probe::Item(5));
    assert!(is_closed(&rx).is_closed());
  }

  #[test]
  fn safe_close_twice_is_harmless() {
    let (tx, rx) = unbounded::<()>();
    assert!(safe_close(&tx));
    assert!(!safe_close(&tx));
    assert!(tx.is_closed());
    assert_eq!(is_closed(&rx), Probe::Closed);
  }

  #[test]
  fn safe_close_after_plain_close() {
    let (tx, _rx) = unbounded::<()>();
    tx.close().unwrap();
    assert!(!safe_close(&tx));
  }

  #[tokio::test]
  async fn lookahead_peek_keeps_item() {
    let (tx, rx) = unbounded();
    let mut ahead = Lookahead::new(rx);
    assert_eq!(ahead.peek(), None);

    tx.try_send(1).unwrap();
    tx.try_send(2).unwrap();
    assert_eq!(ahead.peek(), Some(&1));
    assert_eq!(ahead.peek(), Some(&1));
    assert!(!ahead.is_closed());

    tx.close().unwrap();
    assert_eq!(ahead.recv().await, Ok(1));
    assert_eq!(ahead.try_recv(), Ok(2));
    assert!(ahead.is_closed());
    assert_eq!(ahead.recv().await, Err(RecvError::Disconnected));
  }

  #[test]
  fn lookahead_is_closed_caches_item() {
    let (tx, rx) = unbounded();
    tx.try_send("last").unwrap();
    tx.close().unwrap();

    let mut ahead = Lookahead::new(rx);
    assert!(!ahead.is_closed());
    let (_rx, slot) = ahead.into_parts();
    assert_eq!(slot, Some("last"));
  }
}
