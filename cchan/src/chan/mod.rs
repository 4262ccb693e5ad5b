//! A closable multi-producer, multi-consumer FIFO channel.
//!
//! This is the data channel every other primitive in the crate operates on.
//! Unlike most Rust channels, closing is an explicit, channel-wide act
//! ([`Sender::close`]) that any sender handle may perform once; later attempts
//! report [`CloseError`] instead of panicking. Buffered items survive the close
//! and are still drained by receivers before they observe end-of-stream.
//! Dropping the last sender handle closes the channel as well.

mod shared;

use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use shared::Shared;

use futures_core::Stream;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Creates a channel that holds at most `capacity` buffered items.
///
/// A capacity of `0` is treated as `1`: rendezvous hand-off is not supported.
pub fn bounded<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
  from_shared(Arc::new(Shared::new(Some(capacity.max(1)))))
}

/// Creates a channel without a buffering limit.
pub fn unbounded<T>() -> (Sender<T>, Receiver<T>) {
  from_shared(Arc::new(Shared::new(None)))
}

fn from_shared<T>(shared: Arc<Shared<T>>) -> (Sender<T>, Receiver<T>) {
  (
    Sender {
      shared: Arc::clone(&shared),
    },
    Receiver {
      shared,
      stream_key: None,
    },
  )
}

// --- Sender ---

/// The sending half of a channel. Cloneable.
pub struct Sender<T> {
  pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Sender<T> {
  /// Sends a value, waiting while the channel is full.
  ///
  /// Fails with [`SendError`] if the channel is closed, or every receiver is
  /// gone, before the value could be enqueued.
  pub fn send(&self, value: T) -> SendFuture<'_, T> {
    SendFuture {
      shared: &self.shared,
      value: Some(value),
      key: None,
    }
  }

  /// Attempts to send a value without waiting.
  pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
    self.shared.try_send(value)
  }

  /// Closes the channel for every handle.
  ///
  /// Only the first call succeeds; every later call, from this or any other
  /// sender, returns [`CloseError`].
  pub fn close(&self) -> Result<(), CloseError> {
    self.shared.close()
  }

  /// Returns `true` once the channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }

  /// Returns the number of buffered items.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// Returns `true` if nothing is buffered.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the buffering limit, or `None` for an unbounded channel.
  pub fn capacity(&self) -> Option<usize> {
    self.shared.capacity
  }
}

impl<T> Clone for Sender<T> {
  fn clone(&self) -> Self {
    self.shared.sender_count.fetch_add(1, Ordering::Relaxed);
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T> Drop for Sender<T> {
  fn drop(&mut self) {
    if self.shared.sender_count.fetch_sub(1, Ordering::AcqRel) == 1 {
      // Already closed explicitly is fine.
      let _ = self.shared.close();
    }
  }
}

impl<T> fmt::Debug for Sender<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Sender").field("shared", &self.shared).finish()
  }
}

// --- Receiver ---

/// The receiving half of a channel. Cloneable; each item goes to exactly one
/// receiver.
pub struct Receiver<T> {
  pub(crate) shared: Arc<Shared<T>>,
  stream_key: Option<usize>,
}

impl<T> Receiver<T> {
  /// Receives the next item, waiting while the channel is empty.
  ///
  /// Resolves to [`RecvError::Disconnected`] once the channel is closed and
  /// every buffered item has been taken.
  pub fn recv(&self) -> RecvFuture<'_, T> {
    RecvFuture {
      shared: &self.shared,
      key: None,
    }
  }

  /// Attempts to receive an item without waiting.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    self.shared.try_recv()
  }

  /// Waits until an item is buffered or the channel is closed, without
  /// consuming anything.
  pub fn readable(&self) -> Readable<'_, T> {
    Readable {
      shared: &self.shared,
      key: None,
    }
  }

  /// Returns `true` if a `try_recv` would not report [`TryRecvError::Empty`].
  pub fn is_readable(&self) -> bool {
    self.shared.is_readable()
  }

  /// Returns `true` once the channel has been closed. Buffered items may
  /// still be pending.
  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }

  /// Returns the number of buffered items.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// Returns `true` if nothing is buffered.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the buffering limit, or `None` for an unbounded channel.
  pub fn capacity(&self) -> Option<usize> {
    self.shared.capacity
  }
}

impl<T> Clone for Receiver<T> {
  fn clone(&self) -> Self {
    self.shared.receiver_count.fetch_add(1, Ordering::Relaxed);
    Self {
      shared: Arc::clone(&self.shared),
      stream_key: None,
    }
  }
}

impl<T> Drop for Receiver<T> {
  fn drop(&mut self) {
    self.shared.unregister_recv(&mut self.stream_key);
    self.shared.release_receiver();
  }
}

impl<T> fmt::Debug for Receiver<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Receiver").field("shared", &self.shared).finish()
  }
}

impl<T> Stream for Receiver<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
    let this = self.get_mut();
    match this.shared.poll_recv(&mut this.stream_key, cx) {
      Poll::Ready(Ok(item)) => Poll::Ready(Some(item)),
      Poll::Ready(Err(RecvError::Disconnected)) => Poll::Ready(None),
      Poll::Pending => Poll::Pending,
    }
  }
}

// --- Futures ---

/// Future returned by [`Sender::send`].
///
/// Dropping it before completion drops the value without enqueuing it.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct SendFuture<'a, T> {
  shared: &'a Shared<T>,
  value: Option<T>,
  key: Option<usize>,
}

// The value is moved out by `Option::take`, never pinned in place.
impl<T> Unpin for SendFuture<'_, T> {}

impl<T> Future for SendFuture<'_, T> {
  type Output = Result<(), SendError<T>>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    this.shared.poll_send(&mut this.value, &mut this.key, cx)
  }
}

impl<T> Drop for SendFuture<'_, T> {
  fn drop(&mut self) {
    self.shared.unregister_send(&mut self.key);
  }
}

impl<T> fmt::Debug for SendFuture<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SendFuture")
      .field("pending", &self.value.is_some())
      .finish()
  }
}

/// Future returned by [`Receiver::recv`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct RecvFuture<'a, T> {
  shared: &'a Shared<T>,
  key: Option<usize>,
}

impl<T> Future for RecvFuture<'_, T> {
  type Output = Result<T, RecvError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    this.shared.poll_recv(&mut this.key, cx)
  }
}

impl<T> Drop for RecvFuture<'_, T> {
  fn drop(&mut self) {
    self.shared.unregister_recv(&mut self.key);
  }
}

impl<T> fmt::Debug for RecvFuture<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecvFuture").finish_non_exhaustive()
  }
}

/// Future returned by [`Receiver::readable`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Readable<'a, T> {
  shared: &'a Shared<T>,
  key: Option<usize>,
}

impl<T> Future for Readable<'_, T> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let this = self.get_mut();
    this.shared.poll_readable(&mut this.key, cx)
  }
}

impl<T> Drop for Readable<'_, T> {
  fn drop(&mut self) {
    self.shared.unregister_recv(&mut self.key);
  }
}

impl<T> fmt::Debug for Readable<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Readable").finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;
  use tokio::time::timeout;

  const TEST_TIMEOUT: Duration = Duration::from_secs(1);

  #[tokio::test]
  async fn fifo_order() {
    let (tx, rx) = unbounded();
    for i in 0..5 {
      tx.send(i).await.unwrap();
    }
    for i in 0..5 {
      assert_eq!(rx.recv().await.unwrap(), i);
    }
  }

  #[tokio::test]
  async fn close_drains_then_disconnects() {
    let (tx, rx) = bounded(4);
    tx.send("a").await.unwrap();
    tx.send("b").await.unwrap();
    tx.close().unwrap();

    assert_eq!(rx.recv().await, Ok("a"));
    assert_eq!(rx.try_recv(), Ok("b"));
    assert_eq!(rx.recv().await, Err(RecvError::Disconnected));
    assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
  }

  #[tokio::test]
  async fn second_close_reports_error() {
    let (tx, _rx) = unbounded::<u8>();
    let tx2 = tx.clone();
    assert_eq!(tx.close(), Ok(()));
    assert_eq!(tx2.close(), Err(CloseError));
    assert_eq!(tx.close(), Err(CloseError));
    assert!(tx2.is_closed());
  }

  #[tokio::test]
  async fn send_after_close_returns_item() {
    let (tx, _rx) = unbounded();
    tx.close().unwrap();
    assert_eq!(tx.send(9).await.unwrap_err().into_inner(), 9);
    assert_eq!(tx.try_send(10), Err(TrySendError::Closed(10)));
  }

  #[tokio::test]
  async fn last_sender_drop_closes() {
    let (tx, rx) = unbounded::<i32>();
    let tx2 = tx.clone();
    drop(tx);
    assert!(!rx.is_closed());
    drop(tx2);
    assert!(rx.is_closed());
    assert_eq!(rx.recv().await, Err(RecvError::Disconnected));
  }

  #[tokio::test]
  async fn send_fails_once_receivers_are_gone() {
    let (tx, rx) = bounded(1);
    drop(rx);
    assert_eq!(tx.try_send(1), Err(TrySendError::Closed(1)));
    assert!(tx.send(2).await.is_err());
  }

  #[tokio::test]
  async fn full_channel_blocks_until_recv() {
    let (tx, rx) = bounded(1);
    tx.try_send(1).unwrap();
    assert_eq!(tx.try_send(2), Err(TrySendError::Full(2)));

    let handle = tokio::spawn(async move {
      tx.send(2).await.unwrap();
    });
    tokio::task::yield_now().await;
    assert_eq!(rx.recv().await, Ok(1));
    timeout(TEST_TIMEOUT, handle)
      .await
      .expect("blocked sender never woke")
      .unwrap();
    assert_eq!(rx.recv().await, Ok(2));
  }

  #[tokio::test]
  async fn close_wakes_blocked_receiver() {
    let (tx, rx) = unbounded::<()>();
    let handle = tokio::spawn(async move { rx.recv().await });
    tokio::task::yield_now().await;
    tx.close().unwrap();
    let res = timeout(TEST_TIMEOUT, handle).await.unwrap().unwrap();
    assert_eq!(res, Err(RecvError::Disconnected));
  }

  #[tokio::test]
  async fn readable_does_not_consume() {
    let (tx, rx) = unbounded();
    tx.send(3).await.unwrap();
    timeout(TEST_TIMEOUT, rx.readable()).await.unwrap();
    assert!(rx.is_readable());
    assert_eq!(rx.try_recv(), Ok(3));
    assert!(!rx.is_readable());
  }

  #[tokio::test]
  async fn stream_ends_on_close() {
    use futures_util::StreamExt;

    let (tx, rx) = unbounded();
    for i in 0..3 {
      tx.try_send(i).unwrap();
    }
    drop(tx);
    let items: Vec<_> = rx.collect().await;
    assert_eq!(items, vec![0, 1, 2]);
  }

  #[test]
  fn no_send_lands_once_closed_is_observed() {
    for _ in 0..200 {
      let (tx, rx) = unbounded::<usize>();
      let closer = tx.clone();
      let writer = std::thread::spawn(move || {
        let mut sent = 0;
        for i in 0..1000 {
          let was_closed = tx.is_closed();
          let res = tx.try_send(i);
          if was_closed {
            assert!(res.is_err(), "send {} landed after close was observed", i);
          }
          if res.is_ok() {
            sent += 1;
          }
        }
        sent
      });
      std::thread::yield_now();
      closer.close().unwrap();
      let sent = writer.join().unwrap();
      assert_eq!(rx.len(), sent);
    }
  }

  #[tokio::test]
  async fn zero_capacity_is_one() {
    let (tx, _rx) = bounded::<u8>(0);
    assert_eq!(tx.capacity(), Some(1));
    tx.try_send(1).unwrap();
    assert!(matches!(tx.try_send(2), Err(TrySendError::Full(2))));
  }
}
