use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use crate::internal::wait_list::{wake_all, WaitList};

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::task::{Context, Poll};

pub(crate) struct State<T> {
  pub(crate) queue: VecDeque<T>,
  /// Set once by the first close (explicit or last-sender drop). Guarded by the
  /// lock so waiters never miss the transition.
  pub(crate) closed: bool,
  /// Set once the last receiver handle is gone.
  pub(crate) receivers_gone: bool,
  pub(crate) recv_waiters: WaitList,
  pub(crate) send_waiters: WaitList,
}

/// State shared by every sender and receiver handle of one channel.
pub(crate) struct Shared<T> {
  pub(crate) state: Mutex<State<T>>,
  /// Atomic close flag. The handle that wins the `false -> true` exchange is
  /// the one and only closer. Only written while `state` is locked, together
  /// with `State::closed`.
  pub(crate) close_flag: AtomicBool,
  pub(crate) capacity: Option<usize>,
  pub(crate) sender_count: AtomicUsize,
  pub(crate) receiver_count: AtomicUsize,
}

impl<T> Shared<T> {
  pub(crate) fn new(capacity: Option<usize>) -> Self {
    Self {
      state: Mutex::new(State {
        queue: VecDeque::with_capacity(capacity.unwrap_or(0).min(1024)),
        closed: false,
        receivers_gone: false,
        recv_waiters: WaitList::new(),
        send_waiters: WaitList::new(),
      }),
      close_flag: AtomicBool::new(false),
      capacity,
      sender_count: AtomicUsize::new(1),
      receiver_count: AtomicUsize::new(1),
    }
  }

  #[inline]
  fn has_room(&self, state: &State<T>) -> bool {
    match self.capacity {
      Some(cap) => state.queue.len() < cap,
      None => true,
    }
  }

  pub(crate) fn close(&self) -> Result<(), CloseError> {
    let wakers = {
      let mut state = self.state.lock();
      // Flipped under the lock so no send can slip in once `is_closed` is true.
      if self
        .close_flag
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
      {
        return Err(CloseError);
      }
      state.closed = true;
      let mut wakers = state.recv_waiters.take_all();
      wakers.extend(state.send_waiters.take_all());
      wakers
    };
    wake_all(wakers);
    Ok(())
  }

  #[inline]
  pub(crate) fn is_closed(&self) -> bool {
    self.close_flag.load(Ordering::Acquire)
  }

  pub(crate) fn release_receiver(&self) {
    if self.receiver_count.fetch_sub(1, Ordering::AcqRel) != 1 {
      return;
    }
    let wakers = {
      let mut state = self.state.lock();
      state.receivers_gone = true;
      state.send_waiters.take_all()
    };
    wake_all(wakers);
  }

  pub(crate) fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
    let wakers = {
      let mut state = self.state.lock();
      if state.closed || state.receivers_gone {
        return Err(TrySendError::Closed(value));
      }
      if !self.has_room(&state) {
        return Err(TrySendError::Full(value));
      }
      state.queue.push_back(value);
      state.recv_waiters.take_all()
    };
    wake_all(wakers);
    Ok(())
  }

  /// Poll half of an awaited send. `value` is only taken once it is enqueued
  /// (or handed back in the error), never in between.
  pub(crate) fn poll_send(
    &self,
    value: &mut Option<T>,
    key: &mut Option<usize>,
    cx: &mut Context<'_>,
  ) -> Poll<Result<(), SendError<T>>> {
    let mut state = self.state.lock();
    let item = match value.take() {
      Some(item) => item,
      // Polled after completion; nothing left to deliver.
      None => return Poll::Ready(Ok(())),
    };
    if state.closed || state.receivers_gone {
      state.send_waiters.remove(key);
      return Poll::Ready(Err(SendError(item)));
    }
    if !self.has_room(&state) {
      *value = Some(item);
      state.send_waiters.register(key, cx.waker());
      return Poll::Pending;
    }
    state.queue.push_back(item);
    state.send_waiters.remove(key);
    let wakers = state.recv_waiters.take_all();
    drop(state);
    wake_all(wakers);
    Poll::Ready(Ok(()))
  }

  pub(crate) fn try_recv(&self) -> Result<T, TryRecvError> {
    let (item, wakers) = {
      let mut state = self.state.lock();
      match state.queue.pop_front() {
        Some(item) => (item, state.send_waiters.take_all()),
        None if state.closed => return Err(TryRecvError::Disconnected),
        None => return Err(TryRecvError::Empty),
      }
    };
    wake_all(wakers);
    Ok(item)
  }

  pub(crate) fn poll_recv(
    &self,
    key: &mut Option<usize>,
    cx: &mut Context<'_>,
  ) -> Poll<Result<T, RecvError>> {
    let mut state = self.state.lock();
    if let Some(item) = state.queue.pop_front() {
      state.recv_waiters.remove(key);
      let wakers = state.send_waiters.take_all();
      drop(state);
      wake_all(wakers);
      return Poll::Ready(Ok(item));
    }
    if state.closed {
      state.recv_waiters.remove(key);
      return Poll::Ready(Err(RecvError::Disconnected));
    }
    state.recv_waiters.register(key, cx.waker());
    Poll::Pending
  }

  /// Resolves once an item is buffered or the channel is closed, without
  /// taking anything off the queue.
  pub(crate) fn poll_readable(&self, key: &mut Option<usize>, cx: &mut Context<'_>) -> Poll<()> {
    let mut state = self.state.lock();
    if !state.queue.is_empty() || state.closed {
      state.recv_waiters.remove(key);
      return Poll::Ready(());
    }
    state.recv_waiters.register(key, cx.waker());
    Poll::Pending
  }

  pub(crate) fn is_readable(&self) -> bool {
    let state = self.state.lock();
    !state.queue.is_empty() || state.closed
  }

  pub(crate) fn unregister_recv(&self, key: &mut Option<usize>) {
    if key.is_some() {
      self.state.lock().recv_waiters.remove(key);
    }
  }

  pub(crate) fn unregister_send(&self, key: &mut Option<usize>) {
    if key.is_some() {
      self.state.lock().send_waiters.remove(key);
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.state.lock().queue.len()
  }
}

impl<T> fmt::Debug for Shared<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Shared")
      .field("capacity", &self.capacity)
      .field("closed", &self.is_closed())
      .field("senders", &self.sender_count.load(Ordering::Relaxed))
      .field("receivers", &self.receiver_count.load(Ordering::Relaxed))
      .finish()
  }
}
