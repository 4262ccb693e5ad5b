//! Broadcast cancellation.
//!
//! A [`Quit`] is shared by every producer and consumer of one generation of
//! work. Firing it is a one-way, idempotent transition; every task waiting on
//! it wakes, and every later check sees it fired.
//!
//! The quit-aware operations accept any [`QuitSignal`], so a plain channel
//! whose payload is irrelevant can stand in for a `Quit`: a [`Receiver`] counts
//! as signaled once an item is buffered or the channel is closed. Observing it
//! never consumes the item, so every observer of the same receiver agrees.

use crate::chan::{Readable, Receiver};
use crate::internal::wait_list::{wake_all, WaitList};

use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Anything that can cancel a quit-aware operation.
pub trait QuitSignal {
  /// Future resolving once the signal has fired.
  type Fired<'a>: Future<Output = ()> + 'a
  where
    Self: 'a;

  /// Returns `true` if the signal has already fired.
  fn is_signaled(&self) -> bool;

  /// Returns a future that resolves once the signal fires.
  fn fired(&self) -> Self::Fired<'_>;
}

struct Inner {
  fired: AtomicBool,
  waiters: Mutex<WaitList>,
}

/// A cloneable, fire-once cancellation signal.
#[derive(Clone)]
pub struct Quit {
  inner: Arc<Inner>,
}

impl Quit {
  /// Creates a signal that has not fired.
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Inner {
        fired: AtomicBool::new(false),
        waiters: Mutex::new(WaitList::new()),
      }),
    }
  }

  /// Fires the signal, waking every waiter.
  ///
  /// Returns `true` if this call performed the transition, `false` if the
  /// signal had already fired.
  pub fn fire(&self) -> bool {
    if self.inner.fired.swap(true, Ordering::AcqRel) {
      return false;
    }
    let wakers = self.inner.waiters.lock().take_all();
    wake_all(wakers);
    true
  }

  /// Returns `true` once [`Quit::fire`] has been called on any clone.
  #[inline]
  pub fn is_fired(&self) -> bool {
    self.inner.fired.load(Ordering::Acquire)
  }

  /// Returns a future that resolves once the signal fires.
  pub fn wait(&self) -> Fired<'_> {
    Fired {
      quit: self,
      key: None,
    }
  }
}

impl Default for Quit {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Quit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Quit").field("fired", &self.is_fired()).finish()
  }
}

/// Future returned by [`Quit::wait`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Fired<'a> {
  quit: &'a Quit,
  key: Option<usize>,
}

impl Future for Fired<'_> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let this = self.get_mut();
    let inner = &this.quit.inner;
    if inner.fired.load(Ordering::Acquire) {
      if this.key.is_some() {
        inner.waiters.lock().remove(&mut this.key);
      }
      return Poll::Ready(());
    }
    let mut waiters = inner.waiters.lock();
    // `fire` flips the flag before draining under this lock, so a re-check
    // here cannot miss it.
    if inner.fired.load(Ordering::Acquire) {
      waiters.remove(&mut this.key);
      return Poll::Ready(());
    }
    waiters.register(&mut this.key, cx.waker());
    Poll::Pending
  }
}

impl Drop for Fired<'_> {
  fn drop(&mut self) {
    if self.key.is_some() {
      self.quit.inner.waiters.lock().remove(&mut self.key);
    }
  }
}

impl fmt::Debug for Fired<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Fired").field("quit", self.quit).finish()
  }
}

impl QuitSignal for Quit {
  type Fired<'a> = Fired<'a>;

  fn is_signaled(&self) -> bool {
    self.is_fired()
  }

  fn fired(&self) -> Fired<'_> {
    self.wait()
  }
}

impl<Q> QuitSignal for Receiver<Q> {
  type Fired<'a> = Readable<'a, Q> where Self: 'a;

  fn is_signaled(&self) -> bool {
    self.is_readable()
  }

  fn fired(&self) -> Readable<'_, Q> {
    self.readable()
  }
}
