use std::fmt;
use std::task::Waker;

/// Registry of parked task wakers.
///
/// A waiting future keeps the key handed out by [`WaitList::register`] and
/// passes it back on every poll, so repeated polls refresh one entry instead of
/// piling up duplicates. Keys removed by [`WaitList::take_all`] simply stop
/// matching and the next `register` call issues a fresh one.
///
/// This list does no synchronization itself; owners keep it behind their lock
/// and wake the drained wakers only after releasing that lock.
pub(crate) struct WaitList {
  next_key: usize,
  entries: Vec<(usize, Waker)>,
}

impl WaitList {
  pub(crate) const fn new() -> Self {
    Self {
      next_key: 0,
      entries: Vec::new(),
    }
  }

  /// Registers (or refreshes) the waker stored under `slot`.
  pub(crate) fn register(&mut self, slot: &mut Option<usize>, waker: &Waker) {
    if let Some(key) = *slot {
      if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
        if !existing.will_wake(waker) {
          *existing = waker.clone();
        }
        return;
      }
    }
    let key = self.next_key;
    self.next_key = self.next_key.wrapping_add(1);
    self.entries.push((key, waker.clone()));
    *slot = Some(key);
  }

  /// Drops the entry under `slot`, if it is still registered.
  pub(crate) fn remove(&mut self, slot: &mut Option<usize>) {
    if let Some(key) = slot.take() {
      if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
        self.entries.swap_remove(pos);
      }
    }
  }

  /// Drains every registered waker. Wake them after the guarding lock is released.
  #[must_use]
  pub(crate) fn take_all(&mut self) -> Vec<Waker> {
    self.entries.drain(..).map(|(_, waker)| waker).collect()
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }
}

impl fmt::Debug for WaitList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WaitList")
      .field("waiting", &self.entries.len())
      .finish()
  }
}

pub(crate) fn wake_all(wakers: Vec<Waker>) {
  for waker in wakers {
    waker.wake();
  }
}
