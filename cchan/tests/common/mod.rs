#![allow(dead_code)]

use cchan::Quit;
use std::time::Duration;

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(3);
/// How long an assertion waits for a callback that should already have run.
pub const MOMENT: Duration = Duration::from_millis(50);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;

pub fn ms(millis: u64) -> Duration {
  Duration::from_millis(millis)
}

pub async fn assert_fired(quit: &Quit) {
  if tokio::time::timeout(MOMENT, quit.wait()).await.is_err() {
    panic!("quit signal was not fired");
  }
}

pub async fn assert_not_fired(quit: &Quit) {
  tokio::time::sleep(MOMENT).await;
  assert!(!quit.is_fired(), "quit signal fired unexpectedly");
}
