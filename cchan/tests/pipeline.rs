mod common;
use common::*;

use cchan::{
  chan, receive_or_quit, safe_close, send_or_quit, send_result, send_results, too_much_error,
  wait_closed, ErrorRatePolicy, Quit, Received,
};

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct StageError(usize);

// --- Helper: fan-in of quit-aware producers into quit-aware consumers ---
async fn run_quit_aware_fan_in(
  num_producers: usize,
  num_consumers: usize,
  items_per_producer: usize,
  capacity: usize,
) {
  let (tx, rx) = chan::bounded(capacity);
  let quit = Quit::new();
  let seen = Arc::new(tokio::sync::Mutex::new(HashSet::new()));
  let received = Arc::new(AtomicUsize::new(0));

  let mut consumers = Vec::new();
  for _ in 0..num_consumers {
    let rx = rx.clone();
    let quit = quit.clone();
    let seen = Arc::clone(&seen);
    let received = Arc::clone(&received);
    consumers.push(tokio::spawn(async move {
      loop {
        match receive_or_quit(&rx, &quit).await {
          Received::Item(item) => {
            assert!(seen.lock().await.insert(item), "duplicate item received");
            received.fetch_add(1, Ordering::Relaxed);
          }
          Received::Closed | Received::Canceled => break,
        }
      }
    }));
  }
  drop(rx);

  let mut producers = Vec::new();
  for p_id in 0..num_producers {
    let tx = tx.clone();
    let quit = quit.clone();
    producers.push(tokio::spawn(async move {
      let batch = (0..items_per_producer).map(move |i| p_id * items_per_producer + i);
      let outcome: Result<_, StageError> = Ok(batch);
      let (err_tx, _err_rx) = chan::unbounded::<StageError>();
      assert!(send_results(outcome, &tx, &err_tx, &quit).await);
    }));
  }
  drop(tx);

  for handle in producers {
    tokio::time::timeout(LONG_TIMEOUT, handle)
      .await
      .expect("producer hung")
      .expect("producer panicked");
  }
  for handle in consumers {
    tokio::time::timeout(LONG_TIMEOUT, handle)
      .await
      .expect("consumer hung")
      .expect("consumer panicked");
  }

  let total = num_producers * items_per_producer;
  assert_eq!(received.load(Ordering::Relaxed), total);
  assert_eq!(seen.lock().await.len(), total);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fan_in_1p_1c() {
  run_quit_aware_fan_in(1, 1, ITEMS_HIGH, 16).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fan_in_mp_mc() {
  run_quit_aware_fan_in(4, 4, ITEMS_MEDIUM, 8).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fan_in_high_contention() {
  run_quit_aware_fan_in(4, 4, ITEMS_HIGH, 1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn quit_tears_down_blocked_pipeline() {
  // Nobody consumes, so every producer ends up parked on a full channel.
  let (tx, rx) = chan::bounded::<usize>(2);
  let quit = Quit::new();
  let mut producers = Vec::new();
  for p_id in 0..4 {
    let tx = tx.clone();
    let quit = quit.clone();
    producers.push(tokio::spawn(async move {
      let mut delivered = 0;
      for i in 0..ITEMS_LOW {
        if !send_or_quit(p_id * ITEMS_LOW + i, &tx, &quit).await {
          break;
        }
        delivered += 1;
      }
      delivered
    }));
  }

  // An idle consumer stuck on a different, empty channel.
  let (_idle_tx, idle_rx) = chan::unbounded::<()>();
  let idle_quit = quit.clone();
  let idle = tokio::spawn(async move { receive_or_quit(&idle_rx, &idle_quit).await });

  tokio::time::sleep(MOMENT).await;
  quit.fire();

  let mut delivered = 0;
  for handle in producers {
    delivered += tokio::time::timeout(SHORT_TIMEOUT, handle)
      .await
      .expect("producer did not observe quit")
      .unwrap();
  }
  let idle_outcome = tokio::time::timeout(SHORT_TIMEOUT, idle).await.unwrap().unwrap();
  assert_eq!(idle_outcome, Received::Canceled);

  // Only what fit in the buffer made it through.
  assert_eq!(delivered, 2);
  assert_eq!(rx.len(), 2);
  safe_close(&tx);
  assert_eq!(wait_closed(&rx).await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn error_burst_cancels_producers() {
  let quit = Quit::new();
  let (res_tx, res_rx) = chan::unbounded::<usize>();
  let (err_tx, err_rx) = chan::unbounded::<StageError>();

  let q = quit.clone();
  let supervisor = tokio::spawn(too_much_error(
    ErrorRatePolicy::new(5, ms(1000)),
    err_rx,
    move || {
      q.fire();
    },
    || {},
  ));

  // Every third unit of work fails, one unit every 10ms.
  let mut attempted = 0;
  for i in 0..ITEMS_LOW {
    let outcome = if i % 3 == 0 { Err(StageError(i)) } else { Ok(i) };
    attempted += 1;
    if !send_result(outcome, &res_tx, &err_tx, &quit).await {
      break;
    }
    tokio::time::sleep(ms(10)).await;
  }
  assert!(quit.is_fired());
  assert!(attempted < ITEMS_LOW);

  // Tear down: closing the error stream stops the supervisor.
  safe_close(&err_tx);
  safe_close(&err_tx);
  safe_close(&res_tx);
  tokio::time::timeout(SHORT_TIMEOUT, supervisor).await.unwrap().unwrap();

  let results = wait_closed(&res_rx).await;
  assert!(results.iter().all(|i| i % 3 != 0));
}
