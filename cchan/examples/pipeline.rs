// examples/pipeline.rs
//
// A three-stage pipeline supervised by both monitors. Run with
// `RUST_LOG=cchan=debug` to see the monitor events.
use cchan::{
  chan, receive_or_quit, safe_close, send_or_quit, send_result, timeout, too_much_error,
  wait_closed, MonitorConfig, Quit, Received,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
error_rate:
  threshold: 5
  window: 500ms
watchdog:
  initial: 1s
  steady: 250ms
"#;

#[derive(Debug)]
struct ParseError(u32);

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = MonitorConfig::from_yaml_str(CONFIG).expect("invalid monitor config");
  let quit = Quit::new();

  let (input_tx, input_rx) = chan::bounded::<u32>(8);
  let (output_tx, output_rx) = chan::bounded::<u32>(8);
  let (err_tx, err_rx) = chan::unbounded::<ParseError>();
  let (progress_tx, progress_rx) = chan::unbounded::<()>();

  if let Some(policy) = config.error_rate {
    let q = quit.clone();
    tokio::spawn(too_much_error(
      policy,
      err_rx,
      move || {
        println!("[Supervisor] Too many errors, quitting.");
        q.fire();
      },
      || println!("[Supervisor] Error stream closed."),
    ));
  }
  if let Some(policy) = config.watchdog {
    let q = quit.clone();
    tokio::spawn(timeout(
      policy,
      progress_rx,
      move || {
        println!("[Watchdog] Stage stalled, quitting.");
        q.fire();
      },
      || println!("[Watchdog] Progress stream closed."),
    ));
  }

  // Source: one number every 40ms until told to stop.
  let source_quit = quit.clone();
  let source = tokio::spawn(async move {
    for n in 0.. {
      if !send_or_quit(n, &input_tx, &source_quit).await {
        break;
      }
      tokio::time::sleep(Duration::from_millis(40)).await;
    }
    safe_close(&input_tx);
  });

  // Worker: past 60 the input turns bad and every odd number fails to parse.
  let worker_quit = quit.clone();
  let worker = tokio::spawn(async move {
    while let Received::Item(n) = receive_or_quit(&input_rx, &worker_quit).await {
      let outcome = if n > 60 && n % 2 == 1 { Err(ParseError(n)) } else { Ok(n * n) };
      if !send_result(outcome, &output_tx, &err_tx, &worker_quit).await {
        break;
      }
      let _ = progress_tx.try_send(());
    }
    safe_close(&output_tx);
    safe_close(&err_tx);
    safe_close(&progress_tx);
  });

  let sink = tokio::spawn(async move { wait_closed(&output_rx).await });

  let _ = tokio::time::timeout(Duration::from_secs(5), quit.wait()).await;
  quit.fire();

  source.await.expect("source panicked");
  worker.await.expect("worker panicked");
  let results = sink.await.expect("sink panicked");
  println!("[Main] Pipeline drained {} results.", results.len());
}
