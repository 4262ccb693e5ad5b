#![warn(missing_debug_implementations, rust_2018_idioms)]

//! Cancellable channel coordination for producer/consumer pipelines.
//!
//! A pipeline stage shares one [`Quit`] between all of its producers and
//! consumers. Producers emit through [`send_or_quit`] or the dispatch
//! combinators ([`send_result`], [`send_results`]) and consumers read through
//! [`receive_or_quit`], so once the quit signal fires nobody stays parked on a
//! full or empty channel. Supervisors run [`too_much_error`] or [`timeout`] on
//! a side-channel and fire the quit signal from their callbacks.
//!
//! ```no_run
//! use cchan::{chan, send_or_quit, too_much_error, ErrorRatePolicy, Quit};
//! use std::time::Duration;
//!
//! # async fn run() {
//! let quit = Quit::new();
//! let (err_tx, err_rx) = chan::unbounded::<std::io::Error>();
//! let q = quit.clone();
//! tokio::spawn(too_much_error(
//!   ErrorRatePolicy::new(10, Duration::from_secs(1)),
//!   err_rx,
//!   move || {
//!     q.fire();
//!   },
//!   || {},
//! ));
//!
//! let (tx, _rx) = chan::bounded(16);
//! while send_or_quit(42u32, &tx, &quit).await {}
//! drop(err_tx);
//! # }
//! ```

pub mod chan;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod introspect;
pub mod monitor;
pub mod ops;
pub mod quit;

// Internal utilities - not part of public API but exposed for crate use
mod internal;

pub use chan::{bounded, unbounded, Receiver, Sender};
pub use config::{ConfigError, ErrorRatePolicy, MonitorConfig, WatchdogPolicy};
pub use dispatch::{send_result, send_results};
pub use error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
pub use introspect::{is_closed, safe_close, wait_closed, Lookahead, Probe};
pub use monitor::{timeout, too_much_error, ErrorWindow, Watchdog};
pub use ops::{receive_or_quit, send_or_quit, Received};
pub use quit::{Quit, QuitSignal};

// Helper function to check if a type is Send + Sync.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}
