//! Supervisor loops that turn a side-channel into policy callbacks.
//!
//! Neither monitor cancels anything by itself. The callbacks decide what a
//! breach or a stall means, usually by firing the pipeline's quit signal.

mod error_rate;
mod watchdog;

pub use error_rate::{too_much_error, ErrorWindow};
pub use watchdog::{timeout, Watchdog};
