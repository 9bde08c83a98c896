//! The runner abstraction shared by every layer.
//!
//! - [`Runner`] four-method capability (open / run / stop / close)
//! - [`RunnerRef`] shared `Arc<dyn Runner>` handle

mod runner;

pub use runner::{Runner, RunnerRef};
