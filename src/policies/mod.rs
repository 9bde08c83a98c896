//! Restart and delay policies.
//!
//! - [`RestartPolicy`] whether another attempt follows (never / until-success / forever)
//! - [`BackoffPolicy`] how long to sleep before it (constant by default)
//! - [`JitterPolicy`]  optional randomization of that sleep

mod backoff;
mod jitter;
mod restart;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use restart::RestartPolicy;
