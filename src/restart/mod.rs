//! Restart wrapper over any [`Runner`](crate::Runner).
//!
//! [`RestartRunner`] keeps re-invoking the wrapped runner as its
//! [`RestartPolicy`](crate::RestartPolicy) dictates, sleeping per
//! [`BackoffPolicy`](crate::BackoffPolicy) in between, until the policy is
//! satisfied or a stop arrives.

mod runner;

pub use runner::RestartRunner;
