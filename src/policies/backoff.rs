//! # Delay between restart attempts.
//!
//! The delay before attempt `n + 1` after `n` consecutive failures is
//! `first × factor^n`, clamped to `max`, then jittered. A constant interval is
//! the special case `factor = 1.0`, `jitter = None` (see [`BackoffPolicy::constant`]).
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use svcvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(3), Duration::from_millis(800));
//! assert_eq!(backoff.next(4), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Restart delay policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failure (and after every success).
    pub first: Duration,
    /// Upper bound for the computed delay.
    pub max: Duration,
    /// Growth factor per consecutive failure (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied after clamping.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Constant 5s, matching the default restart interval.
    fn default() -> Self {
        Self::constant(Duration::from_secs(5))
    }
}

impl BackoffPolicy {
    /// Fixed `interval` between attempts, no growth, no jitter.
    pub fn constant(interval: Duration) -> Self {
        Self {
            first: interval,
            max: interval,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Delay to sleep after `failures` consecutive failed attempts (0 = none).
    pub fn next(&self, failures: u32) -> Duration {
        let base = if failures == 0 || self.factor == 1.0 {
            self.first.min(self.max)
        } else {
            let exp = i32::try_from(failures).unwrap_or(i32::MAX);
            let secs = self.first.as_secs_f64() * self.factor.powi(exp);
            if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
                self.max
            } else {
                Duration::from_secs_f64(secs)
            }
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(first_ms: u64, max_ms: u64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn constant_never_grows() {
        let policy = BackoffPolicy::constant(Duration::from_millis(5));
        for failures in [0, 1, 10, u32::MAX] {
            assert_eq!(policy.next(failures), Duration::from_millis(5));
        }
    }

    #[test]
    fn doubles_until_max() {
        let policy = exp(50, 1_000);
        assert_eq!(policy.next(0), Duration::from_millis(50));
        assert_eq!(policy.next(1), Duration::from_millis(100));
        assert_eq!(policy.next(2), Duration::from_millis(200));
        assert_eq!(policy.next(5), Duration::from_millis(1_000));
    }

    #[test]
    fn first_above_max_is_clamped() {
        assert_eq!(exp(2_000, 500).next(0), Duration::from_millis(500));
    }

    #[test]
    fn overflow_clamps_to_max() {
        assert_eq!(exp(100, 10_000).next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn zero_interval_is_allowed() {
        assert_eq!(BackoffPolicy::constant(Duration::ZERO).next(3), Duration::ZERO);
    }

    #[test]
    fn jitter_stays_below_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..exp(100, 30_000)
        };
        for failures in 0..10 {
            let base = Duration::from_millis(100 * 2u64.pow(failures));
            assert!(policy.next(failures) <= base);
        }
    }
}
