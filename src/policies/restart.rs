//! # Restart policies.
//!
//! [`RestartPolicy`] decides whether a finished attempt is followed by another one.
//!
//! ```text
//! attempt result   Never        UntilSuccess          Forever
//! ─────────────────────────────────────────────────────────────────
//! Ok(())           return Ok    return Ok             sleep, restart
//! Err(e)           return Err   sleep, restart        sleep, restart
//! stop requested   return Ok    return Ok             return Ok
//! ```

/// Policy controlling whether a service is started again after an attempt ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Run once; the attempt's result is the final result.
    Never,
    /// Restart after failures until an attempt succeeds.
    UntilSuccess,
    /// Restart after every attempt, successful or not, until stopped (default).
    #[default]
    Forever,
}

impl RestartPolicy {
    /// Whether an attempt that ended with `succeeded` should be followed by another.
    #[inline]
    pub fn should_restart(self, succeeded: bool) -> bool {
        match self {
            RestartPolicy::Never => false,
            RestartPolicy::UntilSuccess => !succeeded,
            RestartPolicy::Forever => true,
        }
    }

    /// Stable lowercase name (for events and logs).
    pub fn as_str(self) -> &'static str {
        match self {
            RestartPolicy::Never => "never",
            RestartPolicy::UntilSuccess => "until-success",
            RestartPolicy::Forever => "forever",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table() {
        assert!(!RestartPolicy::Never.should_restart(true));
        assert!(!RestartPolicy::Never.should_restart(false));
        assert!(!RestartPolicy::UntilSuccess.should_restart(true));
        assert!(RestartPolicy::UntilSuccess.should_restart(false));
        assert!(RestartPolicy::Forever.should_restart(true));
        assert!(RestartPolicy::Forever.should_restart(false));
    }

    #[test]
    fn default_is_forever() {
        assert_eq!(RestartPolicy::default(), RestartPolicy::Forever);
    }
}
