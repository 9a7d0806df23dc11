//! Cooperative resource budgets.
//!
//! The engine is single-threaded; deadlines are enforced by tactics and
//! search loops polling [`Budget::check`] at their checkpoints. `try-for`
//! tightens the deadline for the span of one application and restores the
//! surrounding one afterwards.

use std::time::{Duration, Instant};

use crate::error::{Result, TactixError};

/// Saved deadline state, returned by [`Budget::tighten_deadline`].
pub type SavedDeadline = Option<(Instant, Duration)>;

/// Deadline and step ceiling for one tactic application tree.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    deadline: Option<(Instant, Duration)>,
    step_limit: Option<u64>,
    steps_used: u64,
}

impl Budget {
    /// A budget with no limits.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// A budget expiring `timeout` from now.
    #[must_use]
    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            deadline: Some((Instant::now() + timeout, timeout)),
            ..Self::default()
        }
    }

    /// Adds a step ceiling.
    #[must_use]
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Installs `timeout`-from-now unless the current deadline is sooner,
    /// returning the previous state for [`Budget::restore_deadline`].
    pub fn tighten_deadline(&mut self, timeout: Duration) -> SavedDeadline {
        let saved = self.deadline;
        let candidate = Instant::now() + timeout;
        self.deadline = match saved {
            Some((at, d)) if at <= candidate => Some((at, d)),
            _ => Some((candidate, timeout)),
        };
        saved
    }

    /// Restores the state saved by [`Budget::tighten_deadline`].
    pub fn restore_deadline(&mut self, saved: SavedDeadline) {
        self.deadline = saved;
    }

    /// Fails with [`TactixError::Timeout`] when the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if let Some((at, timeout)) = self.deadline
            && Instant::now() >= at
        {
            return Err(TactixError::Timeout {
                budget_ms: timeout.as_millis() as u64,
            });
        }
        Ok(())
    }

    /// Counts `n` steps against the ceiling and polls the deadline.
    pub fn tick(&mut self, n: u64) -> Result<()> {
        self.steps_used += n;
        if let Some(limit) = self.step_limit
            && self.steps_used > limit
        {
            return Err(TactixError::StepBudgetExceeded { limit });
        }
        self.check()
    }

    /// Steps consumed so far.
    #[must_use]
    pub fn steps_used(&self) -> u64 {
        self.steps_used
    }
}
