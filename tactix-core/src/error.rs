//! Error types shared across the tactix crates.
//!
//! Tactic failure is an ordinary error value: a combinator such as
//! [`OrElseTactic`](crate::tactic::OrElseTactic) catches the `Err` and tries
//! its next alternative, the same way the interactive front ends of other
//! solvers catch a tactic exception.

use thiserror::Error;

/// Result alias used throughout the tactix crates.
pub type Result<T> = std::result::Result<T, TactixError>;

/// The error type for term construction, tactic application, and solving.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TactixError {
    /// An operation was given terms of incompatible sorts.
    #[error("sort mismatch in `{op}`: {details}")]
    SortMismatch {
        /// Operation that rejected its operands.
        op: &'static str,
        /// Human-readable description of the mismatch.
        details: String,
    },

    /// Two bit-vector operands have different widths.
    #[error("width mismatch in `{op}`: {lhs} vs {rhs} bits")]
    WidthMismatch {
        /// Operation that rejected its operands.
        op: &'static str,
        /// Width of the left operand.
        lhs: u32,
        /// Width of the right operand.
        rhs: u32,
    },

    /// Bit-vector width outside the supported `1..=64` range.
    #[error("unsupported bit-vector width {width} (supported: 1..=64)")]
    UnsupportedWidth {
        /// The rejected width.
        width: u32,
    },

    /// A tactic name was not found in the registry.
    #[error("unknown tactic `{0}`")]
    UnknownTactic(String),

    /// A probe name was not found in the registry.
    #[error("unknown probe `{0}`")]
    UnknownProbe(String),

    /// A tactic gave up on the goal.
    #[error("tactic `{name}` failed: {reason}")]
    Tactic {
        /// Name of the failing tactic.
        name: String,
        /// Why it failed.
        reason: String,
    },

    /// A `fail-if` guard fired.
    #[error("tactic failed: precondition violated ({probe} evaluated to {value})")]
    PreconditionFailed {
        /// Rendering of the probe that fired.
        probe: String,
        /// The probe's value on the goal.
        value: f64,
    },

    /// A deadline set by `try-for` or the solver expired.
    #[error("timeout after {budget_ms} ms")]
    Timeout {
        /// The deadline that expired, in milliseconds.
        budget_ms: u64,
    },

    /// The step ceiling of a [`Budget`](crate::resource::Budget) was hit.
    #[error("step budget exhausted ({limit} steps)")]
    StepBudgetExceeded {
        /// The configured ceiling.
        limit: u64,
    },

    /// A parameter value had the wrong type or an out-of-range value.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter key.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl TactixError {
    /// Builds a [`TactixError::SortMismatch`].
    pub fn sort_mismatch(op: &'static str, details: impl Into<String>) -> Self {
        Self::SortMismatch {
            op,
            details: details.into(),
        }
    }

    /// Builds a [`TactixError::Tactic`] failure.
    pub fn tactic(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Tactic {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let e = TactixError::tactic("sat", "goal is not propositional");
        assert_eq!(e.to_string(), "tactic `sat` failed: goal is not propositional");

        let e = TactixError::PreconditionFailed {
            probe: "(> size 2)".into(),
            value: 3.0,
        };
        assert!(e.to_string().starts_with("tactic failed: precondition violated"));

        let e = TactixError::Timeout { budget_ms: 10 };
        assert_eq!(e.to_string(), "timeout after 10 ms");
    }
}
