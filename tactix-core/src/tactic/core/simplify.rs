//! Simplification Tactic.
//!
//! Rewrites every assertion with the shared term rewriter, drops the ones
//! that become `true`, and collapses the goal to `[false]` when any
//! assertion becomes `false`.
//!
//! ## References
//!
//! - Z3's `tactic/core/simplify_tactic.cpp`

use crate::error::Result;
use crate::rewrite::{RewriteConfig, Rewriter};
use crate::tactic::{Goal, Tactic, TacticContext, TacticResult};

/// Configuration for the simplify tactic.
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    /// Flatten nested `and`/`or`/`+`/`*` applications.
    pub flat: bool,
    /// Rewrite `and` into negated `or`.
    pub elim_and: bool,
    /// Rewrite step ceiling.
    pub max_steps: u64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        let rw = RewriteConfig::default();
        Self {
            flat: rw.flat,
            elim_and: rw.elim_and,
            max_steps: rw.max_steps,
        }
    }
}

/// Rewrites assertions into simplified form.
#[derive(Default)]
pub struct SimplifyTactic {
    config: SimplifyConfig,
}

impl SimplifyTactic {
    /// Creates the tactic with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the tactic with `config`.
    #[must_use]
    pub fn with_config(config: SimplifyConfig) -> Self {
        Self { config }
    }
}

impl Tactic for SimplifyTactic {
    fn name(&self) -> &str {
        "simplify"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        cx.checkpoint()?;
        let config = RewriteConfig {
            flat: cx.params.get_bool("flat", self.config.flat),
            elim_and: cx.params.get_bool("elim-and", self.config.elim_and),
            max_steps: cx.params.get_uint("max-steps", self.config.max_steps),
        };

        let mut rewriter = Rewriter::with_config(cx.tm, config);
        let mut simplified = Vec::with_capacity(goal.len());
        for &assertion in &goal.assertions {
            simplified.push(rewriter.simplify(assertion)?);
        }
        drop(rewriter);

        let mut child = goal.child(Vec::new());
        for s in simplified {
            if cx.tm.is_true(s) {
                continue;
            }
            if cx.tm.is_false(s) {
                child.assertions.clear();
                child.add(s);
                break;
            }
            child.add(s);
        }
        tracing::debug!(before = goal.len(), after = child.len(), "simplify");
        Ok(TacticResult::SubGoals(vec![child]))
    }

    fn description(&self) -> &str {
        "rewrite assertions into simplified form"
    }
}
