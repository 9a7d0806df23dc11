//! Value Propagation Tactic.
//!
//! Collects assertions of the form `x = value`, plain boolean assertions
//! `p`, and negated boolean assertions `(not p)`, and substitutes the
//! bound values into the remaining assertions. The defining assertions
//! stay in the goal, so every binding is still enforced downstream.
//!
//! ## References
//!
//! - Z3's `tactic/core/propagate_values_tactic.cpp`

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::Result;
use crate::rewrite::Rewriter;
use crate::tactic::{Goal, Tactic, TacticContext, TacticResult};

/// Configuration for the value propagation tactic.
#[derive(Debug, Clone)]
pub struct PropagateValuesConfig {
    /// Maximum propagation rounds per application.
    pub max_rounds: u32,
}

impl Default for PropagateValuesConfig {
    fn default() -> Self {
        Self { max_rounds: 8 }
    }
}

/// Substitutes constant bindings into the rest of the goal.
#[derive(Default)]
pub struct PropagateValuesTactic {
    config: PropagateValuesConfig,
}

impl PropagateValuesTactic {
    /// Creates the tactic with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the tactic with `config`.
    #[must_use]
    pub fn with_config(config: PropagateValuesConfig) -> Self {
        Self { config }
    }
}

fn is_value(tm: &TermManager, t: TermId) -> bool {
    matches!(
        tm.kind(t),
        TermKind::True | TermKind::False | TermKind::IntConst(_) | TermKind::BvConst { .. }
    )
}

fn is_var(tm: &TermManager, t: TermId) -> bool {
    matches!(tm.kind(t), TermKind::Var(_))
}

/// Bindings found in one pass, with the indices of the assertions that
/// defined them.
fn collect_bindings(
    tm: &TermManager,
    assertions: &[TermId],
) -> (FxHashMap<TermId, TermId>, FxHashSet<usize>) {
    let mut bindings = FxHashMap::default();
    let mut defining = FxHashSet::default();
    for (i, &a) in assertions.iter().enumerate() {
        let bound = match *tm.kind(a) {
            TermKind::Eq(l, r) if is_var(tm, l) && is_value(tm, r) => Some((l, r)),
            TermKind::Eq(l, r) if is_var(tm, r) && is_value(tm, l) => Some((r, l)),
            TermKind::Var(_) => Some((a, tm.true_id())),
            TermKind::Not(p) if is_var(tm, p) => Some((p, tm.false_id())),
            _ => None,
        };
        if let Some((var, value)) = bound
            && !bindings.contains_key(&var)
        {
            bindings.insert(var, value);
            defining.insert(i);
        }
    }
    (bindings, defining)
}

impl Tactic for PropagateValuesTactic {
    fn name(&self) -> &str {
        "propagate-values"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let max_rounds = cx.params.get_uint("max-rounds", u64::from(self.config.max_rounds));
        let mut assertions = goal.assertions.clone();
        let mut any_change = false;

        for round in 0..max_rounds {
            cx.checkpoint()?;
            let (bindings, defining) = collect_bindings(cx.tm, &assertions);
            if bindings.is_empty() {
                break;
            }

            let mut substituted = Vec::with_capacity(assertions.len());
            for (i, &a) in assertions.iter().enumerate() {
                if defining.contains(&i) {
                    substituted.push(a);
                } else {
                    substituted.push(cx.tm.substitute(a, &bindings)?);
                }
            }

            let mut rewriter = Rewriter::new(cx.tm);
            let mut next = Vec::with_capacity(substituted.len());
            for s in substituted {
                next.push(rewriter.simplify(s)?);
            }
            drop(rewriter);

            if next == assertions {
                break;
            }
            tracing::debug!(round, bindings = bindings.len(), "propagate-values");
            assertions = next;
            any_change = true;
        }

        if !any_change {
            return Ok(TacticResult::NotApplicable);
        }

        let mut child = goal.child(Vec::new());
        for a in assertions {
            if cx.tm.is_true(a) {
                continue;
            }
            if cx.tm.is_false(a) {
                child.assertions.clear();
                child.add(a);
                break;
            }
            child.add(a);
        }
        Ok(TacticResult::SubGoals(vec![child]))
    }

    fn description(&self) -> &str {
        "substitute constant bindings through the goal"
    }
}
