//! Clause Splitting Tactic.
//!
//! Case-splits on the first disjunctive assertion: a goal containing
//! `(or a b c)` becomes three subgoals, one per disjunct. The subgoals are
//! alternatives, so the original goal is satisfiable exactly when one of
//! them is.
//!
//! ## References
//!
//! - Z3's `tactic/core/split_clause_tactic.cpp`

use crate::ast::TermKind;
use crate::error::Result;
use crate::tactic::{Goal, Tactic, TacticContext, TacticResult};

/// Case-splits on the first clause in the goal.
#[derive(Default)]
pub struct SplitClauseTactic;

impl SplitClauseTactic {
    /// Creates the tactic.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tactic for SplitClauseTactic {
    fn name(&self) -> &str {
        "split-clause"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        cx.checkpoint()?;
        let clause = goal.assertions.iter().enumerate().find_map(|(i, &a)| {
            if let TermKind::Or(disjuncts) = cx.tm.kind(a) {
                Some((i, disjuncts.clone()))
            } else {
                None
            }
        });
        let Some((slot, disjuncts)) = clause else {
            return Ok(TacticResult::NotApplicable);
        };

        let mut subgoals = Vec::with_capacity(disjuncts.len());
        for d in disjuncts {
            let mut sub = goal.child(Vec::new());
            sub.assertions = goal.assertions.clone();
            sub.assertions[slot] = d;
            subgoals.push(sub);
        }
        tracing::debug!(cases = subgoals.len(), "split-clause");
        Ok(TacticResult::SubGoals(subgoals))
    }

    fn description(&self) -> &str {
        "case-split on the first disjunctive assertion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;

    #[test]
    fn splits_the_first_clause() {
        let mut tm = TermManager::new();
        let a = tm.mk_bool_var("a");
        let b = tm.mk_bool_var("b");
        let c = tm.mk_bool_var("c");
        let clause = tm.mk_or(vec![a, b]).unwrap();
        let goal = Goal::with_assertions(vec![c, clause]);

        let mut cx = TacticContext::new(&mut tm);
        match SplitClauseTactic::new().apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => {
                assert_eq!(subs.len(), 2);
                assert_eq!(subs[0].assertions, vec![c, a]);
                assert_eq!(subs[1].assertions, vec![c, b]);
                assert_eq!(subs[0].depth, goal.depth + 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn not_applicable_without_clauses() {
        let mut tm = TermManager::new();
        let a = tm.mk_bool_var("a");
        let b = tm.mk_bool_var("b");
        let conj = tm.mk_and(vec![a, b]).unwrap();
        let goal = Goal::with_assertions(vec![conj]);

        let mut cx = TacticContext::new(&mut tm);
        assert!(matches!(
            SplitClauseTactic::new().apply(&goal, &mut cx).unwrap(),
            TacticResult::NotApplicable
        ));
    }

    #[test]
    fn subgoals_inherit_converters() {
        use crate::model::{Model, ModelConversion};
        use std::sync::Arc;

        struct Noop;
        impl ModelConversion for Noop {
            fn describe(&self) -> &str {
                "noop"
            }
            fn convert(&self, _model: &mut Model, _tm: &TermManager) {}
        }

        let mut tm = TermManager::new();
        let a = tm.mk_bool_var("a");
        let b = tm.mk_bool_var("b");
        let clause = tm.mk_or(vec![a, b]).unwrap();
        let mut goal = Goal::with_assertions(vec![clause]);
        goal.push_converter(Arc::new(Noop));

        let mut cx = TacticContext::new(&mut tm);
        match SplitClauseTactic::new().apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => {
                assert_eq!(subs[0].num_converters(), 1);
                assert_eq!(subs[1].num_converters(), 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
