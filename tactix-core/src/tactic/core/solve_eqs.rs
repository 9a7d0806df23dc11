//! Equation Solving Tactic.
//!
//! Eliminates variables defined by equations: an assertion `x = e` where
//! `x` does not occur in `e` is removed from the goal, and `x` is replaced
//! by `e` everywhere else. Eliminated variables are reconstructed during
//! model conversion, so models for the reduced goal extend to models of
//! the original.
//!
//! ## References
//!
//! - Z3's `tactic/core/solve_eqs_tactic.cpp`

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::{TermId, TermKind};
use crate::error::Result;
use crate::model::EliminatedVars;
use crate::rewrite::Rewriter;
use crate::tactic::{Goal, Tactic, TacticContext, TacticResult};

/// Eliminates variables defined by equations.
#[derive(Default)]
pub struct SolveEqsTactic;

impl SolveEqsTactic {
    /// Creates the tactic.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tactic for SolveEqsTactic {
    fn name(&self) -> &str {
        "solve-eqs"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        cx.checkpoint()?;

        // Solved variables with their definitions, in solve order. A
        // candidate definition is rewritten under the bindings collected so
        // far before the occurs check, so no definition mentions an
        // already-solved variable.
        let mut bindings: Vec<(TermId, TermId)> = Vec::new();
        let mut map: FxHashMap<TermId, TermId> = FxHashMap::default();
        let mut solved_indices = Vec::new();

        for (i, &a) in goal.assertions.iter().enumerate() {
            let TermKind::Eq(l, r) = *cx.tm.kind(a) else {
                continue;
            };
            let candidate = match (cx.tm.kind(l), cx.tm.kind(r)) {
                (TermKind::Var(_), _) => Some((l, r)),
                (_, TermKind::Var(_)) => Some((r, l)),
                _ => None,
            };
            let Some((var, def)) = candidate else {
                continue;
            };
            if map.contains_key(&var) {
                continue;
            }
            let def = cx.tm.substitute(def, &map)?;
            if cx.tm.occurs(def, var) {
                continue;
            }
            bindings.push((var, def));
            map.insert(var, def);
            solved_indices.push(i);
        }

        if bindings.is_empty() {
            return Ok(TacticResult::NotApplicable);
        }

        // Earlier definitions may mention variables solved later; rewrite
        // them under the full map until they mention no solved variable.
        let mut settled = false;
        let mut passes = 0;
        while !settled && passes <= bindings.len() {
            settled = true;
            passes += 1;
            for i in 0..bindings.len() {
                let (var, def) = bindings[i];
                let updated = cx.tm.substitute(def, &map)?;
                if updated != def {
                    bindings[i].1 = updated;
                    map.insert(var, updated);
                    settled = false;
                }
            }
        }

        let mut remaining = Vec::new();
        for (i, &a) in goal.assertions.iter().enumerate() {
            if solved_indices.contains(&i) {
                continue;
            }
            remaining.push(cx.tm.substitute(a, &map)?);
        }

        let mut rewriter = Rewriter::new(cx.tm);
        let mut simplified = Vec::with_capacity(remaining.len());
        for a in remaining {
            simplified.push(rewriter.simplify(a)?);
        }
        drop(rewriter);

        let mut child = goal.child(Vec::new());
        for a in simplified {
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
        tracing::debug!(eliminated = bindings.len(), "solve-eqs");
        child.push_converter(Arc::new(EliminatedVars::new(bindings)));
        Ok(TacticResult::SubGoals(vec![child]))
    }

    fn description(&self) -> &str {
        "eliminate variables defined by equations"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;
    use crate::model::{Model, Value};

    fn apply(tm: &mut TermManager, goal: &Goal) -> TacticResult {
        let mut cx = TacticContext::new(tm);
        SolveEqsTactic::new().apply(goal, &mut cx).unwrap()
    }

    #[test]
    fn eliminates_chained_definitions() {
        let mut tm = TermManager::new();
        let x = tm.mk_int_var("x");
        let y = tm.mk_int_var("y");
        let one = tm.mk_int(1);
        let three = tm.mk_int(3);
        let zero = tm.mk_int(0);
        let y_plus_1 = tm.mk_add(vec![y, one]).unwrap();
        let def_x = tm.mk_eq(x, y_plus_1).unwrap();
        let def_y = tm.mk_eq(y, three).unwrap();
        let guard = tm.mk_gt(x, zero).unwrap();
        let goal = Goal::with_assertions(vec![def_x, def_y, guard]);

        let child = match apply(&mut tm, &goal) {
            TacticResult::SubGoals(mut subs) => subs.pop().unwrap(),
            other => panic!("unexpected result: {other:?}"),
        };
        // x > 0 folds away once both definitions are in
        assert!(child.is_empty());
        assert_eq!(child.num_converters(), 1);

        let model = child.convert_model(Model::new(), &tm);
        assert_eq!(model.get(y), Some(&Value::Int(3.into())));
        assert_eq!(model.get(x), Some(&Value::Int(4.into())));
    }

    #[test]
    fn reversed_equations_are_solved() {
        let mut tm = TermManager::new();
        let x = tm.mk_int_var("x");
        let seven = tm.mk_int(7);
        let def = tm.mk_eq(seven, x).unwrap();
        let goal = Goal::with_assertions(vec![def]);

        let child = match apply(&mut tm, &goal) {
            TacticResult::SubGoals(mut subs) => subs.pop().unwrap(),
            other => panic!("unexpected result: {other:?}"),
        };
        assert!(child.is_empty());
        let model = child.convert_model(Model::new(), &tm);
        assert_eq!(model.get(x), Some(&Value::Int(7.into())));
    }

    #[test]
    fn occurs_check_blocks_recursive_definitions() {
        let mut tm = TermManager::new();
        let x = tm.mk_int_var("x");
        let one = tm.mk_int(1);
        let x_plus_1 = tm.mk_add(vec![x, one]).unwrap();
        let circular = tm.mk_eq(x, x_plus_1).unwrap();
        let goal = Goal::with_assertions(vec![circular]);
        assert!(matches!(apply(&mut tm, &goal), TacticResult::NotApplicable));
    }

    #[test]
    fn mutual_definitions_solve_only_one_side() {
        let mut tm = TermManager::new();
        let x = tm.mk_int_var("x");
        let y = tm.mk_int_var("y");
        let a = tm.mk_eq(x, y).unwrap();
        let b = tm.mk_eq(y, x).unwrap();
        let goal = Goal::with_assertions(vec![a, b]);

        let child = match apply(&mut tm, &goal) {
            TacticResult::SubGoals(mut subs) => subs.pop().unwrap(),
            other => panic!("unexpected result: {other:?}"),
        };
        // x := y absorbs both equations; nothing is left to assert
        assert!(child.is_empty());
        let model = child.convert_model(Model::new(), &tm);
        assert_eq!(model.get(x), Some(&Value::Int(0.into())));
    }

    #[test]
    fn not_applicable_without_equations() {
        let mut tm = TermManager::new();
        let x = tm.mk_int_var("x");
        let zero = tm.mk_int(0);
        let guard = tm.mk_lt(zero, x).unwrap();
        let goal = Goal::with_assertions(vec![guard]);
        assert!(matches!(apply(&mut tm, &goal), TacticResult::NotApplicable));
    }
}
