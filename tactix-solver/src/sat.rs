//! The `sat` End-Game Tactic.
//!
//! Where the transformation tactics of `tactix-core` rewrite goals into
//! subgoals, `sat` decides them: the goal is Tseitin-encoded and handed to
//! the DPLL engine, and the verdict comes back as
//! [`TacticResult::Solved`] with the satisfying assignment converted
//! through the goal's model-conversion chain. Non-propositional goals make
//! the tactic fail with an error, which is what guarded pipelines catch;
//! lowering bit-vectors first is the `bit-blast` tactic's job.
//!
//! ## Parameters
//!
//! - `phase` (`"kronecker"`, `"false"`, `"true"`): branch polarity policy.
//! - `max-conflicts`: abort the search past this many conflicts
//!   (0 = unlimited).

use tactix_core::error::{Result, TactixError};
use tactix_core::model::{Model, Value};
use tactix_core::tactic::{Goal, Tactic, TacticContext, TacticResult, Verdict};

use crate::cnf;
use crate::dpll::{DpllConfig, PhaseMode, SatResult, SatSolver};

/// Decides propositional goals with the DPLL engine.
#[derive(Debug, Clone, Default)]
pub struct SatTactic {
    config: DpllConfig,
}

impl SatTactic {
    /// Creates the tactic with the default engine configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the tactic with a custom engine configuration.
    #[must_use]
    pub fn with_config(config: DpllConfig) -> Self {
        Self { config }
    }

    /// Engine configuration for this application, with context parameters
    /// layered over the construction-time defaults.
    fn effective_config(&self, cx: &TacticContext<'_>) -> Result<DpllConfig> {
        let mut config = self.config.clone();
        let default_phase = match config.phase {
            PhaseMode::Kronecker => "kronecker",
            PhaseMode::AlwaysFalse => "false",
            PhaseMode::AlwaysTrue => "true",
        };
        config.phase = match cx.params.get_str("phase", default_phase) {
            "kronecker" => PhaseMode::Kronecker,
            "false" => PhaseMode::AlwaysFalse,
            "true" => PhaseMode::AlwaysTrue,
            other => {
                return Err(TactixError::InvalidParameter {
                    name: "phase".into(),
                    reason: format!("unknown phase mode `{other}`"),
                });
            }
        };
        let default_conflicts = config.max_conflicts.unwrap_or(0);
        config.max_conflicts = match cx.params.get_uint("max-conflicts", default_conflicts) {
            0 => None,
            n => Some(n),
        };
        Ok(config)
    }
}

impl Tactic for SatTactic {
    fn name(&self) -> &str {
        "sat"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        if goal.is_inconsistent(cx.tm) {
            return Ok(TacticResult::Solved(Verdict::Unsat));
        }
        if goal.is_trivially_sat(cx.tm) {
            let model = goal.convert_model(Model::new(), cx.tm);
            return Ok(TacticResult::Solved(Verdict::Sat(model)));
        }
        let config = self.effective_config(cx)?;
        let cnf = cnf::encode(cx.tm, &goal.assertions)?;
        tracing::debug!(
            vars = cnf.num_vars,
            clauses = cnf.clauses.len(),
            "sat: goal encoded"
        );
        let mut solver = SatSolver::with_config(&cnf, config);
        match solver.solve(&cx.budget)? {
            SatResult::Sat(assignment) => {
                let mut model = Model::new();
                for &(t, v) in cnf.inputs() {
                    model.assign(t, Value::Bool(assignment[v as usize]));
                }
                let model = goal.convert_model(model, cx.tm);
                Ok(TacticResult::Solved(Verdict::Sat(model)))
            }
            SatResult::Unsat => Ok(TacticResult::Solved(Verdict::Unsat)),
        }
    }

    fn description(&self) -> &str {
        "decide a propositional goal by DPLL search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tactix_core::ast::TermManager;
    use tactix_core::model::EliminatedVars;
    use tactix_core::params::Params;

    fn apply(goal: &Goal, tm: &mut TermManager) -> Result<TacticResult> {
        let mut cx = TacticContext::new(tm);
        SatTactic::new().apply(goal, &mut cx)
    }

    #[test]
    fn decides_satisfiable_goals_with_a_checked_model() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let np = tm.mk_not(p).unwrap();
        let clause = tm.mk_or(vec![p, q]).unwrap();
        let goal = Goal::with_assertions(vec![clause, np]);

        let TacticResult::Solved(Verdict::Sat(model)) = apply(&goal, &mut tm).unwrap() else {
            panic!("expected sat");
        };
        assert!(model.satisfies(&goal.assertions, &tm));
        assert_eq!(model.get(p), Some(&Value::Bool(false)));
        assert_eq!(model.get(q), Some(&Value::Bool(true)));
    }

    #[test]
    fn decides_unsatisfiable_goals() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let np = tm.mk_not(p).unwrap();
        let goal = Goal::with_assertions(vec![p, np]);

        assert!(matches!(
            apply(&goal, &mut tm).unwrap(),
            TacticResult::Solved(Verdict::Unsat)
        ));
    }

    #[test]
    fn empty_goal_is_trivially_sat() {
        let mut tm = TermManager::new();
        let goal = Goal::new();
        let TacticResult::Solved(Verdict::Sat(model)) = apply(&goal, &mut tm).unwrap() else {
            panic!("expected sat");
        };
        assert!(model.is_empty());
    }

    #[test]
    fn inconsistent_goal_is_unsat_without_encoding() {
        let mut tm = TermManager::new();
        let f = tm.mk_false();
        let goal = Goal::with_assertions(vec![f]);
        assert!(matches!(
            apply(&goal, &mut tm).unwrap(),
            TacticResult::Solved(Verdict::Unsat)
        ));
    }

    #[test]
    fn non_propositional_goals_fail() {
        let mut tm = TermManager::new();
        let x = tm.mk_int_var("x");
        let zero = tm.mk_int(0);
        let lt = tm.mk_lt(zero, x).unwrap();
        let goal = Goal::with_assertions(vec![lt]);
        assert!(matches!(
            apply(&goal, &mut tm),
            Err(TactixError::Tactic { name, .. }) if name == "sat"
        ));
    }

    #[test]
    fn models_convert_through_the_goal_chain() {
        let mut tm = TermManager::new();
        let x = tm.mk_bool_var("x");
        let y = tm.mk_bool_var("y");
        let ny = tm.mk_not(y).unwrap();

        // as if solve-eqs eliminated x := (not y), leaving the goal [y]
        let mut goal = Goal::with_assertions(vec![y]);
        goal.push_converter(Arc::new(EliminatedVars::new(vec![(x, ny)])));

        let TacticResult::Solved(Verdict::Sat(model)) = apply(&goal, &mut tm).unwrap() else {
            panic!("expected sat");
        };
        assert_eq!(model.get(y), Some(&Value::Bool(true)));
        assert_eq!(model.get(x), Some(&Value::Bool(false)));
    }

    #[test]
    fn phase_parameter_steers_the_model() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let clause = tm.mk_or(vec![p, q]).unwrap();
        let goal = Goal::with_assertions(vec![clause]);

        let mut cx =
            TacticContext::new(&mut tm).with_params(Params::new().str("phase", "true"));
        let TacticResult::Solved(Verdict::Sat(model)) =
            SatTactic::new().apply(&goal, &mut cx).unwrap()
        else {
            panic!("expected sat");
        };
        assert_eq!(model.get(p), Some(&Value::Bool(true)));

        let mut cx =
            TacticContext::new(&mut tm).with_params(Params::new().str("phase", "false"));
        let TacticResult::Solved(Verdict::Sat(model)) =
            SatTactic::new().apply(&goal, &mut cx).unwrap()
        else {
            panic!("expected sat");
        };
        assert_eq!(model.get(p), Some(&Value::Bool(false)));
        assert_eq!(model.get(q), Some(&Value::Bool(true)));
    }

    #[test]
    fn unknown_phase_mode_is_rejected() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let goal = Goal::with_assertions(vec![p]);
        let mut cx =
            TacticContext::new(&mut tm).with_params(Params::new().str("phase", "sideways"));
        assert!(matches!(
            SatTactic::new().apply(&goal, &mut cx),
            Err(TactixError::InvalidParameter { name, .. }) if name == "phase"
        ));
    }

    #[test]
    fn conflict_limit_parameter_aborts_search() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let np = tm.mk_not(p).unwrap();
        let nq = tm.mk_not(q).unwrap();
        let goal = Goal::with_assertions(vec![
            tm.mk_or(vec![p, q]).unwrap(),
            tm.mk_or(vec![np, q]).unwrap(),
            tm.mk_or(vec![p, nq]).unwrap(),
            tm.mk_or(vec![np, nq]).unwrap(),
        ]);
        let mut cx =
            TacticContext::new(&mut tm).with_params(Params::new().uint("max-conflicts", 1));
        assert!(matches!(
            SatTactic::new().apply(&goal, &mut cx),
            Err(TactixError::StepBudgetExceeded { limit: 1 })
        ));
    }
}
