//! Tactic-Backed Solver.
//!
//! [`Solver`] packages a tactic as a push-button check-sat interface:
//! assertions accumulate, `check` runs the tactic over them as one goal,
//! and a model is kept when the verdict is satisfiable. Inconclusive
//! outcomes (undecided subgoals, expired budgets, tactic failures) fold
//! into [`CheckResult::Unknown`] with the cause retained for inspection.
//!
//! Any tactic converts via [`IntoSolver::solver`]; [`Solver::new`] wires
//! up the default strategy, a preprocessing chain ending in `sat` with
//! bit-blasting guarded by the `has-bv` probe.

use std::fmt;
use std::time::Duration;

use tactix_core::ast::{TermId, TermManager};
use tactix_core::error::{Result, TactixError};
use tactix_core::model::Model;
use tactix_core::params::Params;
use tactix_core::resource::Budget;
use tactix_core::tactic::{
    BitBlastTactic, Goal, HasBitVectorProbe, PropagateValuesTactic, SimplifyTactic, SolveEqsTactic,
    Tactic, TacticContext, TacticResult, ThenTactic, Verdict, WhenTactic,
};

use crate::sat::SatTactic;

/// Outcome of a [`Solver::check`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// The assertions are satisfiable; a model is available.
    Sat,
    /// The assertions are unsatisfiable.
    Unsat,
    /// The tactic could not decide; see [`Solver::reason_unknown`].
    Unknown,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat => write!(f, "sat"),
            Self::Unsat => write!(f, "unsat"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The strategy behind [`Solver::new`]: simplification, constant and
/// equality propagation, bit-blasting when bit-vectors are present, then
/// DPLL search.
#[must_use]
pub fn default_tactic() -> Box<dyn Tactic> {
    Box::new(ThenTactic::new(vec![
        Box::new(SimplifyTactic::new()),
        Box::new(PropagateValuesTactic::new()),
        Box::new(SolveEqsTactic::new()),
        Box::new(WhenTactic::new(
            Box::new(HasBitVectorProbe),
            Box::new(BitBlastTactic::new()),
        )),
        Box::new(SatTactic::new()),
    ]))
}

/// A check-sat interface over one tactic.
///
/// The solver does not own a [`TermManager`]; assertions are built against
/// the caller's manager and passed in by id, so several solvers can share
/// one term store.
pub struct Solver {
    tactic: Box<dyn Tactic>,
    assertions: Vec<TermId>,
    params: Params,
    timeout: Option<Duration>,
    model: Option<Model>,
    reason_unknown: Option<TactixError>,
}

impl Solver {
    /// A solver running the default strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tactic(default_tactic())
    }

    /// A solver running the given tactic.
    #[must_use]
    pub fn with_tactic(tactic: Box<dyn Tactic>) -> Self {
        Self {
            tactic,
            assertions: Vec::new(),
            params: Params::new(),
            timeout: None,
            model: None,
            reason_unknown: None,
        }
    }

    /// Adds an assertion. Fails when the term is not Boolean.
    pub fn assert_term(&mut self, t: TermId, tm: &TermManager) -> Result<()> {
        if !tm.sorts.is_bool(tm.sort_of(t)) {
            return Err(TactixError::sort_mismatch(
                "assert",
                format!("asserted term {} is not Boolean", tm.display(t)),
            ));
        }
        self.assertions.push(t);
        Ok(())
    }

    /// Replaces the parameter set passed to the tactic on each check.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Caps each subsequent check at `timeout` wall time.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// The assertions added so far.
    #[must_use]
    pub fn assertions(&self) -> &[TermId] {
        &self.assertions
    }

    /// Runs the tactic over the asserted formulas.
    pub fn check(&mut self, tm: &mut TermManager) -> CheckResult {
        self.model = None;
        self.reason_unknown = None;

        let goal = Goal::with_assertions(self.assertions.clone());
        let budget = match self.timeout {
            Some(t) => Budget::with_deadline(t),
            None => Budget::unlimited(),
        };
        let mut cx = TacticContext::new(tm)
            .with_params(self.params.clone())
            .with_budget(budget);

        tracing::info!(
            tactic = self.tactic.name(),
            assertions = self.assertions.len(),
            "checking satisfiability"
        );

        match self.tactic.apply(&goal, &mut cx) {
            Ok(TacticResult::Solved(Verdict::Sat(model))) => {
                self.model = Some(model);
                CheckResult::Sat
            }
            Ok(TacticResult::Solved(Verdict::Unsat)) => CheckResult::Unsat,
            Ok(TacticResult::SubGoals(subgoals)) => self.interpret(subgoals, cx.tm),
            Ok(TacticResult::NotApplicable) => self.interpret(vec![goal], cx.tm),
            Err(err) => {
                tracing::info!(error = %err, "check inconclusive");
                self.reason_unknown = Some(err);
                CheckResult::Unknown
            }
        }
    }

    /// Reads a verdict off residual subgoals. Subgoals are disjunctive: a
    /// trivially satisfiable one settles the whole goal, and only when all
    /// of them are inconsistent (in particular, when there are none) is
    /// the goal unsatisfiable.
    fn interpret(&mut self, subgoals: Vec<Goal>, tm: &TermManager) -> CheckResult {
        if let Some(g) = subgoals.iter().find(|g| g.is_trivially_sat(tm)) {
            self.model = Some(g.convert_model(Model::new(), tm));
            return CheckResult::Sat;
        }
        if subgoals.iter().all(|g| g.is_inconsistent(tm)) {
            return CheckResult::Unsat;
        }
        self.reason_unknown = Some(TactixError::tactic(
            self.tactic.name(),
            format!("{} subgoal(s) left undecided", subgoals.len()),
        ));
        CheckResult::Unknown
    }

    /// The model from the last satisfiable check.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Why the last check came back [`CheckResult::Unknown`].
    #[must_use]
    pub fn reason_unknown(&self) -> Option<&TactixError> {
        self.reason_unknown.as_ref()
    }

    /// Removes all assertions and any previous verdict. The tactic,
    /// parameters, and timeout are kept.
    pub fn reset(&mut self) {
        self.assertions.clear();
        self.model = None;
        self.reason_unknown = None;
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("tactic", &self.tactic.name())
            .field("assertions", &self.assertions)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Conversion of a tactic into a [`Solver`], mirroring the
/// `tactic.solver()` idiom.
pub trait IntoSolver {
    /// Wraps `self` in a solver.
    fn solver(self) -> Solver;
}

impl<T: Tactic + 'static> IntoSolver for T {
    fn solver(self) -> Solver {
        Solver::with_tactic(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactix_core::model::Value;
    use tactix_core::tactic::SkipTactic;

    #[test]
    fn empty_solver_is_sat() {
        let mut tm = TermManager::new();
        let mut solver = Solver::new();
        assert_eq!(solver.check(&mut tm), CheckResult::Sat);
        assert!(solver.model().is_some());
    }

    #[test]
    fn default_strategy_decides_propositional_goals() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let clause = tm.mk_or(vec![p, q]).unwrap();
        let np = tm.mk_not(p).unwrap();

        let mut solver = Solver::new();
        solver.assert_term(clause, &tm).unwrap();
        solver.assert_term(np, &tm).unwrap();

        assert_eq!(solver.check(&mut tm), CheckResult::Sat);
        let model = solver.model().unwrap();
        assert!(model.satisfies(&[clause, np], &tm));
    }

    #[test]
    fn contradictory_assertions_are_unsat() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let np = tm.mk_not(p).unwrap();

        let mut solver = Solver::new();
        solver.assert_term(p, &tm).unwrap();
        solver.assert_term(np, &tm).unwrap();

        assert_eq!(solver.check(&mut tm), CheckResult::Unsat);
        assert!(solver.model().is_none());
    }

    #[test]
    fn default_strategy_bit_blasts_when_needed() {
        let mut tm = TermManager::new();
        let x = tm.mk_bv_var("x", 4).unwrap();
        let three = tm.mk_bv(3, 4).unwrap();
        let zero = tm.mk_bv(0, 4).unwrap();
        let upper = tm.mk_bv_ult(x, three).unwrap();
        let eq_zero = tm.mk_eq(x, zero).unwrap();
        let nonzero = tm.mk_not(eq_zero).unwrap();

        let mut solver = Solver::new();
        solver.assert_term(upper, &tm).unwrap();
        solver.assert_term(nonzero, &tm).unwrap();

        assert_eq!(solver.check(&mut tm), CheckResult::Sat);
        let model = solver.model().unwrap();
        assert!(model.satisfies(&[upper, nonzero], &tm));
        match model.eval(x, &tm) {
            Some(Value::BitVec { value, width: 4 }) => assert!(value == 1 || value == 2),
            other => panic!("expected a 4-bit value for x, got {other:?}"),
        }
    }

    #[test]
    fn non_boolean_assertions_are_rejected() {
        let mut tm = TermManager::new();
        let int_sort = tm.sorts.int_sort;
        let x = tm.mk_var("x", int_sort);

        let mut solver = Solver::new();
        let err = solver.assert_term(x, &tm).unwrap_err();
        assert!(matches!(err, TactixError::SortMismatch { op: "assert", .. }));
        assert!(solver.assertions().is_empty());
    }

    #[test]
    fn undecided_subgoals_come_back_unknown() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");

        let mut solver = SkipTactic::new().solver();
        solver.assert_term(p, &tm).unwrap();

        assert_eq!(solver.check(&mut tm), CheckResult::Unknown);
        assert!(solver.model().is_none());
        assert!(matches!(
            solver.reason_unknown(),
            Some(TactixError::Tactic { .. })
        ));
    }

    #[test]
    fn expired_timeout_comes_back_unknown() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let clause = tm.mk_or(vec![p, q]).unwrap();

        let mut solver = Solver::new();
        solver.assert_term(clause, &tm).unwrap();
        solver.set_timeout(Duration::ZERO);

        assert_eq!(solver.check(&mut tm), CheckResult::Unknown);
        assert!(matches!(
            solver.reason_unknown(),
            Some(TactixError::Timeout { .. })
        ));
    }

    #[test]
    fn reset_clears_assertions_and_verdict() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let np = tm.mk_not(p).unwrap();

        let mut solver = Solver::new();
        solver.assert_term(p, &tm).unwrap();
        solver.assert_term(np, &tm).unwrap();
        assert_eq!(solver.check(&mut tm), CheckResult::Unsat);

        solver.reset();
        assert!(solver.assertions().is_empty());
        assert!(solver.model().is_none());
        assert_eq!(solver.check(&mut tm), CheckResult::Sat);
    }

    #[test]
    fn custom_strategies_convert_via_into_solver() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let iff = tm.mk_eq(p, q).unwrap();

        let mut solver = ThenTactic::new(vec![
            Box::new(SimplifyTactic::new()),
            Box::new(SatTactic::new()),
        ])
        .solver();
        solver.assert_term(iff, &tm).unwrap();
        solver.assert_term(p, &tm).unwrap();

        assert_eq!(solver.check(&mut tm), CheckResult::Sat);
        let model = solver.model().unwrap();
        assert_eq!(model.eval(p, &tm), Some(Value::Bool(true)));
        assert_eq!(model.eval(q, &tm), Some(Value::Bool(true)));
    }
}
