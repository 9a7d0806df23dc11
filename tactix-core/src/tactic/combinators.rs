//! Tactic combinators.
//!
//! Subgoal lists are disjunctive: `then` forwards every pending subgoal to
//! the next tactic, discharges the ones decided unsatisfiable, and ends the
//! whole application as soon as one branch produces a model. `or-else`
//! catches tactic failure, `repeat` stops at a fixpoint, `try-for` bounds
//! an application by a cooperative deadline, and the probe-guarded forms
//! (`fail-if`, `if`, `when`) steer strategies by goal measurements.

use std::time::Duration;

use crate::error::{Result, TactixError};
use crate::params::Params;
use crate::tactic::probe::Probe;
use crate::tactic::{Goal, Tactic, TacticContext, TacticResult, Verdict};

/// Ceiling on pending subgoals inside `then` and `repeat`.
const MAX_SUBGOALS: usize = 1024;

/// Applies tactics in sequence over the whole subgoal frontier.
pub struct ThenTactic {
    tactics: Vec<Box<dyn Tactic>>,
}

impl ThenTactic {
    /// Chains `tactics` left to right.
    #[must_use]
    pub fn new(tactics: Vec<Box<dyn Tactic>>) -> Self {
        Self { tactics }
    }
}

impl Tactic for ThenTactic {
    fn name(&self) -> &str {
        "then"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let mut pending = vec![goal.clone()];
        for tactic in &self.tactics {
            cx.checkpoint()?;
            let mut next: Vec<Goal> = Vec::new();
            for g in &pending {
                match tactic.apply(g, cx)? {
                    TacticResult::Solved(Verdict::Sat(model)) => {
                        return Ok(TacticResult::Solved(Verdict::Sat(model)));
                    }
                    TacticResult::Solved(Verdict::Unsat) => {}
                    TacticResult::SubGoals(subs) => next.extend(subs),
                    TacticResult::NotApplicable => next.push(g.clone()),
                }
            }
            if next.is_empty() {
                // every branch was discharged
                return Ok(TacticResult::Solved(Verdict::Unsat));
            }
            if next.len() > MAX_SUBGOALS {
                return Err(TactixError::tactic(
                    "then",
                    format!("subgoal frontier exceeded {MAX_SUBGOALS}"),
                ));
            }
            tracing::debug!(
                tactic = tactic.name(),
                subgoals = next.len(),
                "then: stage complete"
            );
            pending = next;
        }
        Ok(TacticResult::SubGoals(pending))
    }

    fn description(&self) -> &str {
        "apply tactics in sequence"
    }
}

/// Tries alternatives in order, catching tactic failure.
pub struct OrElseTactic {
    tactics: Vec<Box<dyn Tactic>>,
}

impl OrElseTactic {
    /// Tries `tactics` left to right.
    #[must_use]
    pub fn new(tactics: Vec<Box<dyn Tactic>>) -> Self {
        Self { tactics }
    }
}

impl Tactic for OrElseTactic {
    fn name(&self) -> &str {
        "or-else"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let mut last_err = None;
        for tactic in &self.tactics {
            cx.checkpoint()?;
            match tactic.apply(goal, cx) {
                Ok(TacticResult::NotApplicable) => continue,
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::debug!(
                        tactic = tactic.name(),
                        error = %e,
                        "or-else: alternative failed"
                    );
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) => Err(e),
            None => Ok(TacticResult::NotApplicable),
        }
    }

    fn description(&self) -> &str {
        "try alternatives, recovering from failure"
    }
}

/// Reapplies a tactic until the frontier stops changing.
pub struct RepeatTactic {
    inner: Box<dyn Tactic>,
    max_iterations: u32,
}

impl RepeatTactic {
    /// Repeats `inner` at most `max_iterations` times.
    #[must_use]
    pub fn new(inner: Box<dyn Tactic>, max_iterations: u32) -> Self {
        Self {
            inner,
            max_iterations,
        }
    }
}

impl Tactic for RepeatTactic {
    fn name(&self) -> &str {
        "repeat"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let mut pending = vec![goal.clone()];
        for iteration in 0..self.max_iterations {
            cx.checkpoint()?;
            let mut next: Vec<Goal> = Vec::new();
            let mut changed = false;
            for g in &pending {
                match self.inner.apply(g, cx)? {
                    TacticResult::Solved(Verdict::Sat(model)) => {
                        return Ok(TacticResult::Solved(Verdict::Sat(model)));
                    }
                    TacticResult::Solved(Verdict::Unsat) => changed = true,
                    TacticResult::SubGoals(subs) => {
                        let unchanged = subs.len() == 1
                            && subs[0].assertions == g.assertions
                            && subs[0].num_converters() == g.num_converters();
                        if !unchanged {
                            changed = true;
                        }
                        next.extend(subs);
                    }
                    TacticResult::NotApplicable => next.push(g.clone()),
                }
            }
            if next.is_empty() {
                return Ok(TacticResult::Solved(Verdict::Unsat));
            }
            if next.len() > MAX_SUBGOALS {
                return Err(TactixError::tactic(
                    "repeat",
                    format!("subgoal frontier exceeded {MAX_SUBGOALS}"),
                ));
            }
            pending = next;
            if !changed {
                tracing::debug!(iteration, "repeat: fixpoint reached");
                break;
            }
        }
        Ok(TacticResult::SubGoals(pending))
    }

    fn description(&self) -> &str {
        "reapply a tactic until it stops changing the goal"
    }
}

/// Bounds an application by a deadline.
///
/// The deadline is cooperative: it trips at the inner tactic's next
/// checkpoint, typically inside a rewrite or search loop.
pub struct TryForTactic {
    inner: Box<dyn Tactic>,
    timeout: Duration,
}

impl TryForTactic {
    /// Applies `inner` under `timeout`.
    #[must_use]
    pub fn new(inner: Box<dyn Tactic>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl Tactic for TryForTactic {
    fn name(&self) -> &str {
        "try-for"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let saved = cx.budget.tighten_deadline(self.timeout);
        let result = self.inner.apply(goal, cx);
        cx.budget.restore_deadline(saved);
        result
    }

    fn description(&self) -> &str {
        "fail when the inner tactic exceeds a deadline"
    }
}

/// Applies a tactic with extra parameters merged into the context.
pub struct WithTactic {
    inner: Box<dyn Tactic>,
    params: Params,
}

impl WithTactic {
    /// Applies `inner` with `params` visible, restoring the surrounding
    /// parameters afterwards.
    #[must_use]
    pub fn new(inner: Box<dyn Tactic>, params: Params) -> Self {
        Self { inner, params }
    }
}

impl Tactic for WithTactic {
    fn name(&self) -> &str {
        "with"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let saved = cx.params.clone();
        cx.params.merge(&self.params);
        let result = self.inner.apply(goal, cx);
        cx.params = saved;
        result
    }

    fn description(&self) -> &str {
        "apply a tactic under scoped parameters"
    }
}

/// Fails when a probe is non-zero; otherwise leaves the goal unchanged.
pub struct FailIfTactic {
    probe: Box<dyn Probe>,
}

impl FailIfTactic {
    /// Guards on `probe`.
    #[must_use]
    pub fn new(probe: Box<dyn Probe>) -> Self {
        Self { probe }
    }
}

impl Tactic for FailIfTactic {
    fn name(&self) -> &str {
        "fail-if"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let value = self.probe.eval(goal, cx.tm);
        if value != 0.0 {
            Err(TactixError::PreconditionFailed {
                probe: self.probe.describe(),
                value,
            })
        } else {
            Ok(TacticResult::SubGoals(vec![goal.clone()]))
        }
    }

    fn description(&self) -> &str {
        "fail when a probe is non-zero"
    }
}

/// Branches between two tactics on a probe.
pub struct CondTactic {
    probe: Box<dyn Probe>,
    then_tactic: Box<dyn Tactic>,
    else_tactic: Box<dyn Tactic>,
}

impl CondTactic {
    /// Applies `then_tactic` when `probe` is non-zero, `else_tactic`
    /// otherwise.
    #[must_use]
    pub fn new(
        probe: Box<dyn Probe>,
        then_tactic: Box<dyn Tactic>,
        else_tactic: Box<dyn Tactic>,
    ) -> Self {
        Self {
            probe,
            then_tactic,
            else_tactic,
        }
    }
}

impl Tactic for CondTactic {
    fn name(&self) -> &str {
        "if"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        if self.probe.eval(goal, cx.tm) != 0.0 {
            self.then_tactic.apply(goal, cx)
        } else {
            self.else_tactic.apply(goal, cx)
        }
    }

    fn description(&self) -> &str {
        "branch between two tactics on a probe"
    }
}

/// Applies a tactic only when a probe is non-zero.
pub struct WhenTactic {
    probe: Box<dyn Probe>,
    inner: Box<dyn Tactic>,
}

impl WhenTactic {
    /// Applies `inner` when `probe` is non-zero; otherwise the goal passes
    /// through unchanged.
    #[must_use]
    pub fn new(probe: Box<dyn Probe>, inner: Box<dyn Tactic>) -> Self {
        Self { probe, inner }
    }
}

impl Tactic for WhenTactic {
    fn name(&self) -> &str {
        "when"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        if self.probe.eval(goal, cx.tm) != 0.0 {
            self.inner.apply(goal, cx)
        } else {
            Ok(TacticResult::SubGoals(vec![goal.clone()]))
        }
    }

    fn description(&self) -> &str {
        "apply a tactic only when a probe is non-zero"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{TermId, TermManager};
    use crate::model::Model;
    use crate::tactic::core::SplitClauseTactic;
    use crate::tactic::probe::{ConstProbe, HasBitVectorProbe, ProbeExt, SizeProbe};
    use crate::tactic::{FailTactic, SkipTactic};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Decides `Unsat` whenever the goal mentions the marker term;
    /// otherwise passes the goal through.
    struct DecideMarked {
        marker: TermId,
    }

    impl Tactic for DecideMarked {
        fn name(&self) -> &str {
            "decide-marked"
        }

        fn apply(&self, goal: &Goal, _cx: &mut TacticContext<'_>) -> Result<TacticResult> {
            if goal.assertions.contains(&self.marker) {
                Ok(TacticResult::Solved(Verdict::Unsat))
            } else {
                Ok(TacticResult::SubGoals(vec![goal.clone()]))
            }
        }
    }

    /// Records what the `flat` parameter was when it ran (1 = true,
    /// 2 = false).
    struct ParamEcho {
        saw_flat: Arc<AtomicUsize>,
    }

    impl Tactic for ParamEcho {
        fn name(&self) -> &str {
            "param-echo"
        }

        fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
            let flat = cx.params.get_bool("flat", true);
            self.saw_flat.store(if flat { 1 } else { 2 }, Ordering::SeqCst);
            Ok(TacticResult::SubGoals(vec![goal.clone()]))
        }
    }

    /// Polls the budget, then passes the goal through.
    struct Checkpointing;

    impl Tactic for Checkpointing {
        fn name(&self) -> &str {
            "checkpointing"
        }

        fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
            cx.checkpoint()?;
            Ok(TacticResult::SubGoals(vec![goal.clone()]))
        }
    }

    fn or_goal(tm: &mut TermManager) -> Goal {
        let a = tm.mk_bool_var("a");
        let b = tm.mk_bool_var("b");
        let c = tm.mk_bool_var("c");
        let clause = tm.mk_or(vec![a, b]).unwrap();
        Goal::with_assertions(vec![clause, c])
    }

    #[test]
    fn then_chains_over_the_frontier() {
        let mut tm = TermManager::new();
        let goal = or_goal(&mut tm);
        let mut cx = TacticContext::new(&mut tm);
        let t = ThenTactic::new(vec![
            Box::new(SplitClauseTactic::new()),
            Box::new(SkipTactic::new()),
        ]);
        match t.apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => assert_eq!(subs.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn then_discharges_unsat_branches() {
        let mut tm = TermManager::new();
        let a = tm.mk_bool_var("a");
        let goal = Goal::with_assertions(vec![a]);
        let mut cx = TacticContext::new(&mut tm);
        let t = ThenTactic::new(vec![Box::new(DecideMarked { marker: a })]);
        assert!(matches!(
            t.apply(&goal, &mut cx).unwrap(),
            TacticResult::Solved(Verdict::Unsat)
        ));
    }

    #[test]
    fn then_returns_first_model() {
        struct DecideSat;
        impl Tactic for DecideSat {
            fn name(&self) -> &str {
                "decide-sat"
            }
            fn apply(&self, _goal: &Goal, _cx: &mut TacticContext<'_>) -> Result<TacticResult> {
                Ok(TacticResult::Solved(Verdict::Sat(Model::new())))
            }
        }

        let mut tm = TermManager::new();
        let goal = or_goal(&mut tm);
        let mut cx = TacticContext::new(&mut tm);
        let t = ThenTactic::new(vec![
            Box::new(SplitClauseTactic::new()),
            Box::new(DecideSat),
            Box::new(FailTactic::new()), // never reached
        ]);
        assert!(matches!(
            t.apply(&goal, &mut cx).unwrap(),
            TacticResult::Solved(Verdict::Sat(_))
        ));
    }

    #[test]
    fn or_else_recovers_from_failure() {
        let mut tm = TermManager::new();
        let goal = or_goal(&mut tm);
        let mut cx = TacticContext::new(&mut tm);
        let t = OrElseTactic::new(vec![
            Box::new(FailTactic::new()),
            Box::new(SkipTactic::new()),
        ]);
        match t.apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => {
                assert_eq!(subs.len(), 1);
                assert_eq!(subs[0].assertions, goal.assertions);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn or_else_propagates_the_last_error() {
        let mut tm = TermManager::new();
        let goal = or_goal(&mut tm);
        let mut cx = TacticContext::new(&mut tm);
        let t = OrElseTactic::new(vec![
            Box::new(FailTactic::new()),
            Box::new(FailIfTactic::new(Box::new(ConstProbe(1.0)))),
        ]);
        assert!(matches!(
            t.apply(&goal, &mut cx),
            Err(TactixError::PreconditionFailed { .. })
        ));
    }

    #[test]
    fn or_else_skips_not_applicable_alternatives() {
        let mut tm = TermManager::new();
        let a = tm.mk_bool_var("a");
        let goal = Goal::with_assertions(vec![a]); // no clause to split
        let mut cx = TacticContext::new(&mut tm);
        let t = OrElseTactic::new(vec![
            Box::new(SplitClauseTactic::new()),
            Box::new(SkipTactic::new()),
        ]);
        assert!(matches!(
            t.apply(&goal, &mut cx).unwrap(),
            TacticResult::SubGoals(_)
        ));
    }

    #[test]
    fn repeat_splits_to_fixpoint() {
        let mut tm = TermManager::new();
        let a = tm.mk_bool_var("a");
        let b = tm.mk_bool_var("b");
        let c = tm.mk_bool_var("c");
        let inner = tm.mk_or(vec![b, c]).unwrap();
        let clause = tm.mk_or(vec![a, inner]).unwrap();
        let goal = Goal::with_assertions(vec![clause]);
        let mut cx = TacticContext::new(&mut tm);

        // A single split yields [a] and [(or b c)]; repeating splits the
        // second branch again.
        let t = RepeatTactic::new(Box::new(SplitClauseTactic::new()), 16);
        match t.apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => {
                assert_eq!(subs.len(), 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn repeat_honors_iteration_cap() {
        let mut tm = TermManager::new();
        let a = tm.mk_bool_var("a");
        let b = tm.mk_bool_var("b");
        let c = tm.mk_bool_var("c");
        let inner = tm.mk_or(vec![b, c]).unwrap();
        let clause = tm.mk_or(vec![a, inner]).unwrap();
        let goal = Goal::with_assertions(vec![clause]);
        let mut cx = TacticContext::new(&mut tm);

        let t = RepeatTactic::new(Box::new(SplitClauseTactic::new()), 1);
        match t.apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => assert_eq!(subs.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn try_for_trips_at_the_next_checkpoint() {
        let mut tm = TermManager::new();
        let goal = Goal::new();
        let mut cx = TacticContext::new(&mut tm);
        let t = TryForTactic::new(Box::new(Checkpointing), Duration::ZERO);
        assert!(matches!(
            t.apply(&goal, &mut cx),
            Err(TactixError::Timeout { .. })
        ));
        // the surrounding budget is restored
        assert!(cx.checkpoint().is_ok());
    }

    #[test]
    fn try_for_failures_are_caught_by_or_else() {
        let mut tm = TermManager::new();
        let goal = Goal::new();
        let mut cx = TacticContext::new(&mut tm);
        let t = OrElseTactic::new(vec![
            Box::new(TryForTactic::new(Box::new(Checkpointing), Duration::ZERO)),
            Box::new(SkipTactic::new()),
        ]);
        assert!(matches!(
            t.apply(&goal, &mut cx).unwrap(),
            TacticResult::SubGoals(_)
        ));
    }

    #[test]
    fn with_scopes_parameters() {
        let mut tm = TermManager::new();
        let goal = Goal::new();
        let mut cx = TacticContext::new(&mut tm);

        let saw = Arc::new(AtomicUsize::new(0));
        let echo = ParamEcho {
            saw_flat: Arc::clone(&saw),
        };
        let t = WithTactic::new(Box::new(echo), Params::new().bool("flat", false));
        t.apply(&goal, &mut cx).unwrap();
        // the inner tactic saw the override, and the context was restored
        assert_eq!(saw.load(Ordering::SeqCst), 2);
        assert!(cx.params.is_empty());
    }

    #[test]
    fn fail_if_fires_and_passes() {
        let mut tm = TermManager::new();
        let goal = or_goal(&mut tm); // two assertions
        let mut cx = TacticContext::new(&mut tm);

        let t = FailIfTactic::new(Box::new(SizeProbe.gt(ConstProbe(1.0))));
        match t.apply(&goal, &mut cx) {
            Err(TactixError::PreconditionFailed { probe, value }) => {
                assert_eq!(probe, "(> size 1)");
                assert_eq!(value, 1.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let t = FailIfTactic::new(Box::new(SizeProbe.gt(ConstProbe(5.0))));
        assert!(matches!(
            t.apply(&goal, &mut cx).unwrap(),
            TacticResult::SubGoals(_)
        ));
    }

    #[test]
    fn cond_and_when_branch_on_probes() {
        let mut tm = TermManager::new();
        let goal = or_goal(&mut tm); // no bit-vectors
        let mut cx = TacticContext::new(&mut tm);

        let t = CondTactic::new(
            Box::new(HasBitVectorProbe),
            Box::new(FailTactic::new()),
            Box::new(SkipTactic::new()),
        );
        assert!(t.apply(&goal, &mut cx).is_ok());

        let t = WhenTactic::new(Box::new(HasBitVectorProbe), Box::new(FailTactic::new()));
        match t.apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => assert_eq!(subs[0].assertions, goal.assertions),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
