//! Tactic framework.
//!
//! Tactics transform a [`Goal`] into subgoals or decide it outright;
//! combinators sequence, guard, and retry them. The architecture follows
//! Z3's tactic layer (`src/tactic/tactical.cpp`): subgoals produced by one
//! application are disjunctive case splits, so a goal is satisfiable iff
//! some subgoal is, and an empty goal is trivially satisfiable.
//!
//! Failure is an `Err` from [`Tactic::apply`]; the `or-else` combinator
//! catches it and falls through to its next alternative, which is how
//! guarded strategies built from `fail-if` recover.

pub mod bv;
pub mod combinators;
pub mod core;
pub mod probe;

use std::fmt;
use std::sync::Arc;

use crate::ast::{TermId, TermManager};
use crate::error::{Result, TactixError};
use crate::model::{Model, ModelConversion};
use crate::params::Params;
use crate::resource::Budget;

pub use bv::BitBlastTactic;
pub use combinators::{
    CondTactic, FailIfTactic, OrElseTactic, RepeatTactic, ThenTactic, TryForTactic, WhenTactic,
    WithTactic,
};
pub use core::{
    PropagateValuesConfig, PropagateValuesTactic, SimplifyConfig, SimplifyTactic, SolveEqsTactic,
    SplitClauseTactic,
};
pub use probe::{
    AddProbe, AndProbe, ConstProbe, DepthProbe, DivProbe, EqProbe, GeProbe, GtProbe,
    HasBitVectorProbe, IsPropositionalProbe, IsQfbvProbe, LeProbe, LtProbe, MulProbe, NeProbe,
    NotProbe, NumBoolConstsProbe, NumConstsProbe, NumExprsProbe, OrProbe, Probe, ProbeExt,
    SizeProbe, SubProbe, lookup_probe, probes,
};

/// How faithfully a goal's transformations preserved satisfiability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// Satisfiability of the goal implies satisfiability of the original.
    Under,
    /// Equisatisfiable with the original.
    #[default]
    Precise,
    /// Unsatisfiability of the goal implies unsatisfiability of the original.
    Over,
}

/// A collection of assertions under one conjunction, plus the model
/// conversions accumulated on the way here.
#[derive(Clone)]
pub struct Goal {
    /// The asserted formulas.
    pub assertions: Vec<TermId>,
    /// Precision of the transformations leading to this goal.
    pub precision: Precision,
    /// Number of transformation steps from the root goal.
    pub depth: u32,
    converters: Vec<Arc<dyn ModelConversion>>,
}

impl Goal {
    /// An empty goal (trivially satisfiable).
    #[must_use]
    pub fn new() -> Self {
        Self {
            assertions: Vec::new(),
            precision: Precision::Precise,
            depth: 0,
            converters: Vec::new(),
        }
    }

    /// A goal holding the given assertions.
    #[must_use]
    pub fn with_assertions(assertions: Vec<TermId>) -> Self {
        Self {
            assertions,
            ..Self::new()
        }
    }

    /// Adds an assertion.
    pub fn add(&mut self, t: TermId) {
        self.assertions.push(t);
    }

    /// Number of assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    /// Whether the goal has no assertions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Whether every assertion is the `true` term (or there is none).
    #[must_use]
    pub fn is_trivially_sat(&self, tm: &TermManager) -> bool {
        self.assertions.iter().all(|&a| tm.is_true(a))
    }

    /// Whether some assertion is the `false` term.
    #[must_use]
    pub fn is_inconsistent(&self, tm: &TermManager) -> bool {
        self.assertions.iter().any(|&a| tm.is_false(a))
    }

    /// A subgoal with new assertions, inheriting precision and the
    /// conversion chain, one step deeper.
    #[must_use]
    pub fn child(&self, assertions: Vec<TermId>) -> Self {
        Self {
            assertions,
            precision: self.precision,
            depth: self.depth + 1,
            converters: self.converters.clone(),
        }
    }

    /// Appends a model conversion produced by the latest transformation.
    pub fn push_converter(&mut self, conv: Arc<dyn ModelConversion>) {
        self.converters.push(conv);
    }

    /// Number of model conversions accumulated on this goal.
    #[must_use]
    pub fn num_converters(&self) -> usize {
        self.converters.len()
    }

    /// Replays the conversion chain, newest first, turning a model of this
    /// goal into a model of the root goal.
    #[must_use]
    pub fn convert_model(&self, mut model: Model, tm: &TermManager) -> Model {
        for conv in self.converters.iter().rev() {
            conv.convert(&mut model, tm);
        }
        model
    }

    /// Display adaptor rendering the assertions as a bracketed list.
    #[must_use]
    pub fn display<'a>(&'a self, tm: &'a TermManager) -> GoalDisplay<'a> {
        GoalDisplay { goal: self, tm }
    }
}

impl Default for Goal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("assertions", &self.assertions)
            .field("precision", &self.precision)
            .field("depth", &self.depth)
            .field(
                "converters",
                &self
                    .converters
                    .iter()
                    .map(|c| c.describe())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Renders a goal as `[(< x y), (= x 2)]`.
pub struct GoalDisplay<'a> {
    goal: &'a Goal,
    tm: &'a TermManager,
}

impl fmt::Display for GoalDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, &a) in self.goal.assertions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.tm.display(a))?;
        }
        write!(f, "]")
    }
}

/// Outcome of deciding a goal.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Satisfiable, with a model over the root goal's variables.
    Sat(Model),
    /// Unsatisfiable.
    Unsat,
}

/// Outcome of one tactic application.
#[derive(Debug, Clone)]
pub enum TacticResult {
    /// The goal was decided.
    Solved(Verdict),
    /// The goal was replaced by disjunctive subgoals.
    SubGoals(Vec<Goal>),
    /// The tactic had nothing to do on this goal.
    NotApplicable,
}

/// Mutable state threaded through a tactic application tree: the term
/// manager, the active parameters, and the resource budget.
pub struct TacticContext<'a> {
    /// Term manager used to intern rewritten terms.
    pub tm: &'a mut TermManager,
    /// Parameters visible to the tactic being applied.
    pub params: Params,
    /// Deadline and step ceiling.
    pub budget: Budget,
}

impl<'a> TacticContext<'a> {
    /// A context with empty parameters and no limits.
    pub fn new(tm: &'a mut TermManager) -> Self {
        Self {
            tm,
            params: Params::new(),
            budget: Budget::unlimited(),
        }
    }

    /// Replaces the parameter set.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Replaces the budget.
    #[must_use]
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Cooperative cancellation point.
    pub fn checkpoint(&self) -> Result<()> {
        self.budget.check()
    }
}

/// A goal transformer.
pub trait Tactic: Send + Sync {
    /// Registry name, e.g. `"simplify"`.
    fn name(&self) -> &str;

    /// Applies the tactic to `goal`.
    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult>;

    /// One-line description for listings.
    fn description(&self) -> &str {
        ""
    }
}

/// The tactic that returns its goal unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipTactic;

impl SkipTactic {
    /// Creates the tactic.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tactic for SkipTactic {
    fn name(&self) -> &str {
        "skip"
    }

    fn apply(&self, goal: &Goal, _cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        Ok(TacticResult::SubGoals(vec![goal.clone()]))
    }

    fn description(&self) -> &str {
        "return the goal unchanged"
    }
}

/// The tactic that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailTactic;

impl FailTactic {
    /// Creates the tactic.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tactic for FailTactic {
    fn name(&self) -> &str {
        "fail"
    }

    fn apply(&self, _goal: &Goal, _cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        Err(TactixError::tactic("fail", "unconditional failure"))
    }

    fn description(&self) -> &str {
        "always fail"
    }
}

/// Names and descriptions of the built-in tactics of this crate.
#[must_use]
pub fn tactics() -> Vec<(&'static str, &'static str)> {
    vec![
        ("skip", "return the goal unchanged"),
        ("fail", "always fail"),
        ("simplify", "rewrite assertions bottom-up"),
        ("propagate-values", "propagate constant equations"),
        ("solve-eqs", "eliminate variables by equation solving"),
        ("split-clause", "case-split on the first disjunction"),
        ("bit-blast", "lower bit-vector assertions to Boolean structure"),
    ]
}

/// Builds a built-in tactic by registry name.
pub fn lookup_tactic(name: &str) -> Result<Box<dyn Tactic>> {
    match name {
        "skip" => Ok(Box::new(SkipTactic::new())),
        "fail" => Ok(Box::new(FailTactic::new())),
        "simplify" => Ok(Box::new(SimplifyTactic::new())),
        "propagate-values" => Ok(Box::new(PropagateValuesTactic::new())),
        "solve-eqs" => Ok(Box::new(SolveEqsTactic::new())),
        "split-clause" => Ok(Box::new(SplitClauseTactic::new())),
        "bit-blast" => Ok(Box::new(BitBlastTactic::new())),
        _ => Err(TactixError::UnknownTactic(name.to_string())),
    }
}
