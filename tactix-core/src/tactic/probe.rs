//! Probes: numeric measurements over goals.
//!
//! A probe inspects a goal without changing it and yields an `f64`;
//! predicates return 1.0 or 0.0. Probes are combined with arithmetic,
//! comparison, and logical wrappers, and drive the guarded combinators
//! (`fail-if`, `if`, `when`).

use rustc_hash::FxHashSet;

use crate::ast::{TermId, TermManager};
use crate::error::{Result, TactixError};
use crate::sort::SortKind;
use crate::tactic::Goal;

/// A side-effect-free measurement over a goal.
pub trait Probe: Send + Sync {
    /// Registry name or operator symbol.
    fn name(&self) -> &str;

    /// Evaluates the probe on `goal`.
    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64;

    /// Rendering used in precondition-failure messages.
    fn describe(&self) -> String {
        self.name().to_string()
    }
}

fn subterm_sorts(goal: &Goal, tm: &TermManager) -> impl Iterator<Item = SortKind> {
    tm.subterms(&goal.assertions)
        .into_iter()
        .map(|t| tm.sorts.get(tm.sort_of(t)).kind)
}

fn distinct_vars(goal: &Goal, tm: &TermManager) -> FxHashSet<TermId> {
    tm.collect_vars(&goal.assertions)
}

// ----- built-in measurements -----

/// Number of assertions in the goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeProbe;

impl Probe for SizeProbe {
    fn name(&self) -> &str {
        "size"
    }

    fn eval(&self, goal: &Goal, _tm: &TermManager) -> f64 {
        goal.len() as f64
    }
}

/// Maximum term depth over the assertions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthProbe;

impl Probe for DepthProbe {
    fn name(&self) -> &str {
        "depth"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        goal.assertions
            .iter()
            .map(|&a| tm.depth(a))
            .max()
            .unwrap_or(0) as f64
    }
}

/// Number of distinct subterms in the goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumExprsProbe;

impl Probe for NumExprsProbe {
    fn name(&self) -> &str {
        "num-exprs"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        tm.subterms(&goal.assertions).len() as f64
    }
}

/// Number of distinct uninterpreted constants in the goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumConstsProbe;

impl Probe for NumConstsProbe {
    fn name(&self) -> &str {
        "num-consts"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        distinct_vars(goal, tm).len() as f64
    }
}

/// Number of distinct Boolean uninterpreted constants in the goal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumBoolConstsProbe;

impl Probe for NumBoolConstsProbe {
    fn name(&self) -> &str {
        "num-bool-consts"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        distinct_vars(goal, tm)
            .into_iter()
            .filter(|&v| tm.sorts.is_bool(tm.sort_of(v)))
            .count() as f64
    }
}

/// 1.0 when every subterm is Boolean-sorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsPropositionalProbe;

impl Probe for IsPropositionalProbe {
    fn name(&self) -> &str {
        "is-propositional"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        let prop = subterm_sorts(goal, tm).all(|k| k == SortKind::Bool);
        if prop { 1.0 } else { 0.0 }
    }
}

/// 1.0 when every subterm is Boolean- or bit-vector-sorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsQfbvProbe;

impl Probe for IsQfbvProbe {
    fn name(&self) -> &str {
        "is-qfbv"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        let qfbv = subterm_sorts(goal, tm)
            .all(|k| matches!(k, SortKind::Bool | SortKind::BitVec(_)));
        if qfbv { 1.0 } else { 0.0 }
    }
}

/// 1.0 when some subterm is bit-vector-sorted.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasBitVectorProbe;

impl Probe for HasBitVectorProbe {
    fn name(&self) -> &str {
        "has-bv"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        let has = subterm_sorts(goal, tm).any(|k| matches!(k, SortKind::BitVec(_)));
        if has { 1.0 } else { 0.0 }
    }
}

/// A constant value, for use as a comparison operand.
#[derive(Debug, Clone, Copy)]
pub struct ConstProbe(pub f64);

impl Probe for ConstProbe {
    fn name(&self) -> &str {
        "const"
    }

    fn eval(&self, _goal: &Goal, _tm: &TermManager) -> f64 {
        self.0
    }

    fn describe(&self) -> String {
        format!("{}", self.0)
    }
}

// ----- combinators -----

macro_rules! binary_probe {
    ($(#[$doc:meta])* $name:ident, $sym:literal, $lhs:ident, $rhs:ident, $body:expr) => {
        $(#[$doc])*
        pub struct $name {
            lhs: Box<dyn Probe>,
            rhs: Box<dyn Probe>,
        }

        impl $name {
            /// Combines two probes.
            #[must_use]
            pub fn new(lhs: Box<dyn Probe>, rhs: Box<dyn Probe>) -> Self {
                Self { lhs, rhs }
            }
        }

        impl Probe for $name {
            fn name(&self) -> &str {
                $sym
            }

            fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
                let $lhs = self.lhs.eval(goal, tm);
                let $rhs = self.rhs.eval(goal, tm);
                $body
            }

            fn describe(&self) -> String {
                format!("({} {} {})", $sym, self.lhs.describe(), self.rhs.describe())
            }
        }
    };
}

binary_probe!(
    /// Sum of two probes.
    AddProbe, "+", a, b, a + b
);
binary_probe!(
    /// Difference of two probes.
    SubProbe, "-", a, b, a - b
);
binary_probe!(
    /// Product of two probes.
    MulProbe, "*", a, b, a * b
);
binary_probe!(
    /// Quotient of two probes; a zero divisor yields 0.0.
    DivProbe, "/", a, b, if b == 0.0 { 0.0 } else { a / b }
);
binary_probe!(
    /// 1.0 when the left probe is strictly less.
    LtProbe, "<", a, b, if a < b { 1.0 } else { 0.0 }
);
binary_probe!(
    /// 1.0 when the left probe is less or equal.
    LeProbe, "<=", a, b, if a <= b { 1.0 } else { 0.0 }
);
binary_probe!(
    /// 1.0 when the left probe is strictly greater.
    GtProbe, ">", a, b, if a > b { 1.0 } else { 0.0 }
);
binary_probe!(
    /// 1.0 when the left probe is greater or equal.
    GeProbe, ">=", a, b, if a >= b { 1.0 } else { 0.0 }
);
binary_probe!(
    /// 1.0 when both probes are equal.
    EqProbe, "=", a, b, if a == b { 1.0 } else { 0.0 }
);
binary_probe!(
    /// 1.0 when the probes differ.
    NeProbe, "!=", a, b, if a != b { 1.0 } else { 0.0 }
);
binary_probe!(
    /// 1.0 when both probes are non-zero.
    AndProbe, "and", a, b, if a != 0.0 && b != 0.0 { 1.0 } else { 0.0 }
);
binary_probe!(
    /// 1.0 when either probe is non-zero.
    OrProbe, "or", a, b, if a != 0.0 || b != 0.0 { 1.0 } else { 0.0 }
);

/// 1.0 when the wrapped probe is zero.
pub struct NotProbe {
    inner: Box<dyn Probe>,
}

impl NotProbe {
    /// Negates a probe.
    #[must_use]
    pub fn new(inner: Box<dyn Probe>) -> Self {
        Self { inner }
    }
}

impl Probe for NotProbe {
    fn name(&self) -> &str {
        "not"
    }

    fn eval(&self, goal: &Goal, tm: &TermManager) -> f64 {
        if self.inner.eval(goal, tm) == 0.0 { 1.0 } else { 0.0 }
    }

    fn describe(&self) -> String {
        format!("(not {})", self.inner.describe())
    }
}

/// Fluent construction of probe expressions, e.g.
/// `SizeProbe.gt(ConstProbe(2.0))`.
pub trait ProbeExt: Probe + Sized + 'static {
    /// `self + rhs`.
    fn add(self, rhs: impl Probe + 'static) -> AddProbe {
        AddProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self - rhs`.
    fn sub(self, rhs: impl Probe + 'static) -> SubProbe {
        SubProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self * rhs`.
    fn mul(self, rhs: impl Probe + 'static) -> MulProbe {
        MulProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self / rhs`, 0.0 on a zero divisor.
    fn div(self, rhs: impl Probe + 'static) -> DivProbe {
        DivProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self < rhs`.
    fn lt(self, rhs: impl Probe + 'static) -> LtProbe {
        LtProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self <= rhs`.
    fn le(self, rhs: impl Probe + 'static) -> LeProbe {
        LeProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self > rhs`.
    fn gt(self, rhs: impl Probe + 'static) -> GtProbe {
        GtProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self >= rhs`.
    fn ge(self, rhs: impl Probe + 'static) -> GeProbe {
        GeProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self == rhs`.
    fn eq(self, rhs: impl Probe + 'static) -> EqProbe {
        EqProbe::new(Box::new(self), Box::new(rhs))
    }

    /// `self != rhs`.
    fn ne(self, rhs: impl Probe + 'static) -> NeProbe {
        NeProbe::new(Box::new(self), Box::new(rhs))
    }

    /// Both non-zero.
    fn and(self, rhs: impl Probe + 'static) -> AndProbe {
        AndProbe::new(Box::new(self), Box::new(rhs))
    }

    /// Either non-zero.
    fn or(self, rhs: impl Probe + 'static) -> OrProbe {
        OrProbe::new(Box::new(self), Box::new(rhs))
    }

    /// Zero test.
    fn not(self) -> NotProbe {
        NotProbe::new(Box::new(self))
    }
}

impl<P: Probe + Sized + 'static> ProbeExt for P {}

/// Names and descriptions of the built-in probes.
#[must_use]
pub fn probes() -> Vec<(&'static str, &'static str)> {
    vec![
        ("size", "number of assertions"),
        ("depth", "maximum term depth"),
        ("num-exprs", "number of distinct subterms"),
        ("num-consts", "number of distinct uninterpreted constants"),
        ("num-bool-consts", "number of distinct Boolean constants"),
        ("is-propositional", "1.0 when the goal is purely Boolean"),
        ("is-qfbv", "1.0 when the goal uses only Booleans and bit-vectors"),
        ("has-bv", "1.0 when the goal mentions a bit-vector"),
    ]
}

/// Builds a built-in probe by registry name.
pub fn lookup_probe(name: &str) -> Result<Box<dyn Probe>> {
    match name {
        "size" => Ok(Box::new(SizeProbe)),
        "depth" => Ok(Box::new(DepthProbe)),
        "num-exprs" => Ok(Box::new(NumExprsProbe)),
        "num-consts" => Ok(Box::new(NumConstsProbe)),
        "num-bool-consts" => Ok(Box::new(NumBoolConstsProbe)),
        "is-propositional" => Ok(Box::new(IsPropositionalProbe)),
        "is-qfbv" => Ok(Box::new(IsQfbvProbe)),
        "has-bv" => Ok(Box::new(HasBitVectorProbe)),
        _ => Err(TactixError::UnknownProbe(name.to_string())),
    }
}
