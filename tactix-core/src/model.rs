//! Models and model conversion.
//!
//! A [`Model`] maps uninterpreted constants to [`Value`]s. Tactics that
//! change the goal's vocabulary (variable elimination, bit-blasting) attach
//! a [`ModelConversion`] to the produced subgoal; when an end-game tactic
//! finds a satisfying assignment, the goal replays its conversions newest
//! first to express the model over the original variables.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use rustc_hash::FxHashMap;
use std::fmt;

use crate::ast::{TermId, TermKind, TermManager};
use crate::sort::{SortKind, bv_mask, bv_signed};

/// A concrete value of one of the engine's sorts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A Boolean.
    Bool(bool),
    /// An integer.
    Int(BigInt),
    /// A bit-vector; `value` is stored in the low `width` bits.
    BitVec {
        /// The bits.
        value: u64,
        /// Width in bits.
        width: u32,
    },
}

impl Value {
    /// The Boolean payload, if this is a Boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// The bit-vector payload, if this is a bit-vector.
    #[must_use]
    pub fn as_bv(&self) -> Option<(u64, u32)> {
        match self {
            Value::BitVec { value, width } => Some((*value, *width)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BitVec { value, .. } => write!(f, "{value}"),
        }
    }
}

/// An assignment of values to uninterpreted constants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    entries: FxHashMap<TermId, Value>,
}

impl Model {
    /// The empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` to the constant `var`, replacing any earlier value.
    pub fn assign(&mut self, var: TermId, value: Value) {
        self.entries.insert(var, value);
    }

    /// Removes the assignment of `var`, if any.
    pub fn remove(&mut self, var: TermId) -> Option<Value> {
        self.entries.remove(&var)
    }

    /// The value assigned to `var`.
    #[must_use]
    pub fn get(&self, var: TermId) -> Option<&Value> {
        self.entries.get(&var)
    }

    /// Number of assigned constants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no constant is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(constant, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &Value)> {
        self.entries.iter().map(|(&t, v)| (t, v))
    }

    /// Evaluates `t` under this model. Returns `None` when an unassigned
    /// constant is reached.
    #[must_use]
    pub fn eval(&self, t: TermId, tm: &TermManager) -> Option<Value> {
        self.eval_inner(t, tm, false)
    }

    /// Evaluates `t`, completing unassigned constants with sort defaults
    /// (`false`, `0`).
    #[must_use]
    pub fn eval_or_default(&self, t: TermId, tm: &TermManager) -> Value {
        match self.eval_inner(t, tm, true) {
            Some(v) => v,
            // complete=true always yields a value
            None => Value::Bool(false),
        }
    }

    fn default_of(&self, t: TermId, tm: &TermManager) -> Value {
        match tm.sorts.get(tm.sort_of(t)).kind {
            SortKind::Bool => Value::Bool(false),
            SortKind::Int => Value::Int(BigInt::zero()),
            SortKind::BitVec(w) => Value::BitVec { value: 0, width: w },
        }
    }

    fn eval_bool(&self, t: TermId, tm: &TermManager, complete: bool) -> Option<bool> {
        self.eval_inner(t, tm, complete)?.as_bool()
    }

    fn eval_inner(&self, t: TermId, tm: &TermManager, complete: bool) -> Option<Value> {
        use TermKind::*;
        let v = match tm.kind(t) {
            True => Value::Bool(true),
            False => Value::Bool(false),
            Var(_) => match self.entries.get(&t) {
                Some(v) => v.clone(),
                None if complete => self.default_of(t, tm),
                None => return None,
            },
            IntConst(v) => Value::Int(v.clone()),
            BvConst { value, width } => Value::BitVec { value: *value, width: *width },

            Not(a) => Value::Bool(!self.eval_bool(*a, tm, complete)?),
            And(xs) => {
                let mut acc = true;
                for &x in xs {
                    acc &= self.eval_bool(x, tm, complete)?;
                }
                Value::Bool(acc)
            }
            Or(xs) => {
                let mut acc = false;
                for &x in xs {
                    acc |= self.eval_bool(x, tm, complete)?;
                }
                Value::Bool(acc)
            }
            Xor(a, b) => {
                Value::Bool(self.eval_bool(*a, tm, complete)? ^ self.eval_bool(*b, tm, complete)?)
            }
            Implies(a, b) => Value::Bool(
                !self.eval_bool(*a, tm, complete)? || self.eval_bool(*b, tm, complete)?,
            ),
            Ite(c, th, el) => {
                if self.eval_bool(*c, tm, complete)? {
                    self.eval_inner(*th, tm, complete)?
                } else {
                    self.eval_inner(*el, tm, complete)?
                }
            }
            Eq(a, b) => Value::Bool(
                self.eval_inner(*a, tm, complete)? == self.eval_inner(*b, tm, complete)?,
            ),
            Distinct(xs) => {
                let vals: Option<Vec<Value>> =
                    xs.iter().map(|&x| self.eval_inner(x, tm, complete)).collect();
                let vals = vals?;
                let mut distinct = true;
                'outer: for i in 0..vals.len() {
                    for j in (i + 1)..vals.len() {
                        if vals[i] == vals[j] {
                            distinct = false;
                            break 'outer;
                        }
                    }
                }
                Value::Bool(distinct)
            }

            Add(xs) => {
                let mut acc = BigInt::zero();
                for &x in xs {
                    acc += self.eval_int(x, tm, complete)?;
                }
                Value::Int(acc)
            }
            Sub(a, b) => {
                Value::Int(self.eval_int(*a, tm, complete)? - self.eval_int(*b, tm, complete)?)
            }
            Neg(a) => Value::Int(-self.eval_int(*a, tm, complete)?),
            Mul(xs) => {
                let mut acc = BigInt::one();
                for &x in xs {
                    acc *= self.eval_int(x, tm, complete)?;
                }
                Value::Int(acc)
            }
            Le(a, b) => Value::Bool(
                self.eval_int(*a, tm, complete)? <= self.eval_int(*b, tm, complete)?,
            ),
            Lt(a, b) => Value::Bool(
                self.eval_int(*a, tm, complete)? < self.eval_int(*b, tm, complete)?,
            ),
            Ge(a, b) => Value::Bool(
                self.eval_int(*a, tm, complete)? >= self.eval_int(*b, tm, complete)?,
            ),
            Gt(a, b) => Value::Bool(
                self.eval_int(*a, tm, complete)? > self.eval_int(*b, tm, complete)?,
            ),

            BvNot(a) => {
                let (v, w) = self.eval_bv(*a, tm, complete)?;
                Value::BitVec { value: !v & bv_mask(w), width: w }
            }
            BvNeg(a) => {
                let (v, w) = self.eval_bv(*a, tm, complete)?;
                Value::BitVec { value: v.wrapping_neg() & bv_mask(w), width: w }
            }
            BvAnd(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::BitVec { value: x & y, width: w }
            }
            BvOr(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::BitVec { value: x | y, width: w }
            }
            BvXor(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::BitVec { value: x ^ y, width: w }
            }
            BvAdd(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::BitVec { value: x.wrapping_add(y) & bv_mask(w), width: w }
            }
            BvSub(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::BitVec { value: x.wrapping_sub(y) & bv_mask(w), width: w }
            }
            BvMul(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::BitVec { value: x.wrapping_mul(y) & bv_mask(w), width: w }
            }
            BvUlt(a, b) => {
                let (x, _) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::Bool(x < y)
            }
            BvUle(a, b) => {
                let (x, _) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::Bool(x <= y)
            }
            BvSlt(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::Bool(bv_signed(x, w) < bv_signed(y, w))
            }
            BvSle(a, b) => {
                let (x, w) = self.eval_bv(*a, tm, complete)?;
                let (y, _) = self.eval_bv(*b, tm, complete)?;
                Value::Bool(bv_signed(x, w) <= bv_signed(y, w))
            }
        };
        Some(v)
    }

    fn eval_int(&self, t: TermId, tm: &TermManager, complete: bool) -> Option<BigInt> {
        match self.eval_inner(t, tm, complete)? {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    fn eval_bv(&self, t: TermId, tm: &TermManager, complete: bool) -> Option<(u64, u32)> {
        self.eval_inner(t, tm, complete)?.as_bv()
    }

    /// Whether every assertion of `goal` evaluates to `true` under this
    /// model, completing unassigned constants with defaults.
    #[must_use]
    pub fn satisfies(&self, assertions: &[TermId], tm: &TermManager) -> bool {
        assertions
            .iter()
            .all(|&a| self.eval_or_default(a, tm) == Value::Bool(true))
    }

    /// Display adaptor listing assignments sorted by constant name.
    #[must_use]
    pub fn display<'a>(&'a self, tm: &'a TermManager) -> ModelDisplay<'a> {
        ModelDisplay { model: self, tm }
    }
}

/// Renders a model as `[x := 1, y := true]`, sorted by name.
pub struct ModelDisplay<'a> {
    model: &'a Model,
    tm: &'a TermManager,
}

impl fmt::Display for ModelDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&str, &Value)> = self
            .model
            .iter()
            .map(|(t, v)| (self.tm.name_of(t).unwrap_or("?"), v))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        write!(f, "[")?;
        for (i, (name, value)) in entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} := {value}")?;
        }
        write!(f, "]")
    }
}

/// Maps a satisfying assignment of a transformed goal back to its parent.
pub trait ModelConversion: Send + Sync {
    /// Short human-readable tag, used in goal debugging output.
    fn describe(&self) -> &str;

    /// Rewrites `model` in place into the parent goal's vocabulary.
    fn convert(&self, model: &mut Model, tm: &TermManager);
}

/// Conversion recorded by equation solving: each eliminated variable is
/// recomputed from its defining expression.
///
/// Bindings are replayed newest first, so definitions may mention variables
/// eliminated earlier.
pub struct EliminatedVars {
    bindings: Vec<(TermId, TermId)>,
}

impl EliminatedVars {
    /// `bindings` in elimination order: `(variable, defining expression)`.
    #[must_use]
    pub fn new(bindings: Vec<(TermId, TermId)>) -> Self {
        Self { bindings }
    }
}

impl ModelConversion for EliminatedVars {
    fn describe(&self) -> &str {
        "eliminated-vars"
    }

    fn convert(&self, model: &mut Model, tm: &TermManager) {
        for &(var, def) in self.bindings.iter().rev() {
            let value = model.eval_or_default(def, tm);
            model.assign(var, value);
        }
    }
}

/// One blasted bit-vector variable: its Boolean carrier bits, LSB first.
pub struct BitGroup {
    /// The original bit-vector constant.
    pub var: TermId,
    /// Boolean constants carrying the bits, index 0 is the LSB.
    pub bits: Vec<TermId>,
    /// Width of `var`.
    pub width: u32,
}

/// Conversion recorded by bit-blasting: reassembles bit-vector values from
/// their per-bit Booleans and drops the carrier bits from the model.
pub struct BitGroups {
    groups: Vec<BitGroup>,
}

impl BitGroups {
    /// Builds the conversion from the blaster's variable map.
    #[must_use]
    pub fn new(groups: Vec<BitGroup>) -> Self {
        Self { groups }
    }
}

impl ModelConversion for BitGroups {
    fn describe(&self) -> &str {
        "bit-groups"
    }

    fn convert(&self, model: &mut Model, _tm: &TermManager) {
        for group in &self.groups {
            let mut value = 0u64;
            for (i, &bit) in group.bits.iter().enumerate() {
                let set = matches!(model.remove(bit), Some(Value::Bool(true)));
                if set {
                    value |= 1u64 << i;
                }
            }
            model.assign(group.var, Value::BitVec { value, width: group.width });
        }
    }
}
