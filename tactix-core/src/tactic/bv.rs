//! Bit-Blasting Tactic.
//!
//! Lowers bit-vector structure to propositional structure. Every
//! bit-vector variable becomes a group of boolean carrier variables, one
//! per bit with index 0 the LSB, and the arithmetic operators become the
//! corresponding circuits: ripple-carry addition, shift-and-add
//! multiplication, and a comparison chain for the orders. A model
//! conversion reassembles bit-vector values from the carrier bits.
//!
//! ## References
//!
//! - Z3's `tactic/bv/bit_blaster_tactic.cpp`

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::{Result, TactixError};
use crate::model::{BitGroup, BitGroups};
use crate::tactic::{Goal, Tactic, TacticContext, TacticResult};

/// Bits of one bit-vector term, LSB first.
type Bits = SmallVec<[TermId; 32]>;

/// Lowers bit-vector assertions to propositional assertions.
#[derive(Default)]
pub struct BitBlastTactic;

impl BitBlastTactic {
    /// Creates the tactic.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tactic for BitBlastTactic {
    fn name(&self) -> &str {
        "bit-blast"
    }

    fn apply(&self, goal: &Goal, cx: &mut TacticContext<'_>) -> Result<TacticResult> {
        let reachable = cx.tm.subterms(&goal.assertions);
        let has_bv = reachable
            .iter()
            .any(|&t| cx.tm.bv_width_of(t).is_some());
        if !has_bv {
            return Ok(TacticResult::NotApplicable);
        }

        let mut blaster = Blaster::default();
        let mut lowered = Vec::with_capacity(goal.len());
        for &assertion in &goal.assertions {
            cx.checkpoint()?;
            lowered.push(blaster.blast_bool(cx.tm, assertion)?);
        }

        let mut child = goal.child(Vec::new());
        for a in lowered {
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
        tracing::debug!(
            groups = blaster.groups.len(),
            assertions = child.len(),
            "bit-blast"
        );
        child.push_converter(Arc::new(BitGroups::new(blaster.groups)));
        Ok(TacticResult::SubGoals(vec![child]))
    }

    fn description(&self) -> &str {
        "lower bit-vector assertions to propositional form"
    }
}

/// Carries the per-term bit caches during one application.
#[derive(Default)]
struct Blaster {
    bits: FxHashMap<TermId, Bits>,
    bools: FxHashMap<TermId, TermId>,
    groups: Vec<BitGroup>,
}

// Folding connectives. The constructors only collapse trivial arities, so
// constant inputs are folded here to keep the circuits lean.

fn not1(tm: &mut TermManager, a: TermId) -> Result<TermId> {
    if tm.is_true(a) {
        Ok(tm.mk_false())
    } else if tm.is_false(a) {
        Ok(tm.mk_true())
    } else {
        tm.mk_not(a)
    }
}

fn and2(tm: &mut TermManager, a: TermId, b: TermId) -> Result<TermId> {
    if tm.is_false(a) || tm.is_false(b) {
        Ok(tm.mk_false())
    } else if tm.is_true(a) || a == b {
        Ok(b)
    } else if tm.is_true(b) {
        Ok(a)
    } else {
        tm.mk_and(vec![a, b])
    }
}

fn or2(tm: &mut TermManager, a: TermId, b: TermId) -> Result<TermId> {
    if tm.is_true(a) || tm.is_true(b) {
        Ok(tm.mk_true())
    } else if tm.is_false(a) || a == b {
        Ok(b)
    } else if tm.is_false(b) {
        Ok(a)
    } else {
        tm.mk_or(vec![a, b])
    }
}

fn xor2(tm: &mut TermManager, a: TermId, b: TermId) -> Result<TermId> {
    if a == b {
        Ok(tm.mk_false())
    } else if tm.is_false(a) {
        Ok(b)
    } else if tm.is_false(b) {
        Ok(a)
    } else if tm.is_true(a) {
        not1(tm, b)
    } else if tm.is_true(b) {
        not1(tm, a)
    } else {
        tm.mk_xor(a, b)
    }
}

fn iff2(tm: &mut TermManager, a: TermId, b: TermId) -> Result<TermId> {
    if a == b {
        Ok(tm.mk_true())
    } else if tm.is_true(a) {
        Ok(b)
    } else if tm.is_true(b) {
        Ok(a)
    } else if tm.is_false(a) {
        not1(tm, b)
    } else if tm.is_false(b) {
        not1(tm, a)
    } else {
        tm.mk_eq(a, b)
    }
}

fn ite3(tm: &mut TermManager, c: TermId, t: TermId, e: TermId) -> Result<TermId> {
    if tm.is_true(c) || t == e {
        Ok(t)
    } else if tm.is_false(c) {
        Ok(e)
    } else {
        tm.mk_ite(c, t, e)
    }
}

/// `a + b + carry_in`, truncated to the operand width.
fn add_bits(tm: &mut TermManager, a: &Bits, b: &Bits, carry_in: TermId) -> Result<Bits> {
    let mut out = Bits::new();
    let mut carry = carry_in;
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        let axb = xor2(tm, ai, bi)?;
        let sum = xor2(tm, axb, carry)?;
        let r#gen = and2(tm, ai, bi)?;
        let prop = and2(tm, carry, axb)?;
        out.push(sum);
        carry = or2(tm, r#gen, prop)?;
    }
    Ok(out)
}

/// `a < b` unsigned: the most significant differing bit decides.
fn ult_bits(tm: &mut TermManager, a: &Bits, b: &Bits) -> Result<TermId> {
    let mut res = tm.mk_false();
    for (&ai, &bi) in a.iter().zip(b.iter()) {
        let na = not1(tm, ai)?;
        let lt = and2(tm, na, bi)?;
        let same = iff2(tm, ai, bi)?;
        let keep = and2(tm, same, res)?;
        res = or2(tm, lt, keep)?;
    }
    Ok(res)
}

/// Flips the sign bit, mapping signed order onto unsigned order.
fn flip_msb(tm: &mut TermManager, bits: &Bits) -> Result<Bits> {
    let mut flipped = bits.clone();
    if let Some(last) = flipped.last_mut() {
        *last = not1(tm, *last)?;
    }
    Ok(flipped)
}

impl Blaster {
    /// Lowers a boolean-sorted term, rebuilding the propositional skeleton
    /// and translating the bit-vector atoms under it.
    fn blast_bool(&mut self, tm: &mut TermManager, t: TermId) -> Result<TermId> {
        if let Some(&done) = self.bools.get(&t) {
            return Ok(done);
        }
        let kind = tm.kind(t).clone();
        let out = match kind {
            TermKind::True | TermKind::False | TermKind::Var(_) => t,
            TermKind::Not(x) => {
                let x = self.blast_bool(tm, x)?;
                not1(tm, x)?
            }
            TermKind::And(xs) => {
                let mut blasted = Vec::with_capacity(xs.len());
                for x in xs {
                    blasted.push(self.blast_bool(tm, x)?);
                }
                tm.mk_and(blasted)?
            }
            TermKind::Or(xs) => {
                let mut blasted = Vec::with_capacity(xs.len());
                for x in xs {
                    blasted.push(self.blast_bool(tm, x)?);
                }
                tm.mk_or(blasted)?
            }
            TermKind::Xor(a, b) => {
                let a = self.blast_bool(tm, a)?;
                let b = self.blast_bool(tm, b)?;
                xor2(tm, a, b)?
            }
            TermKind::Implies(a, b) => {
                let a = self.blast_bool(tm, a)?;
                let b = self.blast_bool(tm, b)?;
                let na = not1(tm, a)?;
                or2(tm, na, b)?
            }
            TermKind::Ite(c, th, el) => {
                let c = self.blast_bool(tm, c)?;
                let th = self.blast_bool(tm, th)?;
                let el = self.blast_bool(tm, el)?;
                ite3(tm, c, th, el)?
            }
            TermKind::Eq(l, r) => {
                if tm.bv_width_of(l).is_some() {
                    let (lb, rb) = (self.blast_bits(tm, l)?, self.blast_bits(tm, r)?);
                    self.bitwise_eq(tm, &lb, &rb)?
                } else if tm.sorts.is_bool(tm.sort_of(l)) {
                    let l = self.blast_bool(tm, l)?;
                    let r = self.blast_bool(tm, r)?;
                    iff2(tm, l, r)?
                } else {
                    return Err(integer_content());
                }
            }
            TermKind::Distinct(xs) => {
                if xs.iter().any(|&x| tm.bv_width_of(x).is_none()) {
                    if xs.iter().all(|&x| tm.sorts.is_bool(tm.sort_of(x))) {
                        let mut blasted = Vec::with_capacity(xs.len());
                        for x in xs {
                            blasted.push(self.blast_bool(tm, x)?);
                        }
                        tm.mk_distinct(blasted)?
                    } else {
                        return Err(integer_content());
                    }
                } else {
                    let mut rows = Vec::with_capacity(xs.len());
                    for &x in &xs {
                        rows.push(self.blast_bits(tm, x)?);
                    }
                    let mut conj = Vec::new();
                    for i in 0..rows.len() {
                        for j in i + 1..rows.len() {
                            let same = self.bitwise_eq(tm, &rows[i], &rows[j])?;
                            conj.push(not1(tm, same)?);
                        }
                    }
                    tm.mk_and(conj)?
                }
            }
            TermKind::BvUlt(a, b) => {
                let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
                ult_bits(tm, &ab, &bb)?
            }
            TermKind::BvUle(a, b) => {
                // a <= b  <=>  not (b < a)
                let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
                let gt = ult_bits(tm, &bb, &ab)?;
                not1(tm, gt)?
            }
            TermKind::BvSlt(a, b) => {
                let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
                let (ab, bb) = (flip_msb(tm, &ab)?, flip_msb(tm, &bb)?);
                ult_bits(tm, &ab, &bb)?
            }
            TermKind::BvSle(a, b) => {
                let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
                let (ab, bb) = (flip_msb(tm, &ab)?, flip_msb(tm, &bb)?);
                let gt = ult_bits(tm, &bb, &ab)?;
                not1(tm, gt)?
            }
            TermKind::IntConst(_)
            | TermKind::Add(_)
            | TermKind::Sub(..)
            | TermKind::Neg(_)
            | TermKind::Mul(_)
            | TermKind::Le(..)
            | TermKind::Lt(..)
            | TermKind::Ge(..)
            | TermKind::Gt(..) => return Err(integer_content()),
            TermKind::BvConst { .. }
            | TermKind::BvNot(_)
            | TermKind::BvAnd(..)
            | TermKind::BvOr(..)
            | TermKind::BvXor(..)
            | TermKind::BvAdd(..)
            | TermKind::BvSub(..)
            | TermKind::BvMul(..)
            | TermKind::BvNeg(_) => {
                return Err(TactixError::sort_mismatch(
                    "bit-blast",
                    "bit-vector term in boolean position".to_string(),
                ));
            }
        };
        self.bools.insert(t, out);
        Ok(out)
    }

    /// Lowers a bit-vector-sorted term to its bits.
    fn blast_bits(&mut self, tm: &mut TermManager, t: TermId) -> Result<Bits> {
        if let Some(done) = self.bits.get(&t) {
            return Ok(done.clone());
        }
        let kind = tm.kind(t).clone();
        let out: Bits = match kind {
            TermKind::BvConst { value, width } => (0..width)
                .map(|i| {
                    if (value >> i) & 1 == 1 {
                        tm.true_id()
                    } else {
                        tm.false_id()
                    }
                })
                .collect(),
            TermKind::Var(_) => {
                let width = bv_width(tm, t)?;
                let name = tm
                    .name_of(t)
                    .map(str::to_owned)
                    .unwrap_or_default();
                let bits: Bits = (0..width)
                    .map(|i| tm.mk_bool_var(&format!("{name}!{i}")))
                    .collect();
                self.groups.push(BitGroup {
                    var: t,
                    bits: bits.to_vec(),
                    width,
                });
                bits
            }
            TermKind::BvNot(x) => {
                let xb = self.blast_bits(tm, x)?;
                let mut out = Bits::new();
                for &b in &xb {
                    out.push(not1(tm, b)?);
                }
                out
            }
            TermKind::BvAnd(a, b) => self.zip_bits(tm, a, b, and2)?,
            TermKind::BvOr(a, b) => self.zip_bits(tm, a, b, or2)?,
            TermKind::BvXor(a, b) => self.zip_bits(tm, a, b, xor2)?,
            TermKind::BvAdd(a, b) => {
                let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
                let zero = tm.mk_false();
                add_bits(tm, &ab, &bb, zero)?
            }
            TermKind::BvSub(a, b) => {
                // a - b = a + not(b) + 1
                let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
                let mut nb = Bits::new();
                for &bit in &bb {
                    nb.push(not1(tm, bit)?);
                }
                let one = tm.mk_true();
                add_bits(tm, &ab, &nb, one)?
            }
            TermKind::BvNeg(x) => {
                let xb = self.blast_bits(tm, x)?;
                let mut nx = Bits::new();
                for &bit in &xb {
                    nx.push(not1(tm, bit)?);
                }
                let zeros: Bits = nx.iter().map(|_| tm.mk_false()).collect();
                let one = tm.mk_true();
                add_bits(tm, &nx, &zeros, one)?
            }
            TermKind::BvMul(a, b) => {
                let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
                let width = ab.len();
                let mut acc: Bits = (0..width).map(|_| tm.mk_false()).collect();
                for (i, &bi) in bb.iter().enumerate() {
                    let mut row = Bits::new();
                    for j in 0..width {
                        if j < i {
                            row.push(tm.mk_false());
                        } else {
                            row.push(and2(tm, ab[j - i], bi)?);
                        }
                    }
                    let zero = tm.mk_false();
                    acc = add_bits(tm, &acc, &row, zero)?;
                }
                acc
            }
            TermKind::Ite(c, th, el) => {
                let cond = self.blast_bool(tm, c)?;
                let (tb, eb) = (self.blast_bits(tm, th)?, self.blast_bits(tm, el)?);
                let mut out = Bits::new();
                for (&ti, &ei) in tb.iter().zip(eb.iter()) {
                    out.push(ite3(tm, cond, ti, ei)?);
                }
                out
            }
            _ => {
                return Err(TactixError::sort_mismatch(
                    "bit-blast",
                    format!("term {} is not bit-vector sorted", tm.display(t)),
                ));
            }
        };
        self.bits.insert(t, out.clone());
        Ok(out)
    }

    fn zip_bits(
        &mut self,
        tm: &mut TermManager,
        a: TermId,
        b: TermId,
        op: fn(&mut TermManager, TermId, TermId) -> Result<TermId>,
    ) -> Result<Bits> {
        let (ab, bb) = (self.blast_bits(tm, a)?, self.blast_bits(tm, b)?);
        let mut out = Bits::new();
        for (&ai, &bi) in ab.iter().zip(bb.iter()) {
            out.push(op(tm, ai, bi)?);
        }
        Ok(out)
    }

    fn bitwise_eq(&mut self, tm: &mut TermManager, a: &Bits, b: &Bits) -> Result<TermId> {
        let mut conj = Vec::with_capacity(a.len());
        for (&ai, &bi) in a.iter().zip(b.iter()) {
            conj.push(iff2(tm, ai, bi)?);
        }
        tm.mk_and(conj)
    }
}

fn bv_width(tm: &TermManager, t: TermId) -> Result<u32> {
    tm.bv_width_of(t).ok_or_else(|| {
        TactixError::sort_mismatch("bit-blast", format!("term {} has no width", tm.display(t)))
    })
}

fn integer_content() -> TactixError {
    TactixError::tactic("bit-blast", "goal contains integer arithmetic")
}
