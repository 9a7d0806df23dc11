//! Bottom-up term rewriting.
//!
//! The [`Rewriter`] walks a term once, children first, and applies local
//! rules at each node: constant folding, unit and absorbing elements,
//! complementary literals, if-then-else and equality specializations, and
//! the lowerings the rest of the pipeline relies on (`=>` to `or`, `>=`/`>`
//! to `<=`/`<` with swapped operands, `distinct` to pairwise disequations).
//! Results are cached per rewriter, so shared subterms are visited once.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::{TermId, TermKind, TermManager};
use crate::error::{Result, TactixError};
use crate::sort::{bv_mask, bv_signed};

/// Knobs honored by the rewriter.
///
/// `simplify` exposes these as tactic parameters, so `With` can flip them
/// for one application.
#[derive(Debug, Clone)]
pub struct RewriteConfig {
    /// Flatten nested `and`/`or`/`+`/`*` into their parent.
    pub flat: bool,
    /// Rewrite conjunctions to negated disjunctions.
    pub elim_and: bool,
    /// Ceiling on rewritten nodes per rewriter.
    pub max_steps: u64,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            flat: true,
            elim_and: false,
            max_steps: 1 << 20,
        }
    }
}

/// One-pass bottom-up simplifier with a shared result cache.
pub struct Rewriter<'a> {
    tm: &'a mut TermManager,
    config: RewriteConfig,
    cache: FxHashMap<TermId, TermId>,
    steps: u64,
}

impl<'a> Rewriter<'a> {
    /// Creates a rewriter with default configuration.
    pub fn new(tm: &'a mut TermManager) -> Self {
        Self::with_config(tm, RewriteConfig::default())
    }

    /// Creates a rewriter with the given configuration.
    pub fn with_config(tm: &'a mut TermManager, config: RewriteConfig) -> Self {
        Self {
            tm,
            config,
            cache: FxHashMap::default(),
            steps: 0,
        }
    }

    /// Simplifies `t`; repeated calls share the cache.
    pub fn simplify(&mut self, t: TermId) -> Result<TermId> {
        if let Some(&r) = self.cache.get(&t) {
            return Ok(r);
        }
        self.steps += 1;
        if self.steps > self.config.max_steps {
            return Err(TactixError::StepBudgetExceeded {
                limit: self.config.max_steps,
            });
        }

        let kind = self.tm.kind(t).clone();
        let result = match kind {
            TermKind::True
            | TermKind::False
            | TermKind::Var(_)
            | TermKind::IntConst(_)
            | TermKind::BvConst { .. } => t,

            TermKind::Not(a) => {
                let a = self.simplify(a)?;
                self.simp_not(a)?
            }
            TermKind::And(xs) => {
                let xs = self.simplify_all(xs)?;
                self.simp_and(xs)?
            }
            TermKind::Or(xs) => {
                let xs = self.simplify_all(xs)?;
                self.simp_or(xs)?
            }
            TermKind::Xor(a, b) => {
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                self.simp_xor(a, b)?
            }
            TermKind::Implies(a, b) => {
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                let na = self.simp_not(a)?;
                self.simp_or(vec![na, b])?
            }
            TermKind::Ite(c, th, el) => {
                let c = self.simplify(c)?;
                let th = self.simplify(th)?;
                let el = self.simplify(el)?;
                self.simp_ite(c, th, el)?
            }
            TermKind::Eq(a, b) => {
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                self.simp_eq(a, b)?
            }
            TermKind::Distinct(xs) => {
                let xs = self.simplify_all(xs)?;
                self.simp_distinct(xs)?
            }
            TermKind::Add(xs) => {
                let xs = self.simplify_all(xs)?;
                self.simp_add(xs)?
            }
            TermKind::Sub(a, b) => {
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                self.simp_sub(a, b)?
            }
            TermKind::Neg(a) => {
                let a = self.simplify(a)?;
                self.simp_neg(a)?
            }
            TermKind::Mul(xs) => {
                let xs = self.simplify_all(xs)?;
                self.simp_mul(xs)?
            }
            TermKind::Le(a, b) => {
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                self.simp_le(a, b)?
            }
            TermKind::Lt(a, b) => {
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                self.simp_lt(a, b)?
            }
            TermKind::Ge(a, b) => {
                // a >= b is b <= a
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                self.simp_le(b, a)?
            }
            TermKind::Gt(a, b) => {
                let a = self.simplify(a)?;
                let b = self.simplify(b)?;
                self.simp_lt(b, a)?
            }
            TermKind::BvNot(a) => {
                let a = self.simplify(a)?;
                self.simp_bv_not(a)?
            }
            TermKind::BvNeg(a) => {
                let a = self.simplify(a)?;
                self.simp_bv_neg(a)?
            }
            TermKind::BvAnd(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_and(a, b)?
            }
            TermKind::BvOr(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_or(a, b)?
            }
            TermKind::BvXor(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_xor(a, b)?
            }
            TermKind::BvAdd(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_add(a, b)?
            }
            TermKind::BvSub(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_sub(a, b)?
            }
            TermKind::BvMul(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_mul(a, b)?
            }
            TermKind::BvUlt(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_ult(a, b)?
            }
            TermKind::BvUle(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_ule(a, b)?
            }
            TermKind::BvSlt(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_slt(a, b)?
            }
            TermKind::BvSle(a, b) => {
                let (a, b) = self.simp_pair(a, b)?;
                self.simp_bv_sle(a, b)?
            }
        };
        self.cache.insert(t, result);
        Ok(result)
    }

    fn simplify_all(&mut self, args: Vec<TermId>) -> Result<Vec<TermId>> {
        args.into_iter().map(|a| self.simplify(a)).collect()
    }

    fn simp_pair(&mut self, a: TermId, b: TermId) -> Result<(TermId, TermId)> {
        Ok((self.simplify(a)?, self.simplify(b)?))
    }

    // ----- Boolean rules -----

    fn simp_not(&mut self, a: TermId) -> Result<TermId> {
        if self.tm.is_true(a) {
            return Ok(self.tm.mk_false());
        }
        if self.tm.is_false(a) {
            return Ok(self.tm.mk_true());
        }
        if let TermKind::Not(inner) = *self.tm.kind(a) {
            return Ok(inner);
        }
        self.tm.mk_not(a)
    }

    fn simp_and(&mut self, xs: Vec<TermId>) -> Result<TermId> {
        let mut flat = Vec::with_capacity(xs.len());
        for x in xs {
            if self.config.flat && let TermKind::And(inner) = self.tm.kind(x) {
                flat.extend(inner.iter().copied());
            } else {
                flat.push(x);
            }
        }

        let mut seen = FxHashSet::default();
        let mut out = Vec::with_capacity(flat.len());
        for x in flat {
            if self.tm.is_false(x) {
                return Ok(self.tm.mk_false());
            }
            if self.tm.is_true(x) || !seen.insert(x) {
                continue;
            }
            out.push(x);
        }
        for &x in &out {
            if let TermKind::Not(inner) = *self.tm.kind(x)
                && seen.contains(&inner)
            {
                return Ok(self.tm.mk_false());
            }
        }

        if self.config.elim_and && out.len() > 1 {
            let mut negated = Vec::with_capacity(out.len());
            for x in out {
                negated.push(self.simp_not(x)?);
            }
            let disj = self.simp_or(negated)?;
            return self.simp_not(disj);
        }
        self.tm.mk_and(out)
    }

    fn simp_or(&mut self, xs: Vec<TermId>) -> Result<TermId> {
        let mut flat = Vec::with_capacity(xs.len());
        for x in xs {
            if self.config.flat && let TermKind::Or(inner) = self.tm.kind(x) {
                flat.extend(inner.iter().copied());
            } else {
                flat.push(x);
            }
        }

        let mut seen = FxHashSet::default();
        let mut out = Vec::with_capacity(flat.len());
        for x in flat {
            if self.tm.is_true(x) {
                return Ok(self.tm.mk_true());
            }
            if self.tm.is_false(x) || !seen.insert(x) {
                continue;
            }
            out.push(x);
        }
        for &x in &out {
            if let TermKind::Not(inner) = *self.tm.kind(x)
                && seen.contains(&inner)
            {
                return Ok(self.tm.mk_true());
            }
        }
        self.tm.mk_or(out)
    }

    fn simp_xor(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_false());
        }
        if self.tm.is_false(a) {
            return Ok(b);
        }
        if self.tm.is_false(b) {
            return Ok(a);
        }
        if self.tm.is_true(a) {
            return self.simp_not(b);
        }
        if self.tm.is_true(b) {
            return self.simp_not(a);
        }
        self.tm.mk_xor(a, b)
    }

    fn simp_ite(&mut self, c: TermId, th: TermId, el: TermId) -> Result<TermId> {
        if self.tm.is_true(c) {
            return Ok(th);
        }
        if self.tm.is_false(c) {
            return Ok(el);
        }
        if th == el {
            return Ok(th);
        }
        if self.tm.sorts.is_bool(self.tm.sort_of(th)) {
            // (ite c true false) and friends collapse to plain connectives.
            if self.tm.is_true(th) && self.tm.is_false(el) {
                return Ok(c);
            }
            if self.tm.is_false(th) && self.tm.is_true(el) {
                return self.simp_not(c);
            }
            if self.tm.is_true(th) {
                return self.simp_or(vec![c, el]);
            }
            if self.tm.is_false(th) {
                let nc = self.simp_not(c)?;
                return self.simp_and(vec![nc, el]);
            }
            if self.tm.is_true(el) {
                let nc = self.simp_not(c)?;
                return self.simp_or(vec![nc, th]);
            }
            if self.tm.is_false(el) {
                return self.simp_and(vec![c, th]);
            }
        }
        self.tm.mk_ite(c, th, el)
    }

    fn simp_eq(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_true());
        }
        if self.tm.sorts.is_bool(self.tm.sort_of(a)) {
            if self.tm.is_true(a) {
                return Ok(b);
            }
            if self.tm.is_false(a) {
                return self.simp_not(b);
            }
            if self.tm.is_true(b) {
                return Ok(a);
            }
            if self.tm.is_false(b) {
                return self.simp_not(a);
            }
        }
        if let (Some(x), Some(y)) = (self.int_const(a), self.int_const(b)) {
            return Ok(if x == y { self.tm.mk_true() } else { self.tm.mk_false() });
        }
        if let (Some((x, _)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return Ok(if x == y { self.tm.mk_true() } else { self.tm.mk_false() });
        }
        // Symmetric operator: order operands so consing catches both spellings.
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        self.tm.mk_eq(a, b)
    }

    fn simp_distinct(&mut self, xs: Vec<TermId>) -> Result<TermId> {
        if xs.len() < 2 {
            return Ok(self.tm.mk_true());
        }
        let mut seen = FxHashSet::default();
        for &x in &xs {
            if !seen.insert(x) {
                return Ok(self.tm.mk_false());
            }
        }
        // Three pairwise-distinct Booleans cannot exist.
        if self.tm.sorts.is_bool(self.tm.sort_of(xs[0])) && xs.len() > 2 {
            return Ok(self.tm.mk_false());
        }
        let mut pairs = Vec::new();
        for i in 0..xs.len() {
            for j in (i + 1)..xs.len() {
                let eq = self.simp_eq(xs[i], xs[j])?;
                pairs.push(self.simp_not(eq)?);
            }
        }
        self.simp_and(pairs)
    }

    // ----- integer rules -----

    fn int_const(&self, t: TermId) -> Option<BigInt> {
        match self.tm.kind(t) {
            TermKind::IntConst(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn simp_add(&mut self, xs: Vec<TermId>) -> Result<TermId> {
        let mut flat = Vec::with_capacity(xs.len());
        for x in xs {
            if self.config.flat && let TermKind::Add(inner) = self.tm.kind(x) {
                flat.extend(inner.iter().copied());
            } else {
                flat.push(x);
            }
        }
        let mut acc = BigInt::zero();
        let mut out = Vec::with_capacity(flat.len());
        for x in flat {
            match self.int_const(x) {
                Some(v) => acc += v,
                None => out.push(x),
            }
        }
        if out.is_empty() {
            return Ok(self.tm.mk_int(acc));
        }
        if !acc.is_zero() {
            out.push(self.tm.mk_int(acc));
        }
        self.tm.mk_add(out)
    }

    fn simp_sub(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if let (Some(x), Some(y)) = (self.int_const(a), self.int_const(b)) {
            return Ok(self.tm.mk_int(x - y));
        }
        if let Some(y) = self.int_const(b)
            && y.is_zero()
        {
            return Ok(a);
        }
        if a == b {
            return Ok(self.tm.mk_int(0));
        }
        self.tm.mk_sub(a, b)
    }

    fn simp_neg(&mut self, a: TermId) -> Result<TermId> {
        if let Some(v) = self.int_const(a) {
            return Ok(self.tm.mk_int(-v));
        }
        if let TermKind::Neg(inner) = *self.tm.kind(a) {
            return Ok(inner);
        }
        self.tm.mk_neg(a)
    }

    fn simp_mul(&mut self, xs: Vec<TermId>) -> Result<TermId> {
        let mut flat = Vec::with_capacity(xs.len());
        for x in xs {
            if self.config.flat && let TermKind::Mul(inner) = self.tm.kind(x) {
                flat.extend(inner.iter().copied());
            } else {
                flat.push(x);
            }
        }
        let mut acc = BigInt::one();
        let mut out = Vec::new();
        for x in flat {
            match self.int_const(x) {
                Some(v) => acc *= v,
                None => out.push(x),
            }
        }
        if acc.is_zero() {
            return Ok(self.tm.mk_int(0));
        }
        if out.is_empty() {
            return Ok(self.tm.mk_int(acc));
        }
        if !acc.is_one() {
            out.insert(0, self.tm.mk_int(acc));
        }
        self.tm.mk_mul(out)
    }

    fn simp_le(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_true());
        }
        if let (Some(x), Some(y)) = (self.int_const(a), self.int_const(b)) {
            return Ok(if x <= y { self.tm.mk_true() } else { self.tm.mk_false() });
        }
        self.tm.mk_le(a, b)
    }

    fn simp_lt(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_false());
        }
        if let (Some(x), Some(y)) = (self.int_const(a), self.int_const(b)) {
            return Ok(if x < y { self.tm.mk_true() } else { self.tm.mk_false() });
        }
        self.tm.mk_lt(a, b)
    }

    // ----- bit-vector rules -----

    fn bv_const(&self, t: TermId) -> Option<(u64, u32)> {
        match *self.tm.kind(t) {
            TermKind::BvConst { value, width } => Some((value, width)),
            _ => None,
        }
    }

    fn simp_bv_not(&mut self, a: TermId) -> Result<TermId> {
        if let Some((v, w)) = self.bv_const(a) {
            return self.tm.mk_bv(!v, w);
        }
        if let TermKind::BvNot(inner) = *self.tm.kind(a) {
            return Ok(inner);
        }
        self.tm.mk_bv_not(a)
    }

    fn simp_bv_neg(&mut self, a: TermId) -> Result<TermId> {
        if let Some((v, w)) = self.bv_const(a) {
            return self.tm.mk_bv(v.wrapping_neg(), w);
        }
        if let TermKind::BvNeg(inner) = *self.tm.kind(a) {
            return Ok(inner);
        }
        self.tm.mk_bv_neg(a)
    }

    fn ordered(&self, a: TermId, b: TermId) -> (TermId, TermId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    fn simp_bv_and(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return self.tm.mk_bv(x & y, w);
        }
        if a == b {
            return Ok(a);
        }
        for (c, other) in [(a, b), (b, a)] {
            if let Some((v, w)) = self.bv_const(c) {
                if v == 0 {
                    return self.tm.mk_bv(0, w);
                }
                if v == bv_mask(w) {
                    return Ok(other);
                }
            }
        }
        let (a, b) = self.ordered(a, b);
        self.tm.mk_bv_and(a, b)
    }

    fn simp_bv_or(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return self.tm.mk_bv(x | y, w);
        }
        if a == b {
            return Ok(a);
        }
        for (c, other) in [(a, b), (b, a)] {
            if let Some((v, w)) = self.bv_const(c) {
                if v == 0 {
                    return Ok(other);
                }
                if v == bv_mask(w) {
                    return self.tm.mk_bv(bv_mask(w), w);
                }
            }
        }
        let (a, b) = self.ordered(a, b);
        self.tm.mk_bv_or(a, b)
    }

    fn simp_bv_xor(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return self.tm.mk_bv(x ^ y, w);
        }
        if a == b {
            let w = self.width_of(a)?;
            return self.tm.mk_bv(0, w);
        }
        for (c, other) in [(a, b), (b, a)] {
            if let Some((v, w)) = self.bv_const(c) {
                if v == 0 {
                    return Ok(other);
                }
                if v == bv_mask(w) {
                    return self.simp_bv_not(other);
                }
            }
        }
        let (a, b) = self.ordered(a, b);
        self.tm.mk_bv_xor(a, b)
    }

    fn width_of(&self, t: TermId) -> Result<u32> {
        self.tm
            .bv_width_of(t)
            .ok_or_else(|| TactixError::sort_mismatch("rewrite", "expected a bit-vector"))
    }

    fn simp_bv_add(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return self.tm.mk_bv(x.wrapping_add(y), w);
        }
        for (c, other) in [(a, b), (b, a)] {
            if let Some((0, _)) = self.bv_const(c) {
                return Ok(other);
            }
        }
        let (a, b) = self.ordered(a, b);
        self.tm.mk_bv_add(a, b)
    }

    fn simp_bv_sub(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return self.tm.mk_bv(x.wrapping_sub(y), w);
        }
        if let Some((0, _)) = self.bv_const(b) {
            return Ok(a);
        }
        if a == b {
            let w = self.width_of(a)?;
            return self.tm.mk_bv(0, w);
        }
        self.tm.mk_bv_sub(a, b)
    }

    fn simp_bv_mul(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return self.tm.mk_bv(x.wrapping_mul(y), w);
        }
        for (c, other) in [(a, b), (b, a)] {
            if let Some((v, w)) = self.bv_const(c) {
                if v == 0 {
                    return self.tm.mk_bv(0, w);
                }
                if v == 1 {
                    return Ok(other);
                }
            }
        }
        let (a, b) = self.ordered(a, b);
        self.tm.mk_bv_mul(a, b)
    }

    fn simp_bv_ult(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_false());
        }
        if let (Some((x, _)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return Ok(if x < y { self.tm.mk_true() } else { self.tm.mk_false() });
        }
        if let Some((0, _)) = self.bv_const(b) {
            return Ok(self.tm.mk_false());
        }
        self.tm.mk_bv_ult(a, b)
    }

    fn simp_bv_ule(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_true());
        }
        if let (Some((x, _)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return Ok(if x <= y { self.tm.mk_true() } else { self.tm.mk_false() });
        }
        if let Some((0, _)) = self.bv_const(a) {
            return Ok(self.tm.mk_true());
        }
        if let Some((v, w)) = self.bv_const(b)
            && v == bv_mask(w)
        {
            return Ok(self.tm.mk_true());
        }
        self.tm.mk_bv_ule(a, b)
    }

    fn simp_bv_slt(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_false());
        }
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return Ok(if bv_signed(x, w) < bv_signed(y, w) {
                self.tm.mk_true()
            } else {
                self.tm.mk_false()
            });
        }
        self.tm.mk_bv_slt(a, b)
    }

    fn simp_bv_sle(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if a == b {
            return Ok(self.tm.mk_true());
        }
        if let (Some((x, w)), Some((y, _))) = (self.bv_const(a), self.bv_const(b)) {
            return Ok(if bv_signed(x, w) <= bv_signed(y, w) {
                self.tm.mk_true()
            } else {
                self.tm.mk_false()
            });
        }
        self.tm.mk_bv_sle(a, b)
    }
}

/// Convenience wrapper simplifying a single term with the given knobs.
pub fn simplify_term(tm: &mut TermManager, t: TermId, config: &RewriteConfig) -> Result<TermId> {
    Rewriter::with_config(tm, config.clone()).simplify(t)
}
