//! Hash-consed terms and the term manager.
//!
//! Every term is interned: structurally identical terms share a single
//! [`TermId`], so equality is an integer compare and side tables can be
//! indexed by id. Constructors sort-check their operands and return
//! [`TactixError::SortMismatch`] instead of building ill-sorted terms.

use lasso::{Rodeo, Spur};
use num_bigint::BigInt;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;

use crate::error::{Result, TactixError};
use crate::sort::{SortId, SortStore, bv_mask};

/// Index of an interned term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    /// Raw index, usable for side tables.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The shape of a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Boolean constant `true`.
    True,
    /// Boolean constant `false`.
    False,
    /// Uninterpreted constant of any sort; the payload names it.
    Var(Spur),
    /// Boolean negation.
    Not(TermId),
    /// N-ary conjunction.
    And(Vec<TermId>),
    /// N-ary disjunction.
    Or(Vec<TermId>),
    /// Exclusive or.
    Xor(TermId, TermId),
    /// Implication.
    Implies(TermId, TermId),
    /// If-then-else; branches share a sort.
    Ite(TermId, TermId, TermId),
    /// Equality over a shared sort.
    Eq(TermId, TermId),
    /// Pairwise disequality over a shared sort.
    Distinct(Vec<TermId>),
    /// Integer literal.
    IntConst(BigInt),
    /// N-ary integer sum.
    Add(Vec<TermId>),
    /// Integer difference.
    Sub(TermId, TermId),
    /// Integer negation.
    Neg(TermId),
    /// N-ary integer product.
    Mul(Vec<TermId>),
    /// Integer `<=`.
    Le(TermId, TermId),
    /// Integer `<`.
    Lt(TermId, TermId),
    /// Integer `>=`.
    Ge(TermId, TermId),
    /// Integer `>`.
    Gt(TermId, TermId),
    /// Bit-vector literal; `value` is masked to `width` bits.
    BvConst {
        /// The constant, stored in the low `width` bits.
        value: u64,
        /// Width in bits, `1..=64`.
        width: u32,
    },
    /// Bitwise complement.
    BvNot(TermId),
    /// Bitwise and.
    BvAnd(TermId, TermId),
    /// Bitwise or.
    BvOr(TermId, TermId),
    /// Bitwise xor.
    BvXor(TermId, TermId),
    /// Wrapping addition.
    BvAdd(TermId, TermId),
    /// Wrapping subtraction.
    BvSub(TermId, TermId),
    /// Wrapping multiplication.
    BvMul(TermId, TermId),
    /// Two's-complement negation.
    BvNeg(TermId),
    /// Unsigned `<`.
    BvUlt(TermId, TermId),
    /// Unsigned `<=`.
    BvUle(TermId, TermId),
    /// Signed `<`.
    BvSlt(TermId, TermId),
    /// Signed `<=`.
    BvSle(TermId, TermId),
}

/// An interned term: its shape plus its sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// Shape.
    pub kind: TermKind,
    /// Sort of the whole term.
    pub sort: SortId,
}

/// Owner of all terms, sorts, and names.
///
/// Tactics thread a `&mut TermManager` through their application so rewrites
/// can intern new terms; read-only consumers such as probes take `&TermManager`.
#[derive(Debug)]
pub struct TermManager {
    /// Sort interner; `sorts.bool_sort` and `sorts.int_sort` are pre-made.
    pub sorts: SortStore,
    terms: Vec<Term>,
    table: FxHashMap<Term, TermId>,
    names: Rodeo,
    true_id: TermId,
    false_id: TermId,
    fresh_counter: u32,
}

impl TermManager {
    /// Creates a manager with `true` and `false` pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut tm = Self {
            sorts: SortStore::new(),
            terms: Vec::new(),
            table: FxHashMap::default(),
            names: Rodeo::default(),
            true_id: TermId(0),
            false_id: TermId(0),
            fresh_counter: 0,
        };
        let bool_sort = tm.sorts.bool_sort;
        tm.true_id = tm.intern(Term { kind: TermKind::True, sort: bool_sort });
        tm.false_id = tm.intern(Term { kind: TermKind::False, sort: bool_sort });
        tm
    }

    fn intern(&mut self, term: Term) -> TermId {
        if let Some(&id) = self.table.get(&term) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term.clone());
        self.table.insert(term, id);
        id
    }

    /// Number of interned terms.
    #[must_use]
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// The shape of `t`.
    #[must_use]
    pub fn kind(&self, t: TermId) -> &TermKind {
        &self.terms[t.index()].kind
    }

    /// The sort of `t`.
    #[must_use]
    pub fn sort_of(&self, t: TermId) -> SortId {
        self.terms[t.index()].sort
    }

    /// The bit-vector width of `t`, if it has a bit-vector sort.
    #[must_use]
    pub fn bv_width_of(&self, t: TermId) -> Option<u32> {
        self.sorts.bv_width(self.sort_of(t))
    }

    /// The interned `true` term.
    #[must_use]
    pub fn true_id(&self) -> TermId {
        self.true_id
    }

    /// The interned `false` term.
    #[must_use]
    pub fn false_id(&self) -> TermId {
        self.false_id
    }

    /// Whether `t` is the `true` term.
    #[must_use]
    pub fn is_true(&self, t: TermId) -> bool {
        t == self.true_id
    }

    /// Whether `t` is the `false` term.
    #[must_use]
    pub fn is_false(&self, t: TermId) -> bool {
        t == self.false_id
    }

    /// The name of `t` when it is an uninterpreted constant.
    #[must_use]
    pub fn name_of(&self, t: TermId) -> Option<&str> {
        match self.kind(t) {
            TermKind::Var(s) => Some(self.names.resolve(s)),
            _ => None,
        }
    }

    // ----- leaf constructors -----

    /// The `true` term.
    #[must_use]
    pub fn mk_true(&self) -> TermId {
        self.true_id
    }

    /// The `false` term.
    #[must_use]
    pub fn mk_false(&self) -> TermId {
        self.false_id
    }

    /// An uninterpreted constant of the given sort. The same (name, sort)
    /// pair always yields the same term.
    pub fn mk_var(&mut self, name: &str, sort: SortId) -> TermId {
        let spur = self.names.get_or_intern(name);
        self.intern(Term { kind: TermKind::Var(spur), sort })
    }

    /// A Boolean uninterpreted constant.
    pub fn mk_bool_var(&mut self, name: &str) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk_var(name, sort)
    }

    /// An integer uninterpreted constant.
    pub fn mk_int_var(&mut self, name: &str) -> TermId {
        let sort = self.sorts.int_sort;
        self.mk_var(name, sort)
    }

    /// A bit-vector uninterpreted constant of the given width.
    pub fn mk_bv_var(&mut self, name: &str, width: u32) -> Result<TermId> {
        let sort = self.sorts.bitvec(width)?;
        Ok(self.mk_var(name, sort))
    }

    /// A Boolean constant with a name no caller has used, derived from
    /// `prefix`. Used by tactics that introduce definitions.
    pub fn fresh_bool_var(&mut self, prefix: &str) -> TermId {
        loop {
            let name = format!("{prefix}!{}", self.fresh_counter);
            self.fresh_counter += 1;
            if self.names.get(&name).is_none() {
                return self.mk_bool_var(&name);
            }
        }
    }

    /// An integer literal.
    pub fn mk_int(&mut self, value: impl Into<BigInt>) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(Term { kind: TermKind::IntConst(value.into()), sort })
    }

    /// A bit-vector literal; `value` is masked to `width` bits.
    pub fn mk_bv(&mut self, value: u64, width: u32) -> Result<TermId> {
        let sort = self.sorts.bitvec(width)?;
        let masked = value & bv_mask(width);
        Ok(self.intern(Term { kind: TermKind::BvConst { value: masked, width }, sort }))
    }

    // ----- Boolean constructors -----

    fn expect_bool(&self, op: &'static str, t: TermId) -> Result<()> {
        if self.sorts.is_bool(self.sort_of(t)) {
            Ok(())
        } else {
            Err(TactixError::sort_mismatch(op, "expected a Boolean operand"))
        }
    }

    /// Boolean negation.
    pub fn mk_not(&mut self, a: TermId) -> Result<TermId> {
        self.expect_bool("not", a)?;
        let sort = self.sorts.bool_sort;
        Ok(self.intern(Term { kind: TermKind::Not(a), sort }))
    }

    /// N-ary conjunction. Empty input is `true`, a singleton is returned as is.
    pub fn mk_and(&mut self, args: Vec<TermId>) -> Result<TermId> {
        for &a in &args {
            self.expect_bool("and", a)?;
        }
        match args.len() {
            0 => Ok(self.true_id),
            1 => Ok(args[0]),
            _ => {
                let sort = self.sorts.bool_sort;
                Ok(self.intern(Term { kind: TermKind::And(args), sort }))
            }
        }
    }

    /// N-ary disjunction. Empty input is `false`, a singleton is returned as is.
    pub fn mk_or(&mut self, args: Vec<TermId>) -> Result<TermId> {
        for &a in &args {
            self.expect_bool("or", a)?;
        }
        match args.len() {
            0 => Ok(self.false_id),
            1 => Ok(args[0]),
            _ => {
                let sort = self.sorts.bool_sort;
                Ok(self.intern(Term { kind: TermKind::Or(args), sort }))
            }
        }
    }

    /// Exclusive or.
    pub fn mk_xor(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.expect_bool("xor", a)?;
        self.expect_bool("xor", b)?;
        let sort = self.sorts.bool_sort;
        Ok(self.intern(Term { kind: TermKind::Xor(a, b), sort }))
    }

    /// Implication `a -> b`.
    pub fn mk_implies(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.expect_bool("implies", a)?;
        self.expect_bool("implies", b)?;
        let sort = self.sorts.bool_sort;
        Ok(self.intern(Term { kind: TermKind::Implies(a, b), sort }))
    }

    /// If-then-else. The condition is Boolean and the branches share a sort,
    /// which becomes the sort of the whole term.
    pub fn mk_ite(&mut self, c: TermId, t: TermId, e: TermId) -> Result<TermId> {
        self.expect_bool("ite", c)?;
        let sort = self.sort_of(t);
        if sort != self.sort_of(e) {
            return Err(TactixError::sort_mismatch("ite", "branches have different sorts"));
        }
        Ok(self.intern(Term { kind: TermKind::Ite(c, t, e), sort }))
    }

    /// Equality. Operands must share a sort; the result is Boolean.
    pub fn mk_eq(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        if self.sort_of(a) != self.sort_of(b) {
            return Err(TactixError::sort_mismatch("=", "operands have different sorts"));
        }
        let sort = self.sorts.bool_sort;
        Ok(self.intern(Term { kind: TermKind::Eq(a, b), sort }))
    }

    /// Pairwise disequality. Fewer than two operands is vacuously `true`.
    pub fn mk_distinct(&mut self, args: Vec<TermId>) -> Result<TermId> {
        if let Some((&first, rest)) = args.split_first() {
            let sort = self.sort_of(first);
            for &a in rest {
                if self.sort_of(a) != sort {
                    return Err(TactixError::sort_mismatch(
                        "distinct",
                        "operands have different sorts",
                    ));
                }
            }
        }
        if args.len() < 2 {
            return Ok(self.true_id);
        }
        let sort = self.sorts.bool_sort;
        Ok(self.intern(Term { kind: TermKind::Distinct(args), sort }))
    }

    // ----- integer constructors -----

    fn expect_int(&self, op: &'static str, t: TermId) -> Result<()> {
        if self.sorts.is_int(self.sort_of(t)) {
            Ok(())
        } else {
            Err(TactixError::sort_mismatch(op, "expected an integer operand"))
        }
    }

    /// N-ary sum. Empty input is `0`, a singleton is returned as is.
    pub fn mk_add(&mut self, args: Vec<TermId>) -> Result<TermId> {
        for &a in &args {
            self.expect_int("+", a)?;
        }
        match args.len() {
            0 => Ok(self.mk_int(0)),
            1 => Ok(args[0]),
            _ => {
                let sort = self.sorts.int_sort;
                Ok(self.intern(Term { kind: TermKind::Add(args), sort }))
            }
        }
    }

    /// Difference `a - b`.
    pub fn mk_sub(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.expect_int("-", a)?;
        self.expect_int("-", b)?;
        let sort = self.sorts.int_sort;
        Ok(self.intern(Term { kind: TermKind::Sub(a, b), sort }))
    }

    /// Negation `-a`.
    pub fn mk_neg(&mut self, a: TermId) -> Result<TermId> {
        self.expect_int("-", a)?;
        let sort = self.sorts.int_sort;
        Ok(self.intern(Term { kind: TermKind::Neg(a), sort }))
    }

    /// N-ary product. Empty input is `1`, a singleton is returned as is.
    pub fn mk_mul(&mut self, args: Vec<TermId>) -> Result<TermId> {
        for &a in &args {
            self.expect_int("*", a)?;
        }
        match args.len() {
            0 => Ok(self.mk_int(1)),
            1 => Ok(args[0]),
            _ => {
                let sort = self.sorts.int_sort;
                Ok(self.intern(Term { kind: TermKind::Mul(args), sort }))
            }
        }
    }

    fn int_cmp(
        &mut self,
        op: &'static str,
        a: TermId,
        b: TermId,
        mk: impl FnOnce(TermId, TermId) -> TermKind,
    ) -> Result<TermId> {
        self.expect_int(op, a)?;
        self.expect_int(op, b)?;
        let sort = self.sorts.bool_sort;
        Ok(self.intern(Term { kind: mk(a, b), sort }))
    }

    /// Integer `a <= b`.
    pub fn mk_le(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.int_cmp("<=", a, b, TermKind::Le)
    }

    /// Integer `a < b`.
    pub fn mk_lt(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.int_cmp("<", a, b, TermKind::Lt)
    }

    /// Integer `a >= b`.
    pub fn mk_ge(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.int_cmp(">=", a, b, TermKind::Ge)
    }

    /// Integer `a > b`.
    pub fn mk_gt(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.int_cmp(">", a, b, TermKind::Gt)
    }

    // ----- bit-vector constructors -----

    fn expect_bv(&self, op: &'static str, t: TermId) -> Result<u32> {
        self.bv_width_of(t)
            .ok_or_else(|| TactixError::sort_mismatch(op, "expected a bit-vector operand"))
    }

    fn expect_same_width(&self, op: &'static str, a: TermId, b: TermId) -> Result<u32> {
        let wa = self.expect_bv(op, a)?;
        let wb = self.expect_bv(op, b)?;
        if wa != wb {
            return Err(TactixError::WidthMismatch { op, lhs: wa, rhs: wb });
        }
        Ok(wa)
    }

    /// Bitwise complement.
    pub fn mk_bv_not(&mut self, a: TermId) -> Result<TermId> {
        self.expect_bv("bvnot", a)?;
        let sort = self.sort_of(a);
        Ok(self.intern(Term { kind: TermKind::BvNot(a), sort }))
    }

    /// Two's-complement negation.
    pub fn mk_bv_neg(&mut self, a: TermId) -> Result<TermId> {
        self.expect_bv("bvneg", a)?;
        let sort = self.sort_of(a);
        Ok(self.intern(Term { kind: TermKind::BvNeg(a), sort }))
    }

    fn bv_bin(
        &mut self,
        op: &'static str,
        a: TermId,
        b: TermId,
        mk: impl FnOnce(TermId, TermId) -> TermKind,
    ) -> Result<TermId> {
        self.expect_same_width(op, a, b)?;
        let sort = self.sort_of(a);
        Ok(self.intern(Term { kind: mk(a, b), sort }))
    }

    fn bv_rel(
        &mut self,
        op: &'static str,
        a: TermId,
        b: TermId,
        mk: impl FnOnce(TermId, TermId) -> TermKind,
    ) -> Result<TermId> {
        self.expect_same_width(op, a, b)?;
        let sort = self.sorts.bool_sort;
        Ok(self.intern(Term { kind: mk(a, b), sort }))
    }

    /// Bitwise and.
    pub fn mk_bv_and(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_bin("bvand", a, b, TermKind::BvAnd)
    }

    /// Bitwise or.
    pub fn mk_bv_or(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_bin("bvor", a, b, TermKind::BvOr)
    }

    /// Bitwise xor.
    pub fn mk_bv_xor(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_bin("bvxor", a, b, TermKind::BvXor)
    }

    /// Wrapping addition.
    pub fn mk_bv_add(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_bin("bvadd", a, b, TermKind::BvAdd)
    }

    /// Wrapping subtraction.
    pub fn mk_bv_sub(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_bin("bvsub", a, b, TermKind::BvSub)
    }

    /// Wrapping multiplication.
    pub fn mk_bv_mul(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_bin("bvmul", a, b, TermKind::BvMul)
    }

    /// Unsigned `a < b`.
    pub fn mk_bv_ult(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_rel("bvult", a, b, TermKind::BvUlt)
    }

    /// Unsigned `a <= b`.
    pub fn mk_bv_ule(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_rel("bvule", a, b, TermKind::BvUle)
    }

    /// Signed `a < b`.
    pub fn mk_bv_slt(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_rel("bvslt", a, b, TermKind::BvSlt)
    }

    /// Signed `a <= b`.
    pub fn mk_bv_sle(&mut self, a: TermId, b: TermId) -> Result<TermId> {
        self.bv_rel("bvsle", a, b, TermKind::BvSle)
    }

    // ----- traversal -----

    /// Direct children of `t`.
    #[must_use]
    pub fn children_of(&self, t: TermId) -> SmallVec<[TermId; 4]> {
        use TermKind::*;
        match self.kind(t) {
            True | False | Var(_) | IntConst(_) | BvConst { .. } => SmallVec::new(),
            Not(a) | Neg(a) | BvNot(a) | BvNeg(a) => SmallVec::from_slice(&[*a]),
            And(xs) | Or(xs) | Distinct(xs) | Add(xs) | Mul(xs) => SmallVec::from_slice(xs),
            Xor(a, b) | Implies(a, b) | Eq(a, b) | Sub(a, b) | Le(a, b) | Lt(a, b)
            | Ge(a, b) | Gt(a, b) | BvAnd(a, b) | BvOr(a, b) | BvXor(a, b) | BvAdd(a, b)
            | BvSub(a, b) | BvMul(a, b) | BvUlt(a, b) | BvUle(a, b) | BvSlt(a, b)
            | BvSle(a, b) => SmallVec::from_slice(&[*a, *b]),
            Ite(c, t, e) => SmallVec::from_slice(&[*c, *t, *e]),
        }
    }

    /// All distinct subterms reachable from `roots`, including the roots.
    #[must_use]
    pub fn subterms(&self, roots: &[TermId]) -> FxHashSet<TermId> {
        let mut seen = FxHashSet::default();
        let mut stack: Vec<TermId> = roots.to_vec();
        while let Some(t) = stack.pop() {
            if seen.insert(t) {
                stack.extend(self.children_of(t));
            }
        }
        seen
    }

    /// All uninterpreted constants reachable from `roots`.
    #[must_use]
    pub fn collect_vars(&self, roots: &[TermId]) -> FxHashSet<TermId> {
        self.subterms(roots)
            .into_iter()
            .filter(|&t| matches!(self.kind(t), TermKind::Var(_)))
            .collect()
    }

    /// Whether `needle` occurs in `haystack` (including `haystack == needle`).
    #[must_use]
    pub fn occurs(&self, haystack: TermId, needle: TermId) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![haystack];
        while let Some(t) = stack.pop() {
            if t == needle {
                return true;
            }
            if seen.insert(t) {
                stack.extend(self.children_of(t));
            }
        }
        false
    }

    /// Depth of `t`: leaves have depth 1.
    #[must_use]
    pub fn depth(&self, t: TermId) -> u32 {
        let mut memo: FxHashMap<TermId, u32> = FxHashMap::default();
        self.depth_memo(t, &mut memo)
    }

    fn depth_memo(&self, t: TermId, memo: &mut FxHashMap<TermId, u32>) -> u32 {
        if let Some(&d) = memo.get(&t) {
            return d;
        }
        let d = 1 + self
            .children_of(t)
            .iter()
            .map(|&c| self.depth_memo(c, memo))
            .max()
            .unwrap_or(0);
        memo.insert(t, d);
        d
    }

    // ----- substitution -----

    /// Replaces every occurrence of a key of `map` by its value, bottom-up.
    ///
    /// Rebuilding goes through the checked constructors, so the result is
    /// interned and stays well-sorted.
    pub fn substitute(
        &mut self,
        t: TermId,
        map: &FxHashMap<TermId, TermId>,
    ) -> Result<TermId> {
        let mut cache = FxHashMap::default();
        self.subst_rec(t, map, &mut cache)
    }

    fn subst_rec(
        &mut self,
        t: TermId,
        map: &FxHashMap<TermId, TermId>,
        cache: &mut FxHashMap<TermId, TermId>,
    ) -> Result<TermId> {
        if let Some(&r) = map.get(&t) {
            return Ok(r);
        }
        if let Some(&r) = cache.get(&t) {
            return Ok(r);
        }
        let kind = self.kind(t).clone();
        let result = match kind {
            TermKind::True | TermKind::False | TermKind::Var(_) | TermKind::IntConst(_)
            | TermKind::BvConst { .. } => t,
            TermKind::Not(a) => {
                let a = self.subst_rec(a, map, cache)?;
                self.mk_not(a)?
            }
            TermKind::And(xs) => {
                let xs = self.subst_args(xs, map, cache)?;
                self.mk_and(xs)?
            }
            TermKind::Or(xs) => {
                let xs = self.subst_args(xs, map, cache)?;
                self.mk_or(xs)?
            }
            TermKind::Xor(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_xor(a, b)?
            }
            TermKind::Implies(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_implies(a, b)?
            }
            TermKind::Ite(c, th, el) => {
                let c = self.subst_rec(c, map, cache)?;
                let th = self.subst_rec(th, map, cache)?;
                let el = self.subst_rec(el, map, cache)?;
                self.mk_ite(c, th, el)?
            }
            TermKind::Eq(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_eq(a, b)?
            }
            TermKind::Distinct(xs) => {
                let xs = self.subst_args(xs, map, cache)?;
                self.mk_distinct(xs)?
            }
            TermKind::Add(xs) => {
                let xs = self.subst_args(xs, map, cache)?;
                self.mk_add(xs)?
            }
            TermKind::Sub(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_sub(a, b)?
            }
            TermKind::Neg(a) => {
                let a = self.subst_rec(a, map, cache)?;
                self.mk_neg(a)?
            }
            TermKind::Mul(xs) => {
                let xs = self.subst_args(xs, map, cache)?;
                self.mk_mul(xs)?
            }
            TermKind::Le(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_le(a, b)?
            }
            TermKind::Lt(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_lt(a, b)?
            }
            TermKind::Ge(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_ge(a, b)?
            }
            TermKind::Gt(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_gt(a, b)?
            }
            TermKind::BvNot(a) => {
                let a = self.subst_rec(a, map, cache)?;
                self.mk_bv_not(a)?
            }
            TermKind::BvNeg(a) => {
                let a = self.subst_rec(a, map, cache)?;
                self.mk_bv_neg(a)?
            }
            TermKind::BvAnd(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_and(a, b)?
            }
            TermKind::BvOr(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_or(a, b)?
            }
            TermKind::BvXor(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_xor(a, b)?
            }
            TermKind::BvAdd(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_add(a, b)?
            }
            TermKind::BvSub(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_sub(a, b)?
            }
            TermKind::BvMul(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_mul(a, b)?
            }
            TermKind::BvUlt(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_ult(a, b)?
            }
            TermKind::BvUle(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_ule(a, b)?
            }
            TermKind::BvSlt(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_slt(a, b)?
            }
            TermKind::BvSle(a, b) => {
                let a = self.subst_rec(a, map, cache)?;
                let b = self.subst_rec(b, map, cache)?;
                self.mk_bv_sle(a, b)?
            }
        };
        cache.insert(t, result);
        Ok(result)
    }

    fn subst_args(
        &mut self,
        args: Vec<TermId>,
        map: &FxHashMap<TermId, TermId>,
        cache: &mut FxHashMap<TermId, TermId>,
    ) -> Result<Vec<TermId>> {
        args.into_iter()
            .map(|a| self.subst_rec(a, map, cache))
            .collect()
    }

    /// Display adaptor rendering `t` as an s-expression.
    #[must_use]
    pub fn display(&self, t: TermId) -> TermDisplay<'_> {
        TermDisplay { tm: self, t }
    }
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a term as an s-expression, e.g. `(and x (not y))`.
pub struct TermDisplay<'a> {
    tm: &'a TermManager,
    t: TermId,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_term(self.tm, self.t, f)
    }
}

fn fmt_nary(
    tm: &TermManager,
    f: &mut fmt::Formatter<'_>,
    op: &str,
    args: &[TermId],
) -> fmt::Result {
    write!(f, "({op}")?;
    for &a in args {
        write!(f, " ")?;
        fmt_term(tm, a, f)?;
    }
    write!(f, ")")
}

fn fmt_term(tm: &TermManager, t: TermId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use TermKind::*;
    match tm.kind(t) {
        True => write!(f, "true"),
        False => write!(f, "false"),
        Var(_) => match tm.name_of(t) {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "?"),
        },
        IntConst(v) => write!(f, "{v}"),
        BvConst { value, width } => write!(f, "(_ bv{value} {width})"),
        Not(a) => fmt_nary(tm, f, "not", &[*a]),
        And(xs) => fmt_nary(tm, f, "and", xs),
        Or(xs) => fmt_nary(tm, f, "or", xs),
        Xor(a, b) => fmt_nary(tm, f, "xor", &[*a, *b]),
        Implies(a, b) => fmt_nary(tm, f, "=>", &[*a, *b]),
        Ite(c, t1, e) => fmt_nary(tm, f, "ite", &[*c, *t1, *e]),
        Eq(a, b) => fmt_nary(tm, f, "=", &[*a, *b]),
        Distinct(xs) => fmt_nary(tm, f, "distinct", xs),
        Add(xs) => fmt_nary(tm, f, "+", xs),
        Sub(a, b) => fmt_nary(tm, f, "-", &[*a, *b]),
        Neg(a) => fmt_nary(tm, f, "-", &[*a]),
        Mul(xs) => fmt_nary(tm, f, "*", xs),
        Le(a, b) => fmt_nary(tm, f, "<=", &[*a, *b]),
        Lt(a, b) => fmt_nary(tm, f, "<", &[*a, *b]),
        Ge(a, b) => fmt_nary(tm, f, ">=", &[*a, *b]),
        Gt(a, b) => fmt_nary(tm, f, ">", &[*a, *b]),
        BvNot(a) => fmt_nary(tm, f, "bvnot", &[*a]),
        BvNeg(a) => fmt_nary(tm, f, "bvneg", &[*a]),
        BvAnd(a, b) => fmt_nary(tm, f, "bvand", &[*a, *b]),
        BvOr(a, b) => fmt_nary(tm, f, "bvor", &[*a, *b]),
        BvXor(a, b) => fmt_nary(tm, f, "bvxor", &[*a, *b]),
        BvAdd(a, b) => fmt_nary(tm, f, "bvadd", &[*a, *b]),
        BvSub(a, b) => fmt_nary(tm, f, "bvsub", &[*a, *b]),
        BvMul(a, b) => fmt_nary(tm, f, "bvmul", &[*a, *b]),
        BvUlt(a, b) => fmt_nary(tm, f, "bvult", &[*a, *b]),
        BvUle(a, b) => fmt_nary(tm, f, "bvule", &[*a, *b]),
        BvSlt(a, b) => fmt_nary(tm, f, "bvslt", &[*a, *b]),
        BvSle(a, b) => fmt_nary(tm, f, "bvsle", &[*a, *b]),
    }
}
