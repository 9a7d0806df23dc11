//! CNF Conversion.
//!
//! Tseitin-transforms a propositional goal into clauses. Negation is a
//! literal polarity, not a gate, so `(not p)` costs nothing. Top-level
//! conjunctions contribute their conjuncts directly and a top-level
//! disjunction becomes a single clause, which keeps encodings of
//! pairwise constraints free of auxiliary variables.
//!
//! ## References
//!
//! - Z3's `sat/tactic/goal2sat.cpp`
//! - Tseitin: "On the Complexity of Derivation in Propositional Calculus" (1968)

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tactix_core::ast::{TermId, TermKind, TermManager};
use tactix_core::error::{Result, TactixError};

use crate::lit::{Lit, Var};

/// A disjunction of literals.
pub type Clause = SmallVec<[Lit; 4]>;

/// A formula in conjunctive normal form, with the mapping from problem
/// variables back to the terms they encode.
#[derive(Debug, Default)]
pub struct Cnf {
    /// The clause database.
    pub clauses: Vec<Clause>,
    /// Number of variables, problem and auxiliary together.
    pub num_vars: u32,
    inputs: Vec<(TermId, Var)>,
}

impl Cnf {
    /// Problem variables in introduction order: `(term, sat variable)`.
    #[must_use]
    pub fn inputs(&self) -> &[(TermId, Var)] {
        &self.inputs
    }
}

/// Encodes `assertions` into CNF.
pub fn encode(tm: &TermManager, assertions: &[TermId]) -> Result<Cnf> {
    let mut encoder = Encoder {
        tm,
        cnf: Cnf::default(),
        cache: FxHashMap::default(),
        true_lit: None,
    };
    for &a in assertions {
        encoder.assert_top(a)?;
    }
    Ok(encoder.cnf)
}

struct Encoder<'a> {
    tm: &'a TermManager,
    cnf: Cnf,
    cache: FxHashMap<TermId, Lit>,
    true_lit: Option<Lit>,
}

impl Encoder<'_> {
    fn new_var(&mut self) -> Var {
        let v = self.cnf.num_vars;
        self.cnf.num_vars += 1;
        v
    }

    /// Adds a clause, dropping tautologies and duplicate literals.
    fn add_clause(&mut self, mut clause: Clause) {
        clause.sort_unstable();
        clause.dedup();
        // after sorting, a literal and its negation are adjacent
        if clause.windows(2).any(|w| w[0] == w[1].negate()) {
            return;
        }
        self.cnf.clauses.push(clause);
    }

    /// A literal fixed to true, allocated on first use.
    fn constant_true(&mut self) -> Lit {
        if let Some(l) = self.true_lit {
            return l;
        }
        let l = Lit::positive(self.new_var());
        self.add_clause(Clause::from_slice(&[l]));
        self.true_lit = Some(l);
        l
    }

    /// Asserts `t` at the top level, exploiting clause structure.
    fn assert_top(&mut self, t: TermId) -> Result<()> {
        match self.tm.kind(t) {
            TermKind::True => Ok(()),
            TermKind::False => {
                self.cnf.clauses.push(Clause::new());
                Ok(())
            }
            TermKind::And(xs) => {
                for &x in xs {
                    self.assert_top(x)?;
                }
                Ok(())
            }
            TermKind::Or(xs) => {
                let mut clause = Clause::new();
                for &x in xs {
                    clause.push(self.lit_for(x)?);
                }
                self.add_clause(clause);
                Ok(())
            }
            _ => {
                let l = self.lit_for(t)?;
                self.add_clause(Clause::from_slice(&[l]));
                Ok(())
            }
        }
    }

    /// The literal carrying the truth of `t`, introducing a gate variable
    /// for compound terms.
    fn lit_for(&mut self, t: TermId) -> Result<Lit> {
        if let Some(&l) = self.cache.get(&t) {
            return Ok(l);
        }
        let l = match self.tm.kind(t) {
            TermKind::True => self.constant_true(),
            TermKind::False => self.constant_true().negate(),
            TermKind::Var(_) => {
                let v = self.new_var();
                self.cnf.inputs.push((t, v));
                Lit::positive(v)
            }
            TermKind::Not(x) => {
                let inner = self.lit_for(*x)?;
                // not cached under t: the inner entry covers both phases
                return Ok(inner.negate());
            }
            TermKind::And(xs) => {
                let mut lits = Vec::with_capacity(xs.len());
                for &x in xs {
                    lits.push(self.lit_for(x)?);
                }
                self.and_gate(&lits)
            }
            TermKind::Or(xs) => {
                let mut lits = Vec::with_capacity(xs.len());
                for &x in xs {
                    lits.push(self.lit_for(x)?);
                }
                self.or_gate(&lits)
            }
            TermKind::Implies(a, b) => {
                let (a, b) = (self.lit_for(*a)?, self.lit_for(*b)?);
                self.or_gate(&[a.negate(), b])
            }
            TermKind::Xor(a, b) => {
                let (a, b) = (self.lit_for(*a)?, self.lit_for(*b)?);
                self.xor_gate(a, b)
            }
            TermKind::Eq(a, b) => {
                if !self.tm.sorts.is_bool(self.tm.sort_of(*a)) {
                    return Err(not_propositional(self.tm, t));
                }
                let (a, b) = (self.lit_for(*a)?, self.lit_for(*b)?);
                self.xor_gate(a, b).negate()
            }
            TermKind::Distinct(xs) => {
                if xs.iter().any(|&x| !self.tm.sorts.is_bool(self.tm.sort_of(x))) {
                    return Err(not_propositional(self.tm, t));
                }
                if let [a, b] = xs[..] {
                    let (a, b) = (self.lit_for(a)?, self.lit_for(b)?);
                    self.xor_gate(a, b)
                } else {
                    // three or more booleans cannot be pairwise distinct
                    self.constant_true().negate()
                }
            }
            TermKind::Ite(c, th, el) => {
                if !self.tm.sorts.is_bool(self.tm.sort_of(*th)) {
                    return Err(not_propositional(self.tm, t));
                }
                let (c, th, el) = (self.lit_for(*c)?, self.lit_for(*th)?, self.lit_for(*el)?);
                self.ite_gate(c, th, el)
            }
            _ => return Err(not_propositional(self.tm, t)),
        };
        self.cache.insert(t, l);
        Ok(l)
    }

    /// `v <=> (l1 and ... and ln)`.
    fn and_gate(&mut self, lits: &[Lit]) -> Lit {
        let v = Lit::positive(self.new_var());
        let mut long = Clause::from_slice(&[v]);
        for &l in lits {
            self.add_clause(Clause::from_slice(&[v.negate(), l]));
            long.push(l.negate());
        }
        self.add_clause(long);
        v
    }

    /// `v <=> (l1 or ... or ln)`.
    fn or_gate(&mut self, lits: &[Lit]) -> Lit {
        let v = Lit::positive(self.new_var());
        let mut long = Clause::from_slice(&[v.negate()]);
        for &l in lits {
            self.add_clause(Clause::from_slice(&[v, l.negate()]));
            long.push(l);
        }
        self.add_clause(long);
        v
    }

    /// `v <=> (a xor b)`.
    fn xor_gate(&mut self, a: Lit, b: Lit) -> Lit {
        let v = Lit::positive(self.new_var());
        self.add_clause(Clause::from_slice(&[v.negate(), a, b]));
        self.add_clause(Clause::from_slice(&[v.negate(), a.negate(), b.negate()]));
        self.add_clause(Clause::from_slice(&[v, a.negate(), b]));
        self.add_clause(Clause::from_slice(&[v, a, b.negate()]));
        v
    }

    /// `v <=> (if c then t else e)`.
    fn ite_gate(&mut self, c: Lit, t: Lit, e: Lit) -> Lit {
        let v = Lit::positive(self.new_var());
        self.add_clause(Clause::from_slice(&[v.negate(), c.negate(), t]));
        self.add_clause(Clause::from_slice(&[v.negate(), c, e]));
        self.add_clause(Clause::from_slice(&[v, c.negate(), t.negate()]));
        self.add_clause(Clause::from_slice(&[v, c, e.negate()]));
        v
    }
}

fn not_propositional(tm: &TermManager, t: TermId) -> TactixError {
    TactixError::tactic(
        "sat",
        format!("assertion is not propositional: {}", tm.display(t)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactix_core::ast::TermManager;

    #[test]
    fn variables_become_unit_clauses() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let cnf = encode(&tm, &[p]).unwrap();
        assert_eq!(cnf.num_vars, 1);
        assert_eq!(cnf.clauses.len(), 1);
        assert_eq!(cnf.clauses[0].len(), 1);
        assert_eq!(cnf.inputs().len(), 1);
    }

    #[test]
    fn top_level_clauses_stay_flat() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let nq = tm.mk_not(q).unwrap();
        let clause = tm.mk_or(vec![p, nq]).unwrap();
        let cnf = encode(&tm, &[clause]).unwrap();
        // one binary clause, no auxiliary variables
        assert_eq!(cnf.num_vars, 2);
        assert_eq!(cnf.clauses.len(), 1);
        assert_eq!(cnf.clauses[0].len(), 2);
    }

    #[test]
    fn top_level_conjunctions_flatten() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let conj = tm.mk_and(vec![p, q]).unwrap();
        let cnf = encode(&tm, &[conj]).unwrap();
        assert_eq!(cnf.clauses.len(), 2);
        assert!(cnf.clauses.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn nested_structure_introduces_gates() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let r = tm.mk_bool_var("r");
        let conj = tm.mk_and(vec![p, q]).unwrap();
        let clause = tm.mk_or(vec![conj, r]).unwrap();
        let cnf = encode(&tm, &[clause]).unwrap();
        // p, q, r plus one gate for the conjunction
        assert_eq!(cnf.num_vars, 4);
        // two implications, one reverse clause, one top-level clause
        assert_eq!(cnf.clauses.len(), 4);
    }

    #[test]
    fn tautologies_are_dropped() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let np = tm.mk_not(p).unwrap();
        let clause = tm.mk_or(vec![p, np]).unwrap();
        let cnf = encode(&tm, &[clause]).unwrap();
        assert!(cnf.clauses.is_empty());
    }

    #[test]
    fn false_yields_the_empty_clause() {
        let mut tm = TermManager::new();
        let f = tm.mk_false();
        let cnf = encode(&tm, &[f]).unwrap();
        assert_eq!(cnf.clauses.len(), 1);
        assert!(cnf.clauses[0].is_empty());
    }

    #[test]
    fn shared_subterms_share_gates() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let conj = tm.mk_and(vec![p, q]).unwrap();
        let r = tm.mk_bool_var("r");
        let s = tm.mk_bool_var("s");
        let c1 = tm.mk_or(vec![conj, r]).unwrap();
        let c2 = tm.mk_or(vec![conj, s]).unwrap();
        let cnf = encode(&tm, &[c1, c2]).unwrap();
        // the conjunction gate is encoded once
        assert_eq!(cnf.num_vars, 5);
    }

    #[test]
    fn non_propositional_content_is_rejected() {
        let mut tm = TermManager::new();
        let x = tm.mk_int_var("x");
        let zero = tm.mk_int(0);
        let lt = tm.mk_lt(zero, x).unwrap();
        assert!(encode(&tm, &[lt]).is_err());
    }

    #[test]
    fn boolean_equality_is_an_iff_gate() {
        let mut tm = TermManager::new();
        let p = tm.mk_bool_var("p");
        let q = tm.mk_bool_var("q");
        let iff = tm.mk_eq(p, q).unwrap();
        let cnf = encode(&tm, &[iff]).unwrap();
        // four xor-gate clauses plus the unit asserting the negated gate
        assert_eq!(cnf.clauses.len(), 5);
    }
}
