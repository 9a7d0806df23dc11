//! Property-based tests for term construction and traversal.

use proptest::prelude::*;
use tactix_core::ast::{TermKind, TermManager};
use tactix_core::sort::bv_mask;

use super::formula::{intern, pool_vars, shapes};

#[test]
fn boolean_units_are_interned_once() {
    let tm = TermManager::new();
    assert_eq!(tm.true_id(), tm.true_id());
    assert!(tm.is_true(tm.true_id()));
    assert!(tm.is_false(tm.false_id()));
}

proptest! {
    /// Interning the same shape twice yields the same id.
    #[test]
    fn hash_consing_is_deterministic(shape in shapes()) {
        let mut tm = TermManager::new();
        let vars = pool_vars(&mut tm);
        let first = intern(&mut tm, &vars, &shape);
        let second = intern(&mut tm, &vars, &shape);
        prop_assert_eq!(first, second);
    }

    /// Every variable a formula mentions is reported by collect_vars.
    #[test]
    fn collected_vars_are_subterms(shape in shapes()) {
        let mut tm = TermManager::new();
        let vars = pool_vars(&mut tm);
        let t = intern(&mut tm, &vars, &shape);
        let collected = tm.collect_vars(&[t]);
        let reachable = tm.subterms(&[t]);
        for v in &collected {
            prop_assert!(reachable.contains(v));
            prop_assert!(matches!(tm.kind(*v), TermKind::Var(_)));
        }
    }

    /// Depth grows by exactly one under negation.
    #[test]
    fn depth_counts_negation(shape in shapes()) {
        let mut tm = TermManager::new();
        let vars = pool_vars(&mut tm);
        let t = intern(&mut tm, &vars, &shape);
        let nt = tm.mk_not(t).unwrap();
        prop_assert_eq!(tm.depth(nt), tm.depth(t) + 1);
    }

    /// An empty substitution changes nothing.
    #[test]
    fn empty_substitution_is_identity(shape in shapes()) {
        let mut tm = TermManager::new();
        let vars = pool_vars(&mut tm);
        let t = intern(&mut tm, &vars, &shape);
        let map = rustc_hash::FxHashMap::default();
        prop_assert_eq!(tm.substitute(t, &map).unwrap(), t);
    }

    /// Bit-vector constants are stored masked to their width.
    #[test]
    fn bv_constants_are_masked(value in any::<u64>(), width in 1u32..=64) {
        let mut tm = TermManager::new();
        let c = tm.mk_bv(value, width).unwrap();
        match *tm.kind(c) {
            TermKind::BvConst { value: stored, width: w } => {
                prop_assert_eq!(w, width);
                prop_assert_eq!(stored, value & bv_mask(width));
            }
            ref other => prop_assert!(false, "unexpected kind {:?}", other),
        }
    }

    /// Zero and oversized widths are rejected.
    #[test]
    fn invalid_widths_are_rejected(width in 65u32..200) {
        let mut tm = TermManager::new();
        prop_assert!(tm.mk_bv_var("x", width).is_err());
        prop_assert!(tm.mk_bv(1, 0).is_err());
    }
}
