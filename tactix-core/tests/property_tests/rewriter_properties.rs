//! Property-based tests for the rewriter.
//!
//! The central property: simplification never changes the truth value of a
//! formula under any assignment.

use proptest::prelude::*;
use tactix_core::ast::TermManager;
use tactix_core::rewrite::{RewriteConfig, simplify_term};

use super::formula::{POOL, intern, model_for, pool_vars, shapes, truth};

proptest! {
    /// Simplification preserves truth under every assignment.
    #[test]
    fn simplify_is_sound(
        shape in shapes(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        let mut tm = TermManager::new();
        let vars = pool_vars(&mut tm);
        let original = intern(&mut tm, &vars, &shape);
        let simplified = simplify_term(&mut tm, original, &RewriteConfig::default()).unwrap();

        let model = model_for(&vars, &bits);
        prop_assert_eq!(
            truth(&model, &tm, original),
            truth(&model, &tm, simplified),
            "formula {} simplified to {}",
            tm.display(original),
            tm.display(simplified),
        );
    }

    /// Simplifying a second time changes nothing.
    #[test]
    fn simplify_is_idempotent(shape in shapes()) {
        let mut tm = TermManager::new();
        let vars = pool_vars(&mut tm);
        let original = intern(&mut tm, &vars, &shape);
        let once = simplify_term(&mut tm, original, &RewriteConfig::default()).unwrap();
        let twice = simplify_term(&mut tm, once, &RewriteConfig::default()).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// The and-elimination form is still sound.
    #[test]
    fn elim_and_is_sound(
        shape in shapes(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        let mut tm = TermManager::new();
        let vars = pool_vars(&mut tm);
        let original = intern(&mut tm, &vars, &shape);
        let config = RewriteConfig { elim_and: true, ..RewriteConfig::default() };
        let rewritten = simplify_term(&mut tm, original, &config).unwrap();

        let model = model_for(&vars, &bits);
        prop_assert_eq!(
            truth(&model, &tm, original),
            truth(&model, &tm, rewritten),
        );
    }

    /// Constant bit-vector addition folds to wrapping arithmetic.
    #[test]
    fn bv_addition_folds_to_wrapping(a in any::<u64>(), b in any::<u64>(), width in 1u32..=64) {
        let mut tm = TermManager::new();
        let ca = tm.mk_bv(a, width).unwrap();
        let cb = tm.mk_bv(b, width).unwrap();
        let sum = tm.mk_bv_add(ca, cb).unwrap();
        let folded = simplify_term(&mut tm, sum, &RewriteConfig::default()).unwrap();
        let expected = tm.mk_bv(a.wrapping_add(b), width).unwrap();
        prop_assert_eq!(folded, expected);
    }

    /// Constant unsigned comparison folds to its truth value.
    #[test]
    fn bv_comparison_folds(a in any::<u64>(), b in any::<u64>(), width in 1u32..=64) {
        let mut tm = TermManager::new();
        let ca = tm.mk_bv(a, width).unwrap();
        let cb = tm.mk_bv(b, width).unwrap();
        let lt = tm.mk_bv_ult(ca, cb).unwrap();
        let folded = simplify_term(&mut tm, lt, &RewriteConfig::default()).unwrap();

        let mask = tactix_core::sort::bv_mask(width);
        let expected = if (a & mask) < (b & mask) { tm.true_id() } else { tm.false_id() };
        prop_assert_eq!(folded, expected);
    }
}
