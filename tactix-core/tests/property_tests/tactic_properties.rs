//! Property-based tests for tactic soundness.
//!
//! Subgoals are alternatives: a transformed goal must be satisfied by an
//! assignment exactly when some subgoal is, and eliminated variables must
//! come back through model conversion.

use proptest::prelude::*;
use tactix_core::ast::TermManager;
use tactix_core::tactic::{
    Goal, PropagateValuesTactic, SimplifyTactic, SolveEqsTactic, SplitClauseTactic, Tactic,
    TacticContext, TacticResult, ThenTactic,
};

use super::formula::{POOL, Shape, intern, model_for, pool_vars, shapes, truth};

fn goals() -> impl Strategy<Value = Vec<Shape>> {
    proptest::collection::vec(shapes(), 1..4)
}

fn build_goal(tm: &mut TermManager, shapes: &[Shape]) -> Goal {
    let vars = pool_vars(tm);
    let assertions = shapes.iter().map(|s| intern(tm, &vars, s)).collect();
    Goal::with_assertions(assertions)
}

/// `model` satisfies the result exactly when it satisfied the input.
///
/// Holds for tactics that neither introduce nor eliminate variables.
fn assert_pointwise_sound(
    tactic: &dyn Tactic,
    shapes: &[Shape],
    bits: &[bool],
) -> Result<(), proptest::test_runner::TestCaseError> {
    let mut tm = TermManager::new();
    let goal = build_goal(&mut tm, shapes);
    let vars = pool_vars(&mut tm);
    let model = model_for(&vars, bits);
    let before = model.satisfies(&goal.assertions, &tm);

    let mut cx = TacticContext::new(&mut tm);
    match tactic.apply(&goal, &mut cx).unwrap() {
        TacticResult::SubGoals(subs) => {
            let after = subs
                .iter()
                .any(|g| model.satisfies(&g.assertions, &tm));
            prop_assert_eq!(before, after, "goal {}", goal.display(&tm));
        }
        TacticResult::NotApplicable => {}
        other => prop_assert!(false, "unexpected result {:?}", other),
    }
    Ok(())
}

proptest! {
    #[test]
    fn simplify_preserves_models(
        shapes in goals(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        assert_pointwise_sound(&SimplifyTactic::new(), &shapes, &bits)?;
    }

    #[test]
    fn split_clause_preserves_models(
        shapes in goals(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        assert_pointwise_sound(&SplitClauseTactic::new(), &shapes, &bits)?;
    }

    #[test]
    fn propagate_values_preserves_models(
        shapes in goals(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        assert_pointwise_sound(&PropagateValuesTactic::new(), &shapes, &bits)?;
    }

    #[test]
    fn simplify_then_split_preserves_models(
        shapes in goals(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        let pipeline = ThenTactic::new(vec![
            Box::new(SimplifyTactic::new()),
            Box::new(SplitClauseTactic::new()),
        ]);
        assert_pointwise_sound(&pipeline, &shapes, &bits)?;
    }

    /// A model of a solve-eqs subgoal converts to a model of the original.
    #[test]
    fn solve_eqs_models_convert_back(
        shapes in goals(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        let mut tm = TermManager::new();
        let goal = build_goal(&mut tm, &shapes);
        let vars = pool_vars(&mut tm);

        let mut cx = TacticContext::new(&mut tm);
        let result = SolveEqsTactic::new().apply(&goal, &mut cx).unwrap();
        let TacticResult::SubGoals(subs) = result else {
            return Ok(());
        };
        let sub = &subs[0];

        let model = model_for(&vars, &bits);
        prop_assume!(model.satisfies(&sub.assertions, &tm));

        let converted = sub.convert_model(model, &tm);
        prop_assert!(
            converted.satisfies(&goal.assertions, &tm),
            "goal {} with converted model {}",
            goal.display(&tm),
            converted.display(&tm),
        );
    }

    /// Simplification of a goal keeps overall truth pointwise even with
    /// and-elimination enabled through parameters.
    #[test]
    fn simplify_with_elim_and_preserves_models(
        shapes in goals(),
        bits in proptest::collection::vec(any::<bool>(), POOL.len()),
    ) {
        use tactix_core::params::Params;

        let mut tm = TermManager::new();
        let goal = build_goal(&mut tm, &shapes);
        let vars = pool_vars(&mut tm);
        let model = model_for(&vars, &bits);
        let before = model.satisfies(&goal.assertions, &tm);

        let mut cx =
            TacticContext::new(&mut tm).with_params(Params::new().bool("elim-and", true));
        match SimplifyTactic::new().apply(&goal, &mut cx).unwrap() {
            TacticResult::SubGoals(subs) => {
                let after = model.satisfies(&subs[0].assertions, &tm);
                prop_assert_eq!(before, after);
            }
            other => prop_assert!(false, "unexpected result {:?}", other),
        }
    }
}
