//! # Goals and Core Tactics Example
//!
//! This example demonstrates the basic tactic workflow.
//! It covers:
//! - Creating goals from assertions
//! - Applying the simplify tactic
//! - Propagating constant bindings
//! - Eliminating variables with solve-eqs and reconstructing models
//! - Case-splitting on clauses
//!
//! ## Goals Overview
//! A goal is a list of assertions read conjunctively. Tactics transform a
//! goal into subgoals read disjunctively: the goal is satisfiable exactly
//! when one subgoal is.
//!
//! ## See Also
//! - [`Tactic`](tactix_core::tactic::Tactic) trait
//! - [`Goal`](tactix_core::tactic::Goal) for goal representation

use tactix_core::Result;
use tactix_core::ast::TermManager;
use tactix_core::model::{Model, Value};
use tactix_core::tactic::{
    Goal, PropagateValuesTactic, SimplifyTactic, SolveEqsTactic, SplitClauseTactic, Tactic,
    TacticContext, TacticResult, Verdict,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG=debug traces every tactic application
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Tactix Core: Goals and Core Tactics ===\n");

    let mut tm = TermManager::new();

    // ===== Example 1: Boolean Simplification =====
    println!("--- Example 1: Boolean Simplification ---");
    let p = tm.mk_bool_var("p");
    let q = tm.mk_bool_var("q");

    // Redundant assertions: (p or true) and (q and true)
    let true_term = tm.mk_true();
    let or_p_true = tm.mk_or(vec![p, true_term])?;
    let and_q_true = tm.mk_and(vec![q, true_term])?;

    let goal = Goal::with_assertions(vec![or_p_true, and_q_true]);
    println!("Original goal: {}", goal.display(&tm));

    let mut cx = TacticContext::new(&mut tm);
    let result = SimplifyTactic::new().apply(&goal, &mut cx)?;
    println!("After simplify:");
    print_result(cx.tm, &result);
    println!("  Expected: [q] (p or true holds vacuously)\n");

    // ===== Example 2: Value Propagation =====
    println!("--- Example 2: Value Propagation ---");
    let x = tm.mk_int_var("x");
    let y = tm.mk_int_var("y");

    // x = 5 and y = x + 10
    let five = tm.mk_int(5);
    let ten = tm.mk_int(10);
    let x_eq_5 = tm.mk_eq(x, five)?;
    let x_plus_10 = tm.mk_add(vec![x, ten])?;
    let y_eq = tm.mk_eq(y, x_plus_10)?;

    let goal2 = Goal::with_assertions(vec![x_eq_5, y_eq]);
    println!("Original goal: {}", goal2.display(&tm));

    let mut cx = TacticContext::new(&mut tm);
    let result = PropagateValuesTactic::new().apply(&goal2, &mut cx)?;
    println!("After propagate-values:");
    print_result(cx.tm, &result);
    println!("  Expected: [(= x 5), (= y 15)]\n");

    // ===== Example 3: Equation Solving with Model Reconstruction =====
    println!("--- Example 3: Equation Solving ---");
    let z = tm.mk_int_var("z");

    // x = y + 5, y = 1, z > x
    let one = tm.mk_int(1);
    let y_plus_5 = tm.mk_add(vec![y, five])?;
    let def_x = tm.mk_eq(x, y_plus_5)?;
    let def_y = tm.mk_eq(y, one)?;
    let guard = tm.mk_gt(z, x)?;

    let goal3 = Goal::with_assertions(vec![def_x, def_y, guard]);
    println!("Original goal: {}", goal3.display(&tm));

    let mut cx = TacticContext::new(&mut tm);
    let result = SolveEqsTactic::new().apply(&goal3, &mut cx)?;
    print_result(cx.tm, &result);

    if let TacticResult::SubGoals(subs) = &result {
        // A model of the reduced goal extends to the eliminated variables.
        let mut reduced_model = Model::new();
        reduced_model.assign(z, Value::Int(10.into()));
        let full = subs[0].convert_model(reduced_model, &tm);
        println!("Model of the subgoal, converted back: {}", full.display(&tm));
        println!("  Expected: x and y reappear with x = 6, y = 1\n");
    }

    // ===== Example 4: Case Splitting =====
    println!("--- Example 4: Case Splitting ---");
    let a = tm.mk_bool_var("a");
    let b = tm.mk_bool_var("b");
    let c = tm.mk_bool_var("c");
    let clause = tm.mk_or(vec![a, b])?;

    let goal4 = Goal::with_assertions(vec![clause, c]);
    println!("Original goal: {}", goal4.display(&tm));

    let mut cx = TacticContext::new(&mut tm);
    let result = SplitClauseTactic::new().apply(&goal4, &mut cx)?;
    println!("After split-clause:");
    print_result(cx.tm, &result);
    println!("  The subgoals are alternatives; one model suffices\n");

    // ===== Example 5: Detecting Inconsistency =====
    println!("--- Example 5: Detecting Inconsistency ---");
    let not_p = tm.mk_not(p)?;
    let goal5 = Goal::with_assertions(vec![p, not_p]);
    println!("Original goal: {}", goal5.display(&tm));

    let mut cx = TacticContext::new(&mut tm);
    let result = PropagateValuesTactic::new().apply(&goal5, &mut cx)?;
    println!("After propagate-values:");
    print_result(cx.tm, &result);
    if let TacticResult::SubGoals(subs) = &result {
        println!("  Inconsistent: {}", subs[0].is_inconsistent(cx.tm));
    }

    println!("\n=== Example Complete ===");
    println!("\nKey Takeaways:");
    println!("  1. Goals list assertions; tactics return subgoal alternatives");
    println!("  2. simplify rewrites assertions and drops trivial ones");
    println!("  3. propagate-values pushes constant bindings through the goal");
    println!("  4. solve-eqs eliminates variables and records how to undo it");
    println!("  5. Model conversion rebuilds values for eliminated variables");
    Ok(())
}

/// Print a tactic result in a human-readable format.
fn print_result(tm: &TermManager, result: &TacticResult) {
    match result {
        TacticResult::Solved(Verdict::Sat(model)) => {
            println!("  Result: SAT with model {}", model.display(tm));
        }
        TacticResult::Solved(Verdict::Unsat) => println!("  Result: UNSAT"),
        TacticResult::SubGoals(goals) => {
            println!("  Result: {} subgoal(s)", goals.len());
            for (i, goal) in goals.iter().enumerate() {
                println!("    Subgoal {}: {}", i, goal.display(tm));
            }
        }
        TacticResult::NotApplicable => println!("  Result: NOT APPLICABLE (goal unchanged)"),
    }
}
