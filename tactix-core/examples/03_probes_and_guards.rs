//! # Probes and Guarded Tactics Example
//!
//! This example demonstrates measuring goals and steering tactics.
//! It covers:
//! - Counting probes (size, depth, expression and constant counts)
//! - Goal-class probes (is-propositional, has-bit-vector)
//! - Probe arithmetic and comparisons
//! - Failing on violated preconditions with fail-if
//! - Branching with if and when
//!
//! ## Probes Overview
//! A probe measures a goal without changing it; the result is a number,
//! with 0.0 read as false. Probes combine with arithmetic and comparison
//! operators, and the guarded combinators dispatch on them.
//!
//! ## See Also
//! - [`Probe`](tactix_core::tactic::probe::Probe) trait
//! - [`FailIfTactic`](tactix_core::tactic::FailIfTactic)

use tactix_core::Result;
use tactix_core::ast::TermManager;
use tactix_core::tactic::probe::{
    ConstProbe, DepthProbe, HasBitVectorProbe, IsPropositionalProbe, NumConstsProbe,
    NumExprsProbe, Probe, ProbeExt, SizeProbe,
};
use tactix_core::tactic::{
    CondTactic, FailIfTactic, Goal, SimplifyTactic, SkipTactic, SplitClauseTactic, Tactic,
    TacticContext, TacticResult, WhenTactic,
};

fn main() -> Result<()> {
    println!("=== Tactix Core: Probes and Guarded Tactics ===\n");

    let mut tm = TermManager::new();

    // ===== Example 1: Measuring a Goal =====
    println!("--- Example 1: Measuring a Goal ---");
    let p = tm.mk_bool_var("p");
    let q = tm.mk_bool_var("q");
    let nq = tm.mk_not(q)?;
    let clause = tm.mk_or(vec![p, nq])?;
    let goal = Goal::with_assertions(vec![clause, p]);
    println!("Goal: {}", goal.display(&tm));

    println!("  size        = {}", SizeProbe.eval(&goal, &tm));
    println!("  depth       = {}", DepthProbe.eval(&goal, &tm));
    println!("  num-exprs   = {}", NumExprsProbe.eval(&goal, &tm));
    println!("  num-consts  = {}", NumConstsProbe.eval(&goal, &tm));
    println!();

    // ===== Example 2: Goal Classes =====
    println!("--- Example 2: Goal Classes ---");
    let x = tm.mk_bv_var("x", 8)?;
    let five = tm.mk_bv(5, 8)?;
    let bv_eq = tm.mk_eq(x, five)?;
    let bv_goal = Goal::with_assertions(vec![bv_eq]);

    println!(
        "propositional goal: is-propositional = {}",
        IsPropositionalProbe.eval(&goal, &tm)
    );
    println!(
        "bit-vector goal:    is-propositional = {}, has-bit-vector = {}",
        IsPropositionalProbe.eval(&bv_goal, &tm),
        HasBitVectorProbe.eval(&bv_goal, &tm)
    );
    println!();

    // ===== Example 3: Probe Arithmetic =====
    println!("--- Example 3: Probe Arithmetic ---");
    let busy = SizeProbe.add(NumExprsProbe);
    println!("  {} = {}", busy.describe(), busy.eval(&goal, &tm));

    let shallow = DepthProbe.le(ConstProbe(4.0));
    println!("  {} = {}", shallow.describe(), shallow.eval(&goal, &tm));

    let small_and_bool = SizeProbe
        .lt(ConstProbe(10.0))
        .and(IsPropositionalProbe);
    println!(
        "  {} = {}",
        small_and_bool.describe(),
        small_and_bool.eval(&goal, &tm)
    );
    println!();

    // ===== Example 4: Violated Preconditions =====
    println!("--- Example 4: Violated Preconditions ---");
    // Insist on a small goal before an expensive step; the guard fails
    // when the goal has more than one assertion.
    let guarded = FailIfTactic::new(Box::new(SizeProbe.gt(ConstProbe(1.0))));
    let mut cx = TacticContext::new(&mut tm);
    match guarded.apply(&goal, &mut cx) {
        Ok(_) => println!("guard passed"),
        Err(e) => println!("caught: {e}"),
    }
    println!();

    // ===== Example 5: Steering Strategies =====
    println!("--- Example 5: Steering Strategies ---");
    // Split clauses only while the goal stays small; otherwise simplify.
    let steer = CondTactic::new(
        Box::new(SizeProbe.le(ConstProbe(4.0))),
        Box::new(SplitClauseTactic::new()),
        Box::new(SimplifyTactic::new()),
    );
    let mut cx = TacticContext::new(&mut tm);
    let result = steer.apply(&goal, &mut cx)?;
    print_subgoal_count("if(size <= 4, split-clause, simplify)", &result);

    // when passes the goal through untouched if the probe is zero
    let only_bv = WhenTactic::new(Box::new(HasBitVectorProbe), Box::new(SkipTactic::new()));
    let mut cx = TacticContext::new(&mut tm);
    let result = only_bv.apply(&goal, &mut cx)?;
    print_subgoal_count("when(has-bit-vector, skip)", &result);

    println!("\n=== Example Complete ===");
    println!("\nKey Takeaways:");
    println!("  1. Probes measure goals; 0.0 reads as false");
    println!("  2. Probe arithmetic composes measurements declaratively");
    println!("  3. fail-if raises a catchable error on violated preconditions");
    println!("  4. if and when steer strategies by goal shape");
    Ok(())
}

fn print_subgoal_count(label: &str, result: &TacticResult) {
    match result {
        TacticResult::SubGoals(goals) => {
            println!("  {label}: {} subgoal(s)", goals.len());
        }
        other => println!("  {label}: {other:?}"),
    }
}
