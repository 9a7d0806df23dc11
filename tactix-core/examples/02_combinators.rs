//! # Tactic Combinators Example
//!
//! This example demonstrates composing tactics into strategies.
//! It covers:
//! - Sequencing with `then`
//! - Alternation and failure recovery with `or-else`
//! - Fixpoint iteration with `repeat`
//! - Deadlines with `try-for`
//! - Scoped parameters with `with`
//!
//! ## Combinators Overview
//! Combinators are tactics built from tactics. Failure is an error value,
//! so `or-else` can catch a failing alternative and move on to the next.
//!
//! ## See Also
//! - [`ThenTactic`](tactix_core::tactic::ThenTactic)
//! - [`OrElseTactic`](tactix_core::tactic::OrElseTactic)

use std::time::Duration;

use tactix_core::Result;
use tactix_core::ast::TermManager;
use tactix_core::params::Params;
use tactix_core::tactic::{
    FailTactic, Goal, OrElseTactic, RepeatTactic, SimplifyTactic, SkipTactic, SplitClauseTactic,
    Tactic, TacticContext, TacticResult, ThenTactic, TryForTactic, Verdict, WithTactic,
};

fn main() -> Result<()> {
    println!("=== Tactix Core: Tactic Combinators ===\n");

    let mut tm = TermManager::new();

    // ===== Example 1: Sequencing =====
    println!("--- Example 1: Sequencing with then ---");
    let p = tm.mk_bool_var("p");
    let q = tm.mk_bool_var("q");
    let r = tm.mk_bool_var("r");
    let true_term = tm.mk_true();

    // (p or q) and (r and true): simplify first, then case-split
    let clause = tm.mk_or(vec![p, q])?;
    let and_r_true = tm.mk_and(vec![r, true_term])?;
    let goal = Goal::with_assertions(vec![clause, and_r_true]);
    println!("Original goal: {}", goal.display(&tm));

    let pipeline = ThenTactic::new(vec![
        Box::new(SimplifyTactic::new()),
        Box::new(SplitClauseTactic::new()),
    ]);
    let mut cx = TacticContext::new(&mut tm);
    let result = pipeline.apply(&goal, &mut cx)?;
    println!("After then(simplify, split-clause):");
    print_result(cx.tm, &result);
    println!();

    // ===== Example 2: Failure Recovery =====
    println!("--- Example 2: Failure Recovery with or-else ---");
    let recovering = OrElseTactic::new(vec![
        Box::new(FailTactic::new()),
        Box::new(SkipTactic::new()),
    ]);
    let mut cx = TacticContext::new(&mut tm);
    match recovering.apply(&goal, &mut cx) {
        Ok(result) => {
            println!("or-else(fail, skip) recovered:");
            print_result(cx.tm, &result);
        }
        Err(e) => println!("unexpected failure: {e}"),
    }
    println!();

    // ===== Example 3: Fixpoint Iteration =====
    println!("--- Example 3: Fixpoint Iteration with repeat ---");
    let s = tm.mk_bool_var("s");
    let inner = tm.mk_or(vec![q, r])?;
    let nested = tm.mk_or(vec![p, inner])?;
    let goal3 = Goal::with_assertions(vec![nested, s]);
    println!("Original goal: {}", goal3.display(&tm));

    let exhaustive = RepeatTactic::new(Box::new(SplitClauseTactic::new()), 16);
    let mut cx = TacticContext::new(&mut tm);
    let result = exhaustive.apply(&goal3, &mut cx)?;
    println!("After repeat(split-clause):");
    print_result(cx.tm, &result);
    println!("  Every disjunct became its own case\n");

    // ===== Example 4: Deadlines =====
    println!("--- Example 4: Deadlines with try-for ---");
    let impatient = TryForTactic::new(Box::new(SimplifyTactic::new()), Duration::ZERO);
    let mut cx = TacticContext::new(&mut tm);
    match impatient.apply(&goal3, &mut cx) {
        Ok(_) => println!("finished inside the deadline"),
        Err(e) => println!("tactic failed as expected: {e}"),
    }

    // or-else turns the timeout into a fallback
    let patient = OrElseTactic::new(vec![
        Box::new(TryForTactic::new(
            Box::new(SimplifyTactic::new()),
            Duration::ZERO,
        )),
        Box::new(SkipTactic::new()),
    ]);
    let mut cx = TacticContext::new(&mut tm);
    let result = patient.apply(&goal3, &mut cx)?;
    println!("or-else(try-for(simplify, 0), skip) still succeeds:");
    print_result(cx.tm, &result);
    println!();

    // ===== Example 5: Scoped Parameters =====
    println!("--- Example 5: Scoped Parameters with with ---");
    let conj = tm.mk_and(vec![p, q])?;
    let goal5 = Goal::with_assertions(vec![conj]);
    println!("Original goal: {}", goal5.display(&tm));

    let negated_form = WithTactic::new(
        Box::new(SimplifyTactic::new()),
        Params::new().bool("elim-and", true),
    );
    let mut cx = TacticContext::new(&mut tm);
    let result = negated_form.apply(&goal5, &mut cx)?;
    println!("After with(simplify, elim-and=true):");
    print_result(cx.tm, &result);
    println!("  Conjunctions were rewritten into negated disjunctions");

    println!("\n=== Example Complete ===");
    println!("\nKey Takeaways:");
    println!("  1. then feeds every subgoal of one tactic into the next");
    println!("  2. or-else tries alternatives and catches failures");
    println!("  3. repeat applies a tactic until nothing changes");
    println!("  4. try-for bounds a tactic by a cooperative deadline");
    println!("  5. with scopes parameters to one application");
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
