//! # Bit-Vector Pipeline Example
//!
//! This example demonstrates deciding bit-vector formulas by reduction to
//! propositional SAT. It covers:
//! - Assembling the simplify / solve-eqs / bit-blast / sat pipeline
//! - Converting a tactic into a solver with `solver()`
//! - Checking assertions and printing the model
//! - The default strategy, which guards bit-blasting behind a probe
//!
//! ## Model Conversion
//! Bit-blasting replaces every bit-vector variable with fresh Boolean
//! variables, and `solve-eqs` removes variables outright. The goal records
//! one converter per transformation, so the assignment DPLL finds at the
//! bit level comes back as bit-vector values of the original variables.
//!
//! ## See Also
//! - [`Solver`](tactix_solver::Solver)
//! - [`BitBlastTactic`](tactix_core::tactic::BitBlastTactic)

use tactix_core::Result;
use tactix_core::ast::TermManager;
use tactix_core::tactic::{BitBlastTactic, SimplifyTactic, SolveEqsTactic, ThenTactic};
use tactix_solver::{IntoSolver, SatTactic, Solver};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG=debug shows tactic application and the DPLL search counters
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Tactix Solver: The Bit-Vector Pipeline ===\n");

    let mut tm = TermManager::new();

    // ===== Example 1: A Bit-Vector Problem =====
    println!("--- Example 1: A Bit-Vector Problem ---");
    let x = tm.mk_bv_var("x", 16)?;
    let y = tm.mk_bv_var("y", 16)?;
    let thirteen = tm.mk_bv(13, 16)?;
    let zero = tm.mk_bv(0, 16)?;
    let or_xy = tm.mk_bv_or(x, y)?;
    let constraints = vec![
        tm.mk_eq(or_xy, thirteen)?,
        tm.mk_bv_slt(y, x)?,
        tm.mk_bv_slt(zero, y)?,
    ];
    for &a in &constraints {
        println!("  assert {}", tm.display(a));
    }
    println!();

    // ===== Example 2: The Pipeline as a Solver =====
    println!("--- Example 2: The Pipeline as a Solver ---");
    let pipeline = ThenTactic::new(vec![
        Box::new(SimplifyTactic::new()),
        Box::new(SolveEqsTactic::new()),
        Box::new(BitBlastTactic::new()),
        Box::new(SatTactic::new()),
    ]);
    let mut solver = pipeline.solver();
    for &a in &constraints {
        solver.assert_term(a, &tm)?;
    }

    let verdict = solver.check(&mut tm);
    println!("verdict: {verdict}");
    if let Some(model) = solver.model() {
        println!("model:   {}", model.display(&tm));
        println!("  x = {:?}", model.eval(x, &tm));
        println!("  y = {:?}", model.eval(y, &tm));
        println!(
            "  model satisfies all constraints: {}",
            model.satisfies(&constraints, &tm)
        );
    }
    println!();

    // ===== Example 3: The Default Strategy =====
    println!("--- Example 3: The Default Strategy ---");
    // Solver::new() guards bit-blasting behind the has-bv probe, so one
    // solver handles propositional and bit-vector goals alike.
    let p = tm.mk_bool_var("p");
    let q = tm.mk_bool_var("q");
    let clause = tm.mk_or(vec![p, q])?;
    let np = tm.mk_not(p)?;

    let mut solver = Solver::new();
    solver.assert_term(clause, &tm)?;
    solver.assert_term(np, &tm)?;
    println!("propositional goal: {}", solver.check(&mut tm));

    solver.reset();
    for &a in &constraints {
        solver.assert_term(a, &tm)?;
    }
    println!("bit-vector goal:    {}", solver.check(&mut tm));
    println!();

    // ===== Example 4: Unsatisfiable Constraints =====
    println!("--- Example 4: Unsatisfiable Constraints ---");
    let below = tm.mk_bv_ult(x, y)?;
    let above = tm.mk_bv_ult(y, x)?;

    let mut solver = Solver::new();
    solver.assert_term(below, &tm)?;
    solver.assert_term(above, &tm)?;
    println!("x < y and y < x:    {}", solver.check(&mut tm));

    println!("\n=== Example Complete ===");
    println!("\nKey Takeaways:");
    println!("  1. Then(simplify, solve-eqs, bit-blast, sat) decides bit-vector goals");
    println!("  2. Any tactic becomes a solver with .solver()");
    println!("  3. Model converters map bit-level assignments back to bit-vectors");
    println!("  4. The default strategy dispatches on goal content by probe");
    Ok(())
}
