//! # Custom Strategies Example
//!
//! This example demonstrates tuning and bounding solver strategies. It
//! covers:
//! - Scoping engine parameters with `with`
//! - Deadlines with `try-for` and recovery with `or-else`
//! - Conflict budgets via the `max-conflicts` parameter
//! - Reading the reason behind an unknown verdict
//!
//! ## See Also
//! - [`WithTactic`](tactix_core::tactic::WithTactic)
//! - [`TryForTactic`](tactix_core::tactic::TryForTactic)

use std::time::Duration;

use tactix_core::Result;
use tactix_core::ast::{TermId, TermManager};
use tactix_core::params::Params;
use tactix_core::tactic::{OrElseTactic, SimplifyTactic, Tactic, ThenTactic, TryForTactic, WithTactic};
use tactix_solver::{IntoSolver, SatTactic};

fn main() -> Result<()> {
    println!("=== Tactix Solver: Custom Strategies ===\n");

    let mut tm = TermManager::new();

    // ===== Example 1: Scoped Parameters =====
    println!("--- Example 1: Scoped Parameters ---");
    // The phase parameter steers which model the search finds first.
    let p = tm.mk_bool_var("p");
    let q = tm.mk_bool_var("q");
    let clause = tm.mk_or(vec![p, q])?;

    for phase in ["true", "false"] {
        let strategy = WithTactic::new(
            Box::new(SatTactic::new()),
            Params::new().str("phase", phase),
        );
        let mut solver = strategy.solver();
        solver.assert_term(clause, &tm)?;
        let verdict = solver.check(&mut tm);
        match solver.model() {
            Some(model) => {
                println!("  phase = {phase:<5} -> {verdict}, {}", model.display(&tm));
            }
            None => println!("  phase = {phase:<5} -> {verdict}"),
        }
    }
    println!();

    // ===== Example 2: Deadlines and Recovery =====
    println!("--- Example 2: Deadlines and Recovery ---");
    fn chain() -> Box<dyn Tactic> {
        Box::new(ThenTactic::new(vec![
            Box::new(SimplifyTactic::new()),
            Box::new(SatTactic::new()),
        ]))
    }

    // An already-expired deadline makes the bounded attempt fail.
    let bounded = TryForTactic::new(chain(), Duration::ZERO);
    let mut solver = bounded.solver();
    solver.assert_term(clause, &tm)?;
    let verdict = solver.check(&mut tm);
    println!("  try-for(chain, 0ms):     {verdict}");
    if let Some(reason) = solver.reason_unknown() {
        println!("    reason: {reason}");
    }

    // or-else catches the failure and falls back to the unbounded chain.
    let recovered = OrElseTactic::new(vec![
        Box::new(TryForTactic::new(chain(), Duration::ZERO)),
        chain(),
    ]);
    let mut solver = recovered.solver();
    solver.assert_term(clause, &tm)?;
    println!("  or-else(bounded, chain): {}", solver.check(&mut tm));
    println!();

    // ===== Example 3: Conflict Budgets =====
    println!("--- Example 3: Conflict Budgets ---");
    // Three pigeons in two holes: unsatisfiable, and (unlike the goals
    // above) not settled by propagation alone.
    let holes = pigeonhole(&mut tm)?;

    let capped = WithTactic::new(
        Box::new(SatTactic::new()),
        Params::new().uint("max-conflicts", 1),
    );
    let mut solver = capped.solver();
    for &a in &holes {
        solver.assert_term(a, &tm)?;
    }
    let verdict = solver.check(&mut tm);
    println!("  capped at 1 conflict:    {verdict}");
    if let Some(reason) = solver.reason_unknown() {
        println!("    reason: {reason}");
    }

    let mut solver = SatTactic::new().solver();
    for &a in &holes {
        solver.assert_term(a, &tm)?;
    }
    println!("  without the cap:         {}", solver.check(&mut tm));

    println!("\n=== Example Complete ===");
    println!("\nKey Takeaways:");
    println!("  1. with() scopes parameters to one strategy");
    println!("  2. try-for bounds a strategy; or-else recovers from its failure");
    println!("  3. max-conflicts turns open-ended search into a budgeted probe");
    println!("  4. Unknown verdicts keep their cause for inspection");
    Ok(())
}

/// Pigeonhole constraints: each of three pigeons takes one of two holes,
/// no hole takes two pigeons.
fn pigeonhole(tm: &mut TermManager) -> Result<Vec<TermId>> {
    let mut vars = Vec::new();
    for i in 0..3 {
        let h0 = tm.mk_bool_var(&format!("p{i}h0"));
        let h1 = tm.mk_bool_var(&format!("p{i}h1"));
        vars.push([h0, h1]);
    }
    let mut constraints = Vec::new();
    for held in &vars {
        constraints.push(tm.mk_or(vec![held[0], held[1]])?);
    }
    for h in 0..2 {
        for i in 0..3 {
            for j in (i + 1)..3 {
                let ni = tm.mk_not(vars[i][h])?;
                let nj = tm.mk_not(vars[j][h])?;
                constraints.push(tm.mk_or(vec![ni, nj])?);
            }
        }
    }
    Ok(constraints)
}
