//! Tactix Solver - CNF Conversion, DPLL Search, and the Tactic-Backed Solver
//!
//! This crate turns the goal-transformation machinery of `tactix-core`
//! into a decision procedure:
//! - Tseitin conversion from propositional goals to CNF, keeping the map
//!   from term-level Booleans to solver variables for model extraction
//! - A DPLL engine with two-watched-literal unit propagation,
//!   most-constrained-first branching, chronological backtracking, and
//!   deterministic phase selection fed by a low-discrepancy sequence
//! - The `sat` end-game tactic, which decides goals the transformation
//!   tactics have reduced to propositional form
//! - [`Solver`], a push-button check-sat interface over any tactic
//!
//! # Examples
//!
//! ## Push-Button Solving
//!
//! ```
//! use tactix_core::ast::TermManager;
//! use tactix_solver::{CheckResult, Solver};
//!
//! # fn main() -> tactix_core::Result<()> {
//! let mut tm = TermManager::new();
//! let p = tm.mk_bool_var("p");
//! let q = tm.mk_bool_var("q");
//! let clause = tm.mk_or(vec![p, q])?;
//! let np = tm.mk_not(p)?;
//!
//! let mut solver = Solver::new();
//! solver.assert_term(clause, &tm)?;
//! solver.assert_term(np, &tm)?;
//! assert_eq!(solver.check(&mut tm), CheckResult::Sat);
//!
//! let model = solver.model().unwrap();
//! assert!(model.satisfies(&[clause, np], &tm));
//! # Ok(())
//! # }
//! ```
//!
//! ## Building a Strategy
//!
//! Any tactic converts into a solver, so strategies assemble from the
//! combinators in `tactix-core` and end in `sat`:
//!
//! ```
//! use tactix_core::ast::TermManager;
//! use tactix_core::tactic::{SimplifyTactic, ThenTactic};
//! use tactix_solver::{CheckResult, IntoSolver, SatTactic};
//!
//! # fn main() -> tactix_core::Result<()> {
//! let mut tm = TermManager::new();
//! let p = tm.mk_bool_var("p");
//! let np = tm.mk_not(p)?;
//!
//! let mut solver = ThenTactic::new(vec![
//!     Box::new(SimplifyTactic::new()),
//!     Box::new(SatTactic::new()),
//! ])
//! .solver();
//! solver.assert_term(p, &tm)?;
//! solver.assert_term(np, &tm)?;
//! assert_eq!(solver.check(&mut tm), CheckResult::Unsat);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cnf;
pub mod dpll;
pub mod lit;
pub mod phase;
pub mod sat;
pub mod solver;

pub use cnf::{Clause, Cnf};
pub use dpll::{DpllConfig, DpllStats, PhaseMode, SatResult, SatSolver};
pub use lit::{Lit, Var};
pub use phase::{KroneckerSequence, hyper_phi};
pub use sat::SatTactic;
pub use solver::{CheckResult, IntoSolver, Solver, default_tactic};
