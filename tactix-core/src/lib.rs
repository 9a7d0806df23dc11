//! Tactix Core - Terms, Goals, Tactics, and Probes
//!
//! This crate provides the building blocks of the tactic engine:
//! - Hash-consed terms with cheap [`TermId`] references over boolean,
//!   integer, and fixed-width bit-vector sorts
//! - Goals carrying assertions plus the model conversions needed to turn
//!   subgoal models back into models of the original problem
//! - A tactic framework with combinators for sequencing, alternation,
//!   repetition, deadlines, and probe-guarded dispatch
//! - Probes measuring syntactic properties of goals
//! - A rewrite system used by the simplification tactics
//!
//! # Examples
//!
//! ## Creating Terms
//!
//! ```
//! use tactix_core::ast::TermManager;
//!
//! # fn main() -> tactix_core::Result<()> {
//! let mut tm = TermManager::new();
//!
//! // Boolean terms
//! let p = tm.mk_bool_var("p");
//! let q = tm.mk_bool_var("q");
//! let and_pq = tm.mk_and(vec![p, q])?;
//! assert_eq!(tm.display(and_pq).to_string(), "(and p q)");
//!
//! // Bit-vector terms
//! let x = tm.mk_bv_var("x", 16)?;
//! let five = tm.mk_bv(5, 16)?;
//! let ge = tm.mk_bv_ule(five, x)?;
//! # let _ = ge;
//! # Ok(())
//! # }
//! ```
//!
//! ## Applying Tactics
//!
//! ```
//! use tactix_core::ast::TermManager;
//! use tactix_core::tactic::{Goal, SimplifyTactic, Tactic, TacticContext, TacticResult};
//!
//! # fn main() -> tactix_core::Result<()> {
//! let mut tm = TermManager::new();
//! let p = tm.mk_bool_var("p");
//! let t = tm.mk_true();
//! let conj = tm.mk_and(vec![p, t])?;
//!
//! let goal = Goal::with_assertions(vec![conj]);
//! let mut cx = TacticContext::new(&mut tm);
//! let result = SimplifyTactic::new().apply(&goal, &mut cx)?;
//!
//! match result {
//!     TacticResult::SubGoals(subs) => assert_eq!(subs[0].assertions, vec![p]),
//!     _ => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarding with Probes
//!
//! ```
//! use tactix_core::ast::TermManager;
//! use tactix_core::tactic::probe::{ConstProbe, Probe, ProbeExt, SizeProbe};
//! use tactix_core::tactic::Goal;
//!
//! let mut tm = TermManager::new();
//! let p = tm.mk_bool_var("p");
//! let goal = Goal::with_assertions(vec![p]);
//!
//! let small = SizeProbe.le(ConstProbe(10.0));
//! assert_eq!(small.eval(&goal, &tm), 1.0);
//! assert_eq!(small.describe(), "(<= size 10)");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod model;
pub mod params;
pub mod resource;
pub mod rewrite;
pub mod sort;
pub mod tactic;

pub use ast::{Term, TermId, TermKind, TermManager};
pub use error::{Result, TactixError};
pub use model::{BitGroup, BitGroups, EliminatedVars, Model, ModelConversion, Value};
pub use params::{ParamValue, Params};
pub use resource::Budget;
pub use rewrite::{RewriteConfig, Rewriter, simplify_term};
pub use sort::{MAX_BV_WIDTH, Sort, SortId, SortKind, SortStore};
pub use tactic::{
    Goal, Precision, Tactic, TacticContext, TacticResult, Verdict, lookup_probe, lookup_tactic,
};
