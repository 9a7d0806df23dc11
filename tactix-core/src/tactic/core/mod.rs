//! Core goal transformations.
//!
//! These tactics rewrite a goal into equivalent subgoals without deciding
//! satisfiability. Deciding is left to the backends; a transformation that
//! reduces a goal to the empty or the `false` assertion list simply returns
//! that subgoal.

mod propagate_values;
mod simplify;
mod solve_eqs;
mod split_clause;

pub use propagate_values::{PropagateValuesConfig, PropagateValuesTactic};
pub use simplify::{SimplifyConfig, SimplifyTactic};
pub use solve_eqs::SolveEqsTactic;
pub use split_clause::SplitClauseTactic;
