//! Property-based tests for tactix-core
//!
//! Verifies the invariants the tactic engine is built on: hash-consing,
//! soundness of the rewriter under arbitrary assignments, and that tactics
//! preserve satisfiability goal by goal.

mod ast_properties;
mod formula;
mod rewriter_properties;
mod tactic_properties;
