//! DPLL Search Engine.
//!
//! A propositional satisfiability engine in the classic DPLL style: unit
//! propagation over two watched literals, chronological backtracking with
//! flip markers, and deterministic branching. There is no clause learning;
//! the engine targets the moderately sized goals the tactic pipeline
//! produces, where propagation does most of the work.
//!
//! ## Heuristics
//!
//! Branching picks the unassigned variable occurring in the most clauses,
//! the propositional reading of most-constrained-variable selection from
//! CSP search. Branch phases are drawn from the Kronecker sequence in
//! [`phase`](crate::phase), so runs are deterministic end to end while
//! early decisions still spread across the assignment space.
//!
//! ## References
//!
//! - Davis, Logemann, Loveland: "A Machine Program for Theorem-Proving" (1962)
//! - Eén & Sörensson: "An Extensible SAT-solver" (2003), for the
//!   watched-literal scheme

use tactix_core::error::{Result, TactixError};
use tactix_core::resource::Budget;

use crate::cnf::{Clause, Cnf};
use crate::lit::{Lit, Var};
use crate::phase::KroneckerSequence;

/// Polarity choice for branch decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseMode {
    /// Per-variable phases drawn from the Kronecker sequence.
    #[default]
    Kronecker,
    /// Branch on the negative polarity first.
    AlwaysFalse,
    /// Branch on the positive polarity first.
    AlwaysTrue,
}

/// Configuration for the DPLL engine.
#[derive(Debug, Clone)]
pub struct DpllConfig {
    /// Phase selection policy.
    pub phase: PhaseMode,
    /// Abort with [`TactixError::StepBudgetExceeded`] past this many conflicts.
    pub max_conflicts: Option<u64>,
    /// Propagations between budget polls.
    pub poll_interval: u64,
}

impl Default for DpllConfig {
    fn default() -> Self {
        Self {
            phase: PhaseMode::Kronecker,
            max_conflicts: None,
            poll_interval: 1024,
        }
    }
}

/// Search counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpllStats {
    /// Branch decisions taken.
    pub decisions: u64,
    /// Literals propagated off the trail.
    pub propagations: u64,
    /// Conflicts encountered.
    pub conflicts: u64,
    /// Decisions retried with the opposite polarity.
    pub flips: u64,
}

/// Outcome of a [`SatSolver::solve`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    /// A satisfying assignment, indexed by variable.
    Sat(Vec<bool>),
    /// The clause set is unsatisfiable.
    Unsat,
}

/// DPLL solver over a fixed clause set.
pub struct SatSolver {
    clauses: Vec<Clause>,
    /// Clause indices watching each literal, indexed by [`Lit::index`].
    watches: Vec<Vec<u32>>,
    assignment: Vec<Option<bool>>,
    phases: Vec<bool>,
    /// Clause occurrences per variable, for branching.
    counts: Vec<u32>,
    trail: Vec<Lit>,
    /// Trail position of each decision literal.
    trail_lim: Vec<usize>,
    /// Whether the decision at each level already tried both polarities.
    flipped: Vec<bool>,
    qhead: usize,
    unsat: bool,
    config: DpllConfig,
    stats: DpllStats,
}

impl SatSolver {
    /// Builds a solver for `cnf` with the default configuration.
    #[must_use]
    pub fn new(cnf: &Cnf) -> Self {
        Self::with_config(cnf, DpllConfig::default())
    }

    /// Builds a solver for `cnf` with a custom configuration.
    #[must_use]
    pub fn with_config(cnf: &Cnf, mut config: DpllConfig) -> Self {
        config.poll_interval = config.poll_interval.max(1);
        let n = cnf.num_vars as usize;
        let mut phases = vec![false; n];
        match config.phase {
            PhaseMode::Kronecker => {
                let mut seq = KroneckerSequence::new(1);
                for p in &mut phases {
                    *p = seq.next_unit() >= 0.5;
                }
            }
            PhaseMode::AlwaysFalse => {}
            PhaseMode::AlwaysTrue => phases.fill(true),
        }
        let mut solver = Self {
            clauses: Vec::with_capacity(cnf.clauses.len()),
            watches: vec![Vec::new(); 2 * n],
            assignment: vec![None; n],
            phases,
            counts: vec![0; n],
            trail: Vec::new(),
            trail_lim: Vec::new(),
            flipped: Vec::new(),
            qhead: 0,
            unsat: false,
            config,
            stats: DpllStats::default(),
        };
        for c in &cnf.clauses {
            solver.add_clause(c.clone());
        }
        solver
    }

    /// Search counters for the run so far.
    #[must_use]
    pub fn stats(&self) -> &DpllStats {
        &self.stats
    }

    fn add_clause(&mut self, clause: Clause) {
        for &l in &clause {
            self.counts[l.var() as usize] += 1;
        }
        match clause.len() {
            0 => self.unsat = true,
            1 => {
                if !self.enqueue(clause[0]) {
                    self.unsat = true;
                }
                self.clauses.push(clause);
            }
            _ => {
                let ci = self.clauses.len() as u32;
                self.watches[clause[0].index()].push(ci);
                self.watches[clause[1].index()].push(ci);
                self.clauses.push(clause);
            }
        }
    }

    /// Runs the search to completion, polling `budget` as it goes.
    pub fn solve(&mut self, budget: &Budget) -> Result<SatResult> {
        tracing::debug!(
            vars = self.assignment.len(),
            clauses = self.clauses.len(),
            "dpll: solving"
        );
        if self.unsat {
            return Ok(SatResult::Unsat);
        }
        loop {
            if self.propagate(budget)?.is_some() {
                self.stats.conflicts += 1;
                if let Some(limit) = self.config.max_conflicts
                    && self.stats.conflicts > limit
                {
                    return Err(TactixError::StepBudgetExceeded { limit });
                }
                if !self.backtrack() {
                    tracing::debug!(conflicts = self.stats.conflicts, "dpll: unsat");
                    return Ok(SatResult::Unsat);
                }
            } else if let Some(v) = self.pick_branch_var() {
                self.decide(v);
            } else {
                tracing::debug!(
                    decisions = self.stats.decisions,
                    conflicts = self.stats.conflicts,
                    "dpll: sat"
                );
                let model = self.assignment.iter().map(|a| a.unwrap_or(false)).collect();
                return Ok(SatResult::Sat(model));
            }
        }
    }

    fn value(&self, l: Lit) -> Option<bool> {
        self.assignment[l.var() as usize].map(|v| l.apply(v))
    }

    /// Records `l` on the trail; false when it contradicts the assignment.
    fn enqueue(&mut self, l: Lit) -> bool {
        match self.value(l) {
            Some(v) => v,
            None => {
                self.assignment[l.var() as usize] = Some(l.is_positive());
                self.trail.push(l);
                true
            }
        }
    }

    /// Propagates until fixpoint; returns the conflicting clause, if any.
    fn propagate(&mut self, budget: &Budget) -> Result<Option<u32>> {
        while self.qhead < self.trail.len() {
            let l = self.trail[self.qhead];
            self.qhead += 1;
            self.stats.propagations += 1;
            if self.stats.propagations % self.config.poll_interval == 0 {
                budget.check()?;
            }
            let false_lit = l.negate();
            let w = false_lit.index();
            let mut i = 0;
            while i < self.watches[w].len() {
                let ci = self.watches[w][i] as usize;
                // keep the falsified literal in slot 1
                if self.clauses[ci][0] == false_lit {
                    self.clauses[ci].swap(0, 1);
                }
                let first = self.clauses[ci][0];
                if self.value(first) == Some(true) {
                    i += 1;
                    continue;
                }
                let len = self.clauses[ci].len();
                let mut moved = false;
                for k in 2..len {
                    let cand = self.clauses[ci][k];
                    if self.value(cand) != Some(false) {
                        self.clauses[ci].swap(1, k);
                        self.watches[cand.index()].push(ci as u32);
                        self.watches[w].swap_remove(i);
                        moved = true;
                        break;
                    }
                }
                if moved {
                    continue;
                }
                // all other literals false: unit under `first`, or conflicting
                if !self.enqueue(first) {
                    return Ok(Some(ci as u32));
                }
                i += 1;
            }
        }
        Ok(None)
    }

    /// Unwinds to the most recent unflipped decision and retries it with the
    /// opposite polarity; false when both polarities of every decision are
    /// exhausted.
    fn backtrack(&mut self) -> bool {
        loop {
            let Some(&start) = self.trail_lim.last() else {
                return false;
            };
            let decision = self.trail[start];
            let was_flipped = self.flipped.last().copied().unwrap_or(true);
            for l in self.trail.drain(start..) {
                self.assignment[l.var() as usize] = None;
            }
            self.trail_lim.pop();
            self.flipped.pop();
            self.qhead = self.trail.len();
            if !was_flipped {
                self.stats.flips += 1;
                self.trail_lim.push(self.trail.len());
                self.flipped.push(true);
                let fresh = self.enqueue(decision.negate());
                debug_assert!(fresh);
                return true;
            }
        }
    }

    fn decide(&mut self, v: Var) {
        self.stats.decisions += 1;
        self.trail_lim.push(self.trail.len());
        self.flipped.push(false);
        let l = if self.phases[v as usize] {
            Lit::positive(v)
        } else {
            Lit::negative(v)
        };
        let fresh = self.enqueue(l);
        debug_assert!(fresh);
    }

    /// Unassigned variable in the most clauses; ties keep the lowest index.
    fn pick_branch_var(&self) -> Option<Var> {
        let mut best: Option<(Var, u32)> = None;
        for (v, a) in self.assignment.iter().enumerate() {
            if a.is_none() {
                let c = self.counts[v];
                if best.is_none_or(|(_, bc)| c > bc) {
                    best = Some((v as Var, c));
                }
            }
        }
        best.map(|(v, _)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: i32) -> Lit {
        if n > 0 {
            Lit::positive((n - 1) as Var)
        } else {
            Lit::negative((-n - 1) as Var)
        }
    }

    fn cnf_of(num_vars: u32, clauses: &[&[i32]]) -> Cnf {
        let mut cnf = Cnf::default();
        cnf.num_vars = num_vars;
        cnf.clauses = clauses
            .iter()
            .map(|c| c.iter().map(|&n| lit(n)).collect())
            .collect();
        cnf
    }

    fn holds(cnf: &Cnf, model: &[bool]) -> bool {
        cnf.clauses
            .iter()
            .all(|c| c.iter().any(|l| l.apply(model[l.var() as usize])))
    }

    #[test]
    fn empty_problem_is_sat() {
        let cnf = cnf_of(0, &[]);
        let mut solver = SatSolver::new(&cnf);
        assert_eq!(solver.solve(&Budget::unlimited()).unwrap(), SatResult::Sat(vec![]));
    }

    #[test]
    fn unit_propagation_chains() {
        let cnf = cnf_of(3, &[&[1], &[-1, 2], &[-2, 3]]);
        let mut solver = SatSolver::new(&cnf);
        let SatResult::Sat(model) = solver.solve(&Budget::unlimited()).unwrap() else {
            panic!("expected sat");
        };
        assert_eq!(model, vec![true, true, true]);
        assert_eq!(solver.stats().decisions, 0);
    }

    #[test]
    fn contradictory_units_are_unsat_without_search() {
        let cnf = cnf_of(1, &[&[1], &[-1]]);
        let mut solver = SatSolver::new(&cnf);
        assert_eq!(solver.solve(&Budget::unlimited()).unwrap(), SatResult::Unsat);
        assert_eq!(solver.stats().decisions, 0);
    }

    #[test]
    fn exhausting_both_polarities_is_unsat() {
        let cnf = cnf_of(2, &[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]);
        let mut solver = SatSolver::new(&cnf);
        assert_eq!(solver.solve(&Budget::unlimited()).unwrap(), SatResult::Unsat);
        assert!(solver.stats().flips >= 1);
    }

    #[test]
    fn pigeonhole_three_into_two_is_unsat() {
        // vars i*2 + h + 1: pigeon i sits in hole h
        let cnf = cnf_of(
            6,
            &[
                &[1, 2],
                &[3, 4],
                &[5, 6],
                &[-1, -3],
                &[-1, -5],
                &[-3, -5],
                &[-2, -4],
                &[-2, -6],
                &[-4, -6],
            ],
        );
        let mut solver = SatSolver::new(&cnf);
        assert_eq!(solver.solve(&Budget::unlimited()).unwrap(), SatResult::Unsat);
    }

    #[test]
    fn models_satisfy_every_clause() {
        let cnf = cnf_of(
            4,
            &[
                &[1, 2, 3],
                &[-1, 2],
                &[-2, -3],
                &[3, 4],
                &[-4, 1],
                &[-3, -1],
            ],
        );
        let mut solver = SatSolver::new(&cnf);
        let SatResult::Sat(model) = solver.solve(&Budget::unlimited()).unwrap() else {
            panic!("expected sat");
        };
        assert!(holds(&cnf, &model));
    }

    #[test]
    fn phase_mode_steers_decisions() {
        let cnf = cnf_of(2, &[&[1, 2]]);

        let config = DpllConfig {
            phase: PhaseMode::AlwaysTrue,
            ..DpllConfig::default()
        };
        let mut solver = SatSolver::with_config(&cnf, config);
        let SatResult::Sat(model) = solver.solve(&Budget::unlimited()).unwrap() else {
            panic!("expected sat");
        };
        assert_eq!(model, vec![true, true]);

        let config = DpllConfig {
            phase: PhaseMode::AlwaysFalse,
            ..DpllConfig::default()
        };
        let mut solver = SatSolver::with_config(&cnf, config);
        let SatResult::Sat(model) = solver.solve(&Budget::unlimited()).unwrap() else {
            panic!("expected sat");
        };
        // first decision falsifies var 0, propagation then forces var 1
        assert_eq!(model, vec![false, true]);
    }

    #[test]
    fn conflict_limit_trips() {
        let cnf = cnf_of(
            6,
            &[
                &[1, 2],
                &[3, 4],
                &[5, 6],
                &[-1, -3],
                &[-1, -5],
                &[-3, -5],
                &[-2, -4],
                &[-2, -6],
                &[-4, -6],
            ],
        );
        let config = DpllConfig {
            max_conflicts: Some(1),
            ..DpllConfig::default()
        };
        let mut solver = SatSolver::with_config(&cnf, config);
        assert!(matches!(
            solver.solve(&Budget::unlimited()),
            Err(TactixError::StepBudgetExceeded { limit: 1 })
        ));
    }

    #[test]
    fn expired_deadline_interrupts_propagation() {
        let cnf = cnf_of(2, &[&[1], &[-1, 2]]);
        let config = DpllConfig {
            poll_interval: 1,
            ..DpllConfig::default()
        };
        let mut solver = SatSolver::with_config(&cnf, config);
        let budget = Budget::with_deadline(std::time::Duration::ZERO);
        assert!(matches!(
            solver.solve(&budget),
            Err(TactixError::Timeout { .. })
        ));
    }

    #[test]
    fn kronecker_runs_are_reproducible() {
        let cnf = cnf_of(4, &[&[1, 2, 3], &[-2, 4], &[-1, -3]]);
        let mut a = SatSolver::new(&cnf);
        let mut b = SatSolver::new(&cnf);
        assert_eq!(
            a.solve(&Budget::unlimited()).unwrap(),
            b.solve(&Budget::unlimited()).unwrap()
        );
    }
}
