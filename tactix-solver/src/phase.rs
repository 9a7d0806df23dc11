//! Low-Discrepancy Phase Sequences.
//!
//! Branching phases in the DPLL engine are drawn from a Kronecker (additive
//! recurrence) sequence built on the generalized golden ratio. Unlike a
//! pseudo-random generator the sequence is an open walk that fills the unit
//! interval evenly from the first few points, so early decisions already
//! spread over the search space, and it needs no seed management to stay
//! deterministic across runs.
//!
//! The base constant `hyper_phi(d)` is the unique real solution of
//! `x^(d+1) = x + 1`; dimension 1 gives the golden ratio and dimension 2 the
//! plastic number.
//!
//! ## References
//!
//! - Roberts: "The Unreasonable Effectiveness of Quasirandom Sequences"
//!   (<http://extremelearning.com.au/unreasonable-effectiveness-of-quasirandom-sequences/>)

use smallvec::SmallVec;

/// Iterations of the fixed-point map; converges to machine precision long
/// before this for every supported dimension.
const FIXED_POINT_ROUNDS: u32 = 40;

/// The generalized golden ratio for `dim` dimensions.
///
/// Computed by iterating `x <- (x + 1)^(1 / (dim + 1))` from 1.0, which
/// converges to the root of `x^(dim + 1) = x + 1`.
///
/// ```
/// use tactix_solver::phase::hyper_phi;
///
/// assert!((hyper_phi(1) - 1.618_033_988_749_894).abs() < 1e-12);
/// ```
#[must_use]
pub fn hyper_phi(dim: u32) -> f64 {
    let p = 1.0 / f64::from(dim + 1);
    let mut x = 1.0_f64;
    for _ in 0..FIXED_POINT_ROUNDS {
        x = (x + 1.0).powf(p);
    }
    x
}

/// Kronecker sequence: `point[n] = (seed + (n + 1) * alpha) mod 1` with
/// `alpha[j] = (1 / hyper_phi(dim))^(j + 1)`.
#[derive(Debug, Clone)]
pub struct KroneckerSequence {
    alpha: SmallVec<[f64; 2]>,
    state: SmallVec<[f64; 2]>,
}

impl KroneckerSequence {
    /// Default seed; the source article finds 0.5 behaves best.
    pub const DEFAULT_SEED: f64 = 0.5;

    /// A `dim`-dimensional sequence with the default seed.
    #[must_use]
    pub fn new(dim: u32) -> Self {
        Self::with_seed(dim, Self::DEFAULT_SEED)
    }

    /// A `dim`-dimensional sequence starting from `seed`.
    #[must_use]
    pub fn with_seed(dim: u32, seed: f64) -> Self {
        let g = hyper_phi(dim);
        let alpha: SmallVec<[f64; 2]> = (1..=dim)
            .map(|j| (1.0 / g).powi(j as i32) % 1.0)
            .collect();
        let state = alpha.iter().map(|a| (a + seed) % 1.0).collect();
        Self { alpha, state }
    }

    /// Number of components per point.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.alpha.len()
    }

    /// Emits the next point, each component in `[0, 1)`.
    pub fn next_point(&mut self) -> SmallVec<[f64; 2]> {
        let out = self.state.clone();
        for (s, a) in self.state.iter_mut().zip(&self.alpha) {
            *s = (*s + *a) % 1.0;
        }
        out
    }

    /// First component of the next point; the usual draw for one-dimensional
    /// consumers such as phase selection.
    pub fn next_unit(&mut self) -> f64 {
        self.next_point()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_ratio_and_plastic_number() {
        assert!((hyper_phi(1) - 1.618_033_988_749_894_8).abs() < 1e-12);
        assert!((hyper_phi(2) - 1.324_717_957_244_746).abs() < 1e-12);
    }

    #[test]
    fn hyper_phi_satisfies_its_defining_equation() {
        for dim in 1..=6u32 {
            let x = hyper_phi(dim);
            assert!(
                (x.powi(dim as i32 + 1) - x - 1.0).abs() < 1e-9,
                "dim {dim}: {x}"
            );
        }
    }

    #[test]
    fn points_stay_in_the_unit_interval() {
        let mut seq = KroneckerSequence::new(2);
        for _ in 0..1000 {
            for c in seq.next_point() {
                assert!((0.0..1.0).contains(&c));
            }
        }
    }

    #[test]
    fn first_point_matches_the_recurrence() {
        let mut seq = KroneckerSequence::new(2);
        let p = seq.next_point();
        let g = hyper_phi(2);
        assert!((p[0] - ((1.0 / g) % 1.0 + 0.5) % 1.0).abs() < 1e-12);
        assert!((p[1] - ((1.0 / g).powi(2) % 1.0 + 0.5) % 1.0).abs() < 1e-12);
    }

    #[test]
    fn sequence_is_deterministic() {
        let mut a = KroneckerSequence::new(1);
        let mut b = KroneckerSequence::new(1);
        for _ in 0..100 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn one_dimensional_draws_are_evenly_split() {
        let mut seq = KroneckerSequence::new(1);
        let below = (0..1000).filter(|_| seq.next_unit() < 0.5).count();
        // low-discrepancy: far tighter than the binomial bound
        assert!((480..=520).contains(&below), "below = {below}");
    }
}
