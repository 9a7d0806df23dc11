//! Literal Type for the SAT Backend.
//!
//! A literal packs a variable and a sign into one `u32`, with the sign in
//! the low bit. Watch lists and assignment tables index by the raw value.

use std::fmt;

/// A Boolean variable identifier.
pub type Var = u32;

/// A literal (signed Boolean variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    /// Create a positive literal from a variable.
    #[must_use]
    pub const fn positive(var: Var) -> Self {
        Self(var << 1)
    }

    /// Create a negative literal from a variable.
    #[must_use]
    pub const fn negative(var: Var) -> Self {
        Self((var << 1) | 1)
    }

    /// Get the variable of this literal.
    #[must_use]
    pub const fn var(self) -> Var {
        self.0 >> 1
    }

    /// Check if this literal is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        (self.0 & 1) == 0
    }

    /// Check if this literal is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        (self.0 & 1) != 0
    }

    /// Get the negation of this literal.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Get the raw value, usable as a dense table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Create from a raw value.
    #[must_use]
    pub const fn from_index(raw: usize) -> Self {
        Self(raw as u32)
    }

    /// Truth of this literal given its variable's assignment.
    #[must_use]
    pub const fn apply(self, var_value: bool) -> bool {
        var_value != self.is_negative()
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_positive() {
            write!(f, "{}", self.var())
        } else {
            write!(f, "-{}", self.var())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_literal() {
        let lit = Lit::positive(5);
        assert!(lit.is_positive());
        assert!(!lit.is_negative());
        assert_eq!(lit.var(), 5);
    }

    #[test]
    fn negative_literal() {
        let lit = Lit::negative(5);
        assert!(!lit.is_positive());
        assert!(lit.is_negative());
        assert_eq!(lit.var(), 5);
    }

    #[test]
    fn negation_is_involutive() {
        let pos = Lit::positive(3);
        let neg = pos.negate();
        assert!(neg.is_negative());
        assert_eq!(neg.var(), 3);
        assert_eq!(neg.negate(), pos);
    }

    #[test]
    fn index_round_trip() {
        let lit = Lit::negative(7);
        assert_eq!(Lit::from_index(lit.index()), lit);
    }

    #[test]
    fn truth_respects_sign() {
        assert!(Lit::positive(0).apply(true));
        assert!(!Lit::positive(0).apply(false));
        assert!(Lit::negative(0).apply(false));
        assert!(!Lit::negative(0).apply(true));
    }

    #[test]
    fn display_marks_negative_literals() {
        assert_eq!(Lit::positive(4).to_string(), "4");
        assert_eq!(Lit::negative(4).to_string(), "-4");
    }
}
