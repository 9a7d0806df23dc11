//! Dynamic tactic parameters.
//!
//! The `with` combinator merges a [`Params`] set into the application
//! context for the span of one tactic, the way parameterized tactic calls
//! work in interactive solver front ends. Tactics read the keys they know
//! and fall back to their own configuration defaults.

use rustc_hash::FxHashMap;
use std::fmt;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A flag.
    Bool(bool),
    /// A non-negative count or limit.
    UInt(u64),
    /// A real-valued knob.
    Float(f64),
    /// A named mode.
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::UInt(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A keyed set of parameter values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: FxHashMap<String, ParamValue>,
}

impl Params {
    /// The empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: ParamValue) {
        self.entries.insert(key.into(), value);
    }

    /// Builder form of [`Params::set`] for flags.
    #[must_use]
    pub fn bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.set(key, ParamValue::Bool(value));
        self
    }

    /// Builder form of [`Params::set`] for counts.
    #[must_use]
    pub fn uint(mut self, key: impl Into<String>, value: u64) -> Self {
        self.set(key, ParamValue::UInt(value));
        self
    }

    /// Builder form of [`Params::set`] for named modes.
    #[must_use]
    pub fn str(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, ParamValue::Str(value.into()));
        self
    }

    /// Reads a flag, falling back to `default` when absent or mistyped.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(ParamValue::Bool(b)) => *b,
            _ => default,
        }
    }

    /// Reads a count, falling back to `default` when absent or mistyped.
    #[must_use]
    pub fn get_uint(&self, key: &str, default: u64) -> u64 {
        match self.entries.get(key) {
            Some(ParamValue::UInt(v)) => *v,
            _ => default,
        }
    }

    /// Reads a named mode, falling back to `default` when absent or mistyped.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.entries.get(key) {
            Some(ParamValue::Str(s)) => s.as_str(),
            _ => default,
        }
    }

    /// Copies every entry of `other` into `self`, overriding collisions.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Whether no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&str, &ParamValue)> =
            self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        write!(f, "(")?;
        for (i, (k, v)) in entries.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_with_defaults() {
        let p = Params::new().bool("flat", false).uint("max-rounds", 3);
        assert!(!p.get_bool("flat", true));
        assert_eq!(p.get_uint("max-rounds", 8), 3);
        assert_eq!(p.get_uint("absent", 8), 8);
        // mistyped read falls back
        assert!(p.get_bool("max-rounds", true));
    }

    #[test]
    fn merge_overrides() {
        let mut a = Params::new().bool("flat", true);
        let b = Params::new().bool("flat", false).str("phase", "kronecker");
        a.merge(&b);
        assert!(!a.get_bool("flat", true));
        assert_eq!(a.get_str("phase", "false"), "kronecker");
    }

    #[test]
    fn display_sorted() {
        let p = Params::new().uint("b", 1).bool("a", true);
        assert_eq!(p.to_string(), "(a=true b=1)");
    }
}
