//! Random boolean formula generation shared by the property suites.

use proptest::prelude::*;
use tactix_core::ast::{TermId, TermManager};
use tactix_core::model::{Model, Value};

/// Variable pool every generated formula draws from.
pub const POOL: [&str; 4] = ["a", "b", "c", "d"];

/// Formula skeleton; interned into a manager per test case.
#[derive(Debug, Clone)]
pub enum Shape {
    T,
    F,
    V(usize),
    Not(Box<Shape>),
    And(Vec<Shape>),
    Or(Vec<Shape>),
    Xor(Box<Shape>, Box<Shape>),
    Iff(Box<Shape>, Box<Shape>),
    Imp(Box<Shape>, Box<Shape>),
    Ite(Box<Shape>, Box<Shape>, Box<Shape>),
}

/// Strategy for boolean formulas a few levels deep.
pub fn shapes() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        4 => (0usize..POOL.len()).prop_map(Shape::V),
        1 => Just(Shape::T),
        1 => Just(Shape::F),
    ];
    leaf.prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::Not(Box::new(s))),
            proptest::collection::vec(inner.clone(), 1..4).prop_map(Shape::And),
            proptest::collection::vec(inner.clone(), 1..4).prop_map(Shape::Or),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Xor(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Iff(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Imp(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(c, t, e)| Shape::Ite(Box::new(c), Box::new(t), Box::new(e))),
        ]
    })
}

/// The pool variables, interned.
pub fn pool_vars(tm: &mut TermManager) -> Vec<TermId> {
    POOL.iter().map(|n| tm.mk_bool_var(n)).collect()
}

/// Interns `shape` over the variable pool.
pub fn intern(tm: &mut TermManager, vars: &[TermId], shape: &Shape) -> TermId {
    match shape {
        Shape::T => tm.mk_true(),
        Shape::F => tm.mk_false(),
        Shape::V(i) => vars[*i],
        Shape::Not(s) => {
            let x = intern(tm, vars, s);
            tm.mk_not(x).unwrap()
        }
        Shape::And(ss) => {
            let xs: Vec<_> = ss.iter().map(|s| intern(tm, vars, s)).collect();
            tm.mk_and(xs).unwrap()
        }
        Shape::Or(ss) => {
            let xs: Vec<_> = ss.iter().map(|s| intern(tm, vars, s)).collect();
            tm.mk_or(xs).unwrap()
        }
        Shape::Xor(a, b) => {
            let (a, b) = (intern(tm, vars, a), intern(tm, vars, b));
            tm.mk_xor(a, b).unwrap()
        }
        Shape::Iff(a, b) => {
            let (a, b) = (intern(tm, vars, a), intern(tm, vars, b));
            tm.mk_eq(a, b).unwrap()
        }
        Shape::Imp(a, b) => {
            let (a, b) = (intern(tm, vars, a), intern(tm, vars, b));
            tm.mk_implies(a, b).unwrap()
        }
        Shape::Ite(c, t, e) => {
            let (c, t, e) = (
                intern(tm, vars, c),
                intern(tm, vars, t),
                intern(tm, vars, e),
            );
            tm.mk_ite(c, t, e).unwrap()
        }
    }
}

/// Model assigning `bits` to the pool variables positionally.
pub fn model_for(vars: &[TermId], bits: &[bool]) -> Model {
    let mut m = Model::new();
    for (&v, &b) in vars.iter().zip(bits.iter()) {
        m.assign(v, Value::Bool(b));
    }
    m
}

/// Evaluates `t` under `model` with default completion, as a boolean.
pub fn truth(model: &Model, tm: &TermManager, t: TermId) -> bool {
    matches!(model.eval_or_default(t, tm), Value::Bool(true))
}
