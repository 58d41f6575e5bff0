//! Row-level evaluation with EAV join semantics.
//!
//! A binding assigns each join alias either one stored value or nothing
//! (the LEFT JOIN found no row). A leaf over a missing value is unknown and,
//! with no negation node in the tree, unknown can be treated as false at
//! every level.

use super::{CompareOp, JoinAlias, Operand, Predicate, PredicateLeaf};
use crate::value::{TextOp, Value};
use std::cmp::Ordering;

///
/// Binding
///

pub trait Binding {
    fn value(&self, alias: &JoinAlias) -> Option<&Value>;
}

impl Binding for std::collections::BTreeMap<JoinAlias, Option<&Value>> {
    fn value(&self, alias: &JoinAlias) -> Option<&Value> {
        self.get(alias).copied().flatten()
    }
}

#[must_use]
pub fn eval<B: Binding + ?Sized>(predicate: &Predicate, binding: &B) -> bool {
    match predicate {
        Predicate::Leaf(leaf) => eval_leaf(leaf, binding),
        Predicate::And(children) => children.iter().all(|child| eval(child, binding)),
        Predicate::Or(children) => children.iter().any(|child| eval(child, binding)),
    }
}

fn eval_leaf<B: Binding + ?Sized>(leaf: &PredicateLeaf, binding: &B) -> bool {
    let actual = binding.value(&leaf.alias);

    match (leaf.op, actual) {
        (CompareOp::IsNull, actual) => actual.is_none(),
        (CompareOp::IsNotNull, actual) => actual.is_some(),
        (_, None) => false,
        (op, Some(actual)) => compare(op, actual, &leaf.operand),
    }
}

fn compare(op: CompareOp, actual: &Value, operand: &Operand) -> bool {
    match (op, operand) {
        (CompareOp::Eq, Operand::Single(v)) => actual.eq_same(v),
        (CompareOp::Ne, Operand::Single(v)) => actual.cmp_same(v).is_some_and(Ordering::is_ne),
        (CompareOp::Lt, Operand::Single(v)) => actual.cmp_same(v).is_some_and(Ordering::is_lt),
        (CompareOp::Lte, Operand::Single(v)) => actual.cmp_same(v).is_some_and(Ordering::is_le),
        (CompareOp::Gt, Operand::Single(v)) => actual.cmp_same(v).is_some_and(Ordering::is_gt),
        (CompareOp::Gte, Operand::Single(v)) => actual.cmp_same(v).is_some_and(Ordering::is_ge),
        (CompareOp::Between, Operand::Range(lo, hi)) => {
            actual.cmp_same(lo).is_some_and(Ordering::is_ge)
                && actual.cmp_same(hi).is_some_and(Ordering::is_le)
        }
        (CompareOp::In, Operand::List(items)) => items.iter().any(|v| actual.eq_same(v)),
        (CompareOp::NotIn, Operand::List(items)) => items.iter().all(|v| {
            actual
                .cmp_same(v)
                .is_some_and(Ordering::is_ne)
        }),
        (CompareOp::Contains, Operand::Single(v)) => actual.text_matches(v, TextOp::Contains),
        (CompareOp::StartsWith, Operand::Single(v)) => actual.text_matches(v, TextOp::StartsWith),
        (CompareOp::EndsWith, Operand::Single(v)) => actual.text_matches(v, TextOp::EndsWith),
        // shapes are fixed by the attribute builder
        _ => false,
    }
}
