use crate::value::Value;
use derive_more::Display;
use eavkit_schema::node::Attribute;
use std::{fmt, sync::Arc};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum CompareOp {
    #[display("between")]
    Between,
    #[display("contains")]
    Contains,
    #[display("ends_with")]
    EndsWith,
    #[display("=")]
    Eq,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
    #[display("in")]
    In,
    #[display("is_not_null")]
    IsNotNull,
    #[display("is_null")]
    IsNull,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display("<>")]
    Ne,
    #[display("not_in")]
    NotIn,
    #[display("starts_with")]
    StartsWith,
}

///
/// Operand
/// right-hand side of a leaf, already coerced to the attribute's type
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    None,
    Single(Value),
    Range(Value, Value),
    List(Vec<Value>),
}

///
/// JoinAlias
/// name under which one attribute's value rows are joined
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct JoinAlias(String);

impl JoinAlias {
    #[must_use]
    pub(crate) fn for_attribute(root: &str, attribute: &Attribute) -> Self {
        Self(format!("{root}_{}", attribute.code()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

///
/// PredicateLeaf
///

#[derive(Clone, Debug, PartialEq)]
pub struct PredicateLeaf {
    pub attribute: Arc<Attribute>,
    pub op: CompareOp,
    pub operand: Operand,
    pub alias: JoinAlias,
}

///
/// Predicate
///
/// Boolean tree over attribute leaves. Groups keep exactly the nesting they
/// were built with; nothing here flattens or reorders children.
///
/// `And([])` is the tautology and `Or([])` the contradiction, so folding a
/// filtered list of conditions never needs a special case.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Leaf(PredicateLeaf),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl Predicate {
    #[must_use]
    pub const fn tautology() -> Self {
        Self::And(Vec::new())
    }

    #[must_use]
    pub const fn contradiction() -> Self {
        Self::Or(Vec::new())
    }

    #[must_use]
    pub fn is_tautology(&self) -> bool {
        matches!(self, Self::And(children) if children.is_empty())
    }

    #[must_use]
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::Or(children) if children.is_empty())
    }

    /// Leaves in depth-first, left-to-right order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&PredicateLeaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);

        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a PredicateLeaf>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Distinct join aliases in first-reference order.
    #[must_use]
    pub fn join_aliases(&self) -> Vec<&JoinAlias> {
        let mut out: Vec<&JoinAlias> = Vec::new();
        for leaf in self.leaves() {
            if !out.contains(&&leaf.alias) {
                out.push(&leaf.alias);
            }
        }

        out
    }
}

impl fmt::Display for PredicateLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.attribute.code();

        match (&self.operand, self.op) {
            (Operand::None, op) => write!(f, "{code} {op}"),
            (Operand::Single(v), op) => write!(f, "{code} {op} {v}"),
            (Operand::Range(lo, hi), op) => write!(f, "{code} {op} {lo} and {hi}"),
            (Operand::List(items), op) => write!(f, "{code} {op} {}", Value::List(items.clone())),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{leaf}"),
            Self::And(children) if children.is_empty() => write!(f, "true"),
            Self::Or(children) if children.is_empty() => write!(f, "false"),
            Self::And(children) | Self::Or(children) => {
                let sep = if matches!(self, Self::And(_)) { " AND " } else { " OR " };
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{sep}")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
