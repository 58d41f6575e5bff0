mod ast;
pub mod eval;
mod ops;

#[cfg(test)]
mod tests;

pub use ast::{CompareOp, JoinAlias, Operand, Predicate, PredicateLeaf};
pub use ops::{OperandShape, OperatorClass, supports_operator};
