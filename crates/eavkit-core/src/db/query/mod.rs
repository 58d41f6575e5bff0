//! Engine-agnostic EAV query composition.
//!
//! An [`EavQueryBuilder`] is bound to one family and one root alias. Leaves
//! come from [`AttributeQueryBuilder`]s, groups from `and`/`or`, and a
//! [`QueryHandler`] turns the finished tree into an engine-native query.

pub mod builder;
mod error;
pub mod handler;
pub mod predicate;

pub use builder::{AttributeQueryBuilder, BuildState, Condition, EavQueryBuilder};
pub use error::QueryError;
pub use handler::{QueryHandler, ValueJoin};
pub use predicate::{CompareOp, JoinAlias, Operand, Predicate, PredicateLeaf};
