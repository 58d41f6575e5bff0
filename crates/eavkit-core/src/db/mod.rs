//! Query composition and the storage engines that translate it.
//!
//! `query` is engine-agnostic: it owns the predicate tree, the builders and
//! the `QueryHandler` contract. `sql` and `memory` are the two handlers.

pub mod memory;
pub mod query;
pub mod sql;
