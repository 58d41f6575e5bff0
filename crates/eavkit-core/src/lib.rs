//! Runtime side of eavkit: values, data instances, the engine-agnostic EAV
//! query builder with its SQL and in-memory handlers, form planning and
//! metrics.

// public exports are one module level down
pub mod data;
pub mod db;
pub mod error;
pub mod form;
pub mod obs;
pub mod value;

///
/// CONSTANTS
///

/// Root alias used when a query builder is created without one.
pub const DEFAULT_ROOT_ALIAS: &str = db::query::EavQueryBuilder::DEFAULT_ALIAS;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, handlers, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        data::{Data, DataId},
        db::query::{Condition, EavQueryBuilder, QueryHandler},
        value::Value,
    };
}
