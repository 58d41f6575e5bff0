//! SQL text engine.
//!
//! Translates a predicate tree into one `SELECT DISTINCT` over the data
//! table with a LEFT JOIN of the value table per referenced attribute. All
//! operands travel as named parameters (`:p0`, `:p1`, ...); nothing from a
//! value is ever spliced into the SQL text.

mod config;
mod handler;
mod query;

#[cfg(test)]
mod tests;

pub use config::SqlConfig;
pub use handler::SqlHandler;
pub use query::{SqlJoin, SqlQuery, SqlStatement};
