//! In-memory engine.
//!
//! Runs the same LEFT JOIN semantics as the SQL engine directly against a
//! [`MemoryStore`](crate::data::MemoryStore), which makes it the reference
//! the SQL output is checked against.

mod handler;


pub use handler::{MemoryHandler, MemoryQuery};
