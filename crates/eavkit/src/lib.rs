//! ## Crate layout
//! - `core`: values, data instances, the EAV query builder with its SQL and
//!   in-memory handlers, form planning, and metrics.
//! - `schema`: attribute types, families, the registry, and TOML config.
//! - `error`: the public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module is what query-building code usually needs.

pub use eavkit_core as core;
pub use eavkit_schema as schema;

pub mod error;

pub use error::Error;

use eavkit_schema::{config::SchemaConfig, registry::FamilyRegistry};
use std::path::Path;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse family definitions from TOML and build a validated registry.
pub fn registry_from_toml(source: &str) -> Result<FamilyRegistry, Error> {
    let config = SchemaConfig::from_toml_str(source).map_err(eavkit_schema::Error::from)?;

    Ok(config.into_registry()?)
}

/// Same as [`registry_from_toml`], reading the definitions from a file.
pub fn registry_from_path(path: impl AsRef<Path>) -> Result<FamilyRegistry, Error> {
    let config = SchemaConfig::from_path(path).map_err(eavkit_schema::Error::from)?;

    Ok(config.into_registry()?)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        data::{Data, DataId, MemoryStore},
        db::{
            memory::MemoryHandler,
            query::{AttributeQueryBuilder, CompareOp, Condition, EavQueryBuilder, QueryHandler},
            sql::{SqlConfig, SqlHandler},
        },
        value::Value,
    };
    pub use crate::schema::prelude::*;
}
