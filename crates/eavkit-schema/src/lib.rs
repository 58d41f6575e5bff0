//! Declarative side of eavkit: attribute types, attributes, families, the
//! family registry and the TOML configuration that feeds it.
//!
//! Nothing here knows how values are stored or queried; `eavkit-core` builds
//! on these definitions.

pub mod config;
pub mod error;
pub mod node;
pub mod registry;
pub mod types;
pub mod validate;

/// Maximum length for family and attribute codes.
pub const MAX_CODE_LEN: usize = 64;

use crate::{config::ConfigError, error::ErrorTree, registry::RegistryError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        node::{Attribute, Family, FamilyBuilder},
        registry::FamilyRegistry,
        types::{AttributeType, Cardinality},
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("validation failed:\n{0}")]
    Validation(ErrorTree),
}
