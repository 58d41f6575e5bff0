use crate::{error::ErrorTree, node::Family, validate::validate_registry};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("family '{code}' is already registered")]
    DuplicateFamily { code: String },

    #[error("missing family '{code}'")]
    MissingFamily { code: String },
}

///
/// FamilyRegistry
///
/// Read-only lookup of families by code. Built once at startup (by hand or
/// from config) and then shared.
///

#[derive(Clone, Debug, Default)]
pub struct FamilyRegistry {
    families: BTreeMap<String, Arc<Family>>,
}

impl FamilyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, family: Family) -> Result<Arc<Family>, RegistryError> {
        let code = family.code().to_string();
        if self.families.contains_key(&code) {
            return Err(RegistryError::DuplicateFamily { code });
        }

        let family = Arc::new(family);
        self.families.insert(code, Arc::clone(&family));
        tracing::debug!(family = family.code(), "registered family");

        Ok(family)
    }

    pub fn family(&self, code: &str) -> Result<&Arc<Family>, RegistryError> {
        self.families
            .get(code)
            .ok_or_else(|| RegistryError::MissingFamily {
                code: code.to_string(),
            })
    }

    #[must_use]
    pub fn has_family(&self, code: &str) -> bool {
        self.families.contains_key(code)
    }

    /// Families sorted by code.
    pub fn families(&self) -> impl Iterator<Item = &Arc<Family>> {
        self.families.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    /// Direct children of `code`.
    pub fn children<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Arc<Family>> + 'a {
        self.families
            .values()
            .filter(move |family| family.parent() == Some(code))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Check cross-family invariants (parents and reference targets).
    pub fn validate(&self) -> Result<(), ErrorTree> {
        validate_registry(self).result()
    }
}
