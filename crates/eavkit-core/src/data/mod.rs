//! Entity instances and their stored values.

mod store;


pub use store::MemoryStore;

use crate::value::{Value, ValueTypeError};
use derive_more::{Display, From};
use eavkit_schema::node::{Attribute, Family};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;
use time::OffsetDateTime;

///
/// DataId
/// identity assigned by the store on first insert
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct DataId(u64);

impl DataId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// DataError
///

#[derive(Debug, ThisError)]
pub enum DataError {
    #[error("attribute '{attribute}' does not belong to family '{family}'")]
    UnknownAttribute { family: String, attribute: String },

    #[error("attribute '{attribute}': {source}")]
    TypeMismatch {
        attribute: String,
        source: ValueTypeError,
    },

    #[error("attribute '{attribute}' holds a single value")]
    SingleValued { attribute: String },
}

///
/// StoredValue
/// one value row: (data, attribute, position) -> payload
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoredValue<'a> {
    pub data: Option<DataId>,
    pub attribute: &'a str,
    pub position: usize,
    pub value: &'a Value,
}

///
/// Data
///
/// One entity instance. Its family is fixed at construction; values are
/// kept per attribute code, in insertion order for multiple attributes.
///

#[derive(Clone, Debug)]
pub struct Data {
    id: Option<DataId>,
    family: Arc<Family>,
    values: BTreeMap<String, Vec<Value>>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl Data {
    /// Fresh, unsaved instance of `family`.
    #[must_use]
    pub fn new(family: Arc<Family>) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            id: None,
            family,
            values: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<DataId> {
        self.id
    }

    pub(crate) const fn assign_id(&mut self, id: DataId) {
        self.id = Some(id);
    }

    #[must_use]
    pub const fn family(&self) -> &Arc<Family> {
        &self.family
    }

    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Persistence-side hook: mark the instance as modified at `now`.
    pub const fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    /// Replace all values of an attribute with a single value.
    pub fn set(&mut self, code: &str, value: impl Into<Value>) -> Result<(), DataError> {
        let attribute = self.resolve(code)?;
        let value = coerce(&attribute, value.into())?;
        self.values.insert(code.to_string(), vec![value]);

        Ok(())
    }

    /// Append a value; single attributes accept only their first value.
    pub fn push(&mut self, code: &str, value: impl Into<Value>) -> Result<(), DataError> {
        let attribute = self.resolve(code)?;
        let value = coerce(&attribute, value.into())?;
        let slot = self.values.entry(code.to_string()).or_default();

        if !attribute.is_multiple() && !slot.is_empty() {
            return Err(DataError::SingleValued {
                attribute: code.to_string(),
            });
        }
        slot.push(value);

        Ok(())
    }

    /// Drop every value of an attribute.
    pub fn clear(&mut self, code: &str) -> Result<(), DataError> {
        self.resolve(code)?;
        self.values.remove(code);

        Ok(())
    }

    /// First value of an attribute.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.values(code).first()
    }

    #[must_use]
    pub fn values(&self, code: &str) -> &[Value] {
        self.values.get(code).map_or(&[], Vec::as_slice)
    }

    /// Value rows in (attribute, position) order.
    pub fn stored_values(&self) -> impl Iterator<Item = StoredValue<'_>> {
        self.values.iter().flat_map(move |(code, values)| {
            values
                .iter()
                .enumerate()
                .map(move |(position, value)| StoredValue {
                    data: self.id,
                    attribute: code,
                    position,
                    value,
                })
        })
    }

    fn resolve(&self, code: &str) -> Result<Arc<Attribute>, DataError> {
        self.family
            .attribute(code)
            .cloned()
            .ok_or_else(|| DataError::UnknownAttribute {
                family: self.family.code().to_string(),
                attribute: code.to_string(),
            })
    }
}

fn coerce(attribute: &Attribute, value: Value) -> Result<Value, DataError> {
    value
        .coerce_for(attribute)
        .map_err(|source| DataError::TypeMismatch {
            attribute: attribute.code().to_string(),
            source,
        })
}
