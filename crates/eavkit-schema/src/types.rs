use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error as ThisError;

///
/// Cardinality
/// how many stored values an attribute owns per data instance
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    #[display("one")]
    One,
    #[display("many")]
    Many,
}

///
/// AttributeType
///
/// Declared value type of an attribute. Decides which operand variants a
/// predicate accepts, which operators apply, and which value column the
/// storage layer reads.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
#[remain::sorted]
pub enum AttributeType {
    #[display("bool")]
    Bool,
    #[display("date")]
    Date,
    #[display("datetime")]
    DateTime,
    #[display("enum")]
    Enum,
    #[display("float")]
    Float,
    #[display("int")]
    Int,
    #[display("reference")]
    Reference,
    #[display("text")]
    Text,
}

impl AttributeType {
    pub const ALL: [Self; 8] = [
        Self::Bool,
        Self::Date,
        Self::DateTime,
        Self::Enum,
        Self::Float,
        Self::Int,
        Self::Reference,
        Self::Text,
    ];

    // ordering comparisons and ranges
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        matches!(
            self,
            Self::Date | Self::DateTime | Self::Float | Self::Int | Self::Text
        )
    }

    // contains / starts_with / ends_with
    #[must_use]
    pub const fn supports_text_search(self) -> bool {
        matches!(self, Self::Text)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Int)
    }

    /// Form widget used when the attribute does not override it.
    #[must_use]
    pub const fn default_form_type(self) -> &'static str {
        match self {
            Self::Bool => "checkbox",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Enum => "choice",
            Self::Float => "number",
            Self::Int => "integer",
            Self::Reference => "data_selector",
            Self::Text => "text",
        }
    }
}

///
/// ParseTypeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("unknown attribute type '{0}'")]
pub struct ParseTypeError(pub String);

impl FromStr for AttributeType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseTypeError(s.to_string()))
    }
}
