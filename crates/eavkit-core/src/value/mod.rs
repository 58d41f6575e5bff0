mod compare;


use crate::data::DataId;
use derive_more::Display;
use eavkit_schema::{node::Attribute, types::AttributeType};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;
use time::{Date, OffsetDateTime};

// re-exports
pub use compare::TextOp;

///
/// Value
///
/// Tagged payload of one stored value or one predicate operand. Every
/// attribute type maps to exactly one variant; `List` only appears as an
/// operand shape and `Null` only as the absence of a stored value.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[remain::sorted]
pub enum Value {
    Bool(bool),
    Date(Date),
    DateTime(OffsetDateTime),
    Enum(String),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Null,
    Reference(DataId),
    Text(String),
}

///
/// ValueKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum ValueKind {
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
    #[display("list")]
    List,
    #[display("null")]
    Null,
    #[display("reference")]
    Reference,
    #[display("text")]
    Text,
}

///
/// ValueTypeError
/// a value whose variant does not fit the attribute's declared type
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("expected {expected}, found {found}")]
pub struct ValueTypeError {
    pub expected: String,
    pub found: ValueKind,
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Date(_) => ValueKind::Date,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Enum(_) => ValueKind::Enum,
            Self::Float(_) => ValueKind::Float,
            Self::Int(_) => ValueKind::Int,
            Self::List(_) => ValueKind::List,
            Self::Null => ValueKind::Null,
            Self::Reference(_) => ValueKind::Reference,
            Self::Text(_) => ValueKind::Text,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Check this value against the attribute's declared type and return
    /// its canonical form.
    ///
    /// Two coercions apply: ints widen to floats, and text naming a declared
    /// choice becomes an enum value. Everything else must match exactly.
    pub fn coerce_for(self, attribute: &Attribute) -> Result<Self, ValueTypeError> {
        let ty = attribute.ty();

        match (ty, self) {
            (AttributeType::Bool, v @ Self::Bool(_))
            | (AttributeType::Date, v @ Self::Date(_))
            | (AttributeType::DateTime, v @ Self::DateTime(_))
            | (AttributeType::Int, v @ Self::Int(_))
            | (AttributeType::Reference, v @ Self::Reference(_))
            | (AttributeType::Text, v @ Self::Text(_)) => Ok(v),

            (AttributeType::Float, Self::Float(f)) if !f.is_nan() => Ok(Self::Float(f)),
            #[allow(clippy::cast_precision_loss)]
            (AttributeType::Float, Self::Int(i)) => Ok(Self::Float(i as f64)),

            (AttributeType::Enum, Self::Enum(s) | Self::Text(s)) if attribute.has_choice(&s) => {
                Ok(Self::Enum(s))
            }

            (_, other) => Err(ValueTypeError {
                expected: expected_label(attribute),
                found: other.kind(),
            }),
        }
    }
}

fn expected_label(attribute: &Attribute) -> String {
    match attribute.ty() {
        AttributeType::Enum => format!("enum({})", attribute.choices().join("|")),
        ty => ty.to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Enum(s) => write!(f, "{s}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Null => write!(f, "null"),
            Self::Reference(id) => write!(f, "#{id}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

//
// From impls
//

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<DataId> for Value {
    fn from(value: DataId) -> Self {
        Self::Reference(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}
