use eavkit_schema::types::AttributeType;
use thiserror::Error as ThisError;

use super::predicate::CompareOp;

///
/// QueryError
///
/// Every variant is raised while the predicate tree is composed, before a
/// handler runs.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("attribute '{attribute}' does not belong to family '{family}'")]
    UnknownAttribute { family: String, attribute: String },

    #[error("type mismatch for attribute '{attribute}': expected {expected}, found {found}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        found: String,
    },

    #[error("operator {op} is not supported for {ty} attribute '{attribute}'")]
    UnsupportedOperator {
        attribute: String,
        op: CompareOp,
        ty: AttributeType,
    },

    #[error("invalid query alias '{alias}': {message}")]
    InvalidAlias { alias: String, message: String },
}

impl QueryError {
    /// Stable short name used in metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownAttribute { .. } => "unknown_attribute",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::UnsupportedOperator { .. } => "unsupported_operator",
            Self::InvalidAlias { .. } => "invalid_alias",
        }
    }
}
