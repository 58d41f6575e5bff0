use eavkit_core::{
    data::DataError,
    db::query::QueryError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    form::FormError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        if let Some(query) = err.query_error() {
            return query.clone().into();
        }

        let kind = match err.class {
            ErrorClass::NotFound => ErrorKind::NotFound,
            ErrorClass::Conflict => ErrorKind::Conflict,
            ErrorClass::InvariantViolation => ErrorKind::Invalid,
            ErrorClass::Unsupported | ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        let kind = match err {
            QueryError::UnknownAttribute { .. } => QueryErrorKind::UnknownAttribute,
            QueryError::TypeMismatch { .. } => QueryErrorKind::TypeMismatch,
            QueryError::UnsupportedOperator { .. } => QueryErrorKind::UnsupportedOperator,
            QueryError::InvalidAlias { .. } => QueryErrorKind::InvalidAlias,
        };

        Self::new(ErrorKind::Query(kind), ErrorOrigin::Query, err.to_string())
    }
}

impl From<DataError> for Error {
    fn from(err: DataError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<FormError> for Error {
    fn from(err: FormError) -> Self {
        InternalError::from(err).into()
    }
}

impl From<eavkit_schema::Error> for Error {
    fn from(err: eavkit_schema::Error) -> Self {
        InternalError::from(err).into()
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),

    /// A family or attribute lookup failed.
    NotFound,

    /// Duplicate registration or a second value for a single attribute.
    Conflict,

    /// Input rejected by validation.
    Invalid,

    /// The caller cannot remediate this.
    Internal,
}

///
/// QueryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Attribute is not part of the builder's family.
    UnknownAttribute,

    /// Operand value does not fit the attribute type.
    TypeMismatch,

    /// Operator is not defined for the attribute type.
    UnsupportedOperator,

    InvalidAlias,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Data,
    Form,
    Query,
    Schema,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Data => Self::Data,
            CoreErrorOrigin::Form => Self::Form,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Schema => Self::Schema,
        }
    }
}
