use crate::{data::DataError, db::query::QueryError, form::FormError};
use eavkit_schema::registry::RegistryError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification. Every domain
/// error of the workspace converts into it, which is what callers that only
/// log or map to a status code should hold on to.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Query errors keep their structured form.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn query_error(&self) -> Option<&QueryError> {
        match &self.detail {
            Some(ErrorDetail::Query(err)) => Some(err),
            None => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Query(QueryError),
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    Conflict,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Data,
    Form,
    Query,
    Schema,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Data => "data",
            Self::Form => "form",
            Self::Query => "query",
            Self::Schema => "schema",
        };
        write!(f, "{label}")
    }
}

impl From<QueryError> for InternalError {
    fn from(err: QueryError) -> Self {
        let class = match err {
            QueryError::UnknownAttribute { .. } => ErrorClass::NotFound,
            QueryError::UnsupportedOperator { .. } => ErrorClass::Unsupported,
            QueryError::TypeMismatch { .. } | QueryError::InvalidAlias { .. } => {
                ErrorClass::InvariantViolation
            }
        };

        Self {
            class,
            origin: ErrorOrigin::Query,
            message: err.to_string(),
            detail: Some(ErrorDetail::Query(err)),
        }
    }
}

impl From<DataError> for InternalError {
    fn from(err: DataError) -> Self {
        let class = match err {
            DataError::UnknownAttribute { .. } => ErrorClass::NotFound,
            DataError::TypeMismatch { .. } => ErrorClass::InvariantViolation,
            DataError::SingleValued { .. } => ErrorClass::Conflict,
        };

        Self::new(class, ErrorOrigin::Data, err.to_string())
    }
}

impl From<FormError> for InternalError {
    fn from(err: FormError) -> Self {
        let class = match err {
            FormError::MissingFamily(_) => ErrorClass::NotFound,
            FormError::UnexpectedData { .. } => ErrorClass::InvariantViolation,
        };

        Self::new(class, ErrorOrigin::Form, err.to_string())
    }
}

impl From<eavkit_schema::Error> for InternalError {
    fn from(err: eavkit_schema::Error) -> Self {
        let (class, origin) = match &err {
            eavkit_schema::Error::Config(_) => (ErrorClass::Internal, ErrorOrigin::Config),
            eavkit_schema::Error::Registry(RegistryError::MissingFamily { .. }) => {
                (ErrorClass::NotFound, ErrorOrigin::Schema)
            }
            eavkit_schema::Error::Registry(RegistryError::DuplicateFamily { .. }) => {
                (ErrorClass::Conflict, ErrorOrigin::Schema)
            }
            eavkit_schema::Error::Validation(_) => {
                (ErrorClass::InvariantViolation, ErrorOrigin::Schema)
            }
        };

        Self::new(class, origin, err.to_string())
    }
}

impl From<RegistryError> for InternalError {
    fn from(err: RegistryError) -> Self {
        eavkit_schema::Error::from(err).into()
    }
}
