//! Core error types.

use thiserror::Error;

/// Result type for core data-model operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the record/field data model.
///
/// These signal programmer or data errors (an accessor against the wrong
/// field kind, a malformed stored date); they are not retried.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("type mismatch on field '{code}': expected {expected}, found {actual}")]
    TypeMismatch {
        code: String,
        expected: &'static str,
        actual: String,
    },

    #[error("no such field: {code}")]
    FieldNotFound { code: String },
}

impl CoreError {
    pub fn type_mismatch(
        code: impl Into<String>,
        expected: &'static str,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            code: code.into(),
            expected,
            actual: actual.into(),
        }
    }

    pub fn field_not_found(code: impl Into<String>) -> Self {
        Self::FieldNotFound { code: code.into() }
    }
}
