use thiserror::Error;

use crate::domain::ValueType;

/// Misuse of a form controller or wizard by the embedding code.
///
/// User input problems never surface here; they live in each field's
/// error list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{key}' holds a {expected}, got a {found}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("field '{key}' only accepts finite numbers")]
    NonFiniteNumber { key: String },
    #[error("field '{key}' cannot be read from {found}")]
    InvalidJson { key: String, found: String },
    #[error("step {index} is out of range (form has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },
}
