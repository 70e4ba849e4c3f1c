use thiserror::Error;

use super::{schema::FieldKind, value::ValueType};

/// Malformed schema or step declarations, reported when they are built.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field keys must not be empty")]
    EmptyKey,
    #[error("field '{0}' is declared more than once")]
    DuplicateKey(String),
    #[error("{kind} field '{key}' must declare at least one option")]
    MissingOptions { key: String, kind: FieldKind },
    #[error("field '{key}' declares option '{value}' more than once")]
    DuplicateOption { key: String, value: String },
    #[error("default value of field '{key}' is a {found}, expected a {expected}")]
    DefaultTypeMismatch {
        key: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("default value '{value}' of field '{key}' is not one of its options")]
    DefaultNotInOptions { key: String, value: String },
    #[error("default value of {kind} field '{key}' cannot be read")]
    InvalidDefault { key: String, kind: FieldKind },
    #[error("field '{key}' depends on unknown field '{dependency}'")]
    UnknownDependency { key: String, dependency: String },
    #[error("field '{0}' cannot depend on itself")]
    SelfDependency(String),
    #[error("field '{key}' has min {min} greater than max {max}")]
    InvalidBounds { key: String, min: f64, max: f64 },
    #[error("field '{child}' is nested under field '{parent}'")]
    NestedKey { parent: String, child: String },
    #[error("invalid pattern '{pattern}' on field '{key}'")]
    InvalidPattern {
        key: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("a step list must contain at least one step")]
    NoSteps,
    #[error("step '{0}' is declared more than once")]
    DuplicateStep(String),
    #[error("step '{step}' lists unknown field '{field}'")]
    UnknownStepField { step: String, field: String },
}
