use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::FormValues;

use super::field::FieldStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub touched: bool,
    pub dirty: bool,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl From<&FieldStatus> for FieldSnapshot {
    fn from(status: &FieldStatus) -> Self {
        Self {
            touched: status.touched,
            dirty: status.dirty,
            is_valid: status.is_valid(),
            errors: status.errors.clone(),
        }
    }
}

/// Everything an embedding UI needs to render the form at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub values: FormValues,
    pub fields: IndexMap<String, FieldSnapshot>,
    pub is_valid: bool,
    pub is_dirty: bool,
    pub is_submitting: bool,
    pub submit_count: usize,
}
