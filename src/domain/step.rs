use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{error::SchemaError, schema::FormSchema};

/// Named, ordered subset of a schema's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormStep {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<String>,
}

impl FormStep {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>) -> Self {
        self.fields.push(key.into());
        self
    }

    pub fn fields<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.fields.extend(keys.into_iter().map(Into::into));
        self
    }
}

/// Steps checked against the schema they group.
#[derive(Debug, Clone)]
pub struct FormSteps {
    steps: Vec<FormStep>,
}

impl FormSteps {
    pub fn new(schema: &FormSchema, steps: Vec<FormStep>) -> Result<Self, SchemaError> {
        if steps.is_empty() {
            return Err(SchemaError::NoSteps);
        }
        let mut ids = HashSet::new();
        for step in &steps {
            if !ids.insert(step.id.as_str()) {
                return Err(SchemaError::DuplicateStep(step.id.clone()));
            }
            if let Some(field) = step.fields.iter().find(|key| !schema.contains(key)) {
                return Err(SchemaError::UnknownStepField {
                    step: step.id.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(Self { steps })
    }

    pub fn get(&self, index: usize) -> Option<&FormStep> {
        self.steps.get(index)
    }

    pub fn as_slice(&self) -> &[FormStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the first step listing `key`.
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.fields.iter().any(|field| field == key))
    }
}
