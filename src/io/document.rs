use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    domain::{
        FieldDescriptor, FieldKind, FieldValue, FormSchema, FormStep, FormSteps, SchemaError,
        SelectOption,
    },
    form::{FormController, FormOptions, FormWizard},
    schema::label_for_key,
    validation::{self, Validator},
};

/// Serialized form: fields with declarative validators, optional steps and
/// controller options.
#[derive(Debug, Clone, Deserialize)]
pub struct FormDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDocument>,
    #[serde(default)]
    pub steps: Vec<FormStep>,
    #[serde(default)]
    pub options: FormOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDocument {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validators: Vec<RuleDocument>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub rows: Option<u16>,
    #[serde(default)]
    pub accept: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// Declarative validator, e.g. `{"rule": "min_length", "value": 3}`.
/// Custom rules have no serialized form.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleDocument {
    Required {
        message: Option<String>,
    },
    MinLength {
        value: usize,
        message: Option<String>,
    },
    MaxLength {
        value: usize,
        message: Option<String>,
    },
    Min {
        value: f64,
        message: Option<String>,
    },
    Max {
        value: f64,
        message: Option<String>,
    },
    Email {
        message: Option<String>,
    },
    Url {
        message: Option<String>,
    },
    Pattern {
        regex: String,
        message: String,
    },
}

impl RuleDocument {
    fn into_validator(self, key: &str) -> Result<Validator, SchemaError> {
        let (validator, message) = match self {
            RuleDocument::Required { message } => (validation::required(), message),
            RuleDocument::MinLength { value, message } => (validation::min_length(value), message),
            RuleDocument::MaxLength { value, message } => (validation::max_length(value), message),
            RuleDocument::Min { value, message } => (validation::min(value), message),
            RuleDocument::Max { value, message } => (validation::max(value), message),
            RuleDocument::Email { message } => (validation::email(), message),
            RuleDocument::Url { message } => (validation::url(), message),
            RuleDocument::Pattern { regex, message } => {
                let compiled = Regex::new(&regex).map_err(|source| SchemaError::InvalidPattern {
                    key: key.to_string(),
                    pattern: regex.clone(),
                    source,
                })?;
                (validation::pattern(compiled, message), None)
            }
        };
        Ok(match message {
            Some(message) => validator.with_message(message),
            None => validator,
        })
    }
}

impl FieldDocument {
    fn into_descriptor(self, key: &str) -> Result<FieldDescriptor, SchemaError> {
        let label = self.label.unwrap_or_else(|| label_for_key(key));
        let mut descriptor = FieldDescriptor::new(self.kind, label);
        descriptor.description = self.description;
        descriptor.placeholder = self.placeholder;
        descriptor.required = self.required;
        descriptor.options = self.options;
        descriptor.min = self.min;
        descriptor.max = self.max;
        descriptor.max_length = self.max_length;
        descriptor.rows = self.rows;
        descriptor.accept = self.accept;
        descriptor.depends_on = self.depends_on;
        descriptor.validators = self
            .validators
            .into_iter()
            .map(|rule| rule.into_validator(key))
            .collect::<Result<_, _>>()?;
        if let Some(raw) = self.default_value {
            let value = FieldValue::from_json(self.kind, &raw).ok_or_else(|| {
                SchemaError::InvalidDefault {
                    key: key.to_string(),
                    kind: self.kind,
                }
            })?;
            descriptor.default_value = Some(value);
        }
        Ok(descriptor)
    }
}

impl FormDocument {
    /// Check the document the same way hand-built schemas are checked.
    pub fn build(self) -> Result<LoadedForm, SchemaError> {
        let mut builder = FormSchema::builder();
        if let Some(title) = self.title {
            builder = builder.title(title);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        for (key, field) in self.fields {
            let descriptor = field.into_descriptor(&key)?;
            builder = builder.field(key, descriptor);
        }
        let schema = builder.build()?;
        if !self.steps.is_empty() {
            FormSteps::new(&schema, self.steps.clone())?;
        }
        Ok(LoadedForm {
            schema,
            steps: self.steps,
            options: self.options,
        })
    }
}

/// A checked form document, ready to mount.
#[derive(Debug, Clone)]
pub struct LoadedForm {
    pub schema: FormSchema,
    pub steps: Vec<FormStep>,
    pub options: FormOptions,
}

impl LoadedForm {
    pub fn into_controller(self) -> FormController {
        FormController::new(self.schema).with_options(self.options)
    }

    /// Mount a wizard over the document's steps. Fails when the document
    /// declares none.
    pub fn into_wizard(self) -> Result<FormWizard, SchemaError> {
        let controller = FormController::new(self.schema).with_options(self.options);
        FormWizard::new(controller, self.steps)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_validators_from_rule_documents() {
        let doc: FormDocument = serde_json::from_value(json!({
            "fields": {
                "sku": {
                    "type": "text",
                    "validators": [
                        {"rule": "pattern", "regex": "^[A-Z]+$", "message": "Uppercase only"},
                        {"rule": "max_length", "value": 4, "message": "Too long"}
                    ]
                }
            }
        }))
        .unwrap();
        let form = doc.build().unwrap();
        let descriptor = form.schema.get("sku").unwrap();
        assert_eq!(descriptor.label, "Sku");
        assert_eq!(descriptor.validators.len(), 2);
        assert_eq!(descriptor.validators[1].message(), Some("Too long"));
    }

    #[test]
    fn invalid_patterns_fail_the_build() {
        let doc: FormDocument = serde_json::from_value(json!({
            "fields": {
                "code": {
                    "type": "text",
                    "validators": [{"rule": "pattern", "regex": "([a-z", "message": "x"}]
                }
            }
        }))
        .unwrap();
        assert!(matches!(
            doc.build(),
            Err(SchemaError::InvalidPattern { ref key, .. }) if key == "code"
        ));
    }

    #[test]
    fn defaults_must_fit_the_field_type() {
        let doc: FormDocument = serde_json::from_value(json!({
            "fields": {"age": {"type": "number", "defaultValue": "ten"}}
        }))
        .unwrap();
        assert!(matches!(doc.build(), Err(SchemaError::InvalidDefault { .. })));
    }
}
