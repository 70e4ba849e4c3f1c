use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use super::{
    error::SchemaError,
    schema::{FieldDescriptor, FormSchema},
    value::FieldValue,
};

/// Collects field descriptors and checks them when [`build`](Self::build)
/// is called.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    title: Option<String>,
    description: Option<String>,
    fields: IndexMap<String, FieldDescriptor>,
    duplicate: Option<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.push(key.into(), descriptor);
        self
    }

    pub fn build(self) -> Result<FormSchema, SchemaError> {
        if let Some(key) = self.duplicate {
            return Err(SchemaError::DuplicateKey(key));
        }
        for (key, descriptor) in &self.fields {
            check_descriptor(key, descriptor, &self.fields)?;
        }
        check_nesting(&self.fields)?;
        debug!(fields = self.fields.len(), "form schema built");
        Ok(FormSchema {
            title: self.title,
            description: self.description,
            fields: self.fields,
        })
    }

    fn push(&mut self, key: String, descriptor: FieldDescriptor) {
        if self.fields.contains_key(&key) {
            self.duplicate.get_or_insert(key);
            return;
        }
        self.fields.insert(key, descriptor);
    }
}

/// Build a schema from `(key, descriptor)` pairs.
pub fn create_form_schema<I, K>(fields: I) -> Result<FormSchema, SchemaError>
where
    I: IntoIterator<Item = (K, FieldDescriptor)>,
    K: Into<String>,
{
    fields
        .into_iter()
        .fold(SchemaBuilder::new(), |builder, (key, descriptor)| {
            builder.field(key, descriptor)
        })
        .build()
}

fn check_descriptor(
    key: &str,
    descriptor: &FieldDescriptor,
    fields: &IndexMap<String, FieldDescriptor>,
) -> Result<(), SchemaError> {
    if key.is_empty() {
        return Err(SchemaError::EmptyKey);
    }

    let kind = descriptor.kind();
    if kind.has_options() {
        if descriptor.options.is_empty() {
            return Err(SchemaError::MissingOptions {
                key: key.to_string(),
                kind,
            });
        }
        let mut seen = HashSet::new();
        for option in &descriptor.options {
            if !seen.insert(option.value.as_str()) {
                return Err(SchemaError::DuplicateOption {
                    key: key.to_string(),
                    value: option.value.clone(),
                });
            }
        }
    }

    if let (Some(min), Some(max)) = (descriptor.min, descriptor.max)
        && min > max
    {
        return Err(SchemaError::InvalidBounds {
            key: key.to_string(),
            min,
            max,
        });
    }

    if let Some(default) = &descriptor.default_value {
        check_default(key, descriptor, default)?;
    }

    for dependency in &descriptor.depends_on {
        if dependency == key {
            return Err(SchemaError::SelfDependency(key.to_string()));
        }
        if !fields.contains_key(dependency) {
            return Err(SchemaError::UnknownDependency {
                key: key.to_string(),
                dependency: dependency.clone(),
            });
        }
    }

    Ok(())
}

// `a` and `a.b` would both claim the `a` slot of the nested JSON.
fn check_nesting(fields: &IndexMap<String, FieldDescriptor>) -> Result<(), SchemaError> {
    for child in fields.keys() {
        let mut end = child.len();
        while let Some(dot) = child[..end].rfind('.') {
            let parent = &child[..dot];
            if fields.contains_key(parent) {
                return Err(SchemaError::NestedKey {
                    parent: parent.to_string(),
                    child: child.clone(),
                });
            }
            end = dot;
        }
    }
    Ok(())
}

fn check_default(
    key: &str,
    descriptor: &FieldDescriptor,
    default: &FieldValue,
) -> Result<(), SchemaError> {
    let expected = descriptor.kind().value_type();
    let found = default.value_type();
    if expected != found {
        return Err(SchemaError::DefaultTypeMismatch {
            key: key.to_string(),
            expected,
            found,
        });
    }

    if let FieldValue::Number(Some(number)) = default
        && !number.is_finite()
    {
        return Err(SchemaError::InvalidDefault {
            key: key.to_string(),
            kind: descriptor.kind(),
        });
    }

    let outside = match default {
        FieldValue::Text(value) if descriptor.kind().has_options() && !value.is_empty() => {
            (!descriptor.has_option(value)).then(|| value.clone())
        }
        FieldValue::List(values) => values
            .iter()
            .find(|value| !descriptor.has_option(value))
            .cloned(),
        _ => None,
    };
    match outside {
        Some(value) => Err(SchemaError::DefaultNotInOptions {
            key: key.to_string(),
            value,
        }),
        None => Ok(()),
    }
}
