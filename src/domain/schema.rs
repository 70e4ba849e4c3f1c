use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::validation::Validator;

use super::{
    builder::SchemaBuilder,
    value::{FieldValue, ValueType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Url,
    Number,
    Textarea,
    Select,
    Multiselect,
    Checkbox,
    File,
}

impl FieldKind {
    pub fn value_type(self) -> ValueType {
        match self {
            FieldKind::Text
            | FieldKind::Email
            | FieldKind::Url
            | FieldKind::Textarea
            | FieldKind::Select => ValueType::String,
            FieldKind::Number => ValueType::Number,
            FieldKind::Checkbox => ValueType::Bool,
            FieldKind::Multiselect => ValueType::StringList,
            FieldKind::File => ValueType::File,
        }
    }

    /// Value a field of this kind starts with when no default is declared.
    pub fn empty_value(self) -> FieldValue {
        match self.value_type() {
            ValueType::String => FieldValue::Text(String::new()),
            ValueType::Number => FieldValue::Number(None),
            ValueType::Bool => FieldValue::Bool(false),
            ValueType::StringList => FieldValue::List(Vec::new()),
            ValueType::File => FieldValue::File(None),
        }
    }

    pub fn has_options(self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Multiselect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Number => "number",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Multiselect => "multiselect",
            FieldKind::Checkbox => "checkbox",
            FieldKind::File => "file",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declarative description of one form field.
///
/// The kind is fixed at construction; everything else is plain data that the
/// schema builder checks once when the schema is assembled.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    kind: FieldKind,
    pub label: String,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub required: bool,
    pub validators: Vec<Validator>,
    pub default_value: Option<FieldValue>,
    pub options: Vec<SelectOption>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub max_length: Option<usize>,
    pub rows: Option<u16>,
    pub accept: Option<String>,
    /// Keys whose changes re-run this field's validators.
    pub depends_on: Vec<String>,
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            description: None,
            placeholder: None,
            required: false,
            validators: Vec::new(),
            default_value: None,
            options: Vec::new(),
            min: None,
            max: None,
            max_length: None,
            rows: None,
            accept: None,
            depends_on: Vec::new(),
        }
    }

    pub fn text(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Text, label)
    }

    pub fn email(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Email, label)
    }

    pub fn url(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Url, label)
    }

    pub fn number(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Number, label)
    }

    pub fn textarea(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Textarea, label)
    }

    pub fn select(label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self::new(FieldKind::Select, label).with_options(options)
    }

    pub fn multiselect(label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self::new(FieldKind::Multiselect, label).with_options(options)
    }

    pub fn checkbox(label: impl Into<String>) -> Self {
        Self::new(FieldKind::Checkbox, label)
    }

    pub fn file(label: impl Into<String>) -> Self {
        Self::new(FieldKind::File, label)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn rows(mut self, rows: u16) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn depends_on(mut self, key: impl Into<String>) -> Self {
        self.depends_on.push(key.into());
        self
    }

    /// True when the field is required, either by flag or by a listed
    /// `required` validator.
    pub fn is_required(&self) -> bool {
        self.required || self.validators.iter().any(Validator::is_required)
    }

    /// Value the field starts with: its declared default, or the kind's
    /// empty value.
    pub fn initial_value(&self) -> FieldValue {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.kind.empty_value())
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}

/// Immutable mapping from field key to descriptor.
///
/// Built through [`FormSchema::builder`] or
/// [`create_form_schema`](super::create_form_schema), which reject malformed
/// descriptors up front.
#[derive(Debug, Clone)]
pub struct FormSchema {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) fields: IndexMap<String, FieldDescriptor>,
}

impl FormSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldDescriptor)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keys of fields whose `depends_on` lists `key`.
    pub fn dependents_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.fields
            .iter()
            .filter(move |(_, field)| field.depends_on.iter().any(|dep| dep == key))
            .map(|(name, _)| name)
    }
}
