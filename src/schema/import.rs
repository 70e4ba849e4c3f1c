use anyhow::{Context, Result, bail};
use regex::Regex;
use schemars::schema::{ArrayValidation, InstanceType, ObjectValidation, SchemaObject, SingleOrVec};
use serde_json::Value;
use tracing::debug;

use crate::{
    domain::{FieldDescriptor, FieldKind, FieldValue, FormSchema, SelectOption},
    validation,
};

use super::{
    loader::load_root_schema,
    metadata::{extension_string, label_for_key},
    resolver::SchemaResolver,
};

/// Derive a form schema from a JSON Schema object.
///
/// Nested object properties flatten into dotted keys. Strings with
/// `format: email|uri` become email/url fields, `enum`s become selects and
/// arrays of enums multiselects; `x-widget: textarea|file` picks the other
/// kinds. `maximum`, `minimum`, `maxLength` and `maxItems` land on the
/// descriptor; `minLength`, `minItems` and `pattern` become validators.
pub fn parse_json_schema(schema_value: &Value) -> Result<FormSchema> {
    let root = load_root_schema(schema_value)?;
    let resolver = SchemaResolver::new(schema_value, &root);
    let root_object = resolver.root_object();
    if !matches!(instance_type(root_object), None | Some(InstanceType::Object)) {
        bail!("root schema must be an object");
    }
    let object = root_object
        .object
        .as_deref()
        .context("root schema must define properties")?;

    let mut fields = Vec::new();
    collect_fields(&resolver, object, "", &mut fields)?;
    debug!(fields = fields.len(), "json schema imported");

    let mut builder = FormSchema::builder();
    if let Some(meta) = root_object.metadata.as_deref() {
        if let Some(title) = &meta.title {
            builder = builder.title(title.clone());
        }
        if let Some(description) = &meta.description {
            builder = builder.description(description.clone());
        }
    }
    fields
        .into_iter()
        .fold(builder, |builder, (key, descriptor)| builder.field(key, descriptor))
        .build()
        .context("imported schema does not form a valid form")
}

fn collect_fields(
    resolver: &SchemaResolver<'_>,
    object: &ObjectValidation,
    prefix: &str,
    out: &mut Vec<(String, FieldDescriptor)>,
) -> Result<()> {
    for (name, property) in &object.properties {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        let resolved = resolver.resolve_schema(property)?;
        if let Some(nested) = nested_object(&resolved) {
            collect_fields(resolver, nested, &key, out)?;
            continue;
        }
        let descriptor =
            build_descriptor(resolver, &resolved, &key, object.required.contains(name))
                .with_context(|| format!("unsupported schema for field '{key}'"))?;
        out.push((key, descriptor));
    }
    Ok(())
}

fn nested_object(schema: &SchemaObject) -> Option<&ObjectValidation> {
    if !matches!(instance_type(schema), None | Some(InstanceType::Object)) {
        return None;
    }
    schema
        .object
        .as_deref()
        .filter(|object| !object.properties.is_empty())
}

fn build_descriptor(
    resolver: &SchemaResolver<'_>,
    schema: &SchemaObject,
    key: &str,
    required: bool,
) -> Result<FieldDescriptor> {
    let kind = detect_kind(resolver, schema)?;
    let metadata = schema.metadata.as_deref();
    let label = metadata
        .and_then(|m| m.title.clone())
        .unwrap_or_else(|| label_for_key(key));

    let mut descriptor = FieldDescriptor::new(kind, label);
    descriptor.required = required;
    descriptor.description = metadata.and_then(|m| m.description.clone());
    descriptor.placeholder = extension_string(schema, "x-placeholder");
    descriptor.options = options_for(resolver, schema, kind)?;

    if let Some(default) = metadata.and_then(|m| m.default.as_ref()) {
        let value = FieldValue::from_json(kind, default)
            .with_context(|| format!("default {default} does not fit a {kind} field"))?;
        descriptor.default_value = Some(value);
    }

    if let Some(string) = schema.string.as_deref() {
        if let Some(min) = string.min_length {
            descriptor
                .validators
                .push(validation::min_length(min as usize));
        }
        if let Some(max) = string.max_length {
            descriptor.max_length = Some(max as usize);
        }
        if let Some(pattern) = &string.pattern {
            let regex = Regex::new(pattern)
                .with_context(|| format!("invalid pattern '{pattern}'"))?;
            descriptor.validators.push(validation::pattern(
                regex,
                format!("Must match the pattern {pattern}"),
            ));
        }
    }

    if let Some(number) = schema.number.as_deref() {
        descriptor.min = number.minimum;
        descriptor.max = number.maximum;
    }

    if kind == FieldKind::Multiselect
        && let Some(array) = schema.array.as_deref()
    {
        if let Some(min) = array.min_items {
            descriptor
                .validators
                .push(validation::min_length(min as usize));
        }
        if let Some(max) = array.max_items {
            descriptor.max_length = Some(max as usize);
        }
    }

    match kind {
        FieldKind::Email => descriptor.validators.push(validation::email()),
        FieldKind::Url => descriptor.validators.push(validation::url()),
        _ => {}
    }

    Ok(descriptor)
}

fn detect_kind(resolver: &SchemaResolver<'_>, schema: &SchemaObject) -> Result<FieldKind> {
    if schema.enum_values.is_some() {
        return Ok(FieldKind::Select);
    }
    if let Some(widget) = extension_string(schema, "x-widget") {
        return match widget.as_str() {
            "textarea" => Ok(FieldKind::Textarea),
            "file" => Ok(FieldKind::File),
            other => bail!("unknown widget '{other}'"),
        };
    }

    match instance_type(schema) {
        Some(InstanceType::String) | None => Ok(match schema.format.as_deref() {
            Some("email") => FieldKind::Email,
            Some("uri") | Some("url") => FieldKind::Url,
            _ => FieldKind::Text,
        }),
        Some(InstanceType::Integer) | Some(InstanceType::Number) => Ok(FieldKind::Number),
        Some(InstanceType::Boolean) => Ok(FieldKind::Checkbox),
        Some(InstanceType::Array) => {
            let array = schema
                .array
                .as_deref()
                .context("array schema must define items")?;
            let items = resolve_array_items(resolver, array)?;
            if items.enum_values.is_some() {
                Ok(FieldKind::Multiselect)
            } else {
                bail!("only arrays of enumerated values are supported")
            }
        }
        Some(other) => bail!("unsupported field type {other:?}"),
    }
}

fn options_for(
    resolver: &SchemaResolver<'_>,
    schema: &SchemaObject,
    kind: FieldKind,
) -> Result<Vec<SelectOption>> {
    let values = match kind {
        FieldKind::Select => schema.enum_values.clone().unwrap_or_default(),
        FieldKind::Multiselect => {
            let array = schema
                .array
                .as_deref()
                .context("array schema must define items")?;
            resolve_array_items(resolver, array)?
                .enum_values
                .unwrap_or_default()
        }
        _ => return Ok(Vec::new()),
    };
    Ok(values
        .iter()
        .map(|value| {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            SelectOption::new(text.clone(), text)
        })
        .collect())
}

fn resolve_array_items(
    resolver: &SchemaResolver<'_>,
    array: &ArrayValidation,
) -> Result<SchemaObject> {
    let items = array
        .items
        .as_ref()
        .context("array schema must define items")?;
    match items {
        SingleOrVec::Single(schema) => resolver.resolve_schema(schema),
        SingleOrVec::Vec(list) => match list.first() {
            Some(first) => resolver.resolve_schema(first),
            None => bail!("tuple arrays without items are not supported"),
        },
    }
}

fn instance_type(schema: &SchemaObject) -> Option<InstanceType> {
    schema.instance_type.as_ref().and_then(|kind| match kind {
        SingleOrVec::Single(single) => Some(**single),
        SingleOrVec::Vec(items) => items
            .iter()
            .cloned()
            .find(|item| *item != InstanceType::Null),
    })
}
