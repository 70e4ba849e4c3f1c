use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;
use schemars::schema::{RootSchema, Schema, SchemaObject};
use serde_json::Value;

/// Follows local `$ref`s while walking an imported JSON Schema.
#[derive(Debug)]
pub struct SchemaResolver<'a> {
    raw: &'a Value,
    root: &'a RootSchema,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(raw: &'a Value, root: &'a RootSchema) -> Self {
        Self { raw, root }
    }

    pub fn root_object(&self) -> &SchemaObject {
        &self.root.schema
    }

    pub fn resolve_schema(&self, schema: &Schema) -> Result<SchemaObject> {
        self.resolve_depth(schema, 0)
    }

    fn resolve_depth(&self, schema: &Schema, depth: usize) -> Result<SchemaObject> {
        if depth > 32 {
            bail!("$ref chain is too deep or cyclic");
        }
        match schema {
            Schema::Bool(value) => Ok(Schema::Bool(*value).into_object()),
            Schema::Object(object) => match &object.reference {
                Some(reference) => self.follow_reference(reference, depth),
                None => Ok(object.clone()),
            },
        }
    }

    fn follow_reference(&self, reference: &str, depth: usize) -> Result<SchemaObject> {
        if let Some(key) = reference.strip_prefix("#/definitions/") {
            let target = self
                .root
                .definitions
                .get(key)
                .with_context(|| format!("definition '{key}' not found"))?;
            return self.resolve_depth(target, depth + 1);
        }

        if let Some(fragment) = reference.strip_prefix('#') {
            let decoded = percent_decode_str(fragment)
                .decode_utf8()
                .context("invalid percent-encoding in $ref")?;
            let pointer = if decoded.is_empty() || decoded.starts_with('/') {
                decoded.to_string()
            } else {
                format!("/{decoded}")
            };
            let target = self
                .raw
                .pointer(&pointer)
                .with_context(|| format!("reference '{reference}' not found"))?;
            let schema: Schema = serde_json::from_value(target.clone())
                .with_context(|| format!("reference '{reference}' is not a valid schema"))?;
            return self.resolve_depth(&schema, depth + 1);
        }

        bail!("unsupported reference {reference}")
    }
}
