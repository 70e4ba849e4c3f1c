use anyhow::{Context, Result};
use jsonschema::validator_for;
use schemars::schema::RootSchema;
use serde_json::Value;

/// Deserialize a JSON value into a `RootSchema`, after checking that it
/// compiles as a JSON Schema.
pub fn load_root_schema(value: &Value) -> Result<RootSchema> {
    validator_for(value).context("failed to compile JSON schema")?;
    serde_json::from_value(value.clone()).context("schema is not a valid JSON Schema document")
}
