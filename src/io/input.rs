use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use super::{
    DocumentFormat,
    document::{FormDocument, LoadedForm},
};

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Parse and check a form document.
pub fn load_form_document(contents: &str, format: DocumentFormat) -> Result<LoadedForm> {
    let value = parse_document_str(contents, format)?;
    load_form_value(&value)
}

pub fn load_form_value(value: &Value) -> Result<LoadedForm> {
    let document: FormDocument =
        serde_json::from_value(value.clone()).context("document is not a valid form document")?;
    let form = document.build().context("form document failed validation")?;
    debug!(
        fields = form.schema.len(),
        steps = form.steps.len(),
        "form document loaded"
    );
    Ok(form)
}
