use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::FormValues;

use super::DocumentFormat;

/// Render submitted values as a document; dotted keys become nested tables.
pub fn render_values(values: &FormValues, format: DocumentFormat, pretty: bool) -> Result<String> {
    render_value(&values.to_json(), format, pretty)
}

pub fn render_value(value: &Value, format: DocumentFormat, pretty: bool) -> Result<String> {
    match format {
        DocumentFormat::Json => {
            if pretty {
                serde_json::to_string_pretty(value).context("failed to serialize JSON")
            } else {
                serde_json::to_string(value).context("failed to serialize JSON")
            }
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let value = strip_nulls(value);
            if pretty {
                toml::to_string_pretty(&value).context("failed to serialize TOML")
            } else {
                toml::to_string(&value).context("failed to serialize TOML")
            }
        }
    }
}

// TOML has no null; empty numbers and files are left out.
#[cfg(feature = "toml")]
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, item)| !item.is_null())
                .map(|(key, item)| (key.clone(), strip_nulls(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_json() {
        let values = FormValues::new()
            .with("name", "Acme")
            .with("address.city", "Lisbon");
        let rendered = render_values(&values, DocumentFormat::Json, false).unwrap();
        assert_eq!(rendered, r#"{"name":"Acme","address":{"city":"Lisbon"}}"#);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_output_drops_empty_numbers() {
        let values = FormValues::new()
            .with("name", "Acme")
            .with("employees", Option::<f64>::None);
        let rendered = render_values(&values, DocumentFormat::Toml, false).unwrap();
        assert!(rendered.contains("name = \"Acme\""));
        assert!(!rendered.contains("employees"));
    }
}
