use schemaform::{
    io::{DocumentFormat, load_form_document, render_values},
    prelude::*,
};
use serde_json::json;

const SIGNUP: &str = r#"{
  "title": "Sign up",
  "fields": {
    "email": {
      "type": "email",
      "required": true,
      "validators": [{"rule": "email", "message": "Use a real address"}]
    },
    "plan": {
      "type": "select",
      "options": [{"value": "free", "label": "Free"}, {"value": "team", "label": "Team"}],
      "defaultValue": "free"
    },
    "seats": {
      "type": "number",
      "validators": [{"rule": "min", "value": 1}, {"rule": "max", "value": 50}]
    }
  },
  "steps": [
    {"id": "who", "title": "Who", "fields": ["email"]},
    {"id": "plan", "title": "Plan", "fields": ["plan", "seats"]}
  ],
  "options": {"touchOnChange": true}
}"#;

#[test]
fn json_document_mounts_a_working_wizard() {
    let loaded = load_form_document(SIGNUP, DocumentFormat::Json).unwrap();
    assert_eq!(loaded.schema.title(), Some("Sign up"));
    assert!(loaded.options.touch_on_change);

    let mut wizard = loaded.into_wizard().unwrap();
    let form = wizard.controller();
    form.set_value("email", "nope").unwrap();
    assert_eq!(form.visible_errors("email"), ["Use a real address"]);
    assert_eq!(wizard.next_step(), StepMove::Blocked { at: 0 });

    wizard.controller().set_value("email", "a@b.co").unwrap();
    assert_eq!(wizard.next_step(), StepMove::Moved { from: 0, to: 1 });

    let form = wizard.controller();
    form.set_value("seats", 80).unwrap();
    assert_eq!(form.visible_errors("seats"), ["Must be at most 50"]);
    form.set_value("plan", "enterprise").unwrap();
    assert_eq!(
        form.visible_errors("plan"),
        ["Select one of the available options"]
    );
}

#[test]
fn document_limits_reject_out_of_range_values() {
    let form = load_form_document(
        r#"{"fields": {
            "code": {"type": "text", "maxLength": 3},
            "qty": {"type": "number", "min": 1, "max": 5}
        }}"#,
        DocumentFormat::Json,
    )
    .unwrap()
    .into_controller();
    form.set_value("code", "ABCDEFGHIJ").unwrap();
    form.set_value("qty", 500).unwrap();
    assert_eq!(
        form.field("code").unwrap().errors(),
        ["Must be at most 3 characters"]
    );
    assert_eq!(form.field("qty").unwrap().errors(), ["Must be at most 5"]);
    assert!(!form.is_valid());

    form.set_value("code", "ABC").unwrap();
    form.set_value("qty", 2).unwrap();
    assert!(form.is_valid());
}

#[test]
fn values_render_back_to_json() {
    let form = load_form_document(SIGNUP, DocumentFormat::Json)
        .unwrap()
        .into_controller();
    form.set_value("email", "a@b.co").unwrap();
    let rendered = render_values(&form.values(), DocumentFormat::Json, false).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed, json!({"email": "a@b.co", "plan": "free", "seats": null}));
}

#[test]
fn broken_documents_explain_themselves() {
    let err = load_form_document(
        r#"{"fields": {"plan": {"type": "select"}}}"#,
        DocumentFormat::Json,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("plan"));

    let err = load_form_document("{", DocumentFormat::Json).unwrap_err();
    assert!(err.to_string().contains("JSON"));
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_documents_load_the_same_way() {
    let raw = "
fields:
  name:
    type: text
    required: true
  newsletter:
    type: checkbox
    defaultValue: true
";
    let form = load_form_document(raw, DocumentFormat::Yaml)
        .unwrap()
        .into_controller();
    assert!(!form.is_valid());
    assert_eq!(form.value("newsletter"), Some(FieldValue::Bool(true)));
    assert_eq!(form.schema().get("name").unwrap().label, "Name");
}
