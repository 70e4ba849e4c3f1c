use std::cell::Cell;

use schemaform::prelude::*;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

const REQUIRED: &str = "This field is required";

fn person_schema() -> FormSchema {
    FormSchema::builder()
        .field(
            "name",
            FieldDescriptor::text("Name")
                .required()
                .validator(validation::required()),
        )
        .field("age", FieldDescriptor::number("Age"))
        .build()
        .expect("valid schema")
}

fn signup_schema() -> FormSchema {
    FormSchema::builder()
        .field(
            "email",
            FieldDescriptor::email("Email")
                .required()
                .validator(validation::email()),
        )
        .field(
            "password",
            FieldDescriptor::text("Password")
                .required()
                .validator(validation::min_length(8)),
        )
        .field(
            "confirm",
            FieldDescriptor::text("Confirm password")
                .required()
                .depends_on("password")
                .validator(validation::custom("matches_password", |value, values| {
                    (value.as_text() != values.text("password"))
                        .then(|| "Passwords do not match".to_string())
                })),
        )
        .field(
            "role",
            FieldDescriptor::select(
                "Role",
                vec![
                    SelectOption::new("admin", "Administrator"),
                    SelectOption::new("user", "User"),
                ],
            )
            .default_value("user"),
        )
        .field("terms", FieldDescriptor::checkbox("Accept terms").required())
        .build()
        .expect("valid schema")
}

fn assert_consistent(form: &FormController) {
    let fields = form.fields();
    for status in fields.values() {
        assert_eq!(status.is_valid(), status.errors().is_empty());
    }
    assert_eq!(
        form.is_valid(),
        form.schema()
            .keys()
            .all(|key| fields[key.as_str()].is_valid())
    );
}

#[test]
fn name_and_age_scenario() {
    let form = FormController::with_initial(
        person_schema(),
        FormValues::new()
            .with("name", "")
            .with("age", Option::<f64>::None),
    )
    .unwrap();
    assert!(!form.is_dirty());

    form.set_value("name", "Ana").unwrap();
    assert!(form.field("name").unwrap().errors().is_empty());
    assert!(form.is_valid());
    assert!(form.is_dirty());
    assert_consistent(&form);

    form.set_value("name", "").unwrap();
    assert_eq!(form.field("name").unwrap().errors(), [REQUIRED]);
    assert!(!form.is_valid());
    assert_consistent(&form);
}

#[test]
fn pristine_form_reports_validity_without_showing_errors() {
    let form = FormController::new(person_schema());
    assert!(!form.is_valid());
    assert!(!form.is_dirty());
    assert!(!form.is_touched());
    assert_eq!(form.field("name").unwrap().errors(), [REQUIRED]);
    assert!(form.visible_errors("name").is_empty());
    assert_consistent(&form);
}

#[test]
fn touching_an_unedited_required_field_shows_its_error() {
    let form = FormController::new(person_schema());
    form.set_field_touched("name", true).unwrap();
    let name = form.field("name").unwrap();
    assert!(name.touched());
    assert_eq!(name.errors(), [REQUIRED]);
    assert_eq!(form.visible_errors("name"), [REQUIRED]);
}

#[test]
fn touching_does_not_rerun_validators_after_an_edit() {
    let form = FormController::new(person_schema());
    form.set_value("name", "Ana").unwrap();
    form.set_field_touched("name", true).unwrap();
    assert!(form.field("name").unwrap().is_valid());
    form.set_field_touched("name", false).unwrap();
    assert!(!form.field("name").unwrap().touched());
}

#[test]
fn dirty_tracks_difference_from_initial_values() {
    let form = FormController::new(person_schema());
    form.set_value("age", 30).unwrap();
    assert!(form.field("age").unwrap().dirty());
    assert!(form.is_dirty());
    form.set_value("age", Option::<f64>::None).unwrap();
    assert!(!form.field("age").unwrap().dirty());
    assert!(!form.is_dirty());
}

#[test]
fn unknown_keys_and_wrong_types_are_rejected() {
    let form = FormController::new(person_schema());
    assert_eq!(
        form.set_value("nickname", "x"),
        Err(FormError::UnknownField("nickname".to_string()))
    );
    assert!(matches!(
        form.set_value("age", "thirty"),
        Err(FormError::TypeMismatch { .. })
    ));
    assert!(form.set_field_touched("nickname", true).is_err());
    assert!(FormController::with_initial(person_schema(), FormValues::new().with("age", true)).is_err());
}

#[test]
fn non_finite_numbers_are_rejected() {
    let form = FormController::new(person_schema());
    assert_eq!(
        form.set_value("age", f64::NAN),
        Err(FormError::NonFiniteNumber {
            key: "age".to_string()
        })
    );
    assert!(form.set_value("age", f64::NEG_INFINITY).is_err());
    assert_eq!(form.value("age"), Some(FieldValue::Number(None)));
    assert!(!form.is_dirty());
    assert!(
        FormController::with_initial(person_schema(), FormValues::new().with("age", f64::NAN))
            .is_err()
    );
}

#[test]
fn required_empty_email_reports_a_single_message() {
    let form = FormController::new(signup_schema());
    form.validate_all();
    assert_eq!(form.field("email").unwrap().errors(), [REQUIRED]);
    form.set_value("email", "not-an-email").unwrap();
    assert_eq!(
        form.field("email").unwrap().errors(),
        ["Must be a valid email address"]
    );
}

#[test]
fn unchecked_required_checkbox_is_missing() {
    let form = FormController::new(signup_schema());
    form.blur("terms").unwrap();
    assert_eq!(form.visible_errors("terms"), [REQUIRED]);
    form.set_value("terms", true).unwrap();
    assert!(form.field("terms").unwrap().is_valid());
}

#[test]
fn dependent_fields_revalidate_when_their_source_changes() {
    let form = FormController::new(signup_schema());
    form.set_value("password", "correct horse").unwrap();
    form.set_value("confirm", "correct horse").unwrap();
    assert!(form.field("confirm").unwrap().is_valid());

    form.set_value("password", "battery staple").unwrap();
    assert_eq!(
        form.field("confirm").unwrap().errors(),
        ["Passwords do not match"]
    );
    assert_consistent(&form);
}

#[test]
fn dependents_can_be_left_alone() {
    let form = FormController::new(signup_schema())
        .with_options(FormOptions::default().with_revalidate_dependents(false));
    form.set_value("password", "correct horse").unwrap();
    form.set_value("confirm", "correct horse").unwrap();
    form.set_value("password", "battery staple").unwrap();
    assert!(form.field("confirm").unwrap().is_valid());
}

#[test]
fn touch_on_change_marks_edited_fields() {
    let form = FormController::new(person_schema())
        .with_options(FormOptions::default().with_touch_on_change(true));
    form.set_value("name", "").unwrap();
    assert_eq!(form.visible_errors("name"), [REQUIRED]);
}

#[test]
fn blank_text_counts_as_missing_when_configured() {
    let strict = FormController::new(person_schema());
    strict.set_value("name", "   ").unwrap();
    assert!(strict.field("name").unwrap().is_valid());

    let lenient = FormController::new(person_schema())
        .with_options(FormOptions::default().with_blank_is_empty(true));
    lenient.set_value("name", "   ").unwrap();
    assert_eq!(lenient.field("name").unwrap().errors(), [REQUIRED]);
}

#[test]
fn validate_all_touches_every_field() {
    let form = FormController::new(signup_schema());
    assert!(!form.validate_all());
    assert!(form.fields().values().all(|status| status.touched()));
    assert_consistent(&form);
}

#[test]
fn reset_is_idempotent_and_uses_original_overrides() {
    let form = FormController::with_initial(
        person_schema(),
        FormValues::new().with("name", "Bea"),
    )
    .unwrap();
    form.set_value("name", "Changed").unwrap();
    form.set_value("age", 41).unwrap();
    form.set_field_touched("age", true).unwrap();
    form.validate_all();

    form.reset_form();
    let first = form.snapshot();
    form.reset_form();
    let second = form.snapshot();
    assert_eq!(first, second);
    assert_eq!(form.value("name"), Some(FieldValue::from("Bea")));
    assert!(!form.is_dirty());
    assert!(!form.is_touched());
    assert_eq!(form.submit_count(), 0);
    assert_consistent(&form);
}

#[test]
fn reset_with_replaces_the_baseline() {
    let form = FormController::new(person_schema());
    form.reset_with(FormValues::new().with("name", "Caio").with("age", 52))
        .unwrap();
    assert_eq!(form.values().text("name"), Some("Caio"));
    assert_eq!(form.values().number("age"), Some(52.0));
    assert!(!form.is_dirty());
    form.set_value("age", 53).unwrap();
    form.reset_form();
    assert_eq!(form.values().number("age"), Some(52.0));
}

#[test]
fn seeds_from_json_and_renders_nested_values() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Address {
        street: String,
        city: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Company {
        name: String,
        employees: Option<f64>,
        address: Address,
    }

    let schema = create_form_schema([
        ("name", FieldDescriptor::text("Name").required()),
        ("employees", FieldDescriptor::number("Employees")),
        ("address.street", FieldDescriptor::text("Street")),
        ("address.city", FieldDescriptor::text("City").default_value("Porto")),
    ])
    .unwrap();
    let form = FormController::from_json(
        schema,
        &json!({"name": "Acme", "address": {"street": "Rua A"}}),
    )
    .unwrap();
    assert_eq!(
        form.values_json(),
        json!({
            "name": "Acme",
            "employees": null,
            "address": {"street": "Rua A", "city": "Porto"}
        })
    );
    let company: Company = form.values().deserialize_into().unwrap();
    assert_eq!(
        company,
        Company {
            name: "Acme".into(),
            employees: None,
            address: Address {
                street: "Rua A".into(),
                city: "Porto".into()
            },
        }
    );
}

#[test]
fn seeding_rejects_values_of_the_wrong_shape() {
    let err = FormController::from_json(person_schema(), &json!({"age": "old"})).unwrap_err();
    assert!(matches!(err, FormError::InvalidJson { ref key, .. } if key == "age"));
}

#[test]
fn snapshot_serializes_for_the_view_layer() {
    let form = FormController::new(person_schema());
    form.blur("name").unwrap();
    let snapshot = serde_json::to_value(form.snapshot()).unwrap();
    assert_eq!(
        snapshot,
        json!({
            "values": {"name": "", "age": null},
            "fields": {
                "name": {"touched": true, "dirty": false, "isValid": false, "errors": [REQUIRED]},
                "age": {"touched": false, "dirty": false, "isValid": true, "errors": []}
            },
            "isValid": false,
            "isDirty": false,
            "isSubmitting": false,
            "submitCount": 0
        })
    );
}

#[tokio::test]
async fn submit_calls_the_handler_with_current_values() {
    let form = FormController::new(person_schema());
    form.set_value("name", "Ana").unwrap();
    let outcome = form
        .handle_submit(|values| async move {
            Ok::<_, String>(values.text("name").map(str::to_string))
        })
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Submitted(Some("Ana".to_string())));
    assert!(!form.is_submitting());
    assert_eq!(form.submit_count(), 1);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_handler() {
    let form = FormController::new(signup_schema());
    let called = Cell::new(false);
    let outcome = form
        .handle_submit(|_| async {
            called.set(true);
            Ok::<_, String>(())
        })
        .await
        .unwrap();
    assert!(!called.get());
    assert!(matches!(outcome, SubmitOutcome::Invalid { issues } if issues > 0));
    assert_eq!(form.visible_errors("email"), [REQUIRED]);
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn handler_errors_propagate_and_clear_the_flag() {
    #[derive(Debug, PartialEq)]
    struct Boom(&'static str);

    let form = FormController::new(person_schema());
    form.set_value("name", "Ana").unwrap();
    let result = form
        .handle_submit(|_| async { Err::<(), _>(Boom("boom")) })
        .await;
    assert_eq!(result, Err(Boom("boom")));
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn second_submit_while_pending_is_a_no_op() {
    let form = FormController::new(person_schema());
    form.set_value("name", "Ana").unwrap();

    let calls = Cell::new(0);
    let (release, pending) = oneshot::channel::<()>();

    let first = form.handle_submit(|_| {
        calls.set(calls.get() + 1);
        async move {
            pending.await.ok();
            Ok::<_, String>("saved")
        }
    });
    let second = async {
        assert!(form.is_submitting());
        let outcome = form
            .handle_submit(|_| {
                calls.set(calls.get() + 1);
                async { Ok::<_, String>("saved twice") }
            })
            .await
            .unwrap();
        release.send(()).unwrap();
        outcome
    };

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap(), SubmitOutcome::Submitted("saved"));
    assert_eq!(second, SubmitOutcome::AlreadySubmitting);
    assert_eq!(calls.get(), 1);
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn dropping_a_pending_submit_releases_the_flag() {
    let form = FormController::new(person_schema());
    form.set_value("name", "Ana").unwrap();
    let (_release, pending) = oneshot::channel::<()>();
    let submit = form.handle_submit(|_| async move {
        pending.await.ok();
        Ok::<_, String>(())
    });
    let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), submit).await;
    assert!(timed_out.is_err());
    assert!(!form.is_submitting());
}
