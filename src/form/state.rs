use std::{
    cell::{Cell, RefCell},
    future::Future,
    sync::Arc,
};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::{
    domain::{FieldDescriptor, FieldValue, FormSchema, FormValues, value_at_key},
    validation::validate_field,
};

use super::{
    error::FormError,
    field::FieldStatus,
    options::FormOptions,
    snapshot::{FieldSnapshot, FormSnapshot},
    submit::{SubmitOutcome, SubmittingGuard},
};

#[derive(Debug, Clone, PartialEq)]
struct FormState {
    initial: FormValues,
    values: FormValues,
    fields: IndexMap<String, FieldStatus>,
    submit_count: usize,
}

impl FormState {
    fn pristine(schema: &FormSchema, overrides: &FormValues, options: &FormOptions) -> Self {
        let initial = schema
            .iter()
            .map(|(key, descriptor)| {
                let value = overrides
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| descriptor.initial_value());
                (key.clone(), value)
            })
            .collect::<FormValues>();

        let mut state = Self {
            values: initial.clone(),
            initial,
            fields: schema
                .keys()
                .map(|key| (key.clone(), FieldStatus::default()))
                .collect(),
            submit_count: 0,
        };
        for key in schema.keys() {
            state.validate(schema, key, options.blank_is_empty);
        }
        state
    }

    fn validate(&mut self, schema: &FormSchema, key: &str, blank_is_empty: bool) {
        let (Some(descriptor), Some(value), Some(status)) = (
            schema.get(key),
            self.values.get(key),
            self.fields.get_mut(key),
        ) else {
            return;
        };
        status.errors = validate_field(descriptor, value, &self.values, blank_is_empty);
        trace!(field = key, errors = status.errors.len(), "field validated");
    }

    fn touch(&mut self, key: &str) {
        if let Some(status) = self.fields.get_mut(key) {
            status.touched = true;
        }
    }

    fn field_valid(&self, key: &str) -> bool {
        self.fields.get(key).is_none_or(FieldStatus::is_valid)
    }

    fn is_valid(&self) -> bool {
        self.fields.values().all(FieldStatus::is_valid)
    }

    fn is_dirty(&self) -> bool {
        self.fields.values().any(|status| status.dirty)
    }

    fn error_count(&self) -> usize {
        self.fields
            .values()
            .filter(|status| !status.is_valid())
            .count()
    }
}

/// Stateful engine behind one mounted form.
///
/// Holds the current values and per-field runtime state for a schema, runs
/// validators on change and blur, and drives the submit lifecycle. All
/// operations take `&self`: the controller lives on a single UI thread and
/// several pending futures (a double-clicked submit button, say) may share
/// it, which is what lets `handle_submit` refuse re-entrant submissions.
#[derive(Debug)]
pub struct FormController {
    schema: Arc<FormSchema>,
    options: FormOptions,
    overrides: RefCell<FormValues>,
    state: RefCell<FormState>,
    submitting: Cell<bool>,
}

impl FormController {
    pub fn new(schema: impl Into<Arc<FormSchema>>) -> Self {
        Self::assemble(schema.into(), FormValues::new(), FormOptions::default())
    }

    /// Controller whose initial values override the schema defaults.
    pub fn with_initial(
        schema: impl Into<Arc<FormSchema>>,
        overrides: FormValues,
    ) -> Result<Self, FormError> {
        let schema = schema.into();
        check_values(&schema, &overrides)?;
        Ok(Self::assemble(schema, overrides, FormOptions::default()))
    }

    /// Controller seeded from a JSON document, e.g. a record loaded for
    /// editing. Dotted keys are looked up as nested paths.
    pub fn from_json(
        schema: impl Into<Arc<FormSchema>>,
        document: &Value,
    ) -> Result<Self, FormError> {
        let schema = schema.into();
        let overrides = seed_values(&schema, document)?;
        Ok(Self::assemble(schema, overrides, FormOptions::default()))
    }

    /// Replace the options and recompute the pristine state.
    pub fn with_options(mut self, options: FormOptions) -> Self {
        let state = FormState::pristine(&self.schema, self.overrides.get_mut(), &options);
        self.options = options;
        *self.state.get_mut() = state;
        self
    }

    fn assemble(schema: Arc<FormSchema>, overrides: FormValues, options: FormOptions) -> Self {
        let state = FormState::pristine(&schema, &overrides, &options);
        debug!(
            fields = schema.len(),
            valid = state.is_valid(),
            "form controller initialised"
        );
        Self {
            schema,
            options,
            overrides: RefCell::new(overrides),
            state: RefCell::new(state),
            submitting: Cell::new(false),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Update one value and re-run its validators, plus those of fields
    /// that depend on it.
    pub fn set_value(&self, key: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let value = value.into();
        let descriptor = self.descriptor(key)?;
        check_type(key, descriptor, &value)?;

        let blank_is_empty = self.options.blank_is_empty;
        let mut state = self.state.borrow_mut();
        let dirty = state.initial.get(key) != Some(&value);
        state.values.insert(key, value);
        if let Some(status) = state.fields.get_mut(key) {
            status.edited = true;
            status.dirty = dirty;
            if self.options.touch_on_change {
                status.touched = true;
            }
        }
        state.validate(&self.schema, key, blank_is_empty);
        if self.options.revalidate_dependents {
            for dependent in self.schema.dependents_of(key) {
                state.validate(&self.schema, dependent, blank_is_empty);
            }
        }
        debug!(
            field = key,
            valid = state.field_valid(key),
            dirty,
            "value set"
        );
        Ok(())
    }

    /// Set the touched flag. A field that never received `set_value` is
    /// validated against its current value when touched, so blurring an
    /// untouched required field shows its error.
    pub fn set_field_touched(&self, key: &str, touched: bool) -> Result<(), FormError> {
        self.descriptor(key)?;
        let mut state = self.state.borrow_mut();
        let Some(status) = state.fields.get_mut(key) else {
            return Ok(());
        };
        status.touched = touched;
        let never_edited = !status.edited;
        if touched && never_edited {
            state.validate(&self.schema, key, self.options.blank_is_empty);
        }
        trace!(field = key, touched, "touched flag set");
        Ok(())
    }

    pub fn blur(&self, key: &str) -> Result<(), FormError> {
        self.set_field_touched(key, true)
    }

    /// Validate every field, mark them all touched and report validity.
    pub fn validate_all(&self) -> bool {
        let mut state = self.state.borrow_mut();
        for key in self.schema.keys() {
            state.validate(&self.schema, key, self.options.blank_is_empty);
            state.touch(key);
        }
        let valid = state.is_valid();
        debug!(valid, issues = state.error_count(), "form validated");
        valid
    }

    /// Validate and touch only `keys`; the rest of the form is left alone.
    pub fn validate_fields<I, K>(&self, keys: I) -> Result<bool, FormError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = keys.into_iter().collect::<Vec<_>>();
        for key in &keys {
            self.descriptor(key.as_ref())?;
        }
        let mut state = self.state.borrow_mut();
        let mut valid = true;
        for key in &keys {
            let key = key.as_ref();
            state.validate(&self.schema, key, self.options.blank_is_empty);
            state.touch(key);
            valid &= state.field_valid(key);
        }
        Ok(valid)
    }

    /// Validate the whole form and, when it passes, hand the values to
    /// `handler`.
    ///
    /// Only one submission runs at a time: a call made while another is
    /// pending returns [`SubmitOutcome::AlreadySubmitting`] without touching
    /// the handler. The in-flight flag is cleared on every exit path. Errors
    /// from the handler are returned unchanged.
    pub async fn handle_submit<F, Fut, T, E>(&self, handler: F) -> Result<SubmitOutcome<T>, E>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(_guard) = SubmittingGuard::acquire(&self.submitting) else {
            warn!("submission already in flight, ignoring submit");
            return Ok(SubmitOutcome::AlreadySubmitting);
        };
        self.state.borrow_mut().submit_count += 1;

        if !self.validate_all() {
            let issues = self.error_count();
            debug!(issues, "submit blocked by validation");
            return Ok(SubmitOutcome::Invalid { issues });
        }

        let values = self.values();
        info!(fields = values.len(), "submitting form");
        match handler(values).await {
            Ok(output) => {
                info!("form submitted");
                Ok(SubmitOutcome::Submitted(output))
            }
            Err(err) => {
                warn!("submit handler failed");
                Err(err)
            }
        }
    }

    /// Back to pristine: values rebuilt from schema defaults and the
    /// original overrides, flags and submit count cleared.
    pub fn reset_form(&self) {
        let state = FormState::pristine(&self.schema, &self.overrides.borrow(), &self.options);
        *self.state.borrow_mut() = state;
        debug!("form reset");
    }

    /// Replace the stored overrides, then reset.
    pub fn reset_with(&self, overrides: FormValues) -> Result<(), FormError> {
        check_values(&self.schema, &overrides)?;
        *self.overrides.borrow_mut() = overrides;
        self.reset_form();
        Ok(())
    }

    pub fn values(&self) -> FormValues {
        self.state.borrow().values.clone()
    }

    pub fn initial_values(&self) -> FormValues {
        self.state.borrow().initial.clone()
    }

    pub fn value(&self, key: &str) -> Option<FieldValue> {
        self.state.borrow().values.get(key).cloned()
    }

    /// Current values as a nested JSON object.
    pub fn values_json(&self) -> Value {
        self.state.borrow().values.to_json()
    }

    pub fn field(&self, key: &str) -> Option<FieldStatus> {
        self.state.borrow().fields.get(key).cloned()
    }

    pub fn fields(&self) -> IndexMap<String, FieldStatus> {
        self.state.borrow().fields.clone()
    }

    pub fn visible_errors(&self, key: &str) -> Vec<String> {
        self.state
            .borrow()
            .fields
            .get(key)
            .map(|status| status.visible_errors().to_vec())
            .unwrap_or_default()
    }

    pub fn is_valid(&self) -> bool {
        self.state.borrow().is_valid()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.borrow().is_dirty()
    }

    pub fn is_touched(&self) -> bool {
        self.state
            .borrow()
            .fields
            .values()
            .any(|status| status.touched)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn submit_count(&self) -> usize {
        self.state.borrow().submit_count
    }

    /// Number of fields currently failing validation.
    pub fn error_count(&self) -> usize {
        self.state.borrow().error_count()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.state.borrow();
        FormSnapshot {
            values: state.values.clone(),
            fields: state
                .fields
                .iter()
                .map(|(key, status)| (key.clone(), FieldSnapshot::from(status)))
                .collect(),
            is_valid: state.is_valid(),
            is_dirty: state.is_dirty(),
            is_submitting: self.submitting.get(),
            submit_count: state.submit_count,
        }
    }

    fn descriptor(&self, key: &str) -> Result<&FieldDescriptor, FormError> {
        self.schema
            .get(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }
}

/// Read the schema's fields out of a JSON document. Keys missing from the
/// document are left out, so the schema defaults apply to them.
pub fn seed_values(schema: &FormSchema, document: &Value) -> Result<FormValues, FormError> {
    let mut values = FormValues::new();
    for (key, descriptor) in schema.iter() {
        let Some(raw) = value_at_key(document, key) else {
            continue;
        };
        let value = FieldValue::from_json(descriptor.kind(), raw).ok_or_else(|| {
            FormError::InvalidJson {
                key: key.clone(),
                found: raw.to_string(),
            }
        })?;
        values.insert(key.clone(), value);
    }
    Ok(values)
}

fn check_values(schema: &FormSchema, values: &FormValues) -> Result<(), FormError> {
    for (key, value) in values {
        let descriptor = schema
            .get(key)
            .ok_or_else(|| FormError::UnknownField(key.clone()))?;
        check_type(key, descriptor, value)?;
    }
    Ok(())
}

fn check_type(key: &str, descriptor: &FieldDescriptor, value: &FieldValue) -> Result<(), FormError> {
    let expected = descriptor.kind().value_type();
    let found = value.value_type();
    if expected != found {
        return Err(FormError::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        });
    }
    if let FieldValue::Number(Some(number)) = value
        && !number.is_finite()
    {
        return Err(FormError::NonFiniteNumber {
            key: key.to_string(),
        });
    }
    Ok(())
}
