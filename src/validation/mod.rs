mod rules;

pub use rules::{
    CustomRule, Rule, Validator, custom, email, max, max_length, min, min_length, pattern,
    required, url,
};

use std::mem;

use crate::domain::{FieldDescriptor, FieldValue, FormValues};

use rules::REQUIRED_MESSAGE;

pub(crate) const OPTION_MESSAGE: &str = "Select one of the available options";

/// Run every check declared for one field and collect all failures.
///
/// The required check runs first. An empty value stops there: a required
/// field reports exactly one message and an optional field reports none, so
/// format rules never fire on a value that is simply missing.
pub fn validate_field(
    descriptor: &FieldDescriptor,
    value: &FieldValue,
    values: &FormValues,
    blank_is_empty: bool,
) -> Vec<String> {
    if value.is_empty(blank_is_empty) {
        if !descriptor.is_required() {
            return Vec::new();
        }
        let message = descriptor
            .validators
            .iter()
            .find(|validator| validator.is_required())
            .and_then(Validator::message)
            .unwrap_or(REQUIRED_MESSAGE);
        return vec![message.to_string()];
    }

    let mut errors = Vec::new();
    if descriptor.kind().has_options() && !within_options(descriptor, value) {
        errors.push(OPTION_MESSAGE.to_string());
    }
    errors.extend(
        declared_limits(descriptor).filter_map(|validator| validator.check(value, values)),
    );
    errors.extend(
        descriptor
            .validators
            .iter()
            .filter(|validator| !validator.is_required())
            .filter_map(|validator| validator.check(value, values)),
    );
    errors
}

/// Validators for the descriptor's `min`, `max` and `max_length`, unless a
/// listed validator already carries the same rule.
fn declared_limits(descriptor: &FieldDescriptor) -> impl Iterator<Item = Validator> + '_ {
    [
        descriptor.min.map(rules::min),
        descriptor.max.map(rules::max),
        descriptor.max_length.map(rules::max_length),
    ]
    .into_iter()
    .flatten()
    .filter(move |limit| {
        let rule = mem::discriminant(limit.rule());
        !descriptor
            .validators
            .iter()
            .any(|listed| mem::discriminant(listed.rule()) == rule)
    })
}

fn within_options(descriptor: &FieldDescriptor, value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(selected) => descriptor.has_option(selected),
        FieldValue::List(selected) => selected.iter().all(|item| descriptor.has_option(item)),
        _ => true,
    }
}
