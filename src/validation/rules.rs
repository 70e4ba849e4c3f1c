use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use regex::Regex;

use crate::domain::{FieldValue, FormValues};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:https?|ftp)://[^\s/?#]+\.[^\s/?#]+(?::\d+)?(?:[/?#]\S*)?$")
        .expect("url pattern compiles")
});

pub(crate) const REQUIRED_MESSAGE: &str = "This field is required";

type CheckFn = dyn Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync;

/// Rule with access to the whole form, for cross-field checks.
#[derive(Clone)]
pub struct CustomRule {
    name: String,
    check: Arc<CheckFn>,
}

impl CustomRule {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Min(f64),
    Max(f64),
    Email,
    Url,
    Pattern(Regex),
    Custom(CustomRule),
}

/// A rule plus an optional message overriding the rule's default one.
#[derive(Debug, Clone)]
pub struct Validator {
    rule: Rule,
    message: Option<String>,
}

impl Validator {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_required(&self) -> bool {
        matches!(self.rule, Rule::Required)
    }

    /// Run the rule against `value`. Values the rule does not apply to
    /// (a length rule on a number, say) pass.
    pub fn check(&self, value: &FieldValue, values: &FormValues) -> Option<String> {
        let failure = match (&self.rule, value) {
            (Rule::Required, value) => value
                .is_empty(false)
                .then(|| REQUIRED_MESSAGE.to_string()),
            (Rule::MinLength(min), FieldValue::Text(text)) => (text.chars().count() < *min)
                .then(|| format!("Must be at least {min} characters")),
            (Rule::MinLength(min), FieldValue::List(items)) => {
                (items.len() < *min).then(|| format!("Select at least {min} options"))
            }
            (Rule::MaxLength(max), FieldValue::Text(text)) => (text.chars().count() > *max)
                .then(|| format!("Must be at most {max} characters")),
            (Rule::MaxLength(max), FieldValue::List(items)) => {
                (items.len() > *max).then(|| format!("Select at most {max} options"))
            }
            (Rule::Min(min), FieldValue::Number(Some(number))) => {
                (number < min).then(|| format!("Must be at least {min}"))
            }
            (Rule::Max(max), FieldValue::Number(Some(number))) => {
                (number > max).then(|| format!("Must be at most {max}"))
            }
            (Rule::Email, FieldValue::Text(text)) => (!EMAIL.is_match(text))
                .then(|| "Must be a valid email address".to_string()),
            (Rule::Url, FieldValue::Text(text)) => {
                (!URL.is_match(text)).then(|| "Must be a valid URL".to_string())
            }
            (Rule::Pattern(regex), FieldValue::Text(text)) => (!regex.is_match(text))
                .then(|| format!("Must match the pattern {}", regex.as_str())),
            (Rule::Custom(custom), value) => (custom.check)(value, values),
            _ => None,
        };
        failure.map(|default| self.message.clone().unwrap_or(default))
    }
}

pub fn required() -> Validator {
    Validator::new(Rule::Required)
}

pub fn min_length(min: usize) -> Validator {
    Validator::new(Rule::MinLength(min))
}

pub fn max_length(max: usize) -> Validator {
    Validator::new(Rule::MaxLength(max))
}

pub fn min(min: f64) -> Validator {
    Validator::new(Rule::Min(min))
}

pub fn max(max: f64) -> Validator {
    Validator::new(Rule::Max(max))
}

pub fn email() -> Validator {
    Validator::new(Rule::Email)
}

pub fn url() -> Validator {
    Validator::new(Rule::Url)
}

pub fn pattern(regex: Regex, message: impl Into<String>) -> Validator {
    Validator::new(Rule::Pattern(regex)).with_message(message)
}

/// Cross-field rule; `check` sees the field's value and every other value.
pub fn custom<F>(name: impl Into<String>, check: F) -> Validator
where
    F: Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync + 'static,
{
    Validator::new(Rule::Custom(CustomRule {
        name: name.into(),
        check: Arc::new(check),
    }))
}
