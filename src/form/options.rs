use serde::{Deserialize, Serialize};

/// Behaviour switches for a [`FormController`](super::FormController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormOptions {
    /// Mark a field touched as soon as its value changes, not only on blur.
    pub touch_on_change: bool,
    /// Treat whitespace-only text as missing for the required check.
    pub blank_is_empty: bool,
    /// Re-run validators of fields that `depends_on` the changed field.
    pub revalidate_dependents: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            touch_on_change: false,
            blank_is_empty: false,
            revalidate_dependents: true,
        }
    }
}

impl FormOptions {
    pub fn with_touch_on_change(mut self, enabled: bool) -> Self {
        self.touch_on_change = enabled;
        self
    }

    pub fn with_blank_is_empty(mut self, enabled: bool) -> Self {
        self.blank_is_empty = enabled;
        self
    }

    pub fn with_revalidate_dependents(mut self, enabled: bool) -> Self {
        self.revalidate_dependents = enabled;
        self
    }
}
