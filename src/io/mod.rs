mod document;
mod format;
mod input;
mod output;

pub use document::{FieldDocument, FormDocument, LoadedForm, RuleDocument};
pub use format::DocumentFormat;
pub use input::{load_form_document, load_form_value, parse_document_str};
pub use output::{render_value, render_values};
