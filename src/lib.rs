#![deny(rust_2018_idioms)]

pub mod domain;
pub mod form;
pub mod io;
pub mod schema;
pub mod validation;

pub use domain::{
    FieldDescriptor, FieldKind, FieldValue, FileRef, FormSchema, FormStep, FormValues,
    SchemaError, SelectOption, create_form_schema,
};
pub use form::{
    FieldStatus, FormController, FormError, FormOptions, FormSnapshot, FormWizard, StepMove,
    SubmitOutcome, WizardAdvance,
};
pub use schema::parse_json_schema;

pub mod prelude {
    pub use super::validation::{self, Validator};
    pub use super::{
        FieldDescriptor, FieldKind, FieldValue, FormController, FormError, FormOptions,
        FormSchema, FormStep, FormValues, FormWizard, SchemaError, SelectOption, StepMove,
        SubmitOutcome, WizardAdvance, create_form_schema,
    };
}
