mod builder;
mod error;
mod schema;
mod step;
mod value;

pub use builder::{SchemaBuilder, create_form_schema};
pub use error::SchemaError;
pub use schema::{FieldDescriptor, FieldKind, FormSchema, SelectOption};
pub use step::{FormStep, FormSteps};
pub use value::{FieldValue, FileRef, FormValues, ValueType};

pub(crate) use value::value_at_key;
