mod error;
mod field;
mod options;
mod snapshot;
mod state;
mod submit;
mod wizard;

pub use error::FormError;
pub use field::FieldStatus;
pub use options::FormOptions;
pub use snapshot::{FieldSnapshot, FormSnapshot};
pub use state::{FormController, seed_values};
pub use submit::SubmitOutcome;
pub use wizard::{FormWizard, StepMove, WizardAdvance};
