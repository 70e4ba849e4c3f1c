/// Runtime state of one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStatus {
    pub(crate) touched: bool,
    pub(crate) dirty: bool,
    pub(crate) errors: Vec<String>,
    /// Set once `set_value` has been called for the field.
    pub(crate) edited: bool,
}

impl FieldStatus {
    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors gated on `touched`, for display.
    pub fn visible_errors(&self) -> &[String] {
        if self.touched { &self.errors } else { &[] }
    }
}
