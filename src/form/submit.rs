use std::cell::Cell;

/// Result of [`FormController::handle_submit`](super::FormController::handle_submit)
/// when the handler did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    /// The handler ran and returned this value.
    Submitted(T),
    /// Validation failed; field errors are now visible and the handler was
    /// not called.
    Invalid { issues: usize },
    /// Another submission was still in flight; nothing happened.
    AlreadySubmitting,
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }

    pub fn submitted(self) -> Option<T> {
        match self {
            SubmitOutcome::Submitted(value) => Some(value),
            _ => None,
        }
    }
}

/// Holds the in-flight flag for one submission and clears it on drop, so
/// the flag resets on success, on handler error and when the submit future
/// is dropped early.
pub(crate) struct SubmittingGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> SubmittingGuard<'a> {
    /// Returns `None` when a submission already holds the flag.
    pub(crate) fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
