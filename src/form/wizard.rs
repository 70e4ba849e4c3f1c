use std::future::Future;

use tracing::debug;

use crate::domain::{FormStep, FormSteps, FormValues, SchemaError};

use super::{error::FormError, state::FormController, submit::SubmitOutcome};

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMove {
    Moved { from: usize, to: usize },
    /// A step on the way failed validation; the wizard now shows step `at`
    /// with its errors visible.
    Blocked { at: usize },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAdvance<T> {
    Step(StepMove),
    Submit(SubmitOutcome<T>),
}

/// Multi-step driver over one controller. Step validity gates navigation;
/// submission from the last step validates the complete schema.
#[derive(Debug)]
pub struct FormWizard {
    controller: FormController,
    steps: FormSteps,
    current: usize,
}

impl FormWizard {
    pub fn new(controller: FormController, steps: Vec<FormStep>) -> Result<Self, SchemaError> {
        let steps = FormSteps::new(controller.schema(), steps)?;
        Ok(Self {
            controller,
            steps,
            current: 0,
        })
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn into_controller(self) -> FormController {
        self.controller
    }

    /// Zero-based index of the step on screen.
    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step(&self) -> &FormStep {
        &self.steps.as_slice()[self.current]
    }

    pub fn steps(&self) -> &[FormStep] {
        self.steps.as_slice()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_first_step(&self) -> bool {
        self.current == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// Whether the current step's fields pass, without touching them.
    pub fn is_step_valid(&self) -> bool {
        self.step().fields.iter().all(|key| {
            self.controller
                .field(key)
                .is_none_or(|status| status.is_valid())
        })
    }

    /// Move forward one step if the current step validates.
    pub fn next_step(&mut self) -> StepMove {
        if self.is_last_step() {
            return StepMove::Unchanged;
        }
        if !self.validate_step(self.current) {
            debug!(step = self.current, "step blocked by validation");
            return StepMove::Blocked { at: self.current };
        }
        self.move_to(self.current + 1)
    }

    pub fn prev_step(&mut self) -> StepMove {
        if self.is_first_step() {
            return StepMove::Unchanged;
        }
        self.move_to(self.current - 1)
    }

    /// Jump to `index`. Moving forward validates every step from the
    /// current one up to `index - 1`. When one fails, the wizard does not
    /// reach `index`: it stops on that failing step, which may lie past the
    /// step it started from, and returns [`StepMove::Blocked`] with the
    /// step's errors visible. Moving back never validates.
    pub fn go_to_step(&mut self, index: usize) -> Result<StepMove, FormError> {
        if index >= self.steps.len() {
            return Err(FormError::StepOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        if index <= self.current {
            return Ok(if index == self.current {
                StepMove::Unchanged
            } else {
                self.move_to(index)
            });
        }
        for step in self.current..index {
            if !self.validate_step(step) {
                debug!(step, target = index, "jump blocked by validation");
                self.current = step;
                return Ok(StepMove::Blocked { at: step });
            }
        }
        Ok(self.move_to(index))
    }

    /// `next_step` everywhere but the last step, where the whole form is
    /// submitted through the controller.
    pub async fn advance_or_submit<F, Fut, T, E>(
        &mut self,
        handler: F,
    ) -> Result<WizardAdvance<T>, E>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.is_last_step() {
            return Ok(WizardAdvance::Step(self.next_step()));
        }
        self.controller
            .handle_submit(handler)
            .await
            .map(WizardAdvance::Submit)
    }

    /// Reset the controller and return to the first step.
    pub fn reset(&mut self) {
        self.controller.reset_form();
        self.current = 0;
    }

    fn validate_step(&self, index: usize) -> bool {
        let Some(step) = self.steps.get(index) else {
            return true;
        };
        // step fields were checked against the schema at construction
        self.controller
            .validate_fields(&step.fields)
            .unwrap_or(false)
    }

    fn move_to(&mut self, index: usize) -> StepMove {
        let from = self.current;
        self.current = index;
        debug!(from, to = index, "step changed");
        StepMove::Moved { from, to: index }
    }
}
