//! Wizard step sequencer.
//!
//! Each category walks a fixed sequence of steps ending at the preview. A
//! step can only be left forwards once the fields it collects are filled;
//! jumping back to any earlier step is always allowed.

mod error;
mod step;

pub use error::WizardError;
pub use step::{sequence, Step};

use crate::draft::{Category, Draft, Envelope, Field, FieldValue};
use crate::resolver::Attribute;
use crate::utils::validation;
use log::*;

/// Subscription state the caller supplies when asking whether a listing can
/// be published.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionGate {
    pub required: bool,
    pub active: bool,
}

impl SubscriptionGate {
    /// Build the gate from the flags carried on the draft.
    ///
    pub fn from_envelope(envelope: &Envelope) -> Self {
        SubscriptionGate {
            required: envelope.is_subscriber_required,
            active: envelope.subscription_active,
        }
    }

    pub fn blocks(&self) -> bool {
        self.required && !self.active
    }
}

/// Tracks the position within a category's step sequence.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wizard {
    category: Category,
    index: usize,
}

impl Wizard {
    /// Returns a wizard positioned at the first step.
    ///
    pub fn new(category: Category) -> Self {
        Wizard { category, index: 0 }
    }

    /// Returns a wizard for an existing draft, positioned at the first
    /// incomplete step or at the preview when nothing is missing.
    ///
    pub fn resume(draft: &Draft) -> Self {
        let category = draft.category();
        let steps = sequence(category);
        let index = steps
            .iter()
            .position(|step| Wizard::validate_step(category, *step, draft).is_err())
            .unwrap_or(steps.len() - 1);
        Wizard { category, index }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn steps(&self) -> &'static [Step] {
        sequence(self.category)
    }

    pub fn current(&self) -> Step {
        self.steps()[self.index]
    }

    pub fn is_at_preview(&self) -> bool {
        self.current() == Step::Preview
    }

    /// Returns the position of the step in this wizard's sequence.
    ///
    pub fn position(&self, step: Step) -> Result<usize, WizardError> {
        self.steps()
            .iter()
            .position(|s| *s == step)
            .ok_or(WizardError::StepNotInSequence {
                step,
                category: self.category,
            })
    }

    /// Check that the step's fields are filled and well formed.
    ///
    pub fn validate_step(category: Category, step: Step, draft: &Draft) -> Result<(), WizardError> {
        let missing = draft.missing(step.required_fields(category));
        if !missing.is_empty() {
            return Err(WizardError::Validation { step, missing });
        }
        match step {
            Step::PriceAndKms => check_price(draft, Field::Price),
            Step::DescriptionAndYear => {
                check_price(draft, Field::SparePrice)?;
                check_year(draft, Field::SpareYear)
            }
            _ => Ok(()),
        }
    }

    /// Returns the first step whose fields are not complete.
    ///
    pub fn first_incomplete(&self, draft: &Draft) -> Option<Step> {
        self.steps()
            .iter()
            .copied()
            .find(|step| Wizard::validate_step(self.category, *step, draft).is_err())
    }

    /// Move to the next step once the current one validates.
    ///
    pub fn advance(&mut self, draft: &Draft) -> Result<Step, WizardError> {
        let current = self.current();
        if current == Step::Preview {
            return Err(WizardError::AtPreview);
        }
        Wizard::validate_step(self.category, current, draft)?;
        self.index += 1;
        debug!("Wizard advanced from {} to {}.", current, self.current());
        Ok(self.current())
    }

    /// Jump to any step. Jumping back is always allowed; jumping forward
    /// requires every step in between to validate.
    ///
    pub fn jump_to(&mut self, step: Step, draft: &Draft) -> Result<Step, WizardError> {
        let target = self.position(step)?;
        if target > self.index {
            for skipped in &self.steps()[self.index..target] {
                Wizard::validate_step(self.category, *skipped, draft)?;
            }
        }
        debug!("Wizard jumped from {} to {}.", self.current(), step);
        self.index = target;
        Ok(step)
    }

    /// Check whether the draft can be submitted from here.
    ///
    pub fn can_submit(&self, draft: &Draft, gate: SubscriptionGate) -> Result<(), WizardError> {
        if !self.is_at_preview() {
            return Err(WizardError::NotAtPreview {
                current: self.current(),
            });
        }
        for step in self.steps() {
            Wizard::validate_step(self.category, *step, draft)?;
        }
        if draft.envelope.images.is_empty() {
            return Err(WizardError::NoImages);
        }
        if gate.blocks() {
            return Err(WizardError::SubscriptionRequired);
        }
        Ok(())
    }
}

/// Check the prerequisites for confirming a selection on the current screen.
/// Fuel needs the typed model name and, for cars, a transmission. Year needs
/// both color and ownership.
///
pub fn check_selection_gate(attribute: Attribute, draft: &Draft) -> Result<(), WizardError> {
    let (step, prerequisites): (Step, &[Field]) = match (attribute, draft.category()) {
        (Attribute::FuelType, Category::Car) => (
            Step::TransmissionAndFuel,
            &[Field::ModelName, Field::Transmission],
        ),
        (Attribute::FuelType, _) => (Step::TransmissionAndFuel, &[Field::ModelName]),
        (Attribute::Year, _) => (
            Step::ColorAndOwnershipAndYear,
            &[Field::Color, Field::Ownership],
        ),
        _ => return Ok(()),
    };
    let missing = draft.missing(prerequisites);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(WizardError::Validation { step, missing })
    }
}

impl Draft {
    /// Returns true when every step of the category validates and at least
    /// one photo is attached.
    ///
    pub fn is_submittable(&self) -> bool {
        let category = self.category();
        !self.envelope.images.is_empty()
            && sequence(category)
                .iter()
                .all(|step| Wizard::validate_step(category, *step, self).is_ok())
    }
}

fn text_of(draft: &Draft, field: Field) -> String {
    match draft.get(field) {
        Ok(FieldValue::Text(text)) => text,
        _ => String::new(),
    }
}

fn check_price(draft: &Draft, field: Field) -> Result<(), WizardError> {
    if validation::is_price(&text_of(draft, field)) {
        Ok(())
    } else {
        Err(WizardError::InvalidValue {
            field,
            reason: "enter digits only".to_string(),
        })
    }
}

fn check_year(draft: &Draft, field: Field) -> Result<(), WizardError> {
    validation::check_year(&text_of(draft, field))
        .map(|_| ())
        .map_err(|reason| WizardError::InvalidValue { field, reason })
}
