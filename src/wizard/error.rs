//! Wizard-specific error types.

use super::Step;
use crate::draft::{Category, Field};

/// Errors that block a wizard transition or action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Required fields are still empty
    #[error("{step}: please provide {}", field_list(.missing))]
    Validation { step: Step, missing: Vec<Field> },

    /// Field value is present but unusable
    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: Field, reason: String },

    /// The current screen is not responsible for the field
    #[error("Field {field} cannot be changed on the {step} step")]
    OutOfStep { field: Field, step: Step },

    /// Step is not part of the category's sequence
    #[error("Step {step} is not part of the {category} wizard")]
    StepNotInSequence { step: Step, category: Category },

    /// Forward navigation past the preview
    #[error("Preview is the last step; submit the listing instead")]
    AtPreview,

    /// Submission attempted before reaching the preview
    #[error("Listing can only be submitted from the preview (currently on {current})")]
    NotAtPreview { current: Step },

    /// Publishing requires at least one photo
    #[error("Add at least one photo before publishing")]
    NoImages,

    /// Subscription gate is closed
    #[error("An active subscription is required to publish this listing")]
    SubscriptionRequired,
}

fn field_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::wire_name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl WizardError {
    /// Returns the missing fields of a validation failure.
    ///
    pub fn missing_fields(&self) -> &[Field] {
        match self {
            WizardError::Validation { missing, .. } => missing,
            _ => &[],
        }
    }
}
