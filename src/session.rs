//! Wizard session.
//!
//! The session is the context object handed to each screen. It owns the
//! draft store and the step position, and is the only way screens change the
//! draft: every write is checked against the step currently on screen and
//! against the in-step gates before it reaches the store.

use crate::api::{ApiError, Client, SubmissionOutcome, SubmitAction};
use crate::draft::{Category, Draft, DraftError, Field, FieldValue, ImageDescriptor};
use crate::rehydrate::{self, RehydrateError};
use crate::resolver::{self, Attribute, LookupEntity, OtherTextCapture, Resolution, ResolveError};
use crate::store::{DraftStore, POST_SUBMIT_FIELDS, SUBSCRIPTION_FIELDS};
use crate::utils::validation;
use crate::wizard::{check_selection_gate, Step, SubscriptionGate, Wizard, WizardError};
use log::*;

/// Fields that describe the listing context rather than a wizard screen.
///
const CONTEXT_FIELDS: &[Field] = &[
    Field::CategoryId,
    Field::CityId,
    Field::SubscriptionPlan,
    Field::IsSubscriberRequired,
    Field::SubscriptionActive,
];

/// Errors that can occur during a session action.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Rehydrate(#[from] RehydrateError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Drives one listing through the wizard.
///
pub struct WizardSession<S: DraftStore> {
    store: S,
    wizard: Wizard,
}

impl<S: DraftStore> WizardSession<S> {
    /// Start a new listing of the category, discarding whatever the store held.
    ///
    pub fn start(mut store: S, category: Category) -> Result<Self, DraftError> {
        store.replace_all(Draft::new(category))?;
        info!("Started new {} listing.", category);
        Ok(WizardSession {
            store,
            wizard: Wizard::new(category),
        })
    }

    /// Continue with the draft already in the store.
    ///
    pub fn resume(store: S) -> Self {
        let wizard = Wizard::resume(&store.get());
        info!(
            "Resumed {} listing at {}.",
            wizard.category(),
            wizard.current()
        );
        WizardSession { store, wizard }
    }

    /// Load a stored listing for editing. On failure the store is untouched.
    ///
    pub fn begin_edit(&mut self, category: Category, raw: &serde_json::Value) -> Result<(), SessionError> {
        let draft = rehydrate::rehydrate(category, raw)?;
        self.store.replace_all(draft)?;
        self.wizard = Wizard::resume(&self.store.get());
        info!(
            "Editing {} listing {} from {}.",
            category,
            self.store.get().envelope.product_id,
            self.wizard.current()
        );
        Ok(())
    }

    /// Fetch a stored listing and load it for editing.
    ///
    pub async fn open_listing(&mut self, client: &Client, category: Category, id: &str) -> Result<(), SessionError> {
        let raw = client.detail(category, id).await?;
        self.begin_edit(category, &raw)
    }

    pub fn draft(&self) -> Draft {
        self.store.get()
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn current_step(&self) -> Step {
        self.wizard.current()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn ensure_owned(&self, field: Field) -> Result<(), WizardError> {
        let step = self.wizard.current();
        if step.owned_fields(self.wizard.category()).contains(&field) {
            Ok(())
        } else {
            Err(WizardError::OutOfStep { field, step })
        }
    }

    /// Confirm a pick from a lookup list on the current screen.
    ///
    pub fn select<C>(
        &mut self,
        attribute: Attribute,
        entity: &LookupEntity,
        capture: &mut C,
    ) -> Result<Resolution, SessionError>
    where
        C: OtherTextCapture + ?Sized,
    {
        self.ensure_owned(attribute.field())?;
        check_selection_gate(attribute, &self.store.get())?;
        Ok(resolver::resolve(&mut self.store, attribute, entity, capture)?)
    }

    /// Write a typed text field on the current screen.
    ///
    pub fn set_text(&mut self, field: Field, text: &str) -> Result<(), SessionError> {
        self.ensure_owned(field)?;
        self.store.set(field, FieldValue::Text(text.to_string()))?;
        Ok(())
    }

    pub fn set_model_name(&mut self, text: &str) -> Result<(), SessionError> {
        self.set_text(Field::ModelName, text)
    }

    /// Write price and kilometers together. Both must be present and the
    /// price must be a plain amount.
    ///
    pub fn set_price_and_kms(&mut self, price: &str, kms: Option<u64>) -> Result<(), SessionError> {
        self.ensure_owned(Field::Price)?;
        let mut missing = vec![];
        if price.trim().is_empty() {
            missing.push(Field::Price);
        }
        if kms.is_none() {
            missing.push(Field::KmsDriven);
        }
        if !missing.is_empty() {
            return Err(WizardError::Validation {
                step: Step::PriceAndKms,
                missing,
            }
            .into());
        }
        if !validation::is_price(price) {
            return Err(WizardError::InvalidValue {
                field: Field::Price,
                reason: "enter digits only".to_string(),
            }
            .into());
        }
        let mut draft = self.store.get();
        draft.set(Field::Price, FieldValue::Text(price.trim().to_string()))?;
        draft.set(Field::KmsDriven, FieldValue::Count(kms))?;
        self.store.replace_all(draft)?;
        Ok(())
    }

    /// Write a field describing the listing context, such as the city or the
    /// subscription flags. These are not tied to a screen.
    ///
    pub fn set_context(&mut self, field: Field, value: FieldValue) -> Result<(), SessionError> {
        if !CONTEXT_FIELDS.contains(&field) {
            return Err(WizardError::OutOfStep {
                field,
                step: self.wizard.current(),
            }
            .into());
        }
        self.store.set(field, value)?;
        Ok(())
    }

    fn update_images<F>(&mut self, change: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Vec<ImageDescriptor>) -> bool,
    {
        self.ensure_owned(Field::Images)?;
        let mut draft = self.store.get();
        if change(&mut draft.envelope.images) {
            draft.envelope.touch("images");
            self.store.replace_all(draft)?;
        }
        Ok(())
    }

    pub fn add_image(&mut self, image: ImageDescriptor) -> Result<(), SessionError> {
        self.update_images(|images| {
            images.push(image);
            true
        })
    }

    /// Remove the image at the index. Out of range indexes are ignored.
    ///
    pub fn remove_image(&mut self, index: usize) -> Result<(), SessionError> {
        self.update_images(|images| {
            if index < images.len() {
                images.remove(index);
                true
            } else {
                false
            }
        })
    }

    /// Move the image at the index to the front, making it the cover.
    ///
    pub fn set_cover(&mut self, index: usize) -> Result<(), SessionError> {
        self.update_images(|images| {
            if index == 0 || index >= images.len() {
                return false;
            }
            let image = images.remove(index);
            images.insert(0, image);
            true
        })
    }

    pub fn advance(&mut self) -> Result<Step, SessionError> {
        Ok(self.wizard.advance(&self.store.get())?)
    }

    pub fn jump_to(&mut self, step: Step) -> Result<Step, SessionError> {
        Ok(self.wizard.jump_to(step, &self.store.get())?)
    }

    /// Change the listing category, keeping the shared listing context, and
    /// restart the wizard for the new category.
    ///
    pub fn switch_category(&mut self, category: Category) -> Result<(), SessionError> {
        if category == self.wizard.category() {
            return Ok(());
        }
        self.store.switch_category(category)?;
        self.wizard = Wizard::new(category);
        Ok(())
    }

    /// Clear the subscription fields when the user backs out of a
    /// subscription-gated flow.
    ///
    pub fn abandon_subscription_flow(&mut self) -> Result<(), SessionError> {
        debug!("Subscription flow abandoned; clearing subscription fields.");
        self.store.reset_fields(SUBSCRIPTION_FIELDS)?;
        Ok(())
    }

    /// Check the preview can be submitted under the given subscription gate.
    ///
    pub fn ready_to_submit(&self, gate: SubscriptionGate) -> Result<(), WizardError> {
        self.wizard.can_submit(&self.store.get(), gate)
    }

    /// Apply the outcome of a submission. Completed submissions clear the
    /// per-listing fields and restart the wizard; anything else keeps the
    /// draft as it is.
    ///
    pub fn finish_submission(&mut self, outcome: &SubmissionOutcome) -> Result<SubmitAction, SessionError> {
        let action = outcome.action();
        match &action {
            SubmitAction::Complete(notice) => {
                info!("Submission complete: {}", notice);
                self.store.reset_fields(POST_SUBMIT_FIELDS)?;
                self.wizard = Wizard::new(self.wizard.category());
            }
            SubmitAction::Block(prompt) => warn!("Submission blocked: {:?}", prompt),
            SubmitAction::Retry(message) => warn!("Submission rejected: {}", message),
        }
        Ok(action)
    }

    /// Save the draft, and publish it when asked, then apply the outcome.
    ///
    pub async fn submit(&mut self, client: &Client, publish: bool) -> Result<SubmitAction, SessionError> {
        let draft = self.store.get();
        let gate = if publish {
            SubscriptionGate::from_envelope(&draft.envelope)
        } else {
            SubscriptionGate::default()
        };
        self.wizard.can_submit(&draft, gate)?;

        let response = if draft.envelope.is_edit {
            client.update(&draft).await?
        } else {
            client.create(&draft).await?
        };
        let mut outcome = SubmissionOutcome::from_response(&response, false);

        if publish && outcome == SubmissionOutcome::Saved {
            let id = if draft.envelope.is_edit {
                draft.envelope.product_id.clone()
            } else {
                response
                    .data
                    .get("_id")
                    .and_then(|id| id.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            if id.is_empty() {
                // The listing exists server side; a retry would create it twice
                warn!("Saved {} listing came back without an id, not publishing", draft.category());
                return self.finish_submission(&outcome);
            }
            if !draft.envelope.is_edit {
                // Later retries update the saved listing instead of creating another
                self.store.set(Field::ProductId, FieldValue::Text(id.clone()))?;
                self.store.set(Field::IsEdit, FieldValue::Flag(true))?;
            }
            let response = client.publish(draft.category(), &id).await?;
            outcome = SubmissionOutcome::from_response(&response, true);
        }

        self.finish_submission(&outcome)
    }
}
