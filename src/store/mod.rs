//! Draft store module.
//!
//! The store owns the single in-progress draft for the current wizard
//! session. It is handed to each screen controller explicitly rather than
//! living in a global, and is accessed through the `DraftStore` trait so that
//! other backings (such as the on-disk `FileStore`) can be swapped in.

mod file;

pub use file::FileStore;

use crate::draft::{Category, Draft, DraftError, Field, FieldValue, Listing};
use log::*;

/// Fields cleared when the user abandons a subscription-gated flow.
///
pub const SUBSCRIPTION_FIELDS: &[Field] = &[
    Field::SubscriptionPlan,
    Field::IsSubscriberRequired,
    Field::SubscriptionActive,
];

/// Fields cleared after a listing was submitted successfully.
///
pub const POST_SUBMIT_FIELDS: &[Field] = &[
    Field::ProductId,
    Field::Images,
    Field::IsPublished,
    Field::IsEdit,
    Field::ModelName,
    Field::Price,
    Field::KmsDriven,
    Field::SpareName,
    Field::SpareDescription,
    Field::SparePrice,
    Field::SpareYear,
];

/// Holds the current draft and exposes whole-draft and per-field access.
///
pub trait DraftStore {
    /// Returns a snapshot of the current draft.
    fn get(&self) -> Draft;

    /// Replaces exactly one field, leaving every other field unchanged.
    fn set(&mut self, field: Field, value: FieldValue) -> Result<(), DraftError>;

    /// Replaces the whole draft. Nothing is defaulted.
    fn replace_all(&mut self, draft: Draft) -> Result<(), DraftError>;

    /// Resets the named fields to their template defaults.
    fn reset_fields(&mut self, fields: &[Field]) -> Result<(), DraftError>;

    /// Swap the category-specific part of the draft for an empty one of the
    /// given category, keeping the shared envelope.
    fn switch_category(&mut self, category: Category) -> Result<(), DraftError> {
        let mut draft = self.get();
        if draft.category() == category {
            return Ok(());
        }
        info!(
            "Switching draft category from {} to {}.",
            draft.category(),
            category
        );
        draft.listing = Listing::new(category);
        self.replace_all(draft)
    }
}

/// In-memory draft store.
///
#[derive(Clone, Debug)]
pub struct MemoryStore {
    draft: Draft,
}

impl MemoryStore {
    /// Returns a store holding a fresh draft for the category.
    ///
    pub fn new(category: Category) -> Self {
        MemoryStore {
            draft: Draft::new(category),
        }
    }

    /// Returns a store holding the given draft.
    ///
    pub fn with_draft(draft: Draft) -> Self {
        MemoryStore { draft }
    }

    /// Borrow the current draft without cloning.
    ///
    pub fn draft(&self) -> &Draft {
        &self.draft
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new(Category::Car)
    }
}

impl DraftStore for MemoryStore {
    fn get(&self) -> Draft {
        self.draft.clone()
    }

    fn set(&mut self, field: Field, value: FieldValue) -> Result<(), DraftError> {
        debug!("Setting draft field {} to {:?}", field, value);
        self.draft.set(field, value)
    }

    fn replace_all(&mut self, draft: Draft) -> Result<(), DraftError> {
        debug!("Replacing {} draft with {} draft.", self.draft.category(), draft.category());
        self.draft = draft;
        Ok(())
    }

    fn reset_fields(&mut self, fields: &[Field]) -> Result<(), DraftError> {
        debug!(
            "Resetting draft fields: {}",
            fields
                .iter()
                .map(Field::wire_name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        // Apply to a copy so a failure leaves the draft untouched.
        let mut draft = self.draft.clone();
        draft.reset_fields(fields)?;
        self.draft = draft;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{ImageDescriptor, Selection};

    fn canonical(id: &str) -> FieldValue {
        FieldValue::Selection(Some(Selection::Canonical(id.to_string())))
    }

    #[test]
    fn get_reflects_last_write() {
        let mut store = MemoryStore::new(Category::Car);
        store.set(Field::Color, canonical("color_1")).unwrap();
        store.set(Field::Ownership, canonical("own_2")).unwrap();
        store.set(Field::Color, canonical("color_9")).unwrap();
        let draft = store.get();
        assert_eq!(draft.get(Field::Color).unwrap(), canonical("color_9"));
        assert_eq!(draft.get(Field::Ownership).unwrap(), canonical("own_2"));
    }

    #[test]
    fn set_preserves_other_fields() {
        let mut store = MemoryStore::new(Category::Car);
        store.set(Field::Brand, canonical("brand_42")).unwrap();
        let before = store.get();
        store.set(Field::Price, "450000".into()).unwrap();
        let after = store.get();
        for field in Field::ALL {
            if field == Field::Price {
                continue;
            }
            assert_eq!(before.get(field).ok(), after.get(field).ok());
        }
    }

    #[test]
    fn replace_all_does_not_default_fields() {
        let mut store = MemoryStore::new(Category::Car);
        store.set(Field::CityId, "city_1".into()).unwrap();
        let replacement = Draft::new(Category::Spare);
        store.replace_all(replacement.clone()).unwrap();
        assert_eq!(store.get(), replacement);
    }

    #[test]
    fn reset_fields_leaves_unnamed_fields() {
        let mut store = MemoryStore::new(Category::Car);
        store
            .set(
                Field::Images,
                FieldValue::Images(vec![ImageDescriptor {
                    uri: "file:///tmp/front.png".to_string(),
                    name: "front.png".to_string(),
                    mime_type: "image/png".to_string(),
                }]),
            )
            .unwrap();
        store.set(Field::IsPublished, true.into()).unwrap();
        store.set(Field::ModelName, "VXi".into()).unwrap();
        store.set(Field::Year, canonical("year_2020")).unwrap();
        store.set(Field::SubscriptionActive, true.into()).unwrap();

        store
            .reset_fields(&[Field::Images, Field::IsPublished, Field::ModelName])
            .unwrap();

        let draft = store.get();
        assert!(draft.envelope.images.is_empty());
        assert!(!draft.envelope.is_published);
        assert_eq!(draft.vehicle().unwrap().model_name, "");
        assert_eq!(draft.get(Field::Year).unwrap(), canonical("year_2020"));
        assert!(draft.envelope.subscription_active);
    }

    #[test]
    fn reset_subscription_fields() {
        let mut store = MemoryStore::new(Category::Bike);
        store.set(Field::SubscriptionPlan, "gold".into()).unwrap();
        store.set(Field::IsSubscriberRequired, true.into()).unwrap();
        store.set(Field::BikeType, canonical("cruiser")).unwrap();
        store.reset_fields(SUBSCRIPTION_FIELDS).unwrap();
        let draft = store.get();
        assert_eq!(draft.envelope.subscription_plan, "");
        assert!(!draft.envelope.is_subscriber_required);
        assert_eq!(draft.get(Field::BikeType).unwrap(), canonical("cruiser"));
    }

    #[test]
    fn switch_category_keeps_envelope() {
        let mut store = MemoryStore::new(Category::Car);
        store.set(Field::CityId, "city_7".into()).unwrap();
        store.set(Field::Brand, canonical("brand_42")).unwrap();
        store.switch_category(Category::Bike).unwrap();
        let draft = store.get();
        assert_eq!(draft.category(), Category::Bike);
        assert_eq!(draft.envelope.city_id, "city_7");
        assert_eq!(draft.get(Field::Brand).unwrap(), FieldValue::Selection(None));
    }

    #[test]
    fn switch_to_same_category_is_noop() {
        let mut store = MemoryStore::new(Category::Spare);
        store.set(Field::SpareName, "Clutch plate".into()).unwrap();
        let before = store.get();
        store.switch_category(Category::Spare).unwrap();
        assert_eq!(store.get(), before);
    }
}
