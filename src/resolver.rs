//! "Others" reconciliation for selectable attributes.
//!
//! A lookup list may contain a sentinel entity flagged `isOthers`. Picking it
//! asks the user for free text, and the draft records the sentinel ID together
//! with that text. Picking any other entity records its ID alone.

use crate::draft::{Category, DraftError, Field, FieldValue, Selection};
use crate::store::DraftStore;
use fake::Dummy;
use log::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Specifying the selectable attributes backed by a lookup list.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Brand,
    Name,
    Transmission,
    FuelType,
    Color,
    Ownership,
    Year,
    BikeType,
    SpareCondition,
    SpareProductType,
    SpareSubProductType,
    SpareBrand,
    SpareModel,
}

impl Attribute {
    /// Returns the draft field holding the selection.
    ///
    pub fn field(&self) -> Field {
        match self {
            Attribute::Brand => Field::Brand,
            Attribute::Name => Field::Name,
            Attribute::Transmission => Field::Transmission,
            Attribute::FuelType => Field::FuelType,
            Attribute::Color => Field::Color,
            Attribute::Ownership => Field::Ownership,
            Attribute::Year => Field::Year,
            Attribute::BikeType => Field::BikeType,
            Attribute::SpareCondition => Field::SpareCondition,
            Attribute::SpareProductType => Field::SpareProductType,
            Attribute::SpareSubProductType => Field::SpareSubProductType,
            Attribute::SpareBrand => Field::SpareBrand,
            Attribute::SpareModel => Field::SpareModel,
        }
    }

    /// Returns true when the attribute has a free-text override slot.
    ///
    pub fn accepts_other(&self) -> bool {
        matches!(
            self,
            Attribute::Brand
                | Attribute::Name
                | Attribute::FuelType
                | Attribute::Color
                | Attribute::Ownership
                | Attribute::SpareBrand
                | Attribute::SpareModel
        )
    }

    /// Returns the attribute for a field, if the field is a selection.
    ///
    pub fn for_field(field: Field) -> Option<Attribute> {
        ATTRIBUTES.iter().copied().find(|a| a.field() == field)
    }

    pub fn applies_to(&self, category: Category) -> bool {
        self.field().applies_to(category)
    }
}

const ATTRIBUTES: [Attribute; 13] = [
    Attribute::Brand,
    Attribute::Name,
    Attribute::Transmission,
    Attribute::FuelType,
    Attribute::Color,
    Attribute::Ownership,
    Attribute::Year,
    Attribute::BikeType,
    Attribute::SpareCondition,
    Attribute::SpareProductType,
    Attribute::SpareSubProductType,
    Attribute::SpareBrand,
    Attribute::SpareModel,
];

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Brand | Attribute::SpareBrand => "brand",
            Attribute::Name => "model",
            Attribute::Transmission => "transmission",
            Attribute::FuelType => "fuel type",
            Attribute::Color => "color",
            Attribute::Ownership => "ownership",
            Attribute::Year => "year",
            Attribute::BikeType => "bike type",
            Attribute::SpareCondition => "condition",
            Attribute::SpareProductType => "product type",
            Attribute::SpareSubProductType => "sub product type",
            Attribute::SpareModel => "part model",
        })
    }
}

/// Defines an entry of a lookup list.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntity {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "isOthers", default)]
    pub is_others: bool,
}

/// Collects the free text for an "Others" pick, typically through a modal.
/// Returning None means the user cancelled.
///
pub trait OtherTextCapture {
    fn capture(&mut self, attribute: Attribute, entity: &LookupEntity) -> Option<String>;
}

impl<F> OtherTextCapture for F
where
    F: FnMut(Attribute, &LookupEntity) -> Option<String>,
{
    fn capture(&mut self, attribute: Attribute, entity: &LookupEntity) -> Option<String> {
        self(attribute, entity)
    }
}

/// Result of resolving a pick.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Selected(Selection),
    Cancelled,
}

/// Errors that can occur while resolving a pick.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The user confirmed an empty override
    #[error("Please enter a value for {attribute}")]
    EmptyOtherText { attribute: Attribute },

    /// The attribute has no override slot
    #[error("{attribute} does not accept a custom value")]
    OtherNotSupported { attribute: Attribute },

    /// The lookup entity carries no ID
    #[error("Selected {attribute} has no ID")]
    MissingEntityId { attribute: Attribute },

    /// Writing the draft failed
    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// Turn a pick into a selection without touching the draft. Returns None
/// when the user cancelled the free-text capture.
///
pub fn selection_for<C>(
    attribute: Attribute,
    entity: &LookupEntity,
    capture: &mut C,
) -> Result<Option<Selection>, ResolveError>
where
    C: OtherTextCapture + ?Sized,
{
    if entity.id.trim().is_empty() {
        return Err(ResolveError::MissingEntityId { attribute });
    }
    if !entity.is_others {
        return Ok(Some(Selection::Canonical(entity.id.clone())));
    }
    if !attribute.accepts_other() {
        return Err(ResolveError::OtherNotSupported { attribute });
    }
    match capture.capture(attribute, entity) {
        None => Ok(None),
        Some(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(ResolveError::EmptyOtherText { attribute });
            }
            Ok(Some(Selection::Other {
                sentinel_id: entity.id.clone(),
                text: text.to_string(),
            }))
        }
    }
}

/// Resolve a pick and write it into the draft. On cancellation or error the
/// draft is left as it was.
///
pub fn resolve<S, C>(
    store: &mut S,
    attribute: Attribute,
    entity: &LookupEntity,
    capture: &mut C,
) -> Result<Resolution, ResolveError>
where
    S: DraftStore + ?Sized,
    C: OtherTextCapture + ?Sized,
{
    match selection_for(attribute, entity, capture)? {
        Some(selection) => {
            store.set(attribute.field(), FieldValue::Selection(Some(selection.clone())))?;
            Ok(Resolution::Selected(selection))
        }
        None => {
            debug!("Custom {} entry cancelled; draft unchanged.", attribute);
            Ok(Resolution::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;
    use crate::store::MemoryStore;
    use fake::{Fake, Faker};

    fn entity(id: &str, is_others: bool) -> LookupEntity {
        LookupEntity {
            id: id.to_string(),
            name: id.to_string(),
            is_others,
        }
    }

    fn never_called(_: Attribute, _: &LookupEntity) -> Option<String> {
        panic!("capture should not be invoked for canonical picks")
    }

    #[test]
    fn canonical_pick_writes_id() {
        let mut store = MemoryStore::new(Category::Car);
        let mut pick: LookupEntity = Faker.fake();
        pick.is_others = false;
        pick.id = "fuel_3".to_string();
        let resolution = resolve(&mut store, Attribute::FuelType, &pick, &mut never_called).unwrap();
        assert_eq!(
            resolution,
            Resolution::Selected(Selection::Canonical("fuel_3".to_string()))
        );
        let fuel = store.get().vehicle().unwrap().fuel.clone().unwrap();
        assert_eq!(fuel.id(), "fuel_3");
        assert_eq!(fuel.other_text(), None);
    }

    #[test]
    fn canonical_pick_never_writes_override() {
        for attribute in ATTRIBUTES.iter().copied().filter(|a| a.accepts_other()) {
            let category = if attribute.applies_to(Category::Car) {
                Category::Car
            } else {
                Category::Spare
            };
            let mut store = MemoryStore::new(category);
            resolve(&mut store, attribute, &entity("canon", false), &mut never_called).unwrap();
            let value = store.get().get(attribute.field()).unwrap();
            match value {
                FieldValue::Selection(Some(selection)) => assert_eq!(selection.other_text(), None),
                other => panic!("unexpected value {:?}", other),
            }
        }
    }

    #[test]
    fn other_pick_writes_sentinel_and_text() {
        let mut store = MemoryStore::new(Category::Car);
        let mut capture = |attribute: Attribute, _: &LookupEntity| {
            assert_eq!(attribute, Attribute::Ownership);
            Some("  Company owned  ".to_string())
        };
        resolve(
            &mut store,
            Attribute::Ownership,
            &entity("own_others", true),
            &mut capture,
        )
        .unwrap();
        let ownership = store.get().vehicle().unwrap().ownership.clone().unwrap();
        assert_eq!(ownership.id(), "own_others");
        assert_eq!(ownership.other_text(), Some("Company owned"));
    }

    #[test]
    fn cancelled_capture_leaves_draft_unchanged() {
        let mut store = MemoryStore::new(Category::Spare);
        store
            .set(Field::SpareBrand, Selection::Canonical("bosch".to_string()).into())
            .unwrap();
        let before = store.get();
        let resolution = resolve(
            &mut store,
            Attribute::SpareBrand,
            &entity("brand_others", true),
            &mut |_: Attribute, _: &LookupEntity| -> Option<String> { None },
        )
        .unwrap();
        assert_eq!(resolution, Resolution::Cancelled);
        assert_eq!(store.get(), before);
    }

    #[test]
    fn empty_capture_is_validation_error() {
        let mut store = MemoryStore::new(Category::Car);
        let result = resolve(
            &mut store,
            Attribute::Name,
            &entity("name_others", true),
            &mut |_: Attribute, _: &LookupEntity| Some("   ".to_string()),
        );
        assert!(matches!(
            result,
            Err(ResolveError::EmptyOtherText {
                attribute: Attribute::Name
            })
        ));
        assert_eq!(store.get(), Draft::new(Category::Car));
    }

    #[test]
    fn other_pick_rejected_without_override_slot() {
        let mut store = MemoryStore::new(Category::Car);
        let result = resolve(
            &mut store,
            Attribute::Transmission,
            &entity("trans_others", true),
            &mut |_: Attribute, _: &LookupEntity| Some("Semi-auto".to_string()),
        );
        assert!(matches!(result, Err(ResolveError::OtherNotSupported { .. })));
    }

    #[test]
    fn pick_for_missing_field_is_rejected() {
        let mut store = MemoryStore::new(Category::Bike);
        let result = resolve(
            &mut store,
            Attribute::Transmission,
            &entity("trans_1", false),
            &mut never_called,
        );
        assert!(matches!(
            result,
            Err(ResolveError::Draft(DraftError::NotApplicable { .. }))
        ));
    }

    #[test]
    fn entity_without_id_is_rejected() {
        let result = selection_for(Attribute::Color, &entity("", false), &mut never_called);
        assert!(matches!(result, Err(ResolveError::MissingEntityId { .. })));
    }

    #[test]
    fn attribute_for_field() {
        for attribute in ATTRIBUTES {
            assert_eq!(Attribute::for_field(attribute.field()), Some(attribute));
        }
        assert_eq!(Attribute::for_field(Field::Price), None);
    }

    #[test]
    fn lookup_entity_deserializes_marker() {
        let entity: LookupEntity =
            serde_json::from_str(r#"{"_id":"c1","name":"Others","isOthers":true}"#).unwrap();
        assert!(entity.is_others);
        let entity: LookupEntity = serde_json::from_str(r#"{"_id":"c2"}"#).unwrap();
        assert!(!entity.is_others);
        assert_eq!(entity.name, "");
    }
}
