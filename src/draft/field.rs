//! Addressable draft fields.
//!
//! Screens read and write the draft one field at a time using the wire names
//! the listing API and the screens agree on. Each field has a fixed value
//! kind; writes of another kind are rejected, as are writes to fields the
//! active category does not have.

use super::model::{BikeDraft, Draft, ImageDescriptor, Listing, Selection, SpareDraft, VehicleDraft};
use super::{Category, DraftError};
use log::*;
use std::fmt;
use std::str::FromStr;

/// Specifying every field a screen may address.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    // Identity
    CategoryId,
    CityId,
    SubscriptionPlan,
    ProductId,
    // Selections
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
    // Scalars
    ModelName,
    Price,
    KmsDriven,
    SpareName,
    SpareDescription,
    SparePrice,
    SpareYear,
    // Media and flags
    Images,
    IsPublished,
    IsEdit,
    IsSubscriberRequired,
    SubscriptionActive,
}

/// Specifying the value kind a field holds.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Count,
    Flag,
    Selection,
    Images,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Text => "text",
            FieldKind::Count => "count",
            FieldKind::Flag => "flag",
            FieldKind::Selection => "selection",
            FieldKind::Images => "images",
        })
    }
}

impl Field {
    pub const ALL: [Field; 29] = [
        Field::CategoryId,
        Field::CityId,
        Field::SubscriptionPlan,
        Field::ProductId,
        Field::Brand,
        Field::Name,
        Field::Transmission,
        Field::FuelType,
        Field::Color,
        Field::Ownership,
        Field::Year,
        Field::BikeType,
        Field::SpareCondition,
        Field::SpareProductType,
        Field::SpareSubProductType,
        Field::SpareBrand,
        Field::SpareModel,
        Field::ModelName,
        Field::Price,
        Field::KmsDriven,
        Field::SpareName,
        Field::SpareDescription,
        Field::SparePrice,
        Field::SpareYear,
        Field::Images,
        Field::IsPublished,
        Field::IsEdit,
        Field::IsSubscriberRequired,
        Field::SubscriptionActive,
    ];

    /// Returns the name screens and payloads use for the field.
    ///
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::CategoryId => "category_id",
            Field::CityId => "city_id",
            Field::SubscriptionPlan => "subscription_plan",
            Field::ProductId => "carandbikeproductid",
            Field::Brand => "carAndBikeBrandId",
            Field::Name => "carandBikeId",
            Field::Transmission => "transmissionId",
            Field::FuelType => "fuelTypeId",
            Field::Color => "carColorId",
            Field::Ownership => "ownershipId",
            Field::Year => "yearId",
            Field::BikeType => "bikeTypeId",
            Field::SpareCondition => "spareConditionId",
            Field::SpareProductType => "spareProductTypeId",
            Field::SpareSubProductType => "spareSubProductTypeId",
            Field::SpareBrand => "Sparebrand",
            Field::SpareModel => "Sparemodel",
            Field::ModelName => "model_name",
            Field::Price => "price",
            Field::KmsDriven => "kmsDriven",
            Field::SpareName => "Sparename",
            Field::SpareDescription => "Sparedescription",
            Field::SparePrice => "Spareprice",
            Field::SpareYear => "Spareyear_of_manufacture",
            Field::Images => "images",
            Field::IsPublished => "isPublished",
            Field::IsEdit => "isEdit",
            Field::IsSubscriberRequired => "isSubscriberRequired",
            Field::SubscriptionActive => "subscriptionActive",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Brand
            | Field::Name
            | Field::Transmission
            | Field::FuelType
            | Field::Color
            | Field::Ownership
            | Field::Year
            | Field::BikeType
            | Field::SpareCondition
            | Field::SpareProductType
            | Field::SpareSubProductType
            | Field::SpareBrand
            | Field::SpareModel => FieldKind::Selection,
            Field::KmsDriven => FieldKind::Count,
            Field::Images => FieldKind::Images,
            Field::IsPublished
            | Field::IsEdit
            | Field::IsSubscriberRequired
            | Field::SubscriptionActive => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    /// Returns true when drafts of the category carry this field.
    ///
    pub fn applies_to(&self, category: Category) -> bool {
        Draft::new(category).get(*self).is_ok()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Field {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The spare flow historically used its own edit flag name.
        if s == "isEditSpare" {
            return Ok(Field::IsEdit);
        }
        Field::ALL
            .iter()
            .find(|field| field.wire_name() == s)
            .copied()
            .ok_or_else(|| DraftError::UnknownField(s.to_string()))
    }
}

/// Value read from or written to a single field.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Count(Option<u64>),
    Flag(bool),
    Selection(Option<Selection>),
    Images(Vec<ImageDescriptor>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Count(_) => FieldKind::Count,
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Selection(_) => FieldKind::Selection,
            FieldValue::Images(_) => FieldKind::Images,
        }
    }

    /// Returns true when the value would not satisfy a step that requires it.
    /// Flags are never considered empty.
    ///
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Count(count) => count.is_none(),
            FieldValue::Flag(_) => false,
            FieldValue::Selection(selection) => {
                !selection.as_ref().map(Selection::is_complete).unwrap_or(false)
            }
            FieldValue::Images(images) => images.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Flag(flag)
    }
}

impl From<Selection> for FieldValue {
    fn from(selection: Selection) -> Self {
        FieldValue::Selection(Some(selection))
    }
}

/// Borrowed view of a field slot.
///
enum Slot<'a> {
    Text(&'a String),
    Count(&'a Option<u64>),
    Flag(&'a bool),
    Selection(&'a Option<Selection>),
    Images(&'a Vec<ImageDescriptor>),
}

impl Slot<'_> {
    fn to_value(&self) -> FieldValue {
        match self {
            Slot::Text(text) => FieldValue::Text((*text).clone()),
            Slot::Count(count) => FieldValue::Count(**count),
            Slot::Flag(flag) => FieldValue::Flag(**flag),
            Slot::Selection(selection) => FieldValue::Selection((*selection).clone()),
            Slot::Images(images) => FieldValue::Images((*images).clone()),
        }
    }
}

/// Mutable view of a field slot.
///
enum SlotMut<'a> {
    Text(&'a mut String),
    Count(&'a mut Option<u64>),
    Flag(&'a mut bool),
    Selection(&'a mut Option<Selection>),
    Images(&'a mut Vec<ImageDescriptor>),
}

impl VehicleDraft {
    fn slot(&self, field: Field, is_bike: bool) -> Option<Slot<'_>> {
        Some(match field {
            Field::Brand => Slot::Selection(&self.brand),
            Field::Name => Slot::Selection(&self.name),
            Field::Transmission if !is_bike => Slot::Selection(&self.transmission),
            Field::FuelType => Slot::Selection(&self.fuel),
            Field::Color => Slot::Selection(&self.color),
            Field::Ownership => Slot::Selection(&self.ownership),
            Field::Year => Slot::Selection(&self.year),
            Field::ModelName => Slot::Text(&self.model_name),
            Field::Price => Slot::Text(&self.price),
            Field::KmsDriven => Slot::Count(&self.kms_driven),
            _ => return None,
        })
    }

    fn slot_mut(&mut self, field: Field, is_bike: bool) -> Option<SlotMut<'_>> {
        Some(match field {
            Field::Brand => SlotMut::Selection(&mut self.brand),
            Field::Name => SlotMut::Selection(&mut self.name),
            Field::Transmission if !is_bike => SlotMut::Selection(&mut self.transmission),
            Field::FuelType => SlotMut::Selection(&mut self.fuel),
            Field::Color => SlotMut::Selection(&mut self.color),
            Field::Ownership => SlotMut::Selection(&mut self.ownership),
            Field::Year => SlotMut::Selection(&mut self.year),
            Field::ModelName => SlotMut::Text(&mut self.model_name),
            Field::Price => SlotMut::Text(&mut self.price),
            Field::KmsDriven => SlotMut::Count(&mut self.kms_driven),
            _ => return None,
        })
    }
}

impl BikeDraft {
    fn slot(&self, field: Field) -> Option<Slot<'_>> {
        match field {
            Field::BikeType => Some(Slot::Selection(&self.bike_type)),
            _ => self.vehicle.slot(field, true),
        }
    }

    fn slot_mut(&mut self, field: Field) -> Option<SlotMut<'_>> {
        match field {
            Field::BikeType => Some(SlotMut::Selection(&mut self.bike_type)),
            _ => self.vehicle.slot_mut(field, true),
        }
    }
}

impl SpareDraft {
    fn slot(&self, field: Field) -> Option<Slot<'_>> {
        Some(match field {
            Field::SpareCondition => Slot::Selection(&self.condition),
            Field::SpareProductType => Slot::Selection(&self.product_type),
            Field::SpareSubProductType => Slot::Selection(&self.sub_product_type),
            Field::SpareBrand => Slot::Selection(&self.brand),
            Field::SpareModel => Slot::Selection(&self.model),
            Field::SpareName => Slot::Text(&self.name),
            Field::SpareDescription => Slot::Text(&self.description),
            Field::SparePrice => Slot::Text(&self.price),
            Field::SpareYear => Slot::Text(&self.year_of_manufacture),
            _ => return None,
        })
    }

    fn slot_mut(&mut self, field: Field) -> Option<SlotMut<'_>> {
        Some(match field {
            Field::SpareCondition => SlotMut::Selection(&mut self.condition),
            Field::SpareProductType => SlotMut::Selection(&mut self.product_type),
            Field::SpareSubProductType => SlotMut::Selection(&mut self.sub_product_type),
            Field::SpareBrand => SlotMut::Selection(&mut self.brand),
            Field::SpareModel => SlotMut::Selection(&mut self.model),
            Field::SpareName => SlotMut::Text(&mut self.name),
            Field::SpareDescription => SlotMut::Text(&mut self.description),
            Field::SparePrice => SlotMut::Text(&mut self.price),
            Field::SpareYear => SlotMut::Text(&mut self.year_of_manufacture),
            _ => return None,
        })
    }
}

impl Listing {
    fn slot(&self, field: Field) -> Option<Slot<'_>> {
        match self {
            Listing::Car(vehicle) => vehicle.slot(field, false),
            Listing::Bike(bike) => bike.slot(field),
            Listing::Spare(spare) => spare.slot(field),
        }
    }

    fn slot_mut(&mut self, field: Field) -> Option<SlotMut<'_>> {
        match self {
            Listing::Car(vehicle) => vehicle.slot_mut(field, false),
            Listing::Bike(bike) => bike.slot_mut(field),
            Listing::Spare(spare) => spare.slot_mut(field),
        }
    }
}

impl Draft {
    fn slot(&self, field: Field) -> Option<Slot<'_>> {
        let envelope = &self.envelope;
        Some(match field {
            Field::CategoryId => Slot::Text(&envelope.category_id),
            Field::CityId => Slot::Text(&envelope.city_id),
            Field::SubscriptionPlan => Slot::Text(&envelope.subscription_plan),
            Field::ProductId => Slot::Text(&envelope.product_id),
            Field::Images => Slot::Images(&envelope.images),
            Field::IsPublished => Slot::Flag(&envelope.is_published),
            Field::IsEdit => Slot::Flag(&envelope.is_edit),
            Field::IsSubscriberRequired => Slot::Flag(&envelope.is_subscriber_required),
            Field::SubscriptionActive => Slot::Flag(&envelope.subscription_active),
            _ => return self.listing.slot(field),
        })
    }

    fn slot_mut(&mut self, field: Field) -> Option<SlotMut<'_>> {
        let envelope = &mut self.envelope;
        Some(match field {
            Field::CategoryId => SlotMut::Text(&mut envelope.category_id),
            Field::CityId => SlotMut::Text(&mut envelope.city_id),
            Field::SubscriptionPlan => SlotMut::Text(&mut envelope.subscription_plan),
            Field::ProductId => SlotMut::Text(&mut envelope.product_id),
            Field::Images => SlotMut::Images(&mut envelope.images),
            Field::IsPublished => SlotMut::Flag(&mut envelope.is_published),
            Field::IsEdit => SlotMut::Flag(&mut envelope.is_edit),
            Field::IsSubscriberRequired => SlotMut::Flag(&mut envelope.is_subscriber_required),
            Field::SubscriptionActive => SlotMut::Flag(&mut envelope.subscription_active),
            _ => return self.listing.slot_mut(field),
        })
    }

    /// Returns the current value of a field.
    ///
    pub fn get(&self, field: Field) -> Result<FieldValue, DraftError> {
        self.slot(field)
            .map(|slot| slot.to_value())
            .ok_or(DraftError::NotApplicable {
                field,
                category: self.category(),
            })
    }

    /// Replaces the value of exactly one field.
    ///
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), DraftError> {
        let category = self.category();
        let slot = self
            .slot_mut(field)
            .ok_or(DraftError::NotApplicable { field, category })?;
        match (slot, value) {
            (SlotMut::Text(slot), FieldValue::Text(value)) => *slot = value,
            (SlotMut::Count(slot), FieldValue::Count(value)) => *slot = value,
            (SlotMut::Flag(slot), FieldValue::Flag(value)) => *slot = value,
            (SlotMut::Selection(slot), FieldValue::Selection(value)) => *slot = value,
            (SlotMut::Images(slot), FieldValue::Images(value)) => *slot = value,
            (_, value) => {
                return Err(DraftError::TypeMismatch {
                    field,
                    expected: field.kind(),
                    found: value.kind(),
                })
            }
        }
        Ok(())
    }

    /// Resets each named field to the value the zero template holds for it.
    /// Fields the active category does not carry are skipped.
    ///
    pub fn reset_fields(&mut self, fields: &[Field]) -> Result<(), DraftError> {
        let template = Draft::new(self.category());
        for &field in fields {
            match template.get(field) {
                Ok(zero) => self.set(field, zero)?,
                Err(DraftError::NotApplicable { .. }) => {
                    debug!(
                        "Skipping reset of {} for {} draft.",
                        field,
                        self.category()
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Returns the fields from the list that are still unfilled. Fields the
    /// active category does not carry are never reported.
    ///
    pub fn missing(&self, fields: &[Field]) -> Vec<Field> {
        fields
            .iter()
            .copied()
            .filter(|field| match self.get(*field) {
                Ok(value) => value.is_empty(),
                Err(_) => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(id: &str) -> FieldValue {
        FieldValue::Selection(Some(Selection::Canonical(id.to_string())))
    }

    #[test]
    fn test_field_wire_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.wire_name().parse::<Field>().unwrap(), field);
        }
        assert_eq!("isEditSpare".parse::<Field>().unwrap(), Field::IsEdit);
        assert!(matches!(
            "colour".parse::<Field>(),
            Err(DraftError::UnknownField(_))
        ));
    }

    #[test]
    fn test_field_applies_to() {
        assert!(Field::Transmission.applies_to(Category::Car));
        assert!(!Field::Transmission.applies_to(Category::Bike));
        assert!(Field::BikeType.applies_to(Category::Bike));
        assert!(!Field::BikeType.applies_to(Category::Car));
        assert!(Field::SpareName.applies_to(Category::Spare));
        assert!(!Field::ModelName.applies_to(Category::Spare));
        for category in Category::ALL {
            assert!(Field::Images.applies_to(category));
            assert!(Field::IsPublished.applies_to(category));
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut draft = Draft::new(Category::Car);
        draft.set(Field::Brand, canonical("brand_42")).unwrap();
        draft.set(Field::ModelName, "VXi".into()).unwrap();
        draft.set(Field::KmsDriven, FieldValue::Count(Some(35000))).unwrap();
        draft.set(Field::IsPublished, true.into()).unwrap();

        assert_eq!(draft.get(Field::Brand).unwrap(), canonical("brand_42"));
        assert_eq!(draft.get(Field::ModelName).unwrap(), FieldValue::Text("VXi".to_string()));
        assert_eq!(draft.get(Field::KmsDriven).unwrap(), FieldValue::Count(Some(35000)));
        assert_eq!(draft.get(Field::IsPublished).unwrap(), FieldValue::Flag(true));
    }

    #[test]
    fn test_set_rejects_type_mismatch() {
        let mut draft = Draft::new(Category::Car);
        let before = draft.clone();
        let result = draft.set(Field::Images, "cover.jpg".into());
        assert!(matches!(
            result,
            Err(DraftError::TypeMismatch {
                field: Field::Images,
                expected: FieldKind::Images,
                found: FieldKind::Text,
            })
        ));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_set_rejects_field_of_other_category() {
        let mut draft = Draft::new(Category::Spare);
        let result = draft.set(Field::ModelName, "VXi".into());
        assert!(matches!(
            result,
            Err(DraftError::NotApplicable {
                field: Field::ModelName,
                category: Category::Spare,
            })
        ));
    }

    #[test]
    fn test_set_is_independent_of_order() {
        let writes = vec![
            (Field::Brand, canonical("brand_1")),
            (Field::Color, canonical("color_9")),
            (Field::Price, FieldValue::Text("100".to_string())),
            (Field::Brand, canonical("brand_2")),
            (Field::CityId, FieldValue::Text("city_5".to_string())),
        ];
        let mut forward = Draft::new(Category::Car);
        for (field, value) in writes.iter().cloned() {
            forward.set(field, value).unwrap();
        }
        // Reorder writes across distinct fields, keeping per-field order.
        let mut shuffled = Draft::new(Category::Car);
        for index in [4, 2, 0, 1, 3] {
            let (field, value) = writes[index].clone();
            shuffled.set(field, value).unwrap();
        }
        assert_eq!(forward, shuffled);
        assert_eq!(forward.get(Field::Brand).unwrap(), canonical("brand_2"));
    }

    #[test]
    fn test_reset_fields_uses_template() {
        let mut draft = Draft::new(Category::Car);
        draft
            .set(
                Field::Images,
                FieldValue::Images(vec![ImageDescriptor {
                    uri: "file:///a.jpg".to_string(),
                    name: "a.jpg".to_string(),
                    mime_type: "image/jpeg".to_string(),
                }]),
            )
            .unwrap();
        draft.set(Field::IsPublished, true.into()).unwrap();
        draft.set(Field::ModelName, "VXi".into()).unwrap();
        draft.set(Field::Brand, canonical("brand_42")).unwrap();
        draft.set(Field::CityId, "city_1".into()).unwrap();
        let before = draft.clone();

        draft
            .reset_fields(&[Field::Images, Field::IsPublished, Field::ModelName])
            .unwrap();

        assert_eq!(draft.get(Field::Images).unwrap(), FieldValue::Images(vec![]));
        assert_eq!(draft.get(Field::IsPublished).unwrap(), FieldValue::Flag(false));
        assert_eq!(draft.get(Field::ModelName).unwrap(), FieldValue::Text(String::new()));
        for field in Field::ALL {
            if matches!(field, Field::Images | Field::IsPublished | Field::ModelName) {
                continue;
            }
            assert_eq!(draft.get(field).ok(), before.get(field).ok(), "{} changed", field);
        }
    }

    #[test]
    fn test_reset_skips_fields_of_other_category() {
        let mut draft = Draft::new(Category::Spare);
        draft.set(Field::SpareName, "Brake pad".into()).unwrap();
        draft
            .reset_fields(&[Field::ModelName, Field::SpareName])
            .unwrap();
        assert_eq!(draft, Draft::new(Category::Spare));
    }

    #[test]
    fn test_missing() {
        let mut draft = Draft::new(Category::Bike);
        draft.set(Field::BikeType, canonical("sports")).unwrap();
        draft
            .set(
                Field::FuelType,
                FieldValue::Selection(Some(Selection::Other {
                    sentinel_id: "fuel_others".to_string(),
                    text: String::new(),
                })),
            )
            .unwrap();
        let missing = draft.missing(&[
            Field::BikeType,
            Field::Transmission,
            Field::FuelType,
            Field::ModelName,
            Field::IsPublished,
        ]);
        assert_eq!(missing, vec![Field::FuelType, Field::ModelName]);
    }
}
