//! Flattening of a draft into the submission payload.
//!
//! The payload uses the same entity shapes the detail endpoint returns, so a
//! submitted draft rehydrates back to itself.

use crate::draft::{Draft, Envelope, Listing, Selection, SpareDraft, VehicleDraft};
use crate::rehydrate::{SpareEntity, VehicleEntity};

fn id_of(selection: &Option<Selection>) -> Option<String> {
    selection.as_ref().map(|s| s.id().to_string())
}

fn text_of(selection: &Option<Selection>) -> Option<String> {
    selection
        .as_ref()
        .and_then(Selection::other_text)
        .map(str::to_string)
}

fn product_id(envelope: &Envelope) -> Option<String> {
    if envelope.is_edit && !envelope.product_id.is_empty() {
        Some(envelope.product_id.clone())
    } else {
        None
    }
}

fn image_urls(envelope: &Envelope) -> Vec<String> {
    envelope.images.iter().map(|i| i.uri.clone()).collect()
}

/// Returns the server entity for a car or bike draft.
///
pub fn vehicle_entity(
    envelope: &Envelope,
    vehicle: &VehicleDraft,
    bike_type: Option<&Option<Selection>>,
) -> VehicleEntity {
    VehicleEntity {
        id: product_id(envelope),
        category_id: envelope.category_id.clone(),
        city_id: envelope.city_id.clone(),
        subscription_plan: envelope.subscription_plan.clone(),
        bike_type_id: bike_type.and_then(id_of),
        brand_id: id_of(&vehicle.brand),
        brand_other_text: text_of(&vehicle.brand),
        name_id: id_of(&vehicle.name),
        name_other_text: text_of(&vehicle.name),
        model_name: vehicle.model_name.clone(),
        transmission_id: id_of(&vehicle.transmission),
        fuel_type_id: id_of(&vehicle.fuel),
        fuel_other_text: text_of(&vehicle.fuel),
        color_id: id_of(&vehicle.color),
        color_other_text: text_of(&vehicle.color),
        ownership_id: id_of(&vehicle.ownership),
        ownership_other_text: text_of(&vehicle.ownership),
        year_id: id_of(&vehicle.year),
        price: vehicle.price.clone(),
        kms_driven: vehicle.kms_driven,
        images: image_urls(envelope),
        is_published: envelope.is_published,
    }
}

/// Returns the server entity for a spare-part draft.
///
pub fn spare_entity(envelope: &Envelope, spare: &SpareDraft) -> SpareEntity {
    SpareEntity {
        id: product_id(envelope),
        category_id: envelope.category_id.clone(),
        city_id: envelope.city_id.clone(),
        subscription_plan: envelope.subscription_plan.clone(),
        spare_condition_id: id_of(&spare.condition),
        product_type_id: id_of(&spare.product_type),
        sub_product_type_id: id_of(&spare.sub_product_type),
        brand_id: id_of(&spare.brand),
        brand_other_text: text_of(&spare.brand),
        model_id: id_of(&spare.model),
        model_other_text: text_of(&spare.model),
        name: spare.name.clone(),
        description: spare.description.clone(),
        price: spare.price.clone(),
        year_of_manufacture: spare.year_of_manufacture.clone(),
        images: image_urls(envelope),
        is_published: envelope.is_published,
    }
}

/// Flatten the draft into the JSON body of a create or update request.
///
pub fn build(draft: &Draft) -> serde_json::Value {
    let value = match &draft.listing {
        Listing::Car(vehicle) => serde_json::to_value(vehicle_entity(&draft.envelope, vehicle, None)),
        Listing::Bike(bike) => serde_json::to_value(vehicle_entity(
            &draft.envelope,
            &bike.vehicle,
            Some(&bike.bike_type),
        )),
        Listing::Spare(spare) => serde_json::to_value(spare_entity(&draft.envelope, spare)),
    };
    // Plain derived structs with string keys always serialize
    value.unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Category, Field, FieldValue, ImageDescriptor};
    use crate::rehydrate::{image_descriptor, rehydrate};

    fn filled_car() -> Draft {
        let mut draft = Draft::new(Category::Car);
        draft.envelope.city_id = "city_3".to_string();
        draft.envelope.images.push(ImageDescriptor {
            uri: "https://cdn.example.com/listings/front.jpg".to_string(),
            name: "front.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
        });
        draft
            .set(Field::Brand, Selection::Canonical("brand_42".to_string()).into())
            .unwrap();
        draft
            .set(
                Field::Name,
                Selection::Other {
                    sentinel_id: "name_others".to_string(),
                    text: "Custom build".to_string(),
                }
                .into(),
            )
            .unwrap();
        draft.set(Field::ModelName, "VXi".into()).unwrap();
        draft.set(Field::Price, "450000".into()).unwrap();
        draft.set(Field::KmsDriven, FieldValue::Count(Some(35000))).unwrap();
        draft
    }

    #[test]
    fn build_car_payload() {
        let payload = build(&filled_car());
        assert_eq!(payload["brand_id"], "brand_42");
        assert_eq!(payload["name_id"], "name_others");
        assert_eq!(payload["carAndbike_other_text"], "Custom build");
        assert_eq!(payload["model_name"], "VXi");
        assert_eq!(payload["kms_driven"], 35000);
        assert_eq!(payload["images"][0], "https://cdn.example.com/listings/front.jpg");
        // Canonical picks never carry an override
        assert!(payload.get("carAndbike_brand_other_text").is_none());
        assert!(payload.get("_id").is_none());
    }

    #[test]
    fn build_includes_id_in_edit_mode() {
        let mut draft = filled_car();
        draft.envelope.is_edit = true;
        draft.envelope.product_id = "listing_1".to_string();
        assert_eq!(build(&draft)["_id"], "listing_1");
    }

    #[test]
    fn build_spare_payload() {
        let mut draft = Draft::new(Category::Spare);
        draft
            .set(
                Field::SpareModel,
                Selection::Other {
                    sentinel_id: "model_others".to_string(),
                    text: "Universal".to_string(),
                }
                .into(),
            )
            .unwrap();
        draft.set(Field::SpareName, "Brake pad".into()).unwrap();
        let payload = build(&draft);
        assert_eq!(payload["model_id"], "model_others");
        assert_eq!(payload["Sparemodel_other_text"], "Universal");
        assert_eq!(payload["name"], "Brake pad");
    }

    fn canonical(id: &str) -> Option<Selection> {
        Some(Selection::Canonical(id.to_string()))
    }

    fn other(sentinel_id: &str, text: &str) -> Option<Selection> {
        Some(Selection::Other {
            sentinel_id: sentinel_id.to_string(),
            text: text.to_string(),
        })
    }

    /// An edit draft of the category with every field the wizard collects.
    fn complete_edit_draft(category: Category) -> Draft {
        let mut draft = Draft::new(category);
        draft.envelope.is_edit = true;
        draft.envelope.is_published = true;
        draft.envelope.product_id = "listing_1".to_string();
        draft.envelope.category_id = format!("cat_{}", category);
        draft.envelope.city_id = "city_3".to_string();
        draft.envelope.subscription_plan = "plan_gold".to_string();
        draft.envelope.images = vec![
            image_descriptor("https://cdn.example.com/listings/1/front.jpg"),
            image_descriptor("https://cdn.example.com/listings/1/side.png"),
        ];

        let vehicle = VehicleDraft {
            brand: canonical("brand_42"),
            name: other("name_others", "Custom build"),
            model_name: "VXi".to_string(),
            transmission: canonical("trans_1"),
            fuel: other("fuel_others", "CNG kit"),
            color: other("color_others", "Matte teal"),
            ownership: canonical("own_2"),
            year: canonical("year_2020"),
            price: "450000".to_string(),
            kms_driven: Some(35000),
        };
        draft.listing = match category {
            Category::Car => Listing::Car(vehicle),
            Category::Bike => Listing::Bike(crate::draft::BikeDraft {
                bike_type: canonical("cruiser"),
                vehicle: VehicleDraft {
                    transmission: None,
                    ..vehicle
                },
            }),
            Category::Spare => Listing::Spare(SpareDraft {
                condition: canonical("used"),
                product_type: canonical("brakes"),
                sub_product_type: canonical("disc_pads"),
                brand: other("brand_others", "Local make"),
                model: other("model_others", "Universal"),
                name: "Brake pad".to_string(),
                description: "Front pads, barely used".to_string(),
                price: "1200".to_string(),
                year_of_manufacture: "2019".to_string(),
            }),
        };
        draft
    }

    #[test]
    fn submitted_draft_rehydrates_to_itself() {
        for category in [Category::Car, Category::Bike, Category::Spare] {
            let draft = complete_edit_draft(category);
            let restored = rehydrate(category, &build(&draft)).unwrap();
            assert_eq!(restored, draft, "{} draft changed on the way back", category);
        }
    }

    #[test]
    fn spare_payload_carries_every_pick() {
        let payload = build(&complete_edit_draft(Category::Spare));
        assert_eq!(payload["_id"], "listing_1");
        assert_eq!(payload["spare_condition_id"], "used");
        assert_eq!(payload["product_type_id"], "brakes");
        assert_eq!(payload["sub_product_type_id"], "disc_pads");
        assert_eq!(payload["brand_id"], "brand_others");
        assert_eq!(payload["Sparebrand_other_text"], "Local make");
        assert_eq!(payload["Sparemodel_other_text"], "Universal");
        assert_eq!(payload["images"][1], "https://cdn.example.com/listings/1/side.png");
    }
}
