//! Edit-mode rehydration.
//!
//! Turns a listing fetched from the server back into the draft shape the
//! forward wizard produces, so the same screens can be reused for editing.
//! The server entities defined here are also what the submission payload
//! serializes to, which keeps the two directions symmetric.

use crate::draft::{
    BikeDraft, Category, Draft, Envelope, ImageDescriptor, Listing, Selection, SpareDraft,
    VehicleDraft,
};
use log::*;
use reqwest::Url;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Defines a car or bike listing as stored by the server.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleEntity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub city_id: String,
    #[serde(default)]
    pub subscription_plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bike_type_id: Option<String>,
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(
        rename = "carAndbike_brand_other_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub brand_other_text: Option<String>,
    #[serde(default)]
    pub name_id: Option<String>,
    #[serde(
        rename = "carAndbike_other_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub name_other_text: Option<String>,
    #[serde(default)]
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_id: Option<String>,
    #[serde(default)]
    pub fuel_type_id: Option<String>,
    #[serde(
        rename = "carAndbike_fuel_other_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fuel_other_text: Option<String>,
    #[serde(default)]
    pub color_id: Option<String>,
    #[serde(
        rename = "carAndbike_color_other_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub color_other_text: Option<String>,
    #[serde(default)]
    pub ownership_id: Option<String>,
    #[serde(
        rename = "carAndbike_ownership_other_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ownership_other_text: Option<String>,
    #[serde(default)]
    pub year_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "optional_count")]
    pub kms_driven: Option<u64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// Defines a spare-part listing as stored by the server.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpareEntity {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub city_id: String,
    #[serde(default)]
    pub subscription_plan: String,
    #[serde(default)]
    pub spare_condition_id: Option<String>,
    #[serde(default)]
    pub product_type_id: Option<String>,
    #[serde(default)]
    pub sub_product_type_id: Option<String>,
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(
        rename = "Sparebrand_other_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub brand_other_text: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(
        rename = "Sparemodel_other_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub model_other_text: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year_of_manufacture: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// Errors that can occur while rehydrating a draft.
#[derive(Debug, thiserror::Error)]
pub enum RehydrateError {
    /// Entity carries no server ID
    #[error("The {category} listing could not be loaded: missing _id")]
    MissingIdentity { category: Category },

    /// Entity does not match the expected shape
    #[error("The {category} listing could not be loaded: {source}")]
    Malformed {
        category: Category,
        source: serde_json::Error,
    },

    /// Category has no vehicle listing shape
    #[error("A {category} listing is not a car or bike")]
    NotAVehicle { category: Category },
}

/// Prices arrive as strings or numbers depending on the endpoint.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

/// Kilometre counts must be whole and non-negative.
fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid kilometre count {}", n))),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid kilometre count {:?}", s))),
        Some(other) => Err(de::Error::custom(format!(
            "invalid kilometre count {}",
            other
        ))),
    }
}

/// Build a selection from a stored ID and its optional override text.
///
fn selection(id: &Option<String>, other_text: &Option<String>) -> Option<Selection> {
    let id = id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
    match other_text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Some(Selection::Other {
            sentinel_id: id.to_string(),
            text: text.to_string(),
        }),
        _ => Some(Selection::Canonical(id.to_string())),
    }
}

fn identity(id: &Option<String>, category: Category) -> Result<String, RehydrateError> {
    match id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(RehydrateError::MissingIdentity { category }),
    }
}

/// Map a stored image URL to a descriptor, taking the file name from the
/// last path segment and the MIME type from its extension.
///
pub fn image_descriptor(url: &str) -> ImageDescriptor {
    let name = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default()
            .to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "image/jpeg", // jpg, jpeg and anything unrecognised
    };
    ImageDescriptor {
        uri: url.to_string(),
        name,
        mime_type: mime_type.to_string(),
    }
}

fn envelope(
    product_id: String,
    category_id: &str,
    city_id: &str,
    subscription_plan: &str,
    images: &[String],
    is_published: bool,
) -> Envelope {
    Envelope {
        category_id: category_id.to_string(),
        city_id: city_id.to_string(),
        subscription_plan: subscription_plan.to_string(),
        product_id,
        images: images.iter().map(|url| image_descriptor(url)).collect(),
        is_published,
        is_edit: true,
        is_subscriber_required: false,
        subscription_active: false,
        force_update: BTreeMap::new(),
    }
}

/// Rebuild a car or bike draft from a stored listing.
///
pub fn rehydrate_vehicle(category: Category, entity: &VehicleEntity) -> Result<Draft, RehydrateError> {
    if category == Category::Spare {
        return Err(RehydrateError::NotAVehicle { category });
    }
    let product_id = identity(&entity.id, category)?;
    let vehicle = VehicleDraft {
        brand: selection(&entity.brand_id, &entity.brand_other_text),
        name: selection(&entity.name_id, &entity.name_other_text),
        model_name: entity.model_name.clone(),
        transmission: match category {
            Category::Car => selection(&entity.transmission_id, &None),
            _ => None,
        },
        fuel: selection(&entity.fuel_type_id, &entity.fuel_other_text),
        color: selection(&entity.color_id, &entity.color_other_text),
        ownership: selection(&entity.ownership_id, &entity.ownership_other_text),
        year: selection(&entity.year_id, &None),
        price: entity.price.clone(),
        kms_driven: entity.kms_driven,
    };
    let listing = match category {
        Category::Bike => Listing::Bike(BikeDraft {
            bike_type: selection(&entity.bike_type_id, &None),
            vehicle,
        }),
        Category::Car | Category::Spare => Listing::Car(vehicle),
    };
    debug!("Rehydrated {} listing {} for editing.", category, product_id);
    Ok(Draft {
        envelope: envelope(
            product_id,
            &entity.category_id,
            &entity.city_id,
            &entity.subscription_plan,
            &entity.images,
            entity.is_published,
        ),
        listing,
    })
}

/// Rebuild a spare-part draft from a stored listing.
///
pub fn rehydrate_spare(entity: &SpareEntity) -> Result<Draft, RehydrateError> {
    let product_id = identity(&entity.id, Category::Spare)?;
    let spare = SpareDraft {
        condition: selection(&entity.spare_condition_id, &None),
        product_type: selection(&entity.product_type_id, &None),
        sub_product_type: selection(&entity.sub_product_type_id, &None),
        brand: selection(&entity.brand_id, &entity.brand_other_text),
        model: selection(&entity.model_id, &entity.model_other_text),
        name: entity.name.clone(),
        description: entity.description.clone(),
        price: entity.price.clone(),
        year_of_manufacture: entity.year_of_manufacture.clone(),
    };
    debug!("Rehydrated spare listing {} for editing.", product_id);
    Ok(Draft {
        envelope: envelope(
            product_id,
            &entity.category_id,
            &entity.city_id,
            &entity.subscription_plan,
            &entity.images,
            entity.is_published,
        ),
        listing: Listing::Spare(spare),
    })
}

/// Rebuild a draft from a raw detail payload of the given category.
///
pub fn rehydrate(category: Category, raw: &serde_json::Value) -> Result<Draft, RehydrateError> {
    let malformed = |source| RehydrateError::Malformed { category, source };
    match category {
        Category::Spare => {
            let entity: SpareEntity = serde_json::from_value(raw.clone()).map_err(malformed)?;
            rehydrate_spare(&entity)
        }
        _ => {
            let entity: VehicleEntity = serde_json::from_value(raw.clone()).map_err(malformed)?;
            rehydrate_vehicle(category, &entity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Field, FieldValue};
    use serde_json::json;

    #[test]
    fn image_descriptor_from_url() {
        let image = image_descriptor("https://cdn.example.com/listings/42/front.PNG?w=300");
        assert_eq!(image.name, "front.PNG");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.uri, "https://cdn.example.com/listings/42/front.PNG?w=300");

        let image = image_descriptor("https://cdn.example.com/listings/42/side.jpg");
        assert_eq!(image.name, "side.jpg");
        assert_eq!(image.mime_type, "image/jpeg");

        let image = image_descriptor("uploads/rear");
        assert_eq!(image.name, "rear");
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[test]
    fn rehydrate_car_maps_every_field() {
        let raw = json!({
            "_id": "listing_1",
            "category_id": "cat_car",
            "city_id": "city_3",
            "brand_id": "brand_42",
            "name_id": "name_7",
            "model_name": "VXi",
            "transmission_id": "trans_1",
            "fuel_type_id": "fuel_3",
            "color_id": "color_9",
            "ownership_id": "own_others",
            "carAndbike_ownership_other_text": "Company owned",
            "year_id": "year_2020",
            "price": 450000,
            "kms_driven": "35000",
            "images": ["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.webp"],
            "is_published": true
        });
        let draft = rehydrate(Category::Car, &raw).unwrap();
        assert_eq!(draft.category(), Category::Car);
        assert!(draft.envelope.is_edit);
        assert_eq!(draft.envelope.product_id, "listing_1");
        assert_eq!(draft.envelope.city_id, "city_3");
        assert!(draft.envelope.is_published);
        assert_eq!(draft.envelope.images.len(), 2);
        assert_eq!(draft.envelope.images[1].mime_type, "image/webp");

        let vehicle = draft.vehicle().unwrap();
        assert_eq!(vehicle.brand, Some(Selection::Canonical("brand_42".to_string())));
        assert_eq!(vehicle.transmission, Some(Selection::Canonical("trans_1".to_string())));
        assert_eq!(
            vehicle.ownership,
            Some(Selection::Other {
                sentinel_id: "own_others".to_string(),
                text: "Company owned".to_string(),
            })
        );
        assert_eq!(vehicle.price, "450000");
        assert_eq!(vehicle.kms_driven, Some(35000));
    }

    #[test]
    fn rehydrate_bike_drops_transmission() {
        let raw = json!({
            "_id": "bike_1",
            "bike_type_id": "cruiser",
            "transmission_id": "trans_1",
            "brand_id": "brand_5"
        });
        let draft = rehydrate(Category::Bike, &raw).unwrap();
        assert_eq!(
            draft.get(Field::BikeType).unwrap(),
            FieldValue::Selection(Some(Selection::Canonical("cruiser".to_string())))
        );
        assert!(draft.get(Field::Transmission).is_err());
    }

    #[test]
    fn rehydrate_leaves_unmapped_fields_at_zero() {
        let draft = rehydrate(Category::Car, &json!({ "_id": "listing_2" })).unwrap();
        let mut expected = Draft::new(Category::Car);
        expected.envelope.product_id = "listing_2".to_string();
        expected.envelope.is_edit = true;
        assert_eq!(draft, expected);
    }

    #[test]
    fn rehydrate_spare() {
        let raw = json!({
            "_id": "spare_9",
            "spare_condition_id": "used",
            "product_type_id": "brakes",
            "brand_id": "brand_others",
            "Sparebrand_other_text": "Local make",
            "model_id": "model_3",
            "name": "Brake pad",
            "description": "Front pads",
            "price": "1200",
            "year_of_manufacture": 2019,
            "images": ["https://cdn.example.com/pad.jpeg"]
        });
        let draft = rehydrate(Category::Spare, &raw).unwrap();
        assert!(draft.envelope.is_edit);
        let spare = draft.spare().unwrap();
        assert_eq!(spare.brand.as_ref().and_then(Selection::other_text), Some("Local make"));
        assert_eq!(spare.model, Some(Selection::Canonical("model_3".to_string())));
        assert_eq!(spare.sub_product_type, None);
        assert_eq!(spare.year_of_manufacture, "2019");
    }

    #[test]
    fn rehydrate_without_id_fails() {
        let result = rehydrate(Category::Car, &json!({ "brand_id": "brand_42" }));
        assert!(matches!(
            result,
            Err(RehydrateError::MissingIdentity {
                category: Category::Car
            })
        ));
        let result = rehydrate(Category::Spare, &json!({ "_id": "  " }));
        assert!(matches!(result, Err(RehydrateError::MissingIdentity { .. })));
    }

    #[test]
    fn rehydrate_malformed_fails() {
        let result = rehydrate(Category::Bike, &json!({ "_id": "b", "images": "not-a-list" }));
        assert!(matches!(result, Err(RehydrateError::Malformed { .. })));
    }

    #[test]
    fn unusable_price_or_kms_is_malformed() {
        for raw in [
            json!({ "_id": "c", "kms_driven": 1200.5 }),
            json!({ "_id": "c", "kms_driven": -40 }),
            json!({ "_id": "c", "kms_driven": "lots" }),
            json!({ "_id": "c", "price": true }),
        ] {
            let result = rehydrate(Category::Car, &raw);
            assert!(
                matches!(result, Err(RehydrateError::Malformed { category: Category::Car, .. })),
                "accepted {}",
                raw
            );
        }

        let draft = rehydrate(Category::Car, &json!({ "_id": "c", "kms_driven": "", "price": null })).unwrap();
        assert_eq!(draft.vehicle().unwrap().kms_driven, None);
        assert_eq!(draft.vehicle().unwrap().price, "");
    }

    #[test]
    fn spare_is_not_a_vehicle() {
        let entity = VehicleEntity {
            id: Some("listing_1".to_string()),
            ..VehicleEntity::default()
        };
        assert!(matches!(
            rehydrate_vehicle(Category::Spare, &entity),
            Err(RehydrateError::NotAVehicle {
                category: Category::Spare
            })
        ));
        assert!(rehydrate_vehicle(Category::Bike, &entity).is_ok());
    }
}
