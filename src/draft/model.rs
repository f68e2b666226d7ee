//! Draft record types.
//!
//! A draft is a common envelope plus a category-specific listing. Only the
//! fields relevant to the active category exist at any moment.

use super::DraftError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Specifying the product category families.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Car,
    Bike,
    Spare,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Car, Category::Bike, Category::Spare];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Car => "car",
            Category::Bike => "bike",
            Category::Spare => "spare",
        }
    }

    /// Returns true for the car and bike families, which share a listing shape.
    ///
    pub fn is_vehicle(&self) -> bool {
        matches!(self, Category::Car | Category::Bike)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" | "cars" => Ok(Category::Car),
            "bike" | "bikes" => Ok(Category::Bike),
            "spare" | "spares" | "spare_part" | "spare-part" => Ok(Category::Spare),
            other => Err(DraftError::UnknownCategory(other.to_string())),
        }
    }
}

/// Reference to a canonical lookup entity, or the "Others" sentinel paired
/// with the text the user typed instead.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Canonical(String),
    Other { sentinel_id: String, text: String },
}

impl Selection {
    /// Returns the referenced lookup ID (the sentinel ID for "Others").
    ///
    pub fn id(&self) -> &str {
        match self {
            Selection::Canonical(id) => id,
            Selection::Other { sentinel_id, .. } => sentinel_id,
        }
    }

    /// Returns the free-text override when the sentinel is selected.
    ///
    pub fn other_text(&self) -> Option<&str> {
        match self {
            Selection::Canonical(_) => None,
            Selection::Other { text, .. } => Some(text),
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Selection::Other { .. })
    }

    /// A selection counts as present only when it carries an ID and, for the
    /// sentinel, a non-blank override.
    ///
    pub fn is_complete(&self) -> bool {
        match self {
            Selection::Canonical(id) => !id.trim().is_empty(),
            Selection::Other { sentinel_id, text } => {
                !sentinel_id.trim().is_empty() && !text.trim().is_empty()
            }
        }
    }
}

/// Defines an image attached to a listing.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub uri: String,
    pub name: String,
    pub mime_type: String,
}

/// Fields shared by every category.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub category_id: String,
    pub city_id: String,
    pub subscription_plan: String,
    pub product_id: String, // Server ID, only set in edit mode
    pub images: Vec<ImageDescriptor>, // First image is the cover
    pub is_published: bool,
    pub is_edit: bool,
    pub is_subscriber_required: bool,
    pub subscription_active: bool,
    #[serde(default)]
    pub force_update: BTreeMap<String, u64>,
}

impl Envelope {
    /// Bump the refresh counter for a dependent screen.
    ///
    pub fn touch(&mut self, key: &str) -> u64 {
        let counter = self.force_update.entry(key.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

/// Fields collected by the car and bike wizards.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDraft {
    pub brand: Option<Selection>,
    pub name: Option<Selection>,
    pub model_name: String,
    pub transmission: Option<Selection>, // Cars only
    pub fuel: Option<Selection>,
    pub color: Option<Selection>,
    pub ownership: Option<Selection>,
    pub year: Option<Selection>,
    pub price: String,
    pub kms_driven: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BikeDraft {
    pub bike_type: Option<Selection>,
    pub vehicle: VehicleDraft,
}

/// Fields collected by the spare-part wizard.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpareDraft {
    pub condition: Option<Selection>,
    pub product_type: Option<Selection>,
    pub sub_product_type: Option<Selection>,
    pub brand: Option<Selection>,
    pub model: Option<Selection>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub year_of_manufacture: String,
}

/// Category-specific part of a draft.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "fields", rename_all = "lowercase")]
pub enum Listing {
    Car(VehicleDraft),
    Bike(BikeDraft),
    Spare(SpareDraft),
}

impl Listing {
    /// Returns an empty listing for the category.
    ///
    pub fn new(category: Category) -> Listing {
        match category {
            Category::Car => Listing::Car(VehicleDraft::default()),
            Category::Bike => Listing::Bike(BikeDraft::default()),
            Category::Spare => Listing::Spare(SpareDraft::default()),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Listing::Car(_) => Category::Car,
            Listing::Bike(_) => Category::Bike,
            Listing::Spare(_) => Category::Spare,
        }
    }
}

/// The single listing being created or edited.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub envelope: Envelope,
    pub listing: Listing,
}

impl Draft {
    /// Returns a draft with every field at its zero value. This is also the
    /// template selective resets read their defaults from.
    ///
    pub fn new(category: Category) -> Draft {
        Draft {
            envelope: Envelope::default(),
            listing: Listing::new(category),
        }
    }

    pub fn category(&self) -> Category {
        self.listing.category()
    }

    /// Returns the vehicle fields for car and bike drafts.
    ///
    pub fn vehicle(&self) -> Option<&VehicleDraft> {
        match &self.listing {
            Listing::Car(vehicle) => Some(vehicle),
            Listing::Bike(bike) => Some(&bike.vehicle),
            Listing::Spare(_) => None,
        }
    }

    pub fn spare(&self) -> Option<&SpareDraft> {
        match &self.listing {
            Listing::Spare(spare) => Some(spare),
            _ => None,
        }
    }

    /// Returns the image used as the listing thumbnail.
    ///
    pub fn cover_image(&self) -> Option<&ImageDescriptor> {
        self.envelope.images.first()
    }
}
