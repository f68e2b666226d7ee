//! Wizard steps and the fields each one collects.

use crate::draft::{Category, Field};
use std::fmt;

/// Specifying the wizard screens.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    BikeTypeSelect,
    BrandSelect,
    NameSelect,
    TransmissionAndFuel,
    ColorAndOwnershipAndYear,
    PriceAndKms,
    TypeAndCondition,
    PartNameSelect,
    DescriptionAndYear,
    PhotoUpload,
    Preview,
}

const CAR_STEPS: &[Step] = &[
    Step::BrandSelect,
    Step::NameSelect,
    Step::TransmissionAndFuel,
    Step::ColorAndOwnershipAndYear,
    Step::PriceAndKms,
    Step::PhotoUpload,
    Step::Preview,
];

const BIKE_STEPS: &[Step] = &[
    Step::BikeTypeSelect,
    Step::BrandSelect,
    Step::NameSelect,
    Step::TransmissionAndFuel,
    Step::ColorAndOwnershipAndYear,
    Step::PriceAndKms,
    Step::PhotoUpload,
    Step::Preview,
];

const SPARE_STEPS: &[Step] = &[
    Step::TypeAndCondition,
    Step::BrandSelect,
    Step::PartNameSelect,
    Step::DescriptionAndYear,
    Step::PhotoUpload,
    Step::Preview,
];

/// Returns the ordered steps of the category's wizard.
///
pub fn sequence(category: Category) -> &'static [Step] {
    match category {
        Category::Car => CAR_STEPS,
        Category::Bike => BIKE_STEPS,
        Category::Spare => SPARE_STEPS,
    }
}

impl Step {
    /// Returns the fields that must be filled before leaving the step.
    ///
    pub fn required_fields(&self, category: Category) -> &'static [Field] {
        match (self, category) {
            (Step::BikeTypeSelect, _) => &[Field::BikeType],
            (Step::BrandSelect, Category::Spare) => &[Field::SpareBrand],
            (Step::BrandSelect, _) => &[Field::Brand],
            (Step::NameSelect, _) => &[Field::Name],
            (Step::TransmissionAndFuel, Category::Car) => {
                &[Field::ModelName, Field::Transmission, Field::FuelType]
            }
            (Step::TransmissionAndFuel, _) => &[Field::ModelName, Field::FuelType],
            (Step::ColorAndOwnershipAndYear, _) => &[Field::Color, Field::Ownership, Field::Year],
            (Step::PriceAndKms, _) => &[Field::Price, Field::KmsDriven],
            (Step::TypeAndCondition, _) => &[Field::SpareProductType, Field::SpareCondition],
            (Step::PartNameSelect, _) => &[Field::SpareModel, Field::SpareName],
            (Step::DescriptionAndYear, _) => {
                &[Field::SpareDescription, Field::SpareYear, Field::SparePrice]
            }
            (Step::PhotoUpload, _) => &[Field::Images],
            (Step::Preview, _) => &[],
        }
    }

    /// Returns every field the step's screen may write, required or not.
    ///
    pub fn owned_fields(&self, category: Category) -> &'static [Field] {
        match (self, category) {
            (Step::TypeAndCondition, _) => &[
                Field::SpareProductType,
                Field::SpareSubProductType,
                Field::SpareCondition,
            ],
            _ => self.required_fields(category),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::BikeTypeSelect => "bike type",
            Step::BrandSelect => "brand",
            Step::NameSelect => "model",
            Step::TransmissionAndFuel => "transmission and fuel",
            Step::ColorAndOwnershipAndYear => "color, ownership and year",
            Step::PriceAndKms => "price and kilometers",
            Step::TypeAndCondition => "part type and condition",
            Step::PartNameSelect => "part name",
            Step::DescriptionAndYear => "description and year",
            Step::PhotoUpload => "photo upload",
            Step::Preview => "preview",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
