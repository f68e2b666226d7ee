//! Listing draft module.
//!
//! This module contains the in-progress listing record, including:
//! - `Draft`, a common `Envelope` plus a category-specific `Listing`
//! - `Selection`, a canonical lookup reference or the "Others" sentinel with text
//! - `Field` and `FieldValue` for addressing single fields by wire name
//! - Draft error handling

mod error;
mod field;
mod model;

pub use error::DraftError;
pub use field::{Field, FieldKind, FieldValue};
pub use model::{
    BikeDraft, Category, Draft, Envelope, ImageDescriptor, Listing, Selection, SpareDraft,
    VehicleDraft,
};
