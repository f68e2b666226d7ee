//! Draft-specific error types.

use super::{Category, Field, FieldKind};
use std::path::PathBuf;

/// Errors that can occur while reading or writing a draft.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// Field name is not part of the draft
    #[error("Unknown draft field: {0}")]
    UnknownField(String),

    /// Category name is not recognised
    #[error("Unknown listing category: {0}")]
    UnknownCategory(String),

    /// Field does not exist for the active category
    #[error("Field {field} does not apply to {category} listings")]
    NotApplicable { field: Field, category: Category },

    /// Value type does not match the field type
    #[error("Field {field} expects a {expected} value, got {found}")]
    TypeMismatch {
        field: Field,
        expected: FieldKind,
        found: FieldKind,
    },

    /// Failed to write the draft to disk
    #[error("Failed to persist draft to {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read the draft from disk
    #[error("Failed to load draft from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the draft
    #[error("Failed to serialize draft: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize the draft
    #[error("Failed to deserialize draft: {0}")]
    DeserializationFailed(String),
}
