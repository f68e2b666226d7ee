//! Listing API error types.

/// Errors that can occur during listing API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Envelope reported success=false
    #[error("API request to {endpoint} was not successful: {message}")]
    Unsuccessful { endpoint: String, message: String },

    /// Failed to deserialize API response
    #[error("Failed to deserialize API response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Update or publish was requested for a draft with no server ID
    #[error("Listing has no server ID")]
    MissingProductId,

    /// Base URL cannot carry path segments
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// Unknown lookup list name
    #[error("Unknown lookup list: {0}")]
    UnknownLookup(String),
}
