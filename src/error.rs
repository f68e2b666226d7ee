//! Application-wide error types.
//!
//! Each module reports failures through its own error enum; this module
//! gathers them into a single type for callers that drive several modules.

pub use crate::api::ApiError;
pub use crate::config::ConfigError;
pub use crate::draft::DraftError;
pub use crate::rehydrate::RehydrateError;
pub use crate::resolver::ResolveError;
pub use crate::session::SessionError;
pub use crate::wizard::WizardError;

/// Main application error type.
///
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Draft access errors
    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    /// "Others" resolution errors
    #[error("Selection error: {0}")]
    Resolve(#[from] ResolveError),

    /// Step navigation and gating errors
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// Edit-mode loading errors
    #[error("Rehydration error: {0}")]
    Rehydrate(#[from] RehydrateError),

    /// Listing API errors
    #[error("Listing API error: {0}")]
    Api(#[from] ApiError),

    /// Session action errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logger initialization errors
    #[error("Logger error: {0}")]
    Logger(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
