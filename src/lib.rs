//! Draft and wizard state engine for vehicle and spare-part listings.
//!
//! A dealer builds a listing through a category-specific sequence of steps.
//! The in-progress listing is a [`draft::Draft`] held by a
//! [`store::DraftStore`]; screens change it through a
//! [`session::WizardSession`], which checks each write against the step on
//! screen, reconciles "Others" picks through the [`resolver`], and gates
//! navigation through the [`wizard`]. Existing listings are loaded back for
//! editing by the [`rehydrate`] module and submitted through [`api`].

pub mod api;
pub mod config;
pub mod draft;
pub mod error;
pub mod logger;
pub mod lookups;
pub mod rehydrate;
pub mod resolver;
pub mod session;
pub mod store;
pub mod utils;
pub mod wizard;
