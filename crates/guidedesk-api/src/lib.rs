//! Guidedesk API Library
//!
//! This crate provides the HTTP handlers, query parsing and application setup
//! for the intake dashboard.

mod api_doc;
mod handlers;

pub mod constants;
pub mod error;
pub mod query;
pub mod setup;
pub mod state;

pub use api_doc::{get_openapi_spec, ApiDoc};
pub use error::{HttpAppError, ValidatedJson};
pub use state::AppState;
