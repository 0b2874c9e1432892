//! Guidedesk Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! pure intake logic (complexity scoring, id generation, filtering, sorting and
//! CSV export) shared by every guidedesk component.

pub mod complexity;
pub mod config;
pub mod csv_export;
pub mod error;
pub mod intake_id;
pub mod listing;
pub mod models;
pub mod storage_types;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use complexity::{calculate_complexity, Complexity};
pub use config::{Config, RepositoryPolicy};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use listing::{IntakeFilters, SortField, SortOrder};
pub use storage_types::StorageBackend;
pub use workflow::StatusTransitionPolicy;
