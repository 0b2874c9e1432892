//! Repositories for the data access layer
//!
//! The document traits describe the persistence operations the repositories
//! need (keyed lookup, insert, replace, delete and full scans). Repositories
//! own the domain rules: validation, complexity recomputation, per-intake
//! serialization of writes and cascade deletes.
//
// Document-store seams and the in-memory implementation
pub mod document;
pub mod memory;
//
// Per-key write serialization
pub mod locks;
//
// Repositories
pub mod intake;
pub mod section;
pub mod upload;

pub use document::{IntakeDocuments, SectionDocuments, UploadDocuments};
pub use intake::{IdGenerator, IntakeRepository};
pub use locks::{KeyGuard, KeyedLocks};
pub use memory::MemoryDocumentStore;
pub use section::SectionStore;
pub use upload::{UploadCleanup, UploadRepository};
