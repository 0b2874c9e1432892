//! Guidedesk document store and repositories

pub mod db;

pub use db::{
    IdGenerator, IntakeDocuments, IntakeRepository, KeyedLocks, MemoryDocumentStore,
    SectionDocuments, SectionStore, UploadCleanup, UploadDocuments, UploadRepository,
};
