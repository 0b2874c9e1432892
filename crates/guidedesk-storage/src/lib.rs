//! Guidedesk Storage Library
//!
//! Storage abstraction for the bytes of files attached to intakes, with a
//! local filesystem backend and an in-memory backend.
//!
//! # Storage key format
//!
//! Every upload lives under its intake: `intakes/{intake_id}/{upload_id}-{filename}`,
//! where `filename` is the sanitized original name. Keys must not contain `..`
//! or a leading `/`. Key generation is centralized in the `keys` module so all
//! backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use guidedesk_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
