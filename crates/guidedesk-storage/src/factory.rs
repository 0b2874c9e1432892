#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{MemoryStorage, Storage, StorageBackend, StorageResult};
#[cfg(not(feature = "storage-local"))]
use crate::StorageError;
use guidedesk_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local_storage_path.clone(),
                config.local_storage_base_url.clone(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; uploaded files are lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}
