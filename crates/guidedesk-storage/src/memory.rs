//! In-memory storage backend
//!
//! Holds file bytes in a map. Used by tests and by `STORAGE_BACKEND=memory`
//! for throwaway deployments.

use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, StoredObject>>,
    failing_deletes: RwLock<HashSet<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `delete` of `storage_key` fail.
    pub async fn fail_deletes_for(&self, storage_key: impl Into<String>) {
        self.failing_deletes.write().await.insert(storage_key.into());
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    pub async fn content_type(&self, storage_key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|obj| obj.content_type.clone())
    }

    fn check_key(storage_key: &str) -> StorageResult<()> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        Self::check_key(storage_key)?;
        let size = data.len();
        self.objects.write().await.insert(
            storage_key.to_string(),
            StoredObject {
                data: Bytes::from(data),
                content_type: content_type.to_string(),
            },
        );
        tracing::debug!(key = %storage_key, size_bytes = size, "Memory storage upload successful");
        Ok(format!("memory://{}", storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        Self::check_key(storage_key)?;
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|obj| obj.data.to_vec())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        Self::check_key(storage_key)?;
        let data = self
            .objects
            .read()
            .await
            .get(storage_key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        Self::check_key(storage_key)?;
        if self.failing_deletes.read().await.contains(storage_key) {
            return Err(StorageError::DeleteFailed(format!(
                "Simulated failure deleting {}",
                storage_key
            )));
        }
        self.objects.write().await.remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Self::check_key(storage_key)?;
        Ok(self.objects.read().await.contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
