use chrono::Utc;
use guidedesk_core::models::{Upload, UploadKind};
use guidedesk_core::AppError;
use guidedesk_storage::{keys, ByteStream, Storage};
use std::sync::Arc;
use uuid::Uuid;

use super::document::UploadDocuments;

/// Outcome of removing every upload of an intake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadCleanup {
    /// Upload records removed.
    pub removed: usize,
    /// Uploads whose stored bytes could not be deleted.
    pub storage_failures: usize,
}

/// Upload records plus the stored bytes they point to.
#[derive(Clone)]
pub struct UploadRepository {
    documents: Arc<dyn UploadDocuments>,
    storage: Arc<dyn Storage>,
}

impl UploadRepository {
    pub fn new(documents: Arc<dyn UploadDocuments>, storage: Arc<dyn Storage>) -> Self {
        Self { documents, storage }
    }

    /// Store `bytes` and record the upload. The caller checks the intake exists.
    #[tracing::instrument(skip(self, bytes), fields(db.table = "uploads", db.operation = "insert", size_bytes = bytes.len()))]
    pub async fn attach(
        &self,
        intake_id: &str,
        kind: UploadKind,
        original_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Upload, AppError> {
        let id = Uuid::new_v4();
        let stored_key = keys::upload_key(intake_id, id, original_name);
        let size_bytes = bytes.len() as u64;

        self.storage
            .upload_with_key(&stored_key, bytes, mime_type)
            .await?;

        let upload = Upload {
            id,
            intake_id: intake_id.to_string(),
            kind,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes,
            stored_key,
            created_at: Utc::now(),
        };

        if let Err(e) = self.documents.insert(upload.clone()).await {
            if let Err(cleanup) = self.storage.delete(&upload.stored_key).await {
                tracing::warn!(
                    error = %cleanup,
                    key = %upload.stored_key,
                    "Failed to remove stored bytes after record insert failed"
                );
            }
            return Err(e);
        }

        tracing::info!(upload_id = %upload.id, intake_id = %intake_id, "Upload attached");
        Ok(upload)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select", db.record_id = %intake_id))]
    pub async fn list_by_intake(&self, intake_id: &str) -> Result<Vec<Upload>, AppError> {
        self.documents.list_by_intake(intake_id).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        self.documents.find(id).await
    }

    async fn require(&self, id: Uuid) -> Result<Upload, AppError> {
        self.documents
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))
    }

    /// Record and chunked contents of an upload.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select", db.record_id = %id))]
    pub async fn open(&self, id: Uuid) -> Result<(Upload, ByteStream), AppError> {
        let upload = self.require(id).await?;
        let stream = self.storage.download_stream(&upload.stored_key).await?;
        Ok((upload, stream))
    }

    /// Delete the stored bytes, then the record.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let upload = self.require(id).await?;
        self.storage.delete(&upload.stored_key).await?;
        self.documents.remove(id).await?;
        Ok(())
    }

    /// Best-effort removal of every upload of an intake.
    ///
    /// A storage failure is logged and the record is removed anyway, so no
    /// record keeps pointing at the intake. Nothing already deleted is rolled
    /// back.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "delete", db.record_id = %intake_id))]
    pub async fn delete_by_intake(&self, intake_id: &str) -> Result<UploadCleanup, AppError> {
        let uploads = self.documents.list_by_intake(intake_id).await?;
        let mut cleanup = UploadCleanup::default();

        for upload in uploads {
            if let Err(e) = self.storage.delete(&upload.stored_key).await {
                cleanup.storage_failures += 1;
                tracing::warn!(
                    error = %e,
                    upload_id = %upload.id,
                    intake_id = %intake_id,
                    "Failed to delete upload bytes during cascade delete"
                );
            }
            match self.documents.remove(upload.id).await {
                Ok(_) => cleanup.removed += 1,
                Err(e) => tracing::warn!(
                    error = %e,
                    upload_id = %upload.id,
                    intake_id = %intake_id,
                    "Failed to delete upload record during cascade delete"
                ),
            }
        }

        Ok(cleanup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;
    use futures::StreamExt;
    use guidedesk_storage::MemoryStorage;

    fn repo() -> (UploadRepository, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let repo = UploadRepository::new(Arc::new(MemoryDocumentStore::new()), storage.clone());
        (repo, storage)
    }

    #[tokio::test]
    async fn test_attach_and_open() {
        let (repo, storage) = repo();
        let upload = repo
            .attach(
                "EG-2026-0001",
                UploadKind::PlanDoc,
                "Plan Summary.pdf",
                "application/pdf",
                b"%PDF-1.7".to_vec(),
            )
            .await
            .unwrap();

        assert_eq!(upload.size_bytes, 8);
        assert!(upload
            .stored_key
            .starts_with(&format!("intakes/EG-2026-0001/{}-", upload.id)));
        assert!(upload.stored_key.ends_with("Plan_Summary.pdf"));
        assert!(storage.exists(&upload.stored_key).await.unwrap());

        let (record, mut stream) = repo.open(upload.id).await.unwrap();
        assert_eq!(record, upload);
        let mut streamed = Vec::new();
        while let Some(chunk) = stream.next().await {
            streamed.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(streamed, b"%PDF-1.7".to_vec());
    }

    #[tokio::test]
    async fn test_list_by_intake_in_creation_order() {
        let (repo, _) = repo();
        let first = repo
            .attach("EG-2026-0001", UploadKind::Guide, "a.docx", "application/octet-stream", vec![1])
            .await
            .unwrap();
        let second = repo
            .attach("EG-2026-0001", UploadKind::Other, "b.png", "image/png", vec![2])
            .await
            .unwrap();
        repo.attach("EG-2026-0002", UploadKind::Other, "c.png", "image/png", vec![3])
            .await
            .unwrap();

        let listed = repo.list_by_intake("EG-2026-0001").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].created_at.min(listed[1].created_at), first.created_at);
        assert!(listed.iter().any(|u| u.id == second.id));
    }

    #[tokio::test]
    async fn test_delete_removes_bytes_and_record() {
        let (repo, storage) = repo();
        let upload = repo
            .attach("EG-2026-0001", UploadKind::Guide, "g.pdf", "application/pdf", vec![0; 4])
            .await
            .unwrap();

        repo.delete(upload.id).await.unwrap();
        assert!(repo.get(upload.id).await.unwrap().is_none());
        assert!(storage.is_empty().await);

        let err = repo.delete(upload.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_by_intake_tolerates_storage_failure() {
        let (repo, storage) = repo();
        let ok = repo
            .attach("EG-2026-0001", UploadKind::Guide, "ok.pdf", "application/pdf", vec![1])
            .await
            .unwrap();
        let broken = repo
            .attach("EG-2026-0001", UploadKind::Guide, "broken.pdf", "application/pdf", vec![2])
            .await
            .unwrap();
        storage.fail_deletes_for(broken.stored_key.clone()).await;

        let cleanup = repo.delete_by_intake("EG-2026-0001").await.unwrap();
        assert_eq!(cleanup.removed, 2);
        assert_eq!(cleanup.storage_failures, 1);
        assert!(repo.list_by_intake("EG-2026-0001").await.unwrap().is_empty());
        assert!(!storage.exists(&ok.stored_key).await.unwrap());
    }
}
