//! Document-store traits
//!
//! Each trait covers one collection. Implementations must make every single
//! method atomic; multi-step sequences are serialized by the repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guidedesk_core::models::{Intake, SectionCode, SectionDetail, SectionPayload, Upload};
use guidedesk_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait IntakeDocuments: Send + Sync {
    /// Insert a new intake. Fails with `AppError::Conflict` when the id is taken.
    async fn insert(&self, intake: Intake) -> Result<(), AppError>;

    async fn find(&self, intake_id: &str) -> Result<Option<Intake>, AppError>;

    /// Overwrite an existing intake. Fails with `AppError::NotFound` when absent.
    async fn replace(&self, intake: Intake) -> Result<(), AppError>;

    /// Returns whether a document was removed.
    async fn remove(&self, intake_id: &str) -> Result<bool, AppError>;

    /// Snapshot of every intake, in no particular order.
    async fn all(&self) -> Result<Vec<Intake>, AppError>;
}

#[async_trait]
pub trait SectionDocuments: Send + Sync {
    async fn find(
        &self,
        intake_id: &str,
        section_code: SectionCode,
    ) -> Result<Option<SectionDetail>, AppError>;

    /// Replace the payload of an existing document or insert a new one.
    /// Returns `true` when an existing document was updated.
    async fn upsert(
        &self,
        intake_id: &str,
        section_code: SectionCode,
        payload: SectionPayload,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Insert only when `(intake_id, section_code)` is free. Returns whether
    /// the document was inserted.
    async fn insert_if_absent(&self, detail: SectionDetail) -> Result<bool, AppError>;

    /// Sections of one intake ordered by section code.
    async fn list_by_intake(&self, intake_id: &str) -> Result<Vec<SectionDetail>, AppError>;

    async fn remove(&self, intake_id: &str, section_code: SectionCode) -> Result<bool, AppError>;

    /// Returns the number of removed documents.
    async fn remove_by_intake(&self, intake_id: &str) -> Result<usize, AppError>;
}

#[async_trait]
pub trait UploadDocuments: Send + Sync {
    async fn insert(&self, upload: Upload) -> Result<(), AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Upload>, AppError>;

    /// Uploads of one intake ordered by `created_at`.
    async fn list_by_intake(&self, intake_id: &str) -> Result<Vec<Upload>, AppError>;

    async fn remove(&self, id: Uuid) -> Result<bool, AppError>;
}
