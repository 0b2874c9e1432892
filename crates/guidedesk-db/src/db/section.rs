use chrono::Utc;
use guidedesk_core::models::{
    BulkCreateResult, NewSection, SectionCode, SectionDetail, SectionPayload, UpsertOutcome,
};
use guidedesk_core::AppError;
use std::sync::Arc;

use super::document::SectionDocuments;

/// Per-section change descriptions, unique per `(intake_id, section_code)`.
#[derive(Clone)]
pub struct SectionStore {
    documents: Arc<dyn SectionDocuments>,
}

impl SectionStore {
    pub fn new(documents: Arc<dyn SectionDocuments>) -> Self {
        Self { documents }
    }

    /// Replace the payload of an existing section or create it.
    #[tracing::instrument(skip(self, payload), fields(db.table = "section_details", db.operation = "upsert", db.record_id = %intake_id))]
    pub async fn upsert(
        &self,
        intake_id: &str,
        section_code: SectionCode,
        payload: SectionPayload,
    ) -> Result<UpsertOutcome, AppError> {
        let updated = self
            .documents
            .upsert(intake_id, section_code, payload, Utc::now())
            .await?;
        Ok(UpsertOutcome { updated })
    }

    /// Insert each section that does not exist yet. Existing sections are left
    /// untouched and reported with `created: false`.
    #[tracing::instrument(skip(self, sections), fields(db.table = "section_details", db.operation = "insert", count = sections.len()))]
    pub async fn bulk_create(
        &self,
        sections: Vec<NewSection>,
    ) -> Result<Vec<BulkCreateResult>, AppError> {
        let mut results = Vec::with_capacity(sections.len());
        for section in sections {
            let now = Utc::now();
            let created = self
                .documents
                .insert_if_absent(SectionDetail {
                    intake_id: section.intake_id.clone(),
                    section_code: section.section_code,
                    payload: section.payload,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
            results.push(BulkCreateResult {
                intake_id: section.intake_id,
                section_code: section.section_code,
                created,
            });
        }
        Ok(results)
    }

    #[tracing::instrument(skip(self), fields(db.table = "section_details", db.operation = "select", db.record_id = %intake_id))]
    pub async fn get(
        &self,
        intake_id: &str,
        section_code: SectionCode,
    ) -> Result<Option<SectionDetail>, AppError> {
        self.documents.find(intake_id, section_code).await
    }

    /// All sections of an intake, ordered by section code.
    #[tracing::instrument(skip(self), fields(db.table = "section_details", db.operation = "select", db.record_id = %intake_id))]
    pub async fn get_by_intake(&self, intake_id: &str) -> Result<Vec<SectionDetail>, AppError> {
        self.documents.list_by_intake(intake_id).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "section_details", db.operation = "delete", db.record_id = %intake_id))]
    pub async fn delete_section(
        &self,
        intake_id: &str,
        section_code: SectionCode,
    ) -> Result<(), AppError> {
        if !self.documents.remove(intake_id, section_code).await? {
            return Err(AppError::NotFound(format!(
                "Section {} of intake {} not found",
                section_code, intake_id
            )));
        }
        Ok(())
    }

    /// Remove every section of an intake. Succeeds when there are none.
    #[tracing::instrument(skip(self), fields(db.table = "section_details", db.operation = "delete", db.record_id = %intake_id))]
    pub async fn delete_by_intake(&self, intake_id: &str) -> Result<usize, AppError> {
        self.documents.remove_by_intake(intake_id).await
    }
}
