//! In-memory document store
//!
//! One `RwLock` per collection. Sections are keyed by `(intake_id, code)` in a
//! `BTreeMap`, so a range scan over one intake yields codes in order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guidedesk_core::models::{Intake, SectionCode, SectionDetail, SectionPayload, Upload};
use guidedesk_core::AppError;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::{IntakeDocuments, SectionDocuments, UploadDocuments};

type SectionKey = (String, SectionCode);

#[derive(Default)]
pub struct MemoryDocumentStore {
    intakes: RwLock<HashMap<String, Intake>>,
    sections: RwLock<BTreeMap<SectionKey, SectionDetail>>,
    uploads: RwLock<HashMap<Uuid, Upload>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn section_range(intake_id: &str) -> std::ops::RangeInclusive<SectionKey> {
    (intake_id.to_string(), SectionCode::A)..=(intake_id.to_string(), SectionCode::Q)
}

#[async_trait]
impl IntakeDocuments for MemoryDocumentStore {
    async fn insert(&self, intake: Intake) -> Result<(), AppError> {
        let mut intakes = self.intakes.write().await;
        if intakes.contains_key(&intake.intake_id) {
            return Err(AppError::Conflict(format!(
                "Intake id {} already exists",
                intake.intake_id
            )));
        }
        intakes.insert(intake.intake_id.clone(), intake);
        Ok(())
    }

    async fn find(&self, intake_id: &str) -> Result<Option<Intake>, AppError> {
        Ok(self.intakes.read().await.get(intake_id).cloned())
    }

    async fn replace(&self, intake: Intake) -> Result<(), AppError> {
        let mut intakes = self.intakes.write().await;
        match intakes.get_mut(&intake.intake_id) {
            Some(existing) => {
                *existing = intake;
                Ok(())
            }
            None => Err(AppError::intake_not_found(&intake.intake_id)),
        }
    }

    async fn remove(&self, intake_id: &str) -> Result<bool, AppError> {
        Ok(self.intakes.write().await.remove(intake_id).is_some())
    }

    async fn all(&self) -> Result<Vec<Intake>, AppError> {
        Ok(self.intakes.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl SectionDocuments for MemoryDocumentStore {
    async fn find(
        &self,
        intake_id: &str,
        section_code: SectionCode,
    ) -> Result<Option<SectionDetail>, AppError> {
        Ok(self
            .sections
            .read()
            .await
            .get(&(intake_id.to_string(), section_code))
            .cloned())
    }

    async fn upsert(
        &self,
        intake_id: &str,
        section_code: SectionCode,
        payload: SectionPayload,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut sections = self.sections.write().await;
        let key = (intake_id.to_string(), section_code);
        match sections.get_mut(&key) {
            Some(existing) => {
                existing.payload = payload;
                existing.updated_at = now;
                Ok(true)
            }
            None => {
                sections.insert(
                    key,
                    SectionDetail {
                        intake_id: intake_id.to_string(),
                        section_code,
                        payload,
                        created_at: now,
                        updated_at: now,
                    },
                );
                Ok(false)
            }
        }
    }

    async fn insert_if_absent(&self, detail: SectionDetail) -> Result<bool, AppError> {
        let mut sections = self.sections.write().await;
        let key = (detail.intake_id.clone(), detail.section_code);
        if sections.contains_key(&key) {
            return Ok(false);
        }
        sections.insert(key, detail);
        Ok(true)
    }

    async fn list_by_intake(&self, intake_id: &str) -> Result<Vec<SectionDetail>, AppError> {
        Ok(self
            .sections
            .read()
            .await
            .range(section_range(intake_id))
            .map(|(_, detail)| detail.clone())
            .collect())
    }

    async fn remove(&self, intake_id: &str, section_code: SectionCode) -> Result<bool, AppError> {
        Ok(self
            .sections
            .write()
            .await
            .remove(&(intake_id.to_string(), section_code))
            .is_some())
    }

    async fn remove_by_intake(&self, intake_id: &str) -> Result<usize, AppError> {
        let mut sections = self.sections.write().await;
        let keys: Vec<SectionKey> = sections
            .range(section_range(intake_id))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            sections.remove(key);
        }
        Ok(keys.len())
    }
}

#[async_trait]
impl UploadDocuments for MemoryDocumentStore {
    async fn insert(&self, upload: Upload) -> Result<(), AppError> {
        let mut uploads = self.uploads.write().await;
        if uploads.contains_key(&upload.id) {
            return Err(AppError::Conflict(format!(
                "Upload {} already exists",
                upload.id
            )));
        }
        uploads.insert(upload.id, upload);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        Ok(self.uploads.read().await.get(&id).cloned())
    }

    async fn list_by_intake(&self, intake_id: &str) -> Result<Vec<Upload>, AppError> {
        let mut uploads: Vec<Upload> = self
            .uploads
            .read()
            .await
            .values()
            .filter(|u| u.intake_id == intake_id)
            .cloned()
            .collect();
        uploads.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(uploads)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.uploads.write().await.remove(&id).is_some())
    }
}
