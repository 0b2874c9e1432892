use chrono::{SecondsFormat, TimeDelta, Utc};
use guidedesk_core::csv_export;
use guidedesk_core::intake_id::generate_intake_id;
use guidedesk_core::listing::{self, IntakeFilters, SortField, SortOrder};
use guidedesk_core::models::{
    BulkCreateResult, ComplexityBand, ComplexityFactorsUpdate, CreateIntakeRequest, CreatedIntake,
    Intake, IntakeStats, IntakeStatus, NewSection, SectionCode, SectionFlagsUpdate,
    SectionPayload, Upload, UploadKind, UpsertOutcome,
};
use guidedesk_core::validation::validate_create_request;
use guidedesk_core::{AppError, Complexity, RepositoryPolicy};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::document::IntakeDocuments;
use super::locks::{KeyGuard, KeyedLocks};
use super::section::SectionStore;
use super::upload::{UploadCleanup, UploadRepository};

/// Source of candidate intake ids.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Intake lifecycle: creation, status and flag mutations, cascade delete and
/// dashboard queries.
///
/// Every read-modify-write on an intake holds that intake's lock, so
/// concurrent updates of one intake are applied one after the other.
#[derive(Clone)]
pub struct IntakeRepository {
    intakes: Arc<dyn IntakeDocuments>,
    sections: SectionStore,
    uploads: UploadRepository,
    policy: RepositoryPolicy,
    locks: Arc<KeyedLocks>,
    id_generator: IdGenerator,
}

impl IntakeRepository {
    pub fn new(
        intakes: Arc<dyn IntakeDocuments>,
        sections: SectionStore,
        uploads: UploadRepository,
        policy: RepositoryPolicy,
    ) -> Self {
        Self {
            intakes,
            sections,
            uploads,
            policy,
            locks: Arc::new(KeyedLocks::new()),
            id_generator: Arc::new(generate_intake_id),
        }
    }

    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn policy(&self) -> &RepositoryPolicy {
        &self.policy
    }

    pub fn sections(&self) -> &SectionStore {
        &self.sections
    }

    pub fn uploads(&self) -> &UploadRepository {
        &self.uploads
    }

    /// Lock `intake_id` and load it, failing with NotFound when absent.
    async fn lock_existing(
        &self,
        intake_id: &str,
    ) -> Result<(KeyGuard, Intake), AppError> {
        let guard = self.locks.lock(intake_id).await;
        let intake = self.require(intake_id).await?;
        Ok((guard, intake))
    }

    /// Validate, score and store a new intake.
    ///
    /// A freshly generated id that is already taken is replaced by another one,
    /// up to `intake_id_max_attempts` tries in total.
    #[tracing::instrument(skip(self, request), fields(db.table = "intakes", db.operation = "insert"))]
    pub async fn create(&self, request: &CreateIntakeRequest) -> Result<CreatedIntake, AppError> {
        let validated = validate_create_request(request, self.policy.plan_years())?;
        let now = Utc::now();

        let mut intake = Intake {
            intake_id: String::new(),
            client_name: validated.client_name,
            requestor_name: validated.requestor_name,
            payroll_storage_url: validated.payroll_storage_url,
            plan_year: validated.plan_year,
            guide_type: validated.guide_type,
            communications_add_ons: validated.communications_add_ons,
            requested_production_time: validated.requested_production_time,
            notes_general: validated.notes_general,
            status: IntakeStatus::NotStarted,
            sections_changed_flags: validated.sections_changed_flags,
            sections_included_flags: validated.sections_included_flags,
            complexity_score: 0,
            complexity_band: ComplexityBand::Minimal,
            date_received: now,
            created_at: now,
            updated_at: now,
        };
        intake.refresh_complexity();

        let attempts = self.policy.intake_id_max_attempts.max(1);
        for attempt in 1..=attempts {
            intake.intake_id = (self.id_generator)();
            match self.intakes.insert(intake.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        intake_id = %intake.intake_id,
                        complexity_score = intake.complexity_score,
                        complexity_band = %intake.complexity_band,
                        "Intake created"
                    );
                    return Ok(CreatedIntake {
                        intake_id: intake.intake_id,
                    });
                }
                Err(AppError::Conflict(msg)) => {
                    tracing::warn!(
                        intake_id = %intake.intake_id,
                        attempt,
                        max_attempts = attempts,
                        "Intake id collision, regenerating: {}",
                        msg
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict(format!(
            "Could not allocate a unique intake id after {} attempts",
            attempts
        )))
    }

    /// Fetch an intake. A missing intake is `Ok(None)`.
    #[tracing::instrument(skip(self), fields(db.table = "intakes", db.operation = "select", db.record_id = %intake_id))]
    pub async fn get(&self, intake_id: &str) -> Result<Option<Intake>, AppError> {
        self.intakes.find(intake_id).await
    }

    /// Fetch an intake, failing with NotFound when absent.
    pub async fn require(&self, intake_id: &str) -> Result<Intake, AppError> {
        self.get(intake_id)
            .await?
            .ok_or_else(|| AppError::intake_not_found(intake_id))
    }

    #[tracing::instrument(skip(self), fields(db.table = "intakes", db.operation = "select"))]
    pub async fn list(
        &self,
        filters: &IntakeFilters,
        sort_by: SortField,
        order: SortOrder,
    ) -> Result<Vec<Intake>, AppError> {
        let snapshot = self.intakes.all().await?;
        Ok(listing::apply(&snapshot, filters, sort_by, order))
    }

    /// CSV of the filtered and sorted intakes.
    pub async fn export_csv(
        &self,
        filters: &IntakeFilters,
        sort_by: SortField,
        order: SortOrder,
    ) -> Result<String, AppError> {
        let intakes = self.list(filters, sort_by, order).await?;
        csv_export::to_csv(&intakes)
    }

    /// Set the status. Complexity is untouched.
    #[tracing::instrument(skip(self), fields(db.table = "intakes", db.operation = "update", db.record_id = %intake_id))]
    pub async fn update_status(&self, intake_id: &str, status: IntakeStatus) -> Result<(), AppError> {
        let (_guard, mut intake) = self.lock_existing(intake_id).await?;
        self.policy
            .transition_policy
            .validate(intake.status, status)?;

        let previous = intake.status;
        intake.status = status;
        intake.updated_at = Utc::now();
        self.intakes.replace(intake).await?;

        tracing::info!(intake_id = %intake_id, from = %previous, to = %status, "Intake status updated");
        Ok(())
    }

    /// Merge the given flag(s) of one section. The score is recomputed only
    /// when `changed` is provided.
    #[tracing::instrument(skip(self), fields(db.table = "intakes", db.operation = "update", db.record_id = %intake_id))]
    pub async fn update_section_flags(
        &self,
        intake_id: &str,
        section_code: SectionCode,
        changed: Option<bool>,
        included: Option<bool>,
    ) -> Result<SectionFlagsUpdate, AppError> {
        let (_guard, mut intake) = self.lock_existing(intake_id).await?;

        if let Some(included) = included {
            intake.sections_included_flags.set(section_code, included);
        }
        let complexity = match changed {
            Some(changed) => {
                intake.sections_changed_flags.set(section_code, changed);
                Some(intake.refresh_complexity())
            }
            None => None,
        };
        intake.updated_at = Utc::now();
        self.intakes.replace(intake).await?;

        Ok(SectionFlagsUpdate { complexity })
    }

    /// Merge new scoring inputs and recompute the score from the merged intake.
    #[tracing::instrument(skip(self, update), fields(db.table = "intakes", db.operation = "update", db.record_id = %intake_id))]
    pub async fn update_complexity_factors(
        &self,
        intake_id: &str,
        update: &ComplexityFactorsUpdate,
    ) -> Result<Complexity, AppError> {
        let (_guard, mut intake) = self.lock_existing(intake_id).await?;

        if let Some(partial) = &update.sections_changed_flags {
            intake.sections_changed_flags.merge(partial);
        }
        if let Some(guide_type) = update.guide_type {
            intake.guide_type = guide_type;
        }
        if let Some(add_ons) = update.communications_add_ons {
            intake.communications_add_ons = add_ons;
        }
        let complexity = intake.refresh_complexity();
        intake.updated_at = Utc::now();
        self.intakes.replace(intake).await?;

        Ok(complexity)
    }

    /// Delete an intake with its uploads and sections, in that order.
    ///
    /// Removing each upload is best effort; see
    /// [`UploadRepository::delete_by_intake`]. Failing to list the uploads
    /// aborts before anything is deleted.
    #[tracing::instrument(skip(self), fields(db.table = "intakes", db.operation = "delete", db.record_id = %intake_id))]
    pub async fn delete(&self, intake_id: &str) -> Result<(), AppError> {
        let (guard, _intake) = self.lock_existing(intake_id).await?;

        let UploadCleanup {
            removed,
            storage_failures,
        } = self.uploads.delete_by_intake(intake_id).await?;
        let sections_removed = self.sections.delete_by_intake(intake_id).await?;
        self.intakes.remove(intake_id).await?;
        drop(guard);

        tracing::info!(
            intake_id = %intake_id,
            uploads_removed = removed,
            upload_storage_failures = storage_failures,
            sections_removed,
            "Intake deleted"
        );
        Ok(())
    }

    /// Counters over a snapshot of every intake.
    ///
    /// `recent_count` compares RFC 3339 strings of `date_received` against
    /// now minus the recent window, boundary included.
    #[tracing::instrument(skip(self), fields(db.table = "intakes", db.operation = "select"))]
    pub async fn stats(&self) -> Result<IntakeStats, AppError> {
        let snapshot = self.intakes.all().await?;

        let mut by_status: BTreeMap<String, usize> = IntakeStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut by_complexity: BTreeMap<String, usize> = ComplexityBand::ALL
            .iter()
            .map(|b| (b.as_str().to_string(), 0))
            .collect();

        let threshold = TimeDelta::try_days(self.policy.recent_window_days)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Recent window of {} days is out of range",
                    self.policy.recent_window_days
                ))
            })?
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut recent_count = 0;

        for intake in &snapshot {
            *by_status.entry(intake.status.as_str().to_string()).or_default() += 1;
            *by_complexity
                .entry(intake.complexity_band.as_str().to_string())
                .or_default() += 1;
            if intake
                .date_received
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                >= threshold
            {
                recent_count += 1;
            }
        }

        Ok(IntakeStats {
            total: snapshot.len(),
            by_status,
            by_complexity,
            recent_count,
        })
    }

    /// Upsert a section of an existing intake.
    pub async fn upsert_section(
        &self,
        intake_id: &str,
        section_code: SectionCode,
        payload: SectionPayload,
    ) -> Result<UpsertOutcome, AppError> {
        let (_guard, _) = self.lock_existing(intake_id).await?;
        self.sections.upsert(intake_id, section_code, payload).await
    }

    /// Create the given sections of an existing intake, skipping ones that exist.
    pub async fn bulk_create_sections(
        &self,
        intake_id: &str,
        sections: Vec<(SectionCode, SectionPayload)>,
    ) -> Result<Vec<BulkCreateResult>, AppError> {
        let (_guard, _) = self.lock_existing(intake_id).await?;
        let entries = sections
            .into_iter()
            .map(|(section_code, payload)| NewSection {
                intake_id: intake_id.to_string(),
                section_code,
                payload,
            })
            .collect();
        self.sections.bulk_create(entries).await
    }

    /// Store a file for an existing intake.
    pub async fn attach_upload(
        &self,
        intake_id: &str,
        kind: UploadKind,
        original_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Upload, AppError> {
        let (_guard, _) = self.lock_existing(intake_id).await?;
        self.uploads
            .attach(intake_id, kind, original_name, mime_type, bytes)
            .await
    }
}
