//! Credit metering service.
//!
//! Both metered operations follow the same order: authorize, atomically
//! debit, insert the job/snapshot record, refund if that insert fails, and
//! return immediately; delivery to the external fetch worker happens
//! asynchronously off the outbox. A crash between debit and insert leaves a
//! debited-but-unused credit; that leak is accepted and bounded.

use uuid::Uuid;

use adflow_core::constants::FETCH_CREDIT_COST;
use adflow_core::models::{
    AnalyticsSnapshot, SocialDataJob, SocialJobType, SocialPlatform,
};
use adflow_core::{AppError, Permission};
use adflow_db::{AgencyRepository, CreatorRepository, SocialJobRepository};

use crate::auth::gate::AccessGate;
use crate::auth::models::Caller;
use crate::services::audit::{snapshot, AuditLogger};

#[derive(Clone)]
pub struct MeteringService {
    gate: AccessGate,
    agencies: AgencyRepository,
    creators: CreatorRepository,
    social_jobs: SocialJobRepository,
    audit: AuditLogger,
}

impl MeteringService {
    pub fn new(
        gate: AccessGate,
        agencies: AgencyRepository,
        creators: CreatorRepository,
        social_jobs: SocialJobRepository,
        audit: AuditLogger,
    ) -> Self {
        Self {
            gate,
            agencies,
            creators,
            social_jobs,
            audit,
        }
    }

    /// Fetch pre-campaign analytics for a campaign creator. Costs one
    /// credit; returns the snapshot row the caller polls for completion.
    pub async fn fetch_pre_campaign_analytics(
        &self,
        caller: &Caller,
        campaign_creator_id: Uuid,
        platform: SocialPlatform,
    ) -> Result<AnalyticsSnapshot, AppError> {
        let campaign_creator = self
            .creators
            .get_campaign_creator(campaign_creator_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Campaign creator not found".to_string()))?;
        if campaign_creator.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Campaign creator not found".to_string()));
        }
        self.gate.require_permission(caller, Permission::CreditSpend)?;

        let agency_id = campaign_creator.agency_id;
        self.debit(agency_id).await?;

        let snapshot_row = match self
            .creators
            .create_snapshot(
                campaign_creator_id,
                agency_id,
                platform,
                FETCH_CREDIT_COST as i32,
            )
            .await
        {
            Ok(row) => row,
            Err(e) => {
                self.refund(agency_id).await;
                return Err(AppError::from(e));
            }
        };

        self.audit
            .record(
                agency_id,
                "analytics_snapshot",
                snapshot_row.id,
                "analytics_fetch_requested",
                caller,
                None,
                snapshot(&snapshot_row),
                serde_json::json!({
                    "platform": platform,
                    "tokens_consumed": FETCH_CREDIT_COST,
                }),
            )
            .await;
        Ok(snapshot_row)
    }

    /// Trigger a background social-data fetch for a creator. Costs one
    /// credit; returns the job row the caller polls for completion.
    pub async fn trigger_social_fetch(
        &self,
        caller: &Caller,
        creator_id: Uuid,
        platform: SocialPlatform,
        job_type: SocialJobType,
    ) -> Result<SocialDataJob, AppError> {
        let creator = self
            .creators
            .get(creator_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))?;
        if creator.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Creator not found".to_string()));
        }
        self.gate.require_permission(caller, Permission::CreditSpend)?;

        let agency_id = creator.agency_id;
        self.debit(agency_id).await?;

        let job = match self
            .social_jobs
            .create(
                agency_id,
                creator_id,
                platform,
                job_type,
                FETCH_CREDIT_COST as i32,
            )
            .await
        {
            Ok(job) => job,
            Err(e) => {
                self.refund(agency_id).await;
                return Err(AppError::from(e));
            }
        };

        self.audit
            .record(
                agency_id,
                "social_data_job",
                job.id,
                "social_fetch_triggered",
                caller,
                None,
                snapshot(&job),
                serde_json::json!({
                    "platform": platform,
                    "job_type": job_type,
                    "tokens_consumed": FETCH_CREDIT_COST,
                }),
            )
            .await;
        Ok(job)
    }

    pub async fn get_job(&self, caller: &Caller, job_id: Uuid) -> Result<SocialDataJob, AppError> {
        let job = self
            .social_jobs
            .get(job_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        self.gate.require_permission(caller, Permission::CampaignView)?;
        Ok(job)
    }

    pub async fn get_snapshot(
        &self,
        caller: &Caller,
        snapshot_id: Uuid,
    ) -> Result<AnalyticsSnapshot, AppError> {
        let row = self
            .creators
            .get_snapshot(snapshot_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Snapshot not found".to_string()))?;
        if row.agency_id != caller.agency_id() {
            return Err(AppError::NotFound("Snapshot not found".to_string()));
        }
        self.gate.require_permission(caller, Permission::CampaignView)?;
        Ok(row)
    }

    /// Atomic conditional decrement. On a miss, re-read the balance purely
    /// for the error payload: the failed debit wrote nothing.
    async fn debit(&self, agency_id: Uuid) -> Result<(), AppError> {
        let debited = self
            .agencies
            .debit_tokens(agency_id, FETCH_CREDIT_COST)
            .await
            .map_err(AppError::from)?;
        if debited.is_none() {
            let available = self
                .agencies
                .get_balance(agency_id)
                .await
                .map_err(AppError::from)?
                .unwrap_or(0);
            return Err(AppError::InsufficientCredits {
                required: FETCH_CREDIT_COST,
                available,
            });
        }
        Ok(())
    }

    /// Compensating refund after a failed record insert. Best-effort: a
    /// refund failure is logged loudly, since it means a lost credit.
    async fn refund(&self, agency_id: Uuid) {
        if let Err(e) = self.agencies.refund_tokens(agency_id, FETCH_CREDIT_COST).await {
            tracing::error!(
                agency_id = %agency_id,
                amount = FETCH_CREDIT_COST,
                error = %e,
                "Failed to refund credits after record insert failure"
            );
        }
    }
}
