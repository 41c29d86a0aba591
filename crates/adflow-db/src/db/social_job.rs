//! Social-data job repository.
//!
//! The job row is the dispatch outbox: it is inserted right after the ledger
//! debit, and the dispatcher claims pending rows with FOR UPDATE SKIP LOCKED
//! so concurrent dispatcher instances never deliver the same job twice from
//! the same attempt. Delivery is at-least-once; the job id is the
//! idempotency key on the receiving side.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{SocialDataJob, SocialJobType, SocialPlatform};

#[derive(Clone)]
pub struct SocialJobRepository {
    pool: PgPool,
}

impl SocialJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a job after a successful ledger debit, tagged with the credits
    /// it consumed.
    pub async fn create(
        &self,
        agency_id: Uuid,
        creator_id: Uuid,
        platform: SocialPlatform,
        job_type: SocialJobType,
        tokens_consumed: i32,
    ) -> Result<SocialDataJob> {
        let job = sqlx::query_as::<Postgres, SocialDataJob>(
            r#"
            INSERT INTO social_data_jobs (agency_id, creator_id, platform, job_type, status, tokens_consumed)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING id, agency_id, creator_id, platform, job_type, status,
                tokens_consumed, dispatch_attempts, dispatched_at, completed_at,
                last_error, created_at, updated_at
            "#,
        )
        .bind(agency_id)
        .bind(creator_id)
        .bind(platform)
        .bind(job_type)
        .bind(tokens_consumed)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create social data job")?;
        Ok(job)
    }

    pub async fn get(&self, job_id: Uuid) -> Result<Option<SocialDataJob>> {
        let job = sqlx::query_as::<Postgres, SocialDataJob>(
            r#"
            SELECT id, agency_id, creator_id, platform, job_type, status,
                tokens_consumed, dispatch_attempts, dispatched_at, completed_at,
                last_error, created_at, updated_at
            FROM social_data_jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get social data job")?;
        Ok(job)
    }

    /// Claim a batch of undelivered jobs for dispatch, bumping the attempt
    /// counter. Skips rows another dispatcher is holding.
    pub async fn claim_pending(
        &self,
        batch_size: i64,
        max_attempts: i32,
    ) -> Result<Vec<SocialDataJob>> {
        let jobs = sqlx::query_as::<Postgres, SocialDataJob>(
            r#"
            UPDATE social_data_jobs
            SET dispatch_attempts = dispatch_attempts + 1, updated_at = NOW()
            WHERE id IN (
                SELECT id FROM social_data_jobs
                WHERE status = 'pending' AND dispatch_attempts < $2
                ORDER BY created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, agency_id, creator_id, platform, job_type, status,
                tokens_consumed, dispatch_attempts, dispatched_at, completed_at,
                last_error, created_at, updated_at
            "#,
        )
        .bind(batch_size)
        .bind(max_attempts)
        .fetch_all(&self.pool)
        .await
        .context("Failed to claim pending jobs")?;
        Ok(jobs)
    }

    /// Mark a job accepted by the fetch worker. From here the external
    /// worker owns the lifecycle and reports done/failed out-of-band.
    pub async fn mark_running(&self, job_id: Uuid) -> Result<Option<SocialDataJob>> {
        let job = sqlx::query_as::<Postgres, SocialDataJob>(
            r#"
            UPDATE social_data_jobs
            SET status = 'running', dispatched_at = NOW(), last_error = NULL, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, agency_id, creator_id, platform, job_type, status,
                tokens_consumed, dispatch_attempts, dispatched_at, completed_at,
                last_error, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to mark job running")?;
        Ok(job)
    }

    /// Record a failed dispatch attempt. The job stays pending for the next
    /// poll until the attempt budget is spent, then fails terminally.
    pub async fn record_dispatch_failure(
        &self,
        job_id: Uuid,
        error: &str,
        max_attempts: i32,
    ) -> Result<Option<SocialDataJob>> {
        let job = sqlx::query_as::<Postgres, SocialDataJob>(
            r#"
            UPDATE social_data_jobs
            SET last_error = $2,
                status = CASE WHEN dispatch_attempts >= $3 THEN 'failed'::social_job_status ELSE status END,
                completed_at = CASE WHEN dispatch_attempts >= $3 THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, agency_id, creator_id, platform, job_type, status,
                tokens_consumed, dispatch_attempts, dispatched_at, completed_at,
                last_error, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .bind(error)
        .bind(max_attempts)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to record dispatch failure")?;
        Ok(job)
    }
}
