//! Creator roster, campaign assignments, and analytics snapshots.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{AnalyticsSnapshot, CampaignCreator, Creator, SocialPlatform};

#[derive(Clone)]
pub struct CreatorRepository {
    pool: PgPool,
}

impl CreatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        agency_id: Uuid,
        display_name: &str,
        handle: Option<&str>,
    ) -> Result<Creator> {
        let creator = sqlx::query_as::<Postgres, Creator>(
            r#"
            INSERT INTO creators (agency_id, display_name, handle)
            VALUES ($1, $2, $3)
            RETURNING id, agency_id, display_name, handle, created_at, updated_at
            "#,
        )
        .bind(agency_id)
        .bind(display_name)
        .bind(handle)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create creator")?;
        Ok(creator)
    }

    pub async fn get(&self, creator_id: Uuid) -> Result<Option<Creator>> {
        let creator = sqlx::query_as::<Postgres, Creator>(
            r#"
            SELECT id, agency_id, display_name, handle, created_at, updated_at
            FROM creators
            WHERE id = $1
            "#,
        )
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get creator")?;
        Ok(creator)
    }

    pub async fn assign_to_campaign(
        &self,
        campaign_id: Uuid,
        creator_id: Uuid,
        agency_id: Uuid,
    ) -> Result<CampaignCreator> {
        let assignment = sqlx::query_as::<Postgres, CampaignCreator>(
            r#"
            INSERT INTO campaign_creators (campaign_id, creator_id, agency_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (campaign_id, creator_id) DO UPDATE SET creator_id = EXCLUDED.creator_id
            RETURNING id, campaign_id, creator_id, agency_id, created_at
            "#,
        )
        .bind(campaign_id)
        .bind(creator_id)
        .bind(agency_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to assign creator to campaign")?;
        Ok(assignment)
    }

    pub async fn get_campaign_creator(
        &self,
        campaign_creator_id: Uuid,
    ) -> Result<Option<CampaignCreator>> {
        let assignment = sqlx::query_as::<Postgres, CampaignCreator>(
            r#"
            SELECT id, campaign_id, creator_id, agency_id, created_at
            FROM campaign_creators
            WHERE id = $1
            "#,
        )
        .bind(campaign_creator_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get campaign creator")?;
        Ok(assignment)
    }

    // ----- Analytics snapshots -----

    /// Insert the snapshot row created by a metered fetch. The payload stays
    /// empty until the external worker reports back.
    pub async fn create_snapshot(
        &self,
        campaign_creator_id: Uuid,
        agency_id: Uuid,
        platform: SocialPlatform,
        tokens_consumed: i32,
    ) -> Result<AnalyticsSnapshot> {
        let snapshot = sqlx::query_as::<Postgres, AnalyticsSnapshot>(
            r#"
            INSERT INTO analytics_snapshots (campaign_creator_id, agency_id, platform, tokens_consumed)
            VALUES ($1, $2, $3, $4)
            RETURNING id, campaign_creator_id, agency_id, platform, payload,
                tokens_consumed, dispatch_attempts, dispatched_at, last_error,
                fetched_at, created_at
            "#,
        )
        .bind(campaign_creator_id)
        .bind(agency_id)
        .bind(platform)
        .bind(tokens_consumed)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create analytics snapshot")?;
        Ok(snapshot)
    }

    pub async fn get_snapshot(&self, snapshot_id: Uuid) -> Result<Option<AnalyticsSnapshot>> {
        let snapshot = sqlx::query_as::<Postgres, AnalyticsSnapshot>(
            r#"
            SELECT id, campaign_creator_id, agency_id, platform, payload,
                tokens_consumed, dispatch_attempts, dispatched_at, last_error,
                fetched_at, created_at
            FROM analytics_snapshots
            WHERE id = $1
            "#,
        )
        .bind(snapshot_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get analytics snapshot")?;
        Ok(snapshot)
    }

    pub async fn list_snapshots_for_campaign_creator(
        &self,
        campaign_creator_id: Uuid,
    ) -> Result<Vec<AnalyticsSnapshot>> {
        let snapshots = sqlx::query_as::<Postgres, AnalyticsSnapshot>(
            r#"
            SELECT id, campaign_creator_id, agency_id, platform, payload,
                tokens_consumed, dispatch_attempts, dispatched_at, last_error,
                fetched_at, created_at
            FROM analytics_snapshots
            WHERE campaign_creator_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(campaign_creator_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list analytics snapshots")?;
        Ok(snapshots)
    }

    /// Claim a batch of undelivered snapshots for dispatch, bumping the
    /// attempt counter. Skips rows another dispatcher is holding.
    pub async fn claim_undispatched_snapshots(
        &self,
        batch_size: i64,
        max_attempts: i32,
    ) -> Result<Vec<AnalyticsSnapshot>> {
        let snapshots = sqlx::query_as::<Postgres, AnalyticsSnapshot>(
            r#"
            UPDATE analytics_snapshots
            SET dispatch_attempts = dispatch_attempts + 1
            WHERE id IN (
                SELECT id FROM analytics_snapshots
                WHERE dispatched_at IS NULL AND dispatch_attempts < $2
                ORDER BY created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, campaign_creator_id, agency_id, platform, payload,
                tokens_consumed, dispatch_attempts, dispatched_at, last_error,
                fetched_at, created_at
            "#,
        )
        .bind(batch_size)
        .bind(max_attempts)
        .fetch_all(&self.pool)
        .await
        .context("Failed to claim undispatched snapshots")?;
        Ok(snapshots)
    }

    pub async fn mark_snapshot_dispatched(
        &self,
        snapshot_id: Uuid,
    ) -> Result<Option<AnalyticsSnapshot>> {
        let snapshot = sqlx::query_as::<Postgres, AnalyticsSnapshot>(
            r#"
            UPDATE analytics_snapshots
            SET dispatched_at = NOW(), last_error = NULL
            WHERE id = $1 AND dispatched_at IS NULL
            RETURNING id, campaign_creator_id, agency_id, platform, payload,
                tokens_consumed, dispatch_attempts, dispatched_at, last_error,
                fetched_at, created_at
            "#,
        )
        .bind(snapshot_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to mark snapshot dispatched")?;
        Ok(snapshot)
    }

    pub async fn record_snapshot_dispatch_failure(
        &self,
        snapshot_id: Uuid,
        error: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE analytics_snapshots
            SET last_error = $2
            WHERE id = $1 AND dispatched_at IS NULL
            "#,
        )
        .bind(snapshot_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .context("Failed to record snapshot dispatch failure")?;
        Ok(())
    }
}
