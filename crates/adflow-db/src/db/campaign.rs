//! Campaign repository.
//!
//! Status transitions are compare-and-set on the previous status so two
//! concurrent transition attempts cannot both succeed from the same prior
//! state. Detail mutations carry their own `status <> 'archived'` guard:
//! archival freezes the whole aggregate, not just the status column.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{
    Campaign, CampaignMember, CampaignRole, CampaignStatus, CampaignType,
};

#[derive(Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the campaign and its initial member roster in one transaction.
    /// The caller has already validated that `members` contains at least one
    /// approver; nothing is written when any insert fails.
    pub async fn create_with_members(
        &self,
        project_id: Uuid,
        agency_id: Uuid,
        name: &str,
        campaign_type: CampaignType,
        members: &[(Uuid, CampaignRole)],
    ) -> Result<Campaign> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin campaign creation transaction")?;

        let campaign = sqlx::query_as::<Postgres, Campaign>(
            r#"
            INSERT INTO campaigns (project_id, agency_id, name, campaign_type, status, attachments)
            VALUES ($1, $2, $3, $4, 'draft', '[]'::jsonb)
            RETURNING id, project_id, agency_id, name, campaign_type, status,
                starts_on, ends_on, brief, attachments, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(agency_id)
        .bind(name)
        .bind(campaign_type)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create campaign")?;

        for (membership_id, role) in members {
            sqlx::query(
                r#"
                INSERT INTO campaign_members (campaign_id, membership_id, role)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(campaign.id)
            .bind(membership_id)
            .bind(role)
            .execute(&mut *tx)
            .await
            .context("Failed to add campaign member")?;
        }

        tx.commit()
            .await
            .context("Failed to commit campaign creation")?;

        tracing::info!(campaign_id = %campaign.id, project_id = %project_id, "Created campaign");
        Ok(campaign)
    }

    pub async fn get(&self, campaign_id: Uuid) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<Postgres, Campaign>(
            r#"
            SELECT id, project_id, agency_id, name, campaign_type, status,
                starts_on, ends_on, brief, attachments, created_at, updated_at
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get campaign")?;
        Ok(campaign)
    }

    pub async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<Postgres, Campaign>(
            r#"
            SELECT id, project_id, agency_id, name, campaign_type, status,
                starts_on, ends_on, brief, attachments, created_at, updated_at
            FROM campaigns
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list campaigns")?;
        Ok(campaigns)
    }

    /// Compare-and-set status transition. Returns `None` when the row no
    /// longer sits in `expected`; the caller re-reads and reports an
    /// invalid-state error naming the actual current status.
    pub async fn transition_status(
        &self,
        campaign_id: Uuid,
        expected: CampaignStatus,
        next: CampaignStatus,
    ) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<Postgres, Campaign>(
            r#"
            UPDATE campaigns
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, project_id, agency_id, name, campaign_type, status,
                starts_on, ends_on, brief, attachments, created_at, updated_at
            "#,
        )
        .bind(campaign_id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to transition campaign status")?;
        Ok(campaign)
    }

    /// Update name/type. Guarded against archived rows at the SQL level in
    /// addition to the service-level freeze check.
    pub async fn update_details(
        &self,
        campaign_id: Uuid,
        name: Option<&str>,
        campaign_type: Option<CampaignType>,
    ) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<Postgres, Campaign>(
            r#"
            UPDATE campaigns
            SET name = COALESCE($2, name),
                campaign_type = COALESCE($3, campaign_type),
                updated_at = NOW()
            WHERE id = $1 AND status <> 'archived'
            RETURNING id, project_id, agency_id, name, campaign_type, status,
                starts_on, ends_on, brief, attachments, created_at, updated_at
            "#,
        )
        .bind(campaign_id)
        .bind(name)
        .bind(campaign_type)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update campaign details")?;
        Ok(campaign)
    }

    pub async fn set_dates(
        &self,
        campaign_id: Uuid,
        starts_on: Option<NaiveDate>,
        ends_on: Option<NaiveDate>,
    ) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<Postgres, Campaign>(
            r#"
            UPDATE campaigns
            SET starts_on = $2, ends_on = $3, updated_at = NOW()
            WHERE id = $1 AND status <> 'archived'
            RETURNING id, project_id, agency_id, name, campaign_type, status,
                starts_on, ends_on, brief, attachments, created_at, updated_at
            "#,
        )
        .bind(campaign_id)
        .bind(starts_on)
        .bind(ends_on)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to set campaign dates")?;
        Ok(campaign)
    }

    pub async fn update_brief(
        &self,
        campaign_id: Uuid,
        brief: Option<&str>,
        attachments: Option<&serde_json::Value>,
    ) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<Postgres, Campaign>(
            r#"
            UPDATE campaigns
            SET brief = COALESCE($2, brief),
                attachments = COALESCE($3, attachments),
                updated_at = NOW()
            WHERE id = $1 AND status <> 'archived'
            RETURNING id, project_id, agency_id, name, campaign_type, status,
                starts_on, ends_on, brief, attachments, created_at, updated_at
            "#,
        )
        .bind(campaign_id)
        .bind(brief)
        .bind(attachments)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update campaign brief")?;
        Ok(campaign)
    }

    // ----- Member roster -----

    pub async fn add_member(
        &self,
        campaign_id: Uuid,
        membership_id: Uuid,
        role: CampaignRole,
    ) -> Result<CampaignMember> {
        let member = sqlx::query_as::<Postgres, CampaignMember>(
            r#"
            INSERT INTO campaign_members (campaign_id, membership_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (campaign_id, membership_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING id, campaign_id, membership_id, role, created_at
            "#,
        )
        .bind(campaign_id)
        .bind(membership_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .context("Failed to add campaign member")?;
        Ok(member)
    }

    /// Remove a member unless doing so would leave the campaign without a
    /// single approver. Returns false when nothing was removed.
    pub async fn remove_member(&self, campaign_id: Uuid, membership_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM campaign_members
            WHERE campaign_id = $1 AND membership_id = $2
              AND (role <> 'approver' OR (
                    SELECT COUNT(*) FROM campaign_members
                    WHERE campaign_id = $1 AND role = 'approver'
                  ) > 1)
            "#,
        )
        .bind(campaign_id)
        .bind(membership_id)
        .execute(&self.pool)
        .await
        .context("Failed to remove campaign member")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_members(&self, campaign_id: Uuid) -> Result<Vec<CampaignMember>> {
        let members = sqlx::query_as::<Postgres, CampaignMember>(
            r#"
            SELECT id, campaign_id, membership_id, role, created_at
            FROM campaign_members
            WHERE campaign_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list campaign members")?;
        Ok(members)
    }

    /// The campaign-tier approver roster as membership ids.
    pub async fn list_approver_membership_ids(&self, campaign_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT membership_id
            FROM campaign_members
            WHERE campaign_id = $1 AND role = 'approver'
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list campaign approvers")?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Whether a membership sits on the campaign roster at all (any role).
    pub async fn is_member(&self, campaign_id: Uuid, membership_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM campaign_members
                WHERE campaign_id = $1 AND membership_id = $2
            )
            "#,
        )
        .bind(campaign_id)
        .bind(membership_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check campaign membership")?;
        Ok(exists)
    }
}
