//! Deliverable and deliverable-version repositories.
//!
//! Versions are append-only with a strictly increasing version number per
//! logical file name, computed inside the insert. Status transitions are
//! compare-and-set; the decision write path (insert + status recompute) lives
//! in `ApprovalRepository::record_decision`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{
    Deliverable, DeliverableStatus, DeliverableType, DeliverableVersion,
};

#[derive(Clone)]
pub struct DeliverableRepository {
    pool: PgPool,
}

impl DeliverableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        campaign_id: Uuid,
        agency_id: Uuid,
        title: &str,
        deliverable_type: DeliverableType,
        due_on: Option<NaiveDate>,
    ) -> Result<Deliverable> {
        let deliverable = sqlx::query_as::<Postgres, Deliverable>(
            r#"
            INSERT INTO deliverables (campaign_id, agency_id, title, deliverable_type, status, due_on)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING id, campaign_id, agency_id, title, deliverable_type, status,
                due_on, preview_version_id, created_at, updated_at
            "#,
        )
        .bind(campaign_id)
        .bind(agency_id)
        .bind(title)
        .bind(deliverable_type)
        .bind(due_on)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create deliverable")?;
        Ok(deliverable)
    }

    pub async fn get(&self, deliverable_id: Uuid) -> Result<Option<Deliverable>> {
        let deliverable = sqlx::query_as::<Postgres, Deliverable>(
            r#"
            SELECT id, campaign_id, agency_id, title, deliverable_type, status,
                due_on, preview_version_id, created_at, updated_at
            FROM deliverables
            WHERE id = $1
            "#,
        )
        .bind(deliverable_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get deliverable")?;
        Ok(deliverable)
    }

    pub async fn list_by_campaign(&self, campaign_id: Uuid) -> Result<Vec<Deliverable>> {
        let deliverables = sqlx::query_as::<Postgres, Deliverable>(
            r#"
            SELECT id, campaign_id, agency_id, title, deliverable_type, status,
                due_on, preview_version_id, created_at, updated_at
            FROM deliverables
            WHERE campaign_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list deliverables")?;
        Ok(deliverables)
    }

    /// Deliverables awaiting a client decision for one client, for the
    /// portal's pending-approval listing.
    pub async fn list_pending_client_approval(&self, client_id: Uuid) -> Result<Vec<Deliverable>> {
        let deliverables = sqlx::query_as::<Postgres, Deliverable>(
            r#"
            SELECT d.id, d.campaign_id, d.agency_id, d.title, d.deliverable_type, d.status,
                d.due_on, d.preview_version_id, d.created_at, d.updated_at
            FROM deliverables d
            JOIN campaigns c ON c.id = d.campaign_id
            JOIN projects p ON p.id = c.project_id
            WHERE p.client_id = $1 AND d.status = 'client_review'
            ORDER BY d.updated_at ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list deliverables pending client approval")?;
        Ok(deliverables)
    }

    /// Compare-and-set status transition. Returns `None` when the row no
    /// longer sits in `expected`.
    pub async fn transition_status(
        &self,
        deliverable_id: Uuid,
        expected: DeliverableStatus,
        next: DeliverableStatus,
    ) -> Result<Option<Deliverable>> {
        let deliverable = sqlx::query_as::<Postgres, Deliverable>(
            r#"
            UPDATE deliverables
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, campaign_id, agency_id, title, deliverable_type, status,
                due_on, preview_version_id, created_at, updated_at
            "#,
        )
        .bind(deliverable_id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to transition deliverable status")?;
        Ok(deliverable)
    }

    pub async fn set_preview_version(
        &self,
        deliverable_id: Uuid,
        version_id: Option<Uuid>,
    ) -> Result<Option<Deliverable>> {
        let deliverable = sqlx::query_as::<Postgres, Deliverable>(
            r#"
            UPDATE deliverables
            SET preview_version_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, campaign_id, agency_id, title, deliverable_type, status,
                due_on, preview_version_id, created_at, updated_at
            "#,
        )
        .bind(deliverable_id)
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to set preview version")?;
        Ok(deliverable)
    }

    // ----- Versions -----

    /// Append a version. The version number is computed in the insert:
    /// strictly increasing per (deliverable, file_name).
    pub async fn insert_version(
        &self,
        deliverable_id: Uuid,
        file_name: &str,
        file_key: &str,
        uploaded_by_membership_id: Uuid,
    ) -> Result<DeliverableVersion> {
        let version = sqlx::query_as::<Postgres, DeliverableVersion>(
            r#"
            INSERT INTO deliverable_versions (
                deliverable_id, version_number, file_name, file_key, uploaded_by_membership_id
            )
            VALUES (
                $1,
                (
                    SELECT COALESCE(MAX(version_number), 0) + 1
                    FROM deliverable_versions
                    WHERE deliverable_id = $1 AND file_name = $2
                ),
                $2, $3, $4
            )
            RETURNING id, deliverable_id, version_number, file_name, file_key,
                uploaded_by_membership_id, created_at
            "#,
        )
        .bind(deliverable_id)
        .bind(file_name)
        .bind(file_key)
        .bind(uploaded_by_membership_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert deliverable version")?;
        Ok(version)
    }

    pub async fn get_version(&self, version_id: Uuid) -> Result<Option<DeliverableVersion>> {
        let version = sqlx::query_as::<Postgres, DeliverableVersion>(
            r#"
            SELECT id, deliverable_id, version_number, file_name, file_key,
                uploaded_by_membership_id, created_at
            FROM deliverable_versions
            WHERE id = $1
            "#,
        )
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get deliverable version")?;
        Ok(version)
    }

    pub async fn list_versions(&self, deliverable_id: Uuid) -> Result<Vec<DeliverableVersion>> {
        let versions = sqlx::query_as::<Postgres, DeliverableVersion>(
            r#"
            SELECT id, deliverable_id, version_number, file_name, file_key,
                uploaded_by_membership_id, created_at
            FROM deliverable_versions
            WHERE deliverable_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(deliverable_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list deliverable versions")?;
        Ok(versions)
    }

    /// The most recently uploaded version; quorum is evaluated against this.
    pub async fn latest_version(&self, deliverable_id: Uuid) -> Result<Option<DeliverableVersion>> {
        let version = sqlx::query_as::<Postgres, DeliverableVersion>(
            r#"
            SELECT id, deliverable_id, version_number, file_name, file_key,
                uploaded_by_membership_id, created_at
            FROM deliverable_versions
            WHERE deliverable_id = $1
            ORDER BY created_at DESC, version_number DESC
            LIMIT 1
            "#,
        )
        .bind(deliverable_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get latest deliverable version")?;
        Ok(version)
    }

    pub async fn count_versions(&self, deliverable_id: Uuid) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM deliverable_versions WHERE deliverable_id = $1")
                .bind(deliverable_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count deliverable versions")?;
        Ok(count)
    }

    /// Delete a version and clear the preview pointer if it referenced it.
    /// The delete is guarded in SQL: never while an approval references the
    /// version, and only the latest version. Returns false when the guard
    /// blocked the delete.
    pub async fn delete_version(&self, deliverable_id: Uuid, version_id: Uuid) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin version delete transaction")?;

        let result = sqlx::query(
            r#"
            DELETE FROM deliverable_versions
            WHERE id = $2 AND deliverable_id = $1
              AND NOT EXISTS (SELECT 1 FROM approvals WHERE version_id = $2)
              AND id = (
                    SELECT id FROM deliverable_versions
                    WHERE deliverable_id = $1
                    ORDER BY created_at DESC, version_number DESC
                    LIMIT 1
                  )
            "#,
        )
        .bind(deliverable_id)
        .bind(version_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete deliverable version")?;

        if result.rows_affected() == 0 {
            tx.rollback().await.ok();
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE deliverables
            SET preview_version_id = NULL, updated_at = NOW()
            WHERE id = $1 AND preview_version_id = $2
            "#,
        )
        .bind(deliverable_id)
        .bind(version_id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear preview pointer")?;

        tx.commit()
            .await
            .context("Failed to commit version delete")?;
        Ok(true)
    }
}
