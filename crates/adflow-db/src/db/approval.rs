//! Approval repository.
//!
//! Approvals are write-once: this interface exposes inserts and reads only;
//! no update or delete statement exists for the approvals table. History is
//! reconstructed by filtering and sorting; quorum is evaluated per version.
//!
//! `record_decision` is the one composite write in the review pipeline: it
//! inserts the decision, replays the latest version's decisions through the
//! aggregator, and refreshes the deliverable's cached status, all inside a
//! single transaction. The stored status is never trusted as input to quorum
//! logic.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::lifecycle::deliverable_transition_allowed;
use adflow_core::models::{
    Approval, ApprovalDecision, ApprovalTier, Deliverable, DeliverableStatus,
};
use adflow_core::review::{derive_status, RecordedDecision, TierRosters};

#[derive(Clone)]
pub struct ApprovalRepository {
    pool: PgPool,
}

impl ApprovalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_deliverable(&self, deliverable_id: Uuid) -> Result<Vec<Approval>> {
        let approvals = sqlx::query_as::<Postgres, Approval>(
            r#"
            SELECT id, deliverable_id, version_id, tier, decision,
                decided_by_membership_id, decided_by_contact_id, comment, created_at
            FROM approvals
            WHERE deliverable_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(deliverable_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list approvals")?;
        Ok(approvals)
    }

    pub async fn list_for_version(&self, version_id: Uuid) -> Result<Vec<Approval>> {
        let approvals = sqlx::query_as::<Postgres, Approval>(
            r#"
            SELECT id, deliverable_id, version_id, tier, decision,
                decided_by_membership_id, decided_by_contact_id, comment, created_at
            FROM approvals
            WHERE version_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(version_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list approvals for version")?;
        Ok(approvals)
    }

    /// Whether any approval references the version. Referenced versions can
    /// never be deleted.
    pub async fn version_is_referenced(&self, version_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM approvals WHERE version_id = $1)")
                .bind(version_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check version references")?;
        Ok(exists)
    }

    /// Record a decision and refresh the deliverable's derived status in one
    /// transaction.
    ///
    /// The status update is compare-and-set from `expected_status`; when a
    /// concurrent writer moved the deliverable first, the whole transaction
    /// rolls back (including the decision insert) and `None` is returned so
    /// the caller can re-read and report the actual state.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_decision(
        &self,
        deliverable_id: Uuid,
        version_id: Uuid,
        tier: ApprovalTier,
        decision: ApprovalDecision,
        decided_by_membership_id: Option<Uuid>,
        decided_by_contact_id: Option<Uuid>,
        comment: Option<&str>,
        expected_status: DeliverableStatus,
        rosters: &TierRosters,
    ) -> Result<Option<(Approval, Deliverable)>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin decision transaction")?;

        let approval = sqlx::query_as::<Postgres, Approval>(
            r#"
            INSERT INTO approvals (
                deliverable_id, version_id, tier, decision,
                decided_by_membership_id, decided_by_contact_id, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, deliverable_id, version_id, tier, decision,
                decided_by_membership_id, decided_by_contact_id, comment, created_at
            "#,
        )
        .bind(deliverable_id)
        .bind(version_id)
        .bind(tier)
        .bind(decision)
        .bind(decided_by_membership_id)
        .bind(decided_by_contact_id)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert approval")?;

        // Replay every decision recorded for this version, including the one
        // just written, against the rosters.
        let version_approvals = sqlx::query_as::<Postgres, Approval>(
            r#"
            SELECT id, deliverable_id, version_id, tier, decision,
                decided_by_membership_id, decided_by_contact_id, comment, created_at
            FROM approvals
            WHERE version_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(version_id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to replay version approvals")?;

        let decisions: Vec<RecordedDecision> = version_approvals
            .iter()
            .map(RecordedDecision::from)
            .collect();
        let derived = derive_status(rosters, &decisions);

        // Persist the derived status as a walk of the transition table. A
        // completed campaign quorum on a freshly submitted deliverable passes
        // through internal_review on its way to the next tier.
        let mut steps: Vec<(DeliverableStatus, DeliverableStatus)> = Vec::new();
        if derived != expected_status {
            if deliverable_transition_allowed(expected_status, derived) {
                steps.push((expected_status, derived));
            } else {
                steps.push((expected_status, DeliverableStatus::InternalReview));
                steps.push((DeliverableStatus::InternalReview, derived));
            }
        }

        let mut deliverable: Option<Deliverable> = None;
        for (from, to) in steps {
            let updated = sqlx::query_as::<Postgres, Deliverable>(
                r#"
                UPDATE deliverables
                SET status = $3, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING id, campaign_id, agency_id, title, deliverable_type, status,
                    due_on, preview_version_id, created_at, updated_at
                "#,
            )
            .bind(deliverable_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to refresh deliverable status")?;

            match updated {
                Some(row) => deliverable = Some(row),
                None => {
                    tx.rollback().await.ok();
                    return Ok(None);
                }
            }
        }

        let deliverable = match deliverable {
            Some(row) => row,
            None => {
                // Quorum not reached yet: no status change, but re-read under
                // the same guard so a concurrent transition still rolls the
                // decision back.
                let row = sqlx::query_as::<Postgres, Deliverable>(
                    r#"
                    SELECT id, campaign_id, agency_id, title, deliverable_type, status,
                        due_on, preview_version_id, created_at, updated_at
                    FROM deliverables
                    WHERE id = $1 AND status = $2
                    "#,
                )
                .bind(deliverable_id)
                .bind(expected_status)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to re-read deliverable")?;
                match row {
                    Some(row) => row,
                    None => {
                        tx.rollback().await.ok();
                        return Ok(None);
                    }
                }
            }
        };

        tx.commit()
            .await
            .context("Failed to commit decision transaction")?;

        tracing::info!(
            deliverable_id = %deliverable_id,
            version_id = %version_id,
            tier = %tier,
            status = %deliverable.status,
            "Recorded review decision"
        );
        Ok(Some((approval, deliverable)))
    }
}
