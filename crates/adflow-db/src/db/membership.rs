//! Agency membership repository. Memberships are what the access gate
//! checks; the active-agency selector resolves against `first_active_for_user`
//! when no explicit agency header is sent.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{AgencyMembership, MemberRole};

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        agency_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<AgencyMembership> {
        let membership = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            INSERT INTO agency_memberships (agency_id, user_id, role, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id, agency_id, user_id, role, is_active, created_at, updated_at
            "#,
        )
        .bind(agency_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create membership")?;
        Ok(membership)
    }

    pub async fn get(&self, membership_id: Uuid) -> Result<Option<AgencyMembership>> {
        let membership = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            SELECT id, agency_id, user_id, role, is_active, created_at, updated_at
            FROM agency_memberships
            WHERE id = $1
            "#,
        )
        .bind(membership_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get membership")?;
        Ok(membership)
    }

    /// Active membership of a user in a specific agency.
    pub async fn get_active(
        &self,
        user_id: Uuid,
        agency_id: Uuid,
    ) -> Result<Option<AgencyMembership>> {
        let membership = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            SELECT id, agency_id, user_id, role, is_active, created_at, updated_at
            FROM agency_memberships
            WHERE user_id = $1 AND agency_id = $2 AND is_active
            "#,
        )
        .bind(user_id)
        .bind(agency_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get active membership")?;
        Ok(membership)
    }

    /// Fallback for callers without an explicit agency selector: the first
    /// active membership by creation order.
    pub async fn first_active_for_user(&self, user_id: Uuid) -> Result<Option<AgencyMembership>> {
        let membership = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            SELECT id, agency_id, user_id, role, is_active, created_at, updated_at
            FROM agency_memberships
            WHERE user_id = $1 AND is_active
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get first active membership")?;
        Ok(membership)
    }

    pub async fn list_for_agency(&self, agency_id: Uuid) -> Result<Vec<AgencyMembership>> {
        let memberships = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            SELECT id, agency_id, user_id, role, is_active, created_at, updated_at
            FROM agency_memberships
            WHERE agency_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list memberships")?;
        Ok(memberships)
    }

    /// Resolve the memberships of a set of users within one agency. Used at
    /// campaign creation to translate approver user ids into memberships.
    pub async fn list_active_by_users(
        &self,
        agency_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<Vec<AgencyMembership>> {
        let memberships = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            SELECT id, agency_id, user_id, role, is_active, created_at, updated_at
            FROM agency_memberships
            WHERE agency_id = $1 AND user_id = ANY($2) AND is_active
            "#,
        )
        .bind(agency_id)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to resolve memberships for users")?;
        Ok(memberships)
    }

    pub async fn set_role(
        &self,
        membership_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<AgencyMembership>> {
        let membership = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            UPDATE agency_memberships
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, agency_id, user_id, role, is_active, created_at, updated_at
            "#,
        )
        .bind(membership_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update membership role")?;
        Ok(membership)
    }

    pub async fn deactivate(&self, membership_id: Uuid) -> Result<Option<AgencyMembership>> {
        let membership = sqlx::query_as::<Postgres, AgencyMembership>(
            r#"
            UPDATE agency_memberships
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, agency_id, user_id, role, is_active, created_at, updated_at
            "#,
        )
        .bind(membership_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to deactivate membership")?;
        Ok(membership)
    }
}
