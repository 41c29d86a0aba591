//! Activity log repository.
//!
//! Append-only: this interface exposes insert and a read for observability
//! tooling. No update or delete statement exists for the table, and the
//! workflow core never reads the log back.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::ActivityLogEntry;

#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        agency_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
        action: &str,
        actor_user_id: Option<Uuid>,
        actor_contact_id: Option<Uuid>,
        before_state: Option<serde_json::Value>,
        after_state: Option<serde_json::Value>,
        metadata: serde_json::Value,
    ) -> Result<ActivityLogEntry> {
        let entry = sqlx::query_as::<Postgres, ActivityLogEntry>(
            r#"
            INSERT INTO activity_log (
                agency_id, entity_type, entity_id, action,
                actor_user_id, actor_contact_id, before_state, after_state, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, agency_id, entity_type, entity_id, action,
                actor_user_id, actor_contact_id, before_state, after_state,
                metadata, created_at
            "#,
        )
        .bind(agency_id)
        .bind(entity_type)
        .bind(entity_id)
        .bind(action)
        .bind(actor_user_id)
        .bind(actor_contact_id)
        .bind(before_state)
        .bind(after_state)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert activity log entry")?;
        Ok(entry)
    }

    pub async fn list_by_agency(
        &self,
        agency_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLogEntry>> {
        let entries = sqlx::query_as::<Postgres, ActivityLogEntry>(
            r#"
            SELECT id, agency_id, entity_type, entity_id, action,
                actor_user_id, actor_contact_id, before_state, after_state,
                metadata, created_at
            FROM activity_log
            WHERE agency_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(agency_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list activity log entries")?;
        Ok(entries)
    }
}
