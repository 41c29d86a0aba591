use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only audit record. Written exactly once per agency-scoped mutation,
/// after the domain write succeeds, and never updated or read back by the
/// workflow core itself. `before_state`/`after_state` are complete row
/// snapshots serialized to JSON, not diffs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub actor_user_id: Option<Uuid>,
    pub actor_contact_id: Option<Uuid>,
    pub before_state: Option<serde_json::Value>,
    pub after_state: Option<serde_json::Value>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
