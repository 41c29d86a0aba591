//! Audit writer.
//!
//! Every agency-scoped mutation records exactly one activity-log entry as
//! its final step, after the domain write succeeded. Entries carry complete
//! before/after row snapshots (serialized wholesale, not diffed) plus
//! free-form metadata. The write is best-effort: the domain mutation has
//! already committed, so a failing audit insert is logged and never unwinds
//! the request.

use serde::Serialize;
use uuid::Uuid;

use adflow_db::ActivityLogRepository;

use crate::auth::models::Caller;

/// Serialize a full row snapshot for the log. Swallows serialization
/// failures into `None`; models in this crate all serialize cleanly.
pub fn snapshot<T: Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

#[derive(Clone)]
pub struct AuditLogger {
    repository: ActivityLogRepository,
}

impl AuditLogger {
    pub fn new(repository: ActivityLogRepository) -> Self {
        Self { repository }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        agency_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
        action: &str,
        caller: &Caller,
        before_state: Option<serde_json::Value>,
        after_state: Option<serde_json::Value>,
        metadata: serde_json::Value,
    ) {
        let (actor_user_id, actor_contact_id) = caller.actor_ids();
        if let Err(e) = self
            .repository
            .insert(
                agency_id,
                entity_type,
                entity_id,
                action,
                actor_user_id,
                actor_contact_id,
                before_state,
                after_state,
                metadata,
            )
            .await
        {
            tracing::error!(
                error = %e,
                agency_id = %agency_id,
                entity_type = entity_type,
                entity_id = %entity_id,
                action = action,
                "Failed to write activity log entry"
            );
        }
    }
}
