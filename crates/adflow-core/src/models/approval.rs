use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Review tier a decision was recorded at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalTier {
    Campaign,
    Project,
    Client,
}

impl Display for ApprovalTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ApprovalTier::Campaign => write!(f, "campaign"),
            ApprovalTier::Project => write!(f, "project"),
            ApprovalTier::Client => write!(f, "client"),
        }
    }
}

/// Approve or reject.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_decision", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

/// One recorded review decision. Immutable: a decision for tier T and version
/// V never overwrites a prior decision; history is reconstructed by
/// filtering and sorting, and quorum is evaluated per version. Exactly one of
/// `decided_by_membership_id` / `decided_by_contact_id` is set, depending on
/// whether the decider was an agency member or a client-portal contact.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Approval {
    pub id: Uuid,
    pub deliverable_id: Uuid,
    pub version_id: Uuid,
    pub tier: ApprovalTier,
    pub decision: ApprovalDecision,
    pub decided_by_membership_id: Option<Uuid>,
    pub decided_by_contact_id: Option<Uuid>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
