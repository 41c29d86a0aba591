//! Deliverable models: the reviewed asset, its append-only version history,
//! and the status taxonomy exposed to callers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Deliverable lifecycle status (matches database enum). The operational
/// sequence observed by callers is pending -> submitted -> internal_review ->
/// pending_project_approval -> client_review -> approved, with rejection
/// short-circuiting to rejected from any review tier and resubmission
/// re-entering at submitted. The allowed-transition table lives in
/// `crate::lifecycle::deliverable`; the stored value is a cache of the last
/// aggregation result (`crate::review`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "deliverable_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    Pending,
    Submitted,
    InternalReview,
    PendingProjectApproval,
    ClientReview,
    Approved,
    Rejected,
}

impl Display for DeliverableStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DeliverableStatus::Pending => write!(f, "pending"),
            DeliverableStatus::Submitted => write!(f, "submitted"),
            DeliverableStatus::InternalReview => write!(f, "internal_review"),
            DeliverableStatus::PendingProjectApproval => write!(f, "pending_project_approval"),
            DeliverableStatus::ClientReview => write!(f, "client_review"),
            DeliverableStatus::Approved => write!(f, "approved"),
            DeliverableStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Deliverable asset type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deliverable_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliverableType {
    Image,
    Video,
    Copy,
    Document,
}

/// Deliverable (database row). `preview_version_id` is the client-facing
/// "currently previewed" pointer; deleting the version it references clears
/// it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deliverable {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub agency_id: Uuid,
    pub title: String,
    pub deliverable_type: DeliverableType,
    pub status: DeliverableStatus,
    pub due_on: Option<NaiveDate>,
    pub preview_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One uploaded version of a deliverable. Append-only; `version_number` is
/// strictly increasing per logical `file_name`. A version referenced by an
/// approval can never be deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DeliverableVersion {
    pub id: Uuid,
    pub deliverable_id: Uuid,
    pub version_number: i32,
    pub file_name: String,
    pub file_key: String,
    pub uploaded_by_membership_id: Uuid,
    pub created_at: DateTime<Utc>,
}
