//! Campaign models and the campaign member roster.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Campaign lifecycle status (matches database enum). The allowed-transition
/// table lives in `crate::lifecycle::campaign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize, ToSchema)]
#[sqlx(type_name = "campaign_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    InReview,
    Approved,
    Completed,
    Archived,
}

impl Display for CampaignStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CampaignStatus::Draft => write!(f, "draft"),
            CampaignStatus::Active => write!(f, "active"),
            CampaignStatus::InReview => write!(f, "in_review"),
            CampaignStatus::Approved => write!(f, "approved"),
            CampaignStatus::Completed => write!(f, "completed"),
            CampaignStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Campaign type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "campaign_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    Social,
    Display,
    Video,
    Influencer,
    Mixed,
}

/// Role of a membership inside one campaign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "campaign_member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignRole {
    Operator,
    Approver,
    Viewer,
}

/// Campaign (database row). `attachments` is an opaque JSON array of storage
/// keys; upload and signed-URL generation live outside this system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub project_id: Uuid,
    pub agency_id: Uuid,
    pub name: String,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub brief: Option<String>,
    pub attachments: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership assigned to a campaign with a campaign-level role.
/// A campaign always has at least one `Approver` member; this invariant is
/// enforced at creation time before any row is written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CampaignMember {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub membership_id: Uuid,
    pub role: CampaignRole,
    pub created_at: DateTime<Utc>,
}
