use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Social platform a creator publishes on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "social_platform", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Tiktok,
    Youtube,
}

impl Display for SocialPlatform {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SocialPlatform::Instagram => write!(f, "instagram"),
            SocialPlatform::Tiktok => write!(f, "tiktok"),
            SocialPlatform::Youtube => write!(f, "youtube"),
        }
    }
}

/// Creator in an agency's roster.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Creator {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub display_name: String,
    pub handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment of a creator to a campaign. Payments and pre-campaign
/// analytics snapshots hang off this row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampaignCreator {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub creator_id: Uuid,
    pub agency_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Pre-campaign analytics snapshot. Created by the metered fetch with
/// `tokens_consumed = 1` and an empty payload; the external worker appends
/// the provider payload out-of-band (`fetched_at` marks completion). The
/// payload is opaque to the core. The row doubles as its own dispatch
/// outbox entry, mirroring social-data jobs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalyticsSnapshot {
    pub id: Uuid,
    pub campaign_creator_id: Uuid,
    pub agency_id: Uuid,
    pub platform: SocialPlatform,
    pub payload: Option<serde_json::Value>,
    pub tokens_consumed: i32,
    pub dispatch_attempts: i32,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
