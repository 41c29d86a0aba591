//! Social-data fetch jobs: the credit-metered background work and its outbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

use super::SocialPlatform;

/// Job status. `pending` rows double as the dispatch outbox; `done` and
/// `failed` are terminal and written by the external worker out-of-band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "social_job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SocialJobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl Display for SocialJobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SocialJobStatus::Pending => write!(f, "pending"),
            SocialJobStatus::Running => write!(f, "running"),
            SocialJobStatus::Done => write!(f, "done"),
            SocialJobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Kind of data the external worker fetches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "social_job_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SocialJobType {
    ProfileSnapshot,
    RecentPosts,
    AudienceStats,
}

/// Credit-metered social-data fetch job. Created only after a successful
/// ledger debit, tagged with the tokens it consumed. Once dispatched, the
/// external worker owns the lifecycle; there is no cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialDataJob {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub creator_id: Uuid,
    pub platform: SocialPlatform,
    pub job_type: SocialJobType,
    pub status: SocialJobStatus,
    pub tokens_consumed: i32,
    pub dispatch_attempts: i32,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
