use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Agency member role. Closed enum: authorization goes through the explicit
/// permission matrix in `crate::permissions`, never through string checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    AccountManager,
    Operator,
    InternalApprover,
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MemberRole::Admin => write!(f, "admin"),
            MemberRole::AccountManager => write!(f, "account_manager"),
            MemberRole::Operator => write!(f, "operator"),
            MemberRole::InternalApprover => write!(f, "internal_approver"),
        }
    }
}

/// Membership of a user in an agency. The unit the access gate checks:
/// a caller acts through exactly one active membership per request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AgencyMembership {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
