use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Agency status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "agency_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AgencyStatus {
    Active,
    Suspended,
}

/// Agency: the tenant root. Owns clients, creators, and memberships.
/// `token_balance` is the prepaid credit ledger; it is only ever changed by
/// the ledger debit/refund operations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    pub status: AgencyStatus,
    pub token_balance: i64,
    pub locale: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agency_status_serde_shape() {
        let json = serde_json::to_string(&AgencyStatus::Suspended).expect("serialize");
        assert_eq!(json, "\"suspended\"");
    }
}
