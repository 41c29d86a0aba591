use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Client account of an agency. Soft-deactivated, never hard-deleted while
/// projects exist.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub name: String,
    /// Membership id of the owning account manager.
    pub account_manager_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// External contact on the client side. Contacts flagged `is_approver` form
/// the client-tier approver roster; they are a distinct identity space from
/// agency memberships. `portal_key_hash`/`portal_key_prefix` back the portal
/// bearer key; the raw key is shown once at creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientContact {
    pub id: Uuid,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub name: String,
    pub email: String,
    pub is_approver: bool,
    #[serde(skip_serializing)]
    pub portal_key_hash: Option<String>,
    pub portal_key_prefix: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
