use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Project status. Archival is terminal and irreversible through normal
/// mutation paths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Project of a client. `agency_id` is denormalized from the client so the
/// access gate resolves ownership in one read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project-tier approver: a membership allowed to approve deliverables at the
/// project tier. Zero approvers means the project tier is skipped entirely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectApprover {
    pub id: Uuid,
    pub project_id: Uuid,
    pub membership_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Operator membership with project-wide visibility.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectUser {
    pub id: Uuid,
    pub project_id: Uuid,
    pub membership_id: Uuid,
    pub created_at: DateTime<Utc>,
}
