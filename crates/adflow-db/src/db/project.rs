//! Project repository, including the project-tier approver roster and
//! project users.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{Project, ProjectApprover, ProjectStatus, ProjectUser};

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, client_id: Uuid, agency_id: Uuid, name: &str) -> Result<Project> {
        let project = sqlx::query_as::<Postgres, Project>(
            r#"
            INSERT INTO projects (client_id, agency_id, name, status)
            VALUES ($1, $2, $3, 'active')
            RETURNING id, client_id, agency_id, name, status, created_at, updated_at
            "#,
        )
        .bind(client_id)
        .bind(agency_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create project")?;
        Ok(project)
    }

    pub async fn get(&self, project_id: Uuid) -> Result<Option<Project>> {
        let project = sqlx::query_as::<Postgres, Project>(
            r#"
            SELECT id, client_id, agency_id, name, status, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get project")?;
        Ok(project)
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<Postgres, Project>(
            r#"
            SELECT id, client_id, agency_id, name, status, created_at, updated_at
            FROM projects
            WHERE client_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list projects")?;
        Ok(projects)
    }

    /// Archive a project. Compare-and-set from `active`: archival is terminal
    /// and only ever happens once.
    pub async fn archive(&self, project_id: Uuid) -> Result<Option<Project>> {
        let project = sqlx::query_as::<Postgres, Project>(
            r#"
            UPDATE projects
            SET status = 'archived', updated_at = NOW()
            WHERE id = $1 AND status = 'active'
            RETURNING id, client_id, agency_id, name, status, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to archive project")?;
        Ok(project)
    }

    // ----- Approver roster -----

    pub async fn add_approver(
        &self,
        project_id: Uuid,
        membership_id: Uuid,
    ) -> Result<ProjectApprover> {
        let approver = sqlx::query_as::<Postgres, ProjectApprover>(
            r#"
            INSERT INTO project_approvers (project_id, membership_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, membership_id) DO UPDATE SET membership_id = EXCLUDED.membership_id
            RETURNING id, project_id, membership_id, created_at
            "#,
        )
        .bind(project_id)
        .bind(membership_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to add project approver")?;
        Ok(approver)
    }

    pub async fn remove_approver(&self, project_id: Uuid, membership_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM project_approvers WHERE project_id = $1 AND membership_id = $2",
        )
        .bind(project_id)
        .bind(membership_id)
        .execute(&self.pool)
        .await
        .context("Failed to remove project approver")?;
        Ok(result.rows_affected() > 0)
    }

    /// The project-tier approver roster as membership ids. An empty roster
    /// means the project tier is skipped during review.
    pub async fn list_approver_membership_ids(&self, project_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT membership_id FROM project_approvers WHERE project_id = $1")
                .bind(project_id)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list project approvers")?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    // ----- Project users -----

    pub async fn add_user(&self, project_id: Uuid, membership_id: Uuid) -> Result<ProjectUser> {
        let user = sqlx::query_as::<Postgres, ProjectUser>(
            r#"
            INSERT INTO project_users (project_id, membership_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, membership_id) DO UPDATE SET membership_id = EXCLUDED.membership_id
            RETURNING id, project_id, membership_id, created_at
            "#,
        )
        .bind(project_id)
        .bind(membership_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to add project user")?;
        Ok(user)
    }

    pub async fn remove_user(&self, project_id: Uuid, membership_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM project_users WHERE project_id = $1 AND membership_id = $2")
                .bind(project_id)
                .bind(membership_id)
                .execute(&self.pool)
                .await
                .context("Failed to remove project user")?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether the client still has any projects; guards client hard-deletes.
    pub async fn client_has_projects(&self, client_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM projects WHERE client_id = $1)")
                .bind(client_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check client projects")?;
        Ok(exists)
    }
}
