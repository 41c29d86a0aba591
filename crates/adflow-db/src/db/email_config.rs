use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::AgencyEmailConfig;

#[derive(Clone)]
pub struct EmailConfigRepository {
    pool: PgPool,
}

impl EmailConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_agency(&self, agency_id: Uuid) -> Result<Option<AgencyEmailConfig>> {
        let config = sqlx::query_as::<Postgres, AgencyEmailConfig>(
            r#"
            SELECT id, agency_id, from_name, from_email, reply_to,
                smtp_host, smtp_port, smtp_username, smtp_password,
                created_at, updated_at
            FROM agency_email_configs
            WHERE agency_id = $1
            "#,
        )
        .bind(agency_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get agency email config")?;
        Ok(config)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        &self,
        agency_id: Uuid,
        from_name: &str,
        from_email: &str,
        reply_to: Option<&str>,
        smtp_host: &str,
        smtp_port: i32,
        smtp_username: &str,
        smtp_password: &str,
    ) -> Result<AgencyEmailConfig> {
        let config = sqlx::query_as::<Postgres, AgencyEmailConfig>(
            r#"
            INSERT INTO agency_email_configs (
                agency_id, from_name, from_email, reply_to,
                smtp_host, smtp_port, smtp_username, smtp_password
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (agency_id) DO UPDATE SET
                from_name = EXCLUDED.from_name,
                from_email = EXCLUDED.from_email,
                reply_to = EXCLUDED.reply_to,
                smtp_host = EXCLUDED.smtp_host,
                smtp_port = EXCLUDED.smtp_port,
                smtp_username = EXCLUDED.smtp_username,
                smtp_password = EXCLUDED.smtp_password,
                updated_at = NOW()
            RETURNING id, agency_id, from_name, from_email, reply_to,
                smtp_host, smtp_port, smtp_username, smtp_password,
                created_at, updated_at
            "#,
        )
        .bind(agency_id)
        .bind(from_name)
        .bind(from_email)
        .bind(reply_to)
        .bind(smtp_host)
        .bind(smtp_port)
        .bind(smtp_username)
        .bind(smtp_password)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert agency email config")?;
        Ok(config)
    }
}
