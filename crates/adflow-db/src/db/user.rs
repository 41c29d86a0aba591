use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, email: &str, display_name: &str) -> Result<User> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (email, display_name)
            VALUES ($1, $2)
            RETURNING id, email, display_name, created_at
            "#,
        )
        .bind(email)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create user")?;
        Ok(user)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT id, email, display_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user")?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            SELECT id, email, display_name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by email")?;
        Ok(user)
    }
}
