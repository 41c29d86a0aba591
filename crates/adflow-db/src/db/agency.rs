//! Agency repository, including the credit ledger.
//!
//! The token balance is only ever changed here, by `debit_tokens` and
//! `refund_tokens`. The debit is a single conditional decrement so two
//! concurrent spends cannot both succeed from the same prior balance, and
//! the balance can never go negative.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{Agency, AgencyStatus};

#[derive(Clone)]
pub struct AgencyRepository {
    pool: PgPool,
}

impl AgencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an agency with its signup credit grant.
    pub async fn create(
        &self,
        name: &str,
        locale: &str,
        timezone: &str,
        token_grant: i64,
    ) -> Result<Agency> {
        let agency = sqlx::query_as::<Postgres, Agency>(
            r#"
            INSERT INTO agencies (name, status, token_balance, locale, timezone)
            VALUES ($1, 'active', $2, $3, $4)
            RETURNING id, name, status, token_balance, locale, timezone,
                created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(token_grant)
        .bind(locale)
        .bind(timezone)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create agency")?;

        tracing::info!(agency_id = %agency.id, name = %agency.name, "Created agency");
        Ok(agency)
    }

    pub async fn get(&self, agency_id: Uuid) -> Result<Option<Agency>> {
        let agency = sqlx::query_as::<Postgres, Agency>(
            r#"
            SELECT id, name, status, token_balance, locale, timezone,
                created_at, updated_at
            FROM agencies
            WHERE id = $1
            "#,
        )
        .bind(agency_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get agency")?;
        Ok(agency)
    }

    pub async fn set_status(
        &self,
        agency_id: Uuid,
        status: AgencyStatus,
    ) -> Result<Option<Agency>> {
        let agency = sqlx::query_as::<Postgres, Agency>(
            r#"
            UPDATE agencies
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, status, token_balance, locale, timezone,
                created_at, updated_at
            "#,
        )
        .bind(agency_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update agency status")?;
        Ok(agency)
    }

    pub async fn get_balance(&self, agency_id: Uuid) -> Result<Option<i64>> {
        let balance: Option<(i64,)> =
            sqlx::query_as("SELECT token_balance FROM agencies WHERE id = $1")
                .bind(agency_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to read token balance")?;
        Ok(balance.map(|(b,)| b))
    }

    /// Atomically debit `amount` credits. Returns the new balance, or `None`
    /// when the balance is below `amount` (or the agency does not exist),
    /// in which case nothing was written.
    pub async fn debit_tokens(&self, agency_id: Uuid, amount: i64) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE agencies
            SET token_balance = token_balance - $2, updated_at = NOW()
            WHERE id = $1 AND token_balance >= $2
            RETURNING token_balance
            "#,
        )
        .bind(agency_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to debit tokens")?;

        if let Some((balance,)) = row {
            tracing::info!(agency_id = %agency_id, amount, balance, "Debited agency credits");
        }
        Ok(row.map(|(b,)| b))
    }

    /// Compensating restore of a prior debit. Unconditional increment: the
    /// refunded amount exactly matches a debit that already happened.
    pub async fn refund_tokens(&self, agency_id: Uuid, amount: i64) -> Result<i64> {
        let (balance,): (i64,) = sqlx::query_as(
            r#"
            UPDATE agencies
            SET token_balance = token_balance + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING token_balance
            "#,
        )
        .bind(agency_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .context("Failed to refund tokens")?;

        tracing::warn!(agency_id = %agency_id, amount, balance, "Refunded agency credits");
        Ok(balance)
    }
}
