//! Payment repository.
//!
//! The transition to `paid` is one-way: it is a compare-and-set from the
//! non-terminal states, and no statement in this interface can modify a row
//! once it is `paid`.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::Payment;

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        campaign_creator_id: Uuid,
        agency_id: Uuid,
        amount_cents: i64,
        currency: &str,
    ) -> Result<Payment> {
        let payment = sqlx::query_as::<Postgres, Payment>(
            r#"
            INSERT INTO payments (campaign_creator_id, agency_id, amount_cents, currency, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, campaign_creator_id, agency_id, amount_cents, currency,
                status, paid_at, created_at, updated_at
            "#,
        )
        .bind(campaign_creator_id)
        .bind(agency_id)
        .bind(amount_cents)
        .bind(currency)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create payment")?;
        Ok(payment)
    }

    pub async fn get(&self, payment_id: Uuid) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<Postgres, Payment>(
            r#"
            SELECT id, campaign_creator_id, agency_id, amount_cents, currency,
                status, paid_at, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get payment")?;
        Ok(payment)
    }

    pub async fn mark_processing(&self, payment_id: Uuid) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<Postgres, Payment>(
            r#"
            UPDATE payments
            SET status = 'processing', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, campaign_creator_id, agency_id, amount_cents, currency,
                status, paid_at, created_at, updated_at
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to mark payment processing")?;
        Ok(payment)
    }

    /// One-way transition to `paid`.
    pub async fn mark_paid(&self, payment_id: Uuid) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<Postgres, Payment>(
            r#"
            UPDATE payments
            SET status = 'paid', paid_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING id, campaign_creator_id, agency_id, amount_cents, currency,
                status, paid_at, created_at, updated_at
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to mark payment paid")?;
        Ok(payment)
    }

    pub async fn mark_failed(&self, payment_id: Uuid) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<Postgres, Payment>(
            r#"
            UPDATE payments
            SET status = 'failed', updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING id, campaign_creator_id, agency_id, amount_cents, currency,
                status, paid_at, created_at, updated_at
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to mark payment failed")?;
        Ok(payment)
    }
}
