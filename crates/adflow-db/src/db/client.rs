//! Client and client-contact repositories.

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use adflow_core::models::{Client, ClientContact};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        agency_id: Uuid,
        name: &str,
        account_manager_id: Uuid,
    ) -> Result<Client> {
        let client = sqlx::query_as::<Postgres, Client>(
            r#"
            INSERT INTO clients (agency_id, name, account_manager_id, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id, agency_id, name, account_manager_id, is_active,
                created_at, updated_at
            "#,
        )
        .bind(agency_id)
        .bind(name)
        .bind(account_manager_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create client")?;
        Ok(client)
    }

    pub async fn get(&self, client_id: Uuid) -> Result<Option<Client>> {
        let client = sqlx::query_as::<Postgres, Client>(
            r#"
            SELECT id, agency_id, name, account_manager_id, is_active,
                created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get client")?;
        Ok(client)
    }

    pub async fn list_by_agency(&self, agency_id: Uuid) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<Postgres, Client>(
            r#"
            SELECT id, agency_id, name, account_manager_id, is_active,
                created_at, updated_at
            FROM clients
            WHERE agency_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list clients")?;
        Ok(clients)
    }

    /// Soft-deactivate. Clients are never hard-deleted while projects exist.
    pub async fn deactivate(&self, client_id: Uuid) -> Result<Option<Client>> {
        let client = sqlx::query_as::<Postgres, Client>(
            r#"
            UPDATE clients
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING id, agency_id, name, account_manager_id, is_active,
                created_at, updated_at
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to deactivate client")?;
        Ok(client)
    }

    // ----- Contacts -----

    pub async fn create_contact(
        &self,
        client_id: Uuid,
        agency_id: Uuid,
        name: &str,
        email: &str,
        is_approver: bool,
        portal_key_hash: Option<&str>,
        portal_key_prefix: Option<&str>,
    ) -> Result<ClientContact> {
        let contact = sqlx::query_as::<Postgres, ClientContact>(
            r#"
            INSERT INTO client_contacts (
                client_id, agency_id, name, email, is_approver,
                portal_key_hash, portal_key_prefix
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, client_id, agency_id, name, email, is_approver,
                portal_key_hash, portal_key_prefix, created_at, updated_at
            "#,
        )
        .bind(client_id)
        .bind(agency_id)
        .bind(name)
        .bind(email)
        .bind(is_approver)
        .bind(portal_key_hash)
        .bind(portal_key_prefix)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create client contact")?;
        Ok(contact)
    }

    pub async fn get_contact(&self, contact_id: Uuid) -> Result<Option<ClientContact>> {
        let contact = sqlx::query_as::<Postgres, ClientContact>(
            r#"
            SELECT id, client_id, agency_id, name, email, is_approver,
                portal_key_hash, portal_key_prefix, created_at, updated_at
            FROM client_contacts
            WHERE id = $1
            "#,
        )
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get client contact")?;
        Ok(contact)
    }

    /// Candidate contacts for portal-key verification, looked up by prefix.
    pub async fn get_contacts_by_key_prefix(&self, prefix: &str) -> Result<Vec<ClientContact>> {
        let contacts = sqlx::query_as::<Postgres, ClientContact>(
            r#"
            SELECT id, client_id, agency_id, name, email, is_approver,
                portal_key_hash, portal_key_prefix, created_at, updated_at
            FROM client_contacts
            WHERE portal_key_prefix = $1
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .context("Failed to look up contacts by key prefix")?;
        Ok(contacts)
    }

    /// The client-tier approver roster: contact ids flagged as approvers.
    pub async fn list_approver_contact_ids(&self, client_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM client_contacts
            WHERE client_id = $1 AND is_approver
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list approver contacts")?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
