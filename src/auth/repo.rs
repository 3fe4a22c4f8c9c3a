use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::Credential;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact lookup by handle.
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Credential>>;

    /// Insert a new credential. Returns `None` when the id is already taken.
    async fn insert(&self, id: &str, password_hash: &str) -> anyhow::Result<Option<Credential>>;
}

#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, password_hash, created_at
            FROM login
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find credential by id")?;
        Ok(credential)
    }

    async fn insert(&self, id: &str, password_hash: &str) -> anyhow::Result<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO login (id, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await
        .context("insert credential")?;
        Ok(credential)
    }
}
