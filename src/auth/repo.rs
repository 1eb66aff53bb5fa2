use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use super::credentials::{hash_blocking, verify_blocking, CredentialStore, RegisterError};
use super::permissions::{Permission, PermissionSet};
use super::repo_types::UserRow;

/// Credential store backed by the `users` table.
#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Find a user by username.
    async fn find(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, password_hash, permissions
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user")?;
        Ok(user)
    }
}

fn permissions_from_tags(username: &str, tags: &[String]) -> PermissionSet {
    tags.iter()
        .filter_map(|tag| match tag.parse::<Permission>() {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(user = %username, error = %e, "ignoring stored permission tag");
                None
            }
        })
        .collect()
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn verify(&self, username: &str, secret: &str) -> anyhow::Result<bool> {
        let hash = self.find(username).await?.map(|u| u.password_hash);
        verify_blocking(secret, hash).await
    }

    async fn permissions_of(&self, username: &str) -> anyhow::Result<PermissionSet> {
        Ok(self
            .find(username)
            .await?
            .map(|u| permissions_from_tags(&u.username, &u.permissions))
            .unwrap_or_default())
    }

    async fn register(
        &self,
        username: &str,
        secret: &str,
        permissions: PermissionSet,
    ) -> Result<(), RegisterError> {
        if self.find(username).await?.is_some() {
            return Err(RegisterError::AlreadyExists);
        }
        let password_hash = hash_blocking(secret).await?;

        let inserted = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO users (username, password_hash, permissions)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            RETURNING username
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(permissions.to_tags())
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;

        match inserted {
            Some(_) => Ok(()),
            None => Err(RegisterError::AlreadyExists),
        }
    }
}
