use async_trait::async_trait;

use super::permissions::PermissionSet;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("identity already exists")]
    AlreadyExists,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<RegisterError> for AppError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::AlreadyExists => AppError::AlreadyExists("User".into()),
            RegisterError::Store(e) => AppError::Internal(e),
        }
    }
}

/// Username to password verifier and permission set.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Checks `secret` against the stored verifier. Unknown users cost the
    /// same as a wrong password and yield `false`.
    async fn verify(&self, username: &str, secret: &str) -> anyhow::Result<bool>;

    /// Granted permissions; the empty set for unknown users.
    async fn permissions_of(&self, username: &str) -> anyhow::Result<PermissionSet>;

    /// Stores a fresh verifier and permission set, failing if the username
    /// is taken.
    async fn register(
        &self,
        username: &str,
        secret: &str,
        permissions: PermissionSet,
    ) -> Result<(), RegisterError>;
}

/// Argon2 is CPU bound; keep it off the async workers.
pub(crate) async fn hash_blocking(secret: &str) -> anyhow::Result<String> {
    let secret = secret.to_owned();
    tokio::task::spawn_blocking(move || super::password::hash_password(&secret)).await?
}

pub(crate) async fn verify_blocking(secret: &str, hash: Option<String>) -> anyhow::Result<bool> {
    let secret = secret.to_owned();
    tokio::task::spawn_blocking(move || super::password::verify_or_burn(&secret, hash.as_deref()))
        .await?
}
