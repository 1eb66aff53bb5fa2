use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::credentials::{hash_blocking, verify_blocking, CredentialStore, RegisterError};
use super::permissions::PermissionSet;

struct Identity {
    password_hash: String,
    permissions: PermissionSet,
}

/// Process-local credential store.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, Identity>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn verify(&self, username: &str, secret: &str) -> anyhow::Result<bool> {
        let hash = self
            .users
            .read()
            .await
            .get(username)
            .map(|u| u.password_hash.clone());
        verify_blocking(secret, hash).await
    }

    async fn permissions_of(&self, username: &str) -> anyhow::Result<PermissionSet> {
        Ok(self
            .users
            .read()
            .await
            .get(username)
            .map(|u| u.permissions.clone())
            .unwrap_or_default())
    }

    async fn register(
        &self,
        username: &str,
        secret: &str,
        permissions: PermissionSet,
    ) -> Result<(), RegisterError> {
        if self.users.read().await.contains_key(username) {
            return Err(RegisterError::AlreadyExists);
        }
        let password_hash = hash_blocking(secret).await?;

        // Re-check under the write lock: another registration may have won
        // while we were hashing.
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(RegisterError::AlreadyExists);
        }
        users.insert(
            username.to_string(),
            Identity {
                password_hash,
                permissions,
            },
        );
        Ok(())
    }
}
