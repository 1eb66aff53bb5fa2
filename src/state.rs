use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auth::{credentials::CredentialStore, memory::InMemoryCredentialStore, repo::PgCredentialStore};
use crate::config::AppConfig;
use crate::records::{InMemoryRecordStore, PgRecordStore, RecordStore};
use crate::stats::StatsCache;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<dyn CredentialStore>,
    pub records: Arc<dyn RecordStore>,
    pub stats: Arc<StatsCache>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        if config.jwt.insecure {
            warn!("tokens are signed with the built-in development secret; set JWT_SECRET");
        }
        if config.uses_memory_storage() {
            warn!("using in-memory storage; data is lost on restart");
            return Ok(Self::in_memory(config));
        }

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        } else {
            info!("migrations applied");
        }

        Ok(Self::from_parts(
            config,
            Arc::new(PgCredentialStore::new(db.clone())),
            Arc::new(PgRecordStore::new(db)),
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credentials,
            records,
            stats: Arc::new(StatsCache::new()),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemoryRecordStore::new()),
        )
    }

    /// In-memory state with the test configuration.
    pub fn fake() -> Self {
        Self::in_memory(AppConfig::for_tests())
    }
}
