use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{DateRange, FitnessRecord, NewRecord, RecordPatch};
use super::repo_types::FitnessRecordRow;

/// Persistence for workout and diet entries.
///
/// `update` and `delete` match on both id and owner, so a user can never
/// touch another user's entry; a miss on either returns `None` / `false`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: NewRecord) -> anyhow::Result<FitnessRecord>;

    async fn find(&self, id: Uuid, owner: &str) -> anyhow::Result<Option<FitnessRecord>>;

    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        patch: RecordPatch,
    ) -> anyhow::Result<Option<FitnessRecord>>;

    async fn delete(&self, id: Uuid, owner: &str) -> anyhow::Result<bool>;

    async fn query_by_identity(&self, username: &str) -> anyhow::Result<Vec<FitnessRecord>>;

    async fn query_by_identity_and_range(
        &self,
        username: &str,
        range: DateRange,
    ) -> anyhow::Result<Vec<FitnessRecord>>;
}

const RECORD_COLUMNS: &str =
    "id, username, kind, record_date, category, measure, description, intensity, created_at";

/// Record store backed by the `fitness_records` table.
#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_records(rows: Vec<FitnessRecordRow>) -> anyhow::Result<Vec<FitnessRecord>> {
    rows.into_iter().map(FitnessRecord::try_from).collect()
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: NewRecord) -> anyhow::Result<FitnessRecord> {
        let row = sqlx::query_as::<_, FitnessRecordRow>(&format!(
            r#"
            INSERT INTO fitness_records
                (id, username, kind, record_date, category, measure, description, intensity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&record.username)
        .bind(record.kind.as_str())
        .bind(record.date)
        .bind(&record.category)
        .bind(record.measure)
        .bind(&record.description)
        .bind(&record.intensity)
        .fetch_one(&self.db)
        .await
        .context("insert fitness record")?;
        row.try_into()
    }

    async fn find(&self, id: Uuid, owner: &str) -> anyhow::Result<Option<FitnessRecord>> {
        let row = sqlx::query_as::<_, FitnessRecordRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM fitness_records WHERE id = $1 AND username = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("find fitness record")?;
        row.map(FitnessRecord::try_from).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        patch: RecordPatch,
    ) -> anyhow::Result<Option<FitnessRecord>> {
        let row = sqlx::query_as::<_, FitnessRecordRow>(&format!(
            r#"
            UPDATE fitness_records
               SET record_date = COALESCE($3, record_date),
                   category    = COALESCE($4, category),
                   measure     = COALESCE($5, measure),
                   description = COALESCE($6, description),
                   intensity   = COALESCE($7, intensity)
             WHERE id = $1 AND username = $2
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(patch.date)
        .bind(&patch.category)
        .bind(patch.measure)
        .bind(&patch.description)
        .bind(&patch.intensity)
        .fetch_optional(&self.db)
        .await
        .context("update fitness record")?;
        row.map(FitnessRecord::try_from).transpose()
    }

    async fn delete(&self, id: Uuid, owner: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM fitness_records WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete fitness record")?;
        Ok(result.rows_affected() > 0)
    }

    async fn query_by_identity(&self, username: &str) -> anyhow::Result<Vec<FitnessRecord>> {
        let rows = sqlx::query_as::<_, FitnessRecordRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
              FROM fitness_records
             WHERE username = $1
             ORDER BY record_date ASC, created_at ASC
            "#
        ))
        .bind(username)
        .fetch_all(&self.db)
        .await
        .context("list fitness records")?;
        into_records(rows)
    }

    async fn query_by_identity_and_range(
        &self,
        username: &str,
        range: DateRange,
    ) -> anyhow::Result<Vec<FitnessRecord>> {
        let rows = sqlx::query_as::<_, FitnessRecordRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
              FROM fitness_records
             WHERE username = $1
               AND record_date BETWEEN $2 AND $3
             ORDER BY record_date ASC, created_at ASC
            "#
        ))
        .bind(username)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await
        .context("list fitness records in range")?;
        into_records(rows)
    }
}
