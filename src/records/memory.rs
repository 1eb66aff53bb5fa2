use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{DateRange, FitnessRecord, NewRecord, RecordPatch};
use super::repo::RecordStore;

/// Process-local record store, used for `memory://` runs and tests.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Uuid, FitnessRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F>(&self, username: &str, keep: F) -> Vec<FitnessRecord>
    where
        F: Fn(&FitnessRecord) -> bool,
    {
        let mut out: Vec<FitnessRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.username == username && keep(r))
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.date, r.created_at));
        out
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> anyhow::Result<FitnessRecord> {
        let stored = FitnessRecord {
            id: Uuid::new_v4(),
            username: record.username,
            kind: record.kind,
            date: record.date,
            category: record.category,
            measure: record.measure,
            description: record.description,
            intensity: record.intensity,
            created_at: OffsetDateTime::now_utc(),
        };
        self.records.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: Uuid, owner: &str) -> anyhow::Result<Option<FitnessRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&id)
            .filter(|r| r.username == owner)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        patch: RecordPatch,
    ) -> anyhow::Result<Option<FitnessRecord>> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) if record.username == owner => {
                patch.apply(record);
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner: &str) -> anyhow::Result<bool> {
        let mut records = self.records.write().await;
        if records.get(&id).is_some_and(|r| r.username == owner) {
            records.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn query_by_identity(&self, username: &str) -> anyhow::Result<Vec<FitnessRecord>> {
        Ok(self.select(username, |_| true).await)
    }

    async fn query_by_identity_and_range(
        &self,
        username: &str,
        range: DateRange,
    ) -> anyhow::Result<Vec<FitnessRecord>> {
        Ok(self.select(username, |r| range.contains(r.date)).await)
    }
}
