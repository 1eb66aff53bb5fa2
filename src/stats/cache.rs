use dashmap::DashMap;
use tracing::debug;

use super::aggregate::Aggregate;
use crate::records::RecordStore;

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    aggregate: Option<Aggregate>,
}

/// Per-user memo of [`Aggregate`], dropped on every write for that user.
///
/// Each user has a generation counter bumped by [`StatsCache::invalidate`].
/// A miss remembers the generation it started at and only stores its result
/// if no invalidation happened in between, so a read that raced a write can
/// not leave pre-write totals behind.
#[derive(Debug, Default)]
pub struct StatsCache {
    slots: DashMap<String, Slot>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, username: &str, store: &dyn RecordStore) -> anyhow::Result<Aggregate> {
        if let Some(hit) = self.cached(username) {
            debug!(user = %username, "stats cache hit");
            return Ok(hit);
        }

        let generation = self.generation(username);
        let records = store.query_by_identity(username).await?;
        let aggregate = Aggregate::from_records(&records);
        let stored = self.store_if_current(username, generation, aggregate);
        debug!(user = %username, stored, "stats cache miss");
        Ok(aggregate)
    }

    /// Drops the user's entry. Must complete before a write is acknowledged.
    pub fn invalidate(&self, username: &str) {
        let mut slot = self.slots.entry(username.to_string()).or_default();
        slot.generation += 1;
        slot.aggregate = None;
        debug!(user = %username, generation = slot.generation, "stats cache invalidated");
    }

    fn cached(&self, username: &str) -> Option<Aggregate> {
        self.slots.get(username).and_then(|slot| slot.aggregate)
    }

    fn generation(&self, username: &str) -> u64 {
        self.slots.get(username).map(|slot| slot.generation).unwrap_or(0)
    }

    fn store_if_current(&self, username: &str, generation: u64, aggregate: Aggregate) -> bool {
        let mut slot = self.slots.entry(username.to_string()).or_default();
        if slot.generation != generation {
            return false;
        }
        slot.aggregate = Some(aggregate);
        true
    }
}
