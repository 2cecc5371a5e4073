use crate::domain::memory::{Memory, MemoryChanges, NewMemory};
use crate::persistence::{MemoryStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    records: RwLock<Vec<Memory>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records, e.g. fixtures with hand-picked timestamps.
    pub fn with_records(records: Vec<Memory>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl MemoryStore for InMemoryProvider {
    async fn find_many(&self) -> Result<Vec<Memory>, StoreError> {
        let mut memories = self.records.read().await.clone();
        // Same tie-break as the Postgres provider.
        memories.sort_by_key(|memory| (memory.created_at, memory.id));
        Ok(memories)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Memory>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|memory| memory.id == id).cloned())
    }

    async fn create(&self, memory: NewMemory) -> Result<Memory, StoreError> {
        let mut records = self.records.write().await;

        let mut id = Uuid::new_v4();
        while records.iter().any(|existing| existing.id == id) {
            id = Uuid::new_v4();
        }

        // created_at never goes backwards, even if the wall clock does.
        let now = Utc::now();
        let created_at = records
            .iter()
            .map(|existing| existing.created_at)
            .max()
            .map_or(now, |latest| latest.max(now));

        let created = Memory {
            id,
            content: memory.content,
            cover_url: memory.cover_url,
            is_public: memory.is_public,
            user_id: memory.user_id,
            created_at,
        };
        records.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: MemoryChanges) -> Result<Memory, StoreError> {
        let mut records = self.records.write().await;
        let memory = records
            .iter_mut()
            .find(|memory| memory.id == id)
            .ok_or(StoreError::NotFound)?;

        memory.content = changes.content;
        memory.cover_url = changes.cover_url;
        memory.is_public = changes.is_public;
        Ok(memory.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|memory| memory.id == id)
            .ok_or(StoreError::NotFound)?;
        records.remove(index);
        Ok(())
    }
}
