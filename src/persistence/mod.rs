use crate::domain::memory::{Memory, MemoryChanges, NewMemory};
use async_trait::async_trait;
use uuid::Uuid;

pub mod providers;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record matches the requested id.
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Storage collaborator for memories.
///
/// The store is the sole source of truth: it assigns ids and creation
/// timestamps and provides whatever atomicity a single call needs.
#[async_trait]
pub trait MemoryStore: Send + Sync + std::fmt::Debug {
    /// All memories, oldest `created_at` first.
    async fn find_many(&self) -> Result<Vec<Memory>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Memory>, StoreError>;

    async fn create(&self, memory: NewMemory) -> Result<Memory, StoreError>;

    /// Overwrite the mutable fields. Fails with [`StoreError::NotFound`] for an unknown id.
    async fn update(&self, id: Uuid, changes: MemoryChanges) -> Result<Memory, StoreError>;

    /// Hard delete. Fails with [`StoreError::NotFound`] for an unknown id.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
