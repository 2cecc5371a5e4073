use crate::domain::memory::{Memory, MemoryChanges, NewMemory};
use crate::persistence::{MemoryStore, StoreError};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const MEMORY_COLUMNS: &str = "id, content, cover_url, is_public, user_id, created_at";

const UPSERT_USER: &str = r#"
    INSERT INTO users (id, name, created_at)
    VALUES ($1, $2, NOW())
    ON CONFLICT (id) DO NOTHING
"#;

/// Name recorded for owners first seen through a write.
const OWNER_NAME: &str = "Memory owner";

#[derive(Debug)]
pub struct PostgresProvider {
    pool: PgPool,
}

impl PostgresProvider {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await?;

        // Run Migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Make sure `id` exists in `users` so memories owned by it satisfy the foreign key.
    pub async fn ensure_user(&self, id: Uuid, name: &str) -> Result<(), StoreError> {
        sqlx::query(UPSERT_USER)
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for PostgresProvider {
    async fn find_many(&self) -> Result<Vec<Memory>, StoreError> {
        let memories = sqlx::query_as::<_, Memory>(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(memories)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Memory>, StoreError> {
        let memory = sqlx::query_as::<_, Memory>(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(memory)
    }

    async fn create(&self, memory: NewMemory) -> Result<Memory, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Owners come from token subjects too, not just the configured default user.
        sqlx::query(UPSERT_USER)
            .bind(memory.user_id)
            .bind(OWNER_NAME)
            .execute(&mut *tx)
            .await?;

        let created = sqlx::query_as::<_, Memory>(&format!(
            r#"
            INSERT INTO memories (user_id, content, cover_url, is_public)
            VALUES ($1, $2, $3, $4)
            RETURNING {MEMORY_COLUMNS}
            "#
        ))
        .bind(memory.user_id)
        .bind(&memory.content)
        .bind(&memory.cover_url)
        .bind(memory.is_public)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: MemoryChanges) -> Result<Memory, StoreError> {
        sqlx::query_as::<_, Memory>(&format!(
            r#"
            UPDATE memories
            SET content = $2, cover_url = $3, is_public = $4
            WHERE id = $1
            RETURNING {MEMORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.content)
        .bind(&changes.cover_url)
        .bind(changes.is_public)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM memories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
