//! # Session Storage
//!
//! A tiny persisted key/value store. The client writes two keys, the bearer
//! token ([`AUTH_TOKEN_KEY`]) and the JSON user ([`USER_DATA_KEY`]).
//!
//! ```text
//! SessionStorage (trait)
//!     ├── MemoryStorage   HashMap behind an RwLock. Tests, throwaway runs.
//!     └── SqliteStorage   session_store table. Survives restarts.
//! ```
//!
//! [`AUTH_TOKEN_KEY`]: crm_core::AUTH_TOKEN_KEY
//! [`USER_DATA_KEY`]: crm_core::USER_DATA_KEY

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::DataResult;

/// Async key/value storage for the persisted session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> DataResult<Option<String>>;

    /// Inserts or overwrites `key`.
    async fn set(&self, key: &str, value: &str) -> DataResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> DataResult<()>;
}

// =============================================================================
// In-Memory
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> DataResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DataResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DataResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// SQLite
// =============================================================================

/// Session storage in the `session_store` table.
///
/// Obtain one from [`Database::session_store`](crate::Database::session_store).
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStorage { pool }
    }
}

#[async_trait]
impl SessionStorage for SqliteStorage {
    async fn get(&self, key: &str) -> DataResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM session_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DataResult<()> {
        debug!(key = %key, "Persisting session value");

        sqlx::query(
            r#"
            INSERT INTO session_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> DataResult<()> {
        debug!(key = %key, "Removing session value");

        sqlx::query("DELETE FROM session_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn exercise(storage: &dyn SessionStorage) {
        assert_eq!(storage.get("auth_token").await.unwrap(), None);

        storage.set("auth_token", "first").await.unwrap();
        storage.set("auth_token", "second").await.unwrap();
        assert_eq!(
            storage.get("auth_token").await.unwrap().as_deref(),
            Some("second")
        );

        storage.remove("auth_token").await.unwrap();
        storage.remove("auth_token").await.unwrap();
        assert_eq!(storage.get("auth_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage() {
        exercise(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        exercise(&db.session_store()).await;
    }

    #[tokio::test]
    async fn test_sqlite_storage_fails_after_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let storage = db.session_store();
        db.close().await;
        assert!(storage.get("auth_token").await.is_err());
    }
}
