//! # Database Pool Management
//!
//! Connection pool creation and configuration for the session database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Database                                   │
//! │                                                                         │
//! │  Client startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────┐                                       │
//! │  │        SqlitePool           │                                       │
//! │  │  ┌─────┐ ┌─────┐            │  (max_connections, small: one user,   │
//! │  │  │Conn1│ │Conn2│            │   two keys)                           │
//! │  │  └─────┘ └─────┘            │                                       │
//! │  └──────────────┬──────────────┘                                       │
//! │                 ▼                                                       │
//! │  db.session_store() ──► SqliteStorage (auth_token, user_data)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL journaling is enabled so the transport can read the token while the
//! auth source is writing a fresh one.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DataError, DataResult};
use crate::migrations;
use crate::storage::SqliteStorage;

// =============================================================================
// Configuration
// =============================================================================

/// Where the session database lives and how the pool is sized.
///
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/session.db").without_migrations();
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Two is enough for one signed-in user: the transport reads the
    /// token while the auth source may be replacing it.
    pub max_connections: u32,

    /// How long a write waits on another process holding the file lock
    /// (two `crm` invocations sharing one session file).
    pub busy_timeout: Duration,

    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the file at `path`, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 2,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Skips migrations on connect; the caller runs them itself.
    pub fn without_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }

    /// Private in-memory database for tests. One connection, since each
    /// `:memory:` connection would otherwise get its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the session database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool, creating the file if needed, and runs migrations
    /// when enabled.
    pub async fn new(config: DbConfig) -> DataResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing session database"
        );

        // sqlite://path?mode=rwc creates the file if it does not exist
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DataError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.busy_timeout * 2)
            .connect_with(connect_options)
            .await
            .map_err(|e| DataError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Called by `new()` unless disabled.
    pub async fn run_migrations(&self) -> DataResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the key/value session store backed by this database.
    pub fn session_store(&self) -> SqliteStorage {
        SqliteStorage::new(self.pool.clone())
    }

    /// Closes the connection pool. Storage calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
