//! # Session State
//!
//! Opens the persisted session the auth source writes to.
//!
//! ## Storage Choice
//! ```text
//! config.session_db_path()
//!     │
//!     ├── Some(path) ──► SQLite file (created with its directory)
//!     │                  sign-in survives between invocations
//!     │
//!     └── None ────────► in-memory storage, gone when the process exits
//! ```

use std::sync::Arc;
use tracing::info;

use crm_data::{Database, DbConfig, Session};
use crm_transport::ClientConfig;

use crate::error::{CliError, CliResult, ErrorCode};

#[derive(Debug)]
pub struct SessionState {
    session: Session,
    database: Option<Database>,
}

impl SessionState {
    pub async fn open(config: &ClientConfig) -> CliResult<Self> {
        let Some(path) = config.session_db_path() else {
            info!("Using in-memory session storage");
            return Ok(SessionState {
                session: Session::in_memory(),
                database: None,
            });
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!(?path, "Could not create session directory: {}", e);
                CliError::new(ErrorCode::StorageError, "Could not create the session directory")
            })?;
        }

        info!(?path, "Opening session database");
        let database = Database::new(DbConfig::new(path)).await?;
        let session = Session::new(Arc::new(database.session_store()));

        Ok(SessionState {
            session,
            database: Some(database),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True when the session survives the process.
    pub fn is_persistent(&self) -> bool {
        self.database.is_some()
    }

    pub async fn close(&self) {
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}
