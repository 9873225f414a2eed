//! Async SQLite executor using a dedicated background thread.
//!
//! Every statement is shipped to the single connection thread owned by
//! `tokio_rusqlite`, so callers await results without blocking a runtime
//! worker. Statements run in FIFO order.
//!
//! Only SQL and row mapping belong inside [`AsyncDatabase::call`]; network
//! calls and other slow work stall every other query queued behind them.

use crate::{migrations, UserStoreError, UserStoreResult};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> UserStoreError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => UserStoreError::Sqlite(e),
        tokio_rusqlite::Error::Close(_) => {
            UserStoreError::Connection("Connection closed".to_string())
        }
        other => UserStoreError::Connection(other.to_string()),
    }
}

/// Async SQLite database with a dedicated executor thread.
#[derive(Clone)]
pub struct AsyncDatabase {
    conn: Connection,
    path: String,
}

impl AsyncDatabase {
    /// Open (or create) a database file, apply pragmas and run migrations.
    pub async fn open(path: &Path) -> UserStoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "Opening user store");

        let conn = Connection::open(path_str.clone())
            .await
            .map_err(|e| UserStoreError::Connection(e.to_string()))?;

        let db = Self {
            conn,
            path: path_str,
        };
        db.configure(true).await?;
        info!(path = %db.path, "User store initialized");
        Ok(db)
    }

    /// Open a private in-memory database. Data is gone once the last clone drops.
    pub async fn open_in_memory() -> UserStoreResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| UserStoreError::Connection(e.to_string()))?;

        let db = Self {
            conn,
            path: ":memory:".to_string(),
        };
        db.configure(false).await?;
        Ok(db)
    }

    async fn configure(&self, file_backed: bool) -> UserStoreResult<()> {
        self.call_sqlite(move |conn| {
            if file_backed {
                conn.execute_batch(
                    "
                    PRAGMA journal_mode = WAL;
                    PRAGMA synchronous = NORMAL;
                    ",
                )?;
            }
            conn.execute_batch("PRAGMA busy_timeout = 5000;")
        })
        .await?;

        self.call(|conn| migrations::run_migrations(conn)).await
    }

    /// Execute a closure on the database connection thread.
    pub async fn call<F, T>(&self, f: F) -> UserStoreResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> UserStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        // The inner result rides inside tokio_rusqlite's Ok so our own error
        // variants survive the trip back.
        let outer = self.conn.call(move |conn| Ok(f(conn))).await;

        match outer {
            Ok(inner) => inner,
            Err(e) => Err(from_tokio_rusqlite(e)),
        }
    }

    /// Execute a closure that only produces rusqlite errors.
    pub async fn call_sqlite<F, T>(&self, f: F) -> UserStoreResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| Ok(f(conn)?))
            .await
            .map_err(from_tokio_rusqlite)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run a trivial query to prove the executor thread is alive.
    pub async fn health_check(&self) -> UserStoreResult<()> {
        self.call_sqlite(|conn| conn.execute_batch("SELECT 1")).await?;
        debug!("User store health check passed");
        Ok(())
    }
}
