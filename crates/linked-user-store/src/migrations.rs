//! Database migrations.
//!
//! Migrations are run in order and tracked in the `migrations` table.

use crate::UserStoreResult;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> UserStoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM migrations",
        [],
        |row| row.get(0),
    )?;

    info!(current_version, target_version = CURRENT_VERSION, "Running migrations");

    if current_version < 1 {
        migrate_v1_users(conn)?;
    }
    if current_version < 2 {
        migrate_v2_unique_identities(conn)?;
    }

    info!("Migrations complete");
    Ok(())
}

fn record_migration(conn: &Connection, version: i32, name: &str) -> UserStoreResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    debug!(version, name, "Migration applied");
    Ok(())
}

/// V1: users table.
fn migrate_v1_users(conn: &Connection) -> UserStoreResult<()> {
    info!("Applying migration v1: users");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            chat_id TEXT NOT NULL,
            forum_id TEXT NOT NULL,
            linked_at TEXT NOT NULL
        );
        ",
    )?;

    record_migration(conn, 1, "users")
}

/// V2: both identities are unique across all records.
fn migrate_v2_unique_identities(conn: &Connection) -> UserStoreResult<()> {
    info!("Applying migration v2: unique identities");

    conn.execute_batch(
        "
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_chat_id ON users(chat_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_forum_id ON users(forum_id);
        ",
    )?;

    record_migration(conn, 2, "unique_identities")
}
