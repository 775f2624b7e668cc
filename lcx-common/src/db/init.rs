//! Database initialization
//!
//! Opens (creating on first run) the response database and makes sure the
//! schema exists. Safe to call on every startup.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// SQLite busy timeout applied to every connection
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets the dashboard's reads proceed while a submission is written
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS as u64));
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_responses_table(&pool).await?;

    Ok(pool)
}

/// Create the responses table
///
/// `id` is AUTOINCREMENT so ids are never reused and keep ordering insertion.
/// `key_skills` holds a JSON array; `legacy_key_skill` is only set for
/// records imported from the single-skill format.
pub async fn create_responses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            sector TEXT NOT NULL,
            other_sector TEXT,
            origin TEXT NOT NULL,
            linkedin_url TEXT NOT NULL,
            profile_description TEXT NOT NULL,
            event_goal TEXT NOT NULL,
            networking_interest TEXT NOT NULL,
            other_networking_interest TEXT,
            desired_connections TEXT NOT NULL,
            offer_to_others TEXT NOT NULL,
            key_skills TEXT NOT NULL DEFAULT '[]',
            legacy_key_skill TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
