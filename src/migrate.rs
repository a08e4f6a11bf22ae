//! Schema migrations for the durable stores.
//!
//! `messages` is owned by the chat application; the indexer only reads it.
//! `sync_checkpoints` is the append-only sync progress log. Both statements
//! are idempotent so `recall init` can run any number of times.

use anyhow::Result;
use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY,
            content     TEXT NOT NULL,
            user_id     TEXT,
            channel_id  TEXT,
            dm_user_id  TEXT,
            parent_id   INTEGER,
            created_at  INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sync_checkpoints (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            last_update_time    INTEGER NOT NULL,
            status              TEXT NOT NULL,
            messages_processed  INTEGER NOT NULL,
            recorded_at         INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
