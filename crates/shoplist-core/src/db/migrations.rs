//! Database migrations

use crate::error::Result;
use crate::util::fold_case;
use libsql::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 3;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version < 1 {
        migrate_v1(conn).await?;
    }
    if version < 2 {
        migrate_v2(conn).await?;
    }
    if version < 3 {
        migrate_v3(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
async fn get_version(conn: &Connection) -> Result<i32> {
    // Check if schema_version table exists
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

/// Apply a batch of statements in one transaction
async fn apply(conn: &Connection, statements: &[&str]) -> Result<()> {
    // libsql doesn't have execute_batch, so we run each statement separately
    conn.execute("BEGIN TRANSACTION", ()).await?;

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    Ok(())
}

/// Migration to version 1: Initial schema
async fn migrate_v1(conn: &Connection) -> Result<()> {
    apply(
        conn,
        &[
            // Schema version tracking
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            // Items table; sync_status: 0 synced, 1 pending create,
            // 2 pending update, 3 pending delete
            "CREATE TABLE IF NOT EXISTS shopping_items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                note TEXT,
                is_bought INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                sync_status INTEGER NOT NULL DEFAULT 1 CHECK (sync_status IN (0, 1, 2, 3))
            )",
            "CREATE INDEX IF NOT EXISTS idx_items_created ON shopping_items(created_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_items_updated ON shopping_items(updated_at DESC)",
            "INSERT INTO schema_version (version) VALUES (1)",
        ],
    )
    .await?;

    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: index pending rows for status lookups
async fn migrate_v2(conn: &Connection) -> Result<()> {
    apply(
        conn,
        &[
            "CREATE INDEX IF NOT EXISTS idx_items_sync_status ON shopping_items(sync_status)
             WHERE sync_status != 0",
            "INSERT INTO schema_version (version) VALUES (2)",
        ],
    )
    .await?;

    tracing::info!("Migrated database to version 2");
    Ok(())
}

/// Migration to version 3: lowercased copies of name and note for search
async fn migrate_v3(conn: &Connection) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    if let Err(e) = add_folded_columns(conn).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e);
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}

async fn add_folded_columns(conn: &Connection) -> Result<()> {
    conn.execute(
        "ALTER TABLE shopping_items ADD COLUMN name_folded TEXT NOT NULL DEFAULT ''",
        (),
    )
    .await?;
    conn.execute(
        "ALTER TABLE shopping_items ADD COLUMN note_folded TEXT NOT NULL DEFAULT ''",
        (),
    )
    .await?;

    // SQLite lower() is ASCII-only, so existing rows are folded here
    let mut rows = conn
        .query("SELECT id, name, note FROM shopping_items", ())
        .await?;
    let mut existing = Vec::new();
    while let Some(row) = rows.next().await? {
        existing.push((
            row.get::<String>(0)?,
            row.get::<String>(1)?,
            row.get::<Option<String>>(2)?,
        ));
    }
    drop(rows);

    for (id, name, note) in existing {
        conn.execute(
            "UPDATE shopping_items SET name_folded = ?, note_folded = ? WHERE id = ?",
            libsql::params![
                fold_case(&name),
                note.as_deref().map(fold_case).unwrap_or_default(),
                id
            ],
        )
        .await?;
    }

    conn.execute("INSERT INTO schema_version (version) VALUES (3)", ())
        .await?;
    Ok(())
}
