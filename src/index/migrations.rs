//! Versioned, additive migrations for the cache database.
//!
//! The version is tracked in the `meta` table under `schema_version`. Every
//! migration also checks the live table shape before changing it, so databases
//! written by older releases (which never had a `meta` table) are upgraded in
//! place. Migrations only ever add; columns are never dropped or renamed.

use rusqlite::Connection;

use crate::error::Result;

/// Current schema version. Increment when adding new migrations.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

/// Name of the single cache table.
pub const CACHE_TABLE: &str = "cache";

/// Every column the current schema expects, in declaration order.
pub const CACHE_COLUMNS: &[&str] = &[
    "path",
    "hash",
    "description",
    "enrichment",
    "imports",
    "functions",
    "enriched_hash",
];

/// Column name used by releases before `enrichment` existed.
const LEGACY_ENRICHMENT_COLUMN: &str = "developer_consideration";

type MigrationFn = fn(&Connection) -> Result<()>;

/// All migrations in order. Index + 1 = version number.
const MIGRATIONS: &[MigrationFn] = &[
    migration_v1_base_schema,
    migration_v2_enrichment_column,
    migration_v3_enriched_hash_column,
];

/// Runs all pending migrations on the database.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    for (idx, migration) in MIGRATIONS.iter().enumerate() {
        let version = (idx + 1) as u32;
        if version > current_version {
            migration(conn)?;
            set_schema_version(conn, version)?;
        }
    }

    // A newer binary may have been pointed at this file and then an older one;
    // make sure nothing the current schema needs is missing either way.
    ensure_columns(conn)?;

    Ok(())
}

/// Gets the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )?;

    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .ok();

    Ok(version.and_then(|v| v.parse().ok()).unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [version.to_string()],
    )?;
    Ok(())
}

fn migration_v1_base_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS cache (
            path TEXT PRIMARY KEY,
            hash TEXT,
            description TEXT,
            imports TEXT,
            functions TEXT
        );
        "#,
    )?;
    Ok(())
}

fn migration_v2_enrichment_column(conn: &Connection) -> Result<()> {
    if !column_exists(conn, CACHE_TABLE, "enrichment")? {
        conn.execute("ALTER TABLE cache ADD COLUMN enrichment TEXT", [])?;

        // Carry over annotations written under the old column name.
        if column_exists(conn, CACHE_TABLE, LEGACY_ENRICHMENT_COLUMN)? {
            conn.execute(
                &format!(
                    "UPDATE cache SET enrichment = {} WHERE enrichment IS NULL",
                    LEGACY_ENRICHMENT_COLUMN
                ),
                [],
            )?;
        }
    }
    Ok(())
}

fn migration_v3_enriched_hash_column(conn: &Connection) -> Result<()> {
    if !column_exists(conn, CACHE_TABLE, "enriched_hash")? {
        conn.execute("ALTER TABLE cache ADD COLUMN enriched_hash TEXT", [])?;
    }
    Ok(())
}

/// Adds any expected column that the live table is missing.
fn ensure_columns(conn: &Connection) -> Result<()> {
    for column in CACHE_COLUMNS {
        if !column_exists(conn, CACHE_TABLE, column)? {
            tracing::debug!("Adding missing cache column '{}'", column);
            conn.execute(
                &format!("ALTER TABLE {} ADD COLUMN {} TEXT", CACHE_TABLE, column),
                [],
            )?;
        }
    }
    Ok(())
}

/// Checks if a column exists in a table.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?1",
            table
        ),
        [column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
