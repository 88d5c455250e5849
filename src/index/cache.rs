use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{MapperError, Result};
use crate::index::migrations;
use crate::index::models::CacheEntry;

/// Durable path -> {hash, description, enrichment, imports, functions} store,
/// plus the hash each enrichment was produced for.
///
/// All writes go through [`SqliteCache::upsert`], which commits before
/// returning. The connection sits behind a mutex so a single handle can be
/// shared between the walker and the enrichment stage.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Opens or creates the store and brings its schema up to date.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::configure_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// - WAL mode: the file stays readable while a run is writing
    /// - NORMAL synchronous: durable at every commit with fewer fsyncs
    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MapperError::Cache("cache connection lock poisoned".to_string()))
    }

    /// Returns the stored row for `path`, if any. The caller decides freshness.
    pub fn lookup(&self, path: &str) -> Result<Option<CacheEntry>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT hash, description, enrichment, imports, functions, enriched_hash
                 FROM cache WHERE path = ?1",
                params![path],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(hash, description, enrichment, imports, functions, enriched_hash)| CacheEntry {
            path: path.to_string(),
            hash: hash.unwrap_or_default(),
            description: description.unwrap_or_default(),
            enrichment: enrichment.unwrap_or_default(),
            imports: decode_list(imports.as_deref()),
            functions: decode_list(functions.as_deref()),
            enriched_hash: enriched_hash.unwrap_or_default(),
        }))
    }

    /// Inserts or fully replaces the row for `entry.path`.
    pub fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        let imports = serde_json::to_string(&entry.imports)?;
        let functions = serde_json::to_string(&entry.functions)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT OR REPLACE INTO cache
                (path, hash, description, enrichment, imports, functions, enriched_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.path,
                entry.hash,
                entry.description,
                entry.enrichment,
                imports,
                functions,
                entry.enriched_hash
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Lists are stored as JSON arrays; anything unreadable decodes as empty.
fn decode_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.trim().is_empty() => serde_json::from_str(s).unwrap_or_else(|e| {
            tracing::warn!("Discarding malformed cached list: {}", e);
            Vec::new()
        }),
        _ => Vec::new(),
    }
}
