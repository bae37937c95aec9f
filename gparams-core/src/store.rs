//! SQLite store writer: one table per discovered type tag.
//!
//! Schema per partition:
//!
//! ```sql
//! CREATE TABLE "<tag>" (
//!     id    TEXT PRIMARY KEY,
//!     value TEXT NOT NULL
//! );
//! ```
//!
//! Partitions are dropped and fully rebuilt every run, never incrementally
//! updated. All rows for one tag are written inside a single transaction
//! scoped to that partition only: a failure mid-run leaves exactly that
//! partition untouched (the transaction rolls back), never others.
//!
//! Type tags are producer-controlled strings, so table identifiers are
//! double-quote escaped verbatim rather than renamed; the table name IS
//! the tag, which keeps downstream lookup deterministic.

use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{GparamsError, Result};

/// Handle to the open store.
pub struct StoreWriter {
    conn: Connection,
    db_path: PathBuf,
}

impl fmt::Debug for StoreWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreWriter")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl StoreWriter {
    /// Open (or create) the store described by `config`.
    ///
    /// # Errors
    /// Returns [`GparamsError::Database`] on SQLite failures.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&config.path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;

        info!(
            path = %config.path.display(),
            wal = config.wal_mode,
            "Store opened"
        );

        Ok(Self {
            conn,
            db_path: config.path.clone(),
        })
    }

    /// Open an in-memory store (useful for tests).
    ///
    /// # Errors
    /// Returns [`GparamsError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Drop, recreate and repopulate one partition as a single atomic unit.
    ///
    /// Rows are `(entity key, serialized entity)` pairs. The transaction
    /// commits only after every row is in; any failure rolls the whole
    /// partition back, so it is never left holding a silently-kept subset.
    ///
    /// # Errors
    /// Returns [`GparamsError::DuplicateKey`] if two rows share an entity
    /// key, or [`GparamsError::Database`] on other SQLite failures.
    pub fn rebuild_partition(&mut self, tag: &str, rows: &[(String, String)]) -> Result<()> {
        let table = quote_ident(tag);
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} (id TEXT PRIMARY KEY, value TEXT NOT NULL);"
        ))?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {table} (id, value) VALUES (?1, ?2)"))?;
            for (key, value) in rows {
                stmt.execute(params![key, value])
                    .map_err(|e| map_insert_error(e, tag, key))?;
            }
        }
        tx.commit()?;

        debug!(partition = tag, rows = rows.len(), "Partition rebuilt");
        Ok(())
    }

    /// Names of all partition tables currently in the store.
    ///
    /// # Errors
    /// Returns [`GparamsError::Database`] on SQLite failures.
    pub fn partition_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }

    /// Number of rows in one partition.
    ///
    /// # Errors
    /// Returns [`GparamsError::Database`] on SQLite failures, including
    /// when the partition does not exist.
    pub fn row_count(&self, tag: &str) -> Result<usize> {
        let table = quote_ident(tag);
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Fetch one serialized entity, or `None` when the key is absent.
    ///
    /// # Errors
    /// Returns [`GparamsError::Database`] on SQLite failures.
    pub fn read_entity(&self, tag: &str, key: &str) -> Result<Option<String>> {
        let table = quote_ident(tag);
        let value = self
            .conn
            .query_row(
                &format!("SELECT value FROM {table} WHERE id = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Path to the database file (or `:memory:` for in-memory stores).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Double-quote escape a producer-controlled identifier.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Translate a primary-key violation into the domain error.
fn map_insert_error(err: rusqlite::Error, tag: &str, key: &str) -> GparamsError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            GparamsError::DuplicateKey {
                partition: tag.to_string(),
                key: key.to_string(),
            }
        }
        other => GparamsError::Database(other),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
