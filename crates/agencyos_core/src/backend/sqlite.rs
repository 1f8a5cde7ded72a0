//! SQLite-backed structured engine.
//!
//! # Invariants
//! - Returned handles have all migrations applied.
//! - Each `put` is a single UPSERT statement, so a write either lands fully
//!   or leaves the previous value in place.

use super::migrations::apply_migrations;
use super::{BackendKind, BackendResult, StorageBackend};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (or creates) the store file and provisions the key space.
    ///
    /// # Side effects
    /// - Creates the parent directory when missing.
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        let started_at = Instant::now();
        info!("event=store_open module=backend status=start mode=file");

        let opened = (|| -> BackendResult<Connection> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut conn = Connection::open(path)?;
            bootstrap_connection(&mut conn)?;
            Ok(conn)
        })();

        finish_open(opened, "file", started_at)
    }

    /// Opens a private in-memory store. Contents vanish with the handle.
    pub fn open_in_memory() -> BackendResult<Self> {
        let started_at = Instant::now();
        info!("event=store_open module=backend status=start mode=memory");

        let opened = (|| -> BackendResult<Connection> {
            let mut conn = Connection::open_in_memory()?;
            bootstrap_connection(&mut conn)?;
            Ok(conn)
        })();

        finish_open(opened, "memory", started_at)
    }

    /// Underlying connection, for schema inspection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StorageBackend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Structured
    }

    fn get(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM state WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> BackendResult<()> {
        self.conn.execute(
            "INSERT INTO state (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn finish_open(
    opened: BackendResult<Connection>,
    mode: &str,
    started_at: Instant,
) -> BackendResult<SqliteBackend> {
    match opened {
        Ok(conn) => {
            info!(
                "event=store_open module=backend status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(SqliteBackend { conn })
        }
        Err(err) => {
            error!(
                "event=store_open module=backend status=error mode={} duration_ms={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> BackendResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
