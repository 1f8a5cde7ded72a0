//! Key/value persistence backends and one-time backend selection.
//!
//! # Responsibility
//! - Define the capability contract shared by every storage engine.
//! - Resolve the best available engine once at startup.
//!
//! # Invariants
//! - Both engines expose identical `get`/`put` semantics to callers.
//! - Selection happens once; a process that fell back never re-promotes to
//!   the structured engine.
//! - A structured store with a newer schema version is never modified; the
//!   process falls back instead.

use crate::config::StorageConfig;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod flat_file;
pub mod migrations;
mod sqlite;

pub use flat_file::FlatFileBackend;
pub use sqlite::SqliteBackend;

/// Record key used by the structured engine.
pub const STRUCTURED_STATE_KEY: &str = "main";
/// Record key used by the flat fallback engine.
pub const FALLBACK_STATE_KEY: &str = "agencyState";

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug)]
pub enum BackendError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    UnsupportedSchemaVersion {
        store_version: u32,
        latest_supported: u32,
    },
    /// The engine is disabled or otherwise not usable in this process.
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                store_version,
                latest_supported,
            } => write!(
                f,
                "store schema version {store_version} is newer than supported {latest_supported}"
            ),
            Self::Unavailable(reason) => write!(f, "storage backend unavailable: {reason}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for BackendError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Which engine a backend handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Transactional, versioned store. Writes run off the caller's thread.
    Structured,
    /// Synchronous flat key/value store. Writes run inline.
    Fallback,
}

impl BackendKind {
    /// Fixed key under which the serialized document is stored.
    pub fn state_key(self) -> &'static str {
        match self {
            Self::Structured => STRUCTURED_STATE_KEY,
            Self::Fallback => FALLBACK_STATE_KEY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability contract for a persistence engine.
///
/// Engines are opened through their own `open` constructors; once opened,
/// callers only see these operations.
pub trait StorageBackend: Send {
    fn kind(&self) -> BackendKind;
    /// Returns the stored bytes for `key`, or `None` when absent.
    fn get(&self, key: &str) -> BackendResult<Option<Vec<u8>>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &[u8]) -> BackendResult<()>;
}

/// Resolves the storage engine for this process.
///
/// Tries the structured engine first. Any failure (disabled by
/// configuration, open error, permission error, schema mismatch) is logged
/// and answered with the flat fallback engine.
pub fn select_backend(config: &StorageConfig) -> Box<dyn StorageBackend> {
    let structured = if config.structured_enabled {
        SqliteBackend::open(config.structured_store_path())
    } else {
        Err(BackendError::Unavailable(
            "structured storage disabled by configuration".to_string(),
        ))
    };

    match structured {
        Ok(backend) => {
            info!(
                "event=backend_select module=backend status=ok kind={}",
                BackendKind::Structured
            );
            Box::new(backend)
        }
        Err(err) => {
            warn!(
                "event=backend_select module=backend status=fallback kind={} reason={}",
                BackendKind::Fallback,
                err
            );
            Box::new(FlatFileBackend::open(config.fallback_dir()))
        }
    }
}
