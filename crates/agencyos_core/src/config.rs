//! Storage location configuration.
//!
//! Both engines live under one data directory:
//! - `<data_dir>/agency_os.sqlite3` for the structured engine.
//! - `<data_dir>/flat/` for the fallback engine.

use std::path::{Path, PathBuf};

/// File name of the structured store inside the data directory.
pub const STRUCTURED_STORE_FILE: &str = "agency_os.sqlite3";
/// Directory name of the fallback store inside the data directory.
pub const FALLBACK_DIR_NAME: &str = "flat";
/// Application directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "agencyos";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// When `false` the structured engine is treated as absent and the
    /// fallback engine is selected directly.
    pub structured_enabled: bool,
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            structured_enabled: true,
        }
    }

    pub fn with_structured(mut self, enabled: bool) -> Self {
        self.structured_enabled = enabled;
        self
    }

    pub fn structured_store_path(&self) -> PathBuf {
        self.data_dir.join(STRUCTURED_STORE_FILE)
    }

    pub fn fallback_dir(&self) -> PathBuf {
        self.data_dir.join(FALLBACK_DIR_NAME)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
