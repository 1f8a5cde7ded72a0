//! Flat file fallback engine.
//!
//! One file per key inside a directory. Writes truncate and overwrite the
//! file in place with no rename step, so a crash mid-write can leave a
//! corrupt value behind; the store treats corrupt state as absent.

use super::{BackendKind, BackendResult, StorageBackend};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct FlatFileBackend {
    dir: PathBuf,
}

impl FlatFileBackend {
    /// Binds the engine to `dir`. The directory is created on first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl StorageBackend for FlatFileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn get(&self, key: &str) -> BackendResult<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> BackendResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FlatFileBackend;
    use crate::backend::StorageBackend;

    #[test]
    fn missing_key_reads_as_none_and_put_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let mut backend = FlatFileBackend::open(root.path().join("nested").join("flat"));

        assert_eq!(backend.get("agencyState").unwrap(), None);
        backend.put("agencyState", b"{}").unwrap();
        assert_eq!(
            backend.get("agencyState").unwrap().as_deref(),
            Some(&b"{}"[..])
        );
        assert!(backend.dir().join("agencyState.json").exists());
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let root = tempfile::tempdir().unwrap();
        let mut backend = FlatFileBackend::open(root.path());
        backend.put("../escape", b"x").unwrap();
        assert!(root.path().join("___escape.json").exists());
    }
}
