//! Atomic file backend
//!
//! Handles loading and flushing the document set. A flush serializes the
//! complete document set to a temporary file in the same directory, syncs
//! it according to the configured policy, then renames it over the data
//! file. A crash mid-flush leaves the previous file intact.

use super::{PersistConfig, SyncPolicy};
use crate::error::{Error, Result};
use crate::store::DocumentSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed persistence for the document set
///
/// The backend assumes it is the only writer of the data file.
// TODO: advisory lock on the data file for multi-process use
pub struct FileBackend {
    config: PersistConfig,
    tmp_path: PathBuf,
}

impl FileBackend {
    /// Create a backend for the given configuration
    ///
    /// The containing directory is created if it does not exist yet, so
    /// load and flush never fail on a missing directory.
    pub fn new(config: PersistConfig) -> Result<Self> {
        if let Some(dir) = config.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let tmp_path = tmp_path_for(&config.path);
        Ok(FileBackend { config, tmp_path })
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Load the document set from disk
    ///
    /// Returns an empty set if the data file does not exist. A file that
    /// exists but does not parse is a hard error: the caller must refuse
    /// to proceed rather than reset to an empty state.
    pub fn load(&self) -> Result<DocumentSet> {
        let data = match fs::read(&self.config.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no data file at {:?}, starting empty", self.config.path);
                return Ok(DocumentSet::new());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let docs: DocumentSet = serde_json::from_slice(&data).map_err(|e| Error::Corrupt {
            path: self.config.path.clone(),
            source: e,
        })?;

        info!("loaded {} keys from {:?}", docs.len(), self.config.path);
        Ok(docs)
    }

    /// Atomically replace the data file with the given document set
    pub fn flush(&self, docs: &DocumentSet) -> Result<()> {
        let data = serde_json::to_vec_pretty(docs).map_err(io::Error::from)?;

        let mut tmp = File::create(&self.tmp_path)?;
        tmp.write_all(&data)?;
        if self.config.sync == SyncPolicy::Always {
            tmp.sync_all()?;
        }
        drop(tmp);

        fs::rename(&self.tmp_path, &self.config.path)?;

        debug!("flushed {} bytes to {:?}", data.len(), self.config.path);
        Ok(())
    }
}

/// Temporary file path sitting next to the data file
///
/// Same directory as the target, so the rename never crosses a
/// filesystem boundary.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn backend_in(dir: &TempDir) -> FileBackend {
        FileBackend::new(PersistConfig::new(dir.path().join("database.json"))).unwrap()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        let docs = backend.load().unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_flush_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        let mut docs = DocumentSet::new();
        docs.set("name", json!("charta"));
        docs.set("users", json!([{"id": 0, "name": "Alice"}, {"id": 1, "name": "Bob"}]));
        backend.flush(&docs).unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded, docs);
    }

    #[test]
    fn test_flush_leaves_no_temporary_file() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        backend.flush(&DocumentSet::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["database.json"]);
    }

    #[test]
    fn test_flush_with_os_sync_policy() {
        let dir = TempDir::new().unwrap();
        let config =
            PersistConfig::new(dir.path().join("database.json")).with_sync(SyncPolicy::Os);
        let backend = FileBackend::new(config).unwrap();

        let mut docs = DocumentSet::new();
        docs.set("counter", json!(1));
        backend.flush(&docs).unwrap();

        assert_eq!(backend.load().unwrap(), docs);
    }

    #[test]
    fn test_load_corrupt_file_fails() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        fs::write(backend.path(), b"{ not valid json").unwrap();

        let result = backend.load();
        assert!(matches!(result, Err(Error::Corrupt { .. })));
    }

    #[test]
    fn test_creates_containing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("deep");
        let backend = FileBackend::new(PersistConfig::new(nested.join("database.json"))).unwrap();

        backend.flush(&DocumentSet::new()).unwrap();
        assert!(nested.join("database.json").exists());
    }

    #[test]
    fn test_flush_overwrites_previous_state() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        let mut docs = DocumentSet::new();
        docs.set("counter", json!(1));
        backend.flush(&docs).unwrap();

        docs.set("counter", json!(2));
        backend.flush(&docs).unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded.get("counter").unwrap().as_scalar().unwrap(), &json!(2));
    }

    #[test]
    fn test_reads_hand_written_file() {
        // Files produced by other writers carry no version or schema field
        // and must stay readable.
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);

        fs::write(
            backend.path(),
            r#"{"counter": 7, "users": [{"id": 0, "name": "Alice"}]}"#,
        )
        .unwrap();

        let docs = backend.load().unwrap();
        assert_eq!(docs.get("counter").unwrap().as_scalar().unwrap(), &json!(7));
        assert_eq!(docs.get("users").unwrap().as_table().unwrap().len(), 1);
    }
}
