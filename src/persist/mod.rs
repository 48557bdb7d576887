//! File persistence module
//!
//! Provides durability by rewriting the whole document set on every
//! mutation. The write is atomic: the data file on disk always holds
//! either the complete old state or the complete new state.

mod file;

pub use file::FileBackend;

use std::path::PathBuf;

/// Sync policy applied to the temporary file before it replaces the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// fsync before the rename (safest, slowest)
    Always,
    /// Let the OS decide when to sync (fastest, least safe)
    Os,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy::Always
    }
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistConfig {
    /// Path to the data file
    pub path: PathBuf,
    /// Sync policy
    pub sync: SyncPolicy,
}

impl Default for PersistConfig {
    fn default() -> Self {
        PersistConfig {
            path: PathBuf::from("data/database.json"),
            sync: SyncPolicy::default(),
        }
    }
}

impl PersistConfig {
    /// Configuration pointing at the given data file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PersistConfig {
            path: path.into(),
            sync: SyncPolicy::default(),
        }
    }

    /// Override the sync policy
    pub fn with_sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }
}
