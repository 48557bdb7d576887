//! In-memory document set

use super::entry::Entry;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

/// Type alias for the backing map with SipHasher
type EntryMap = HashMap<String, Entry, BuildHasherDefault<SipHasher13>>;

/// The full in-memory representation of all persisted data
///
/// Once loaded, this is the single source of truth: the data file is only
/// ever written as a byproduct of a mutation here, never read again until
/// the process restarts. Serializes transparently as the top-level JSON
/// object of the data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSet {
    entries: EntryMap,
}

impl DocumentSet {
    /// Create an empty document set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry at a key, overwriting any previous entry
    pub fn set(&mut self, key: impl Into<String>, entry: impl Into<Entry>) {
        self.entries.insert(key.into(), entry.into());
    }

    /// Get the entry at a key
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Get a mutable reference to the entry at a key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    /// Delete a key, returns true if the key existed
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get the number of top-level keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the document set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all top-level keys
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get statistics about the document set
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            keys: self.entries.len(),
            scalars: 0,
            tables: 0,
            records: 0,
        };

        for entry in self.entries.values() {
            match entry {
                Entry::Table(records) => {
                    stats.tables += 1;
                    stats.records += records.len();
                }
                Entry::Scalar(_) => stats.scalars += 1,
            }
        }

        stats
    }
}

/// Statistics about the document set
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub keys: usize,
    pub scalars: usize,
    pub tables: usize,
    pub records: usize,
}
