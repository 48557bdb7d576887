//! Database facade
//!
//! `Database` is the public entry point: one handle owns one data file
//! exclusively, holds the document set in memory, and flushes the whole
//! set to disk before any mutating call returns. A single lock spans the
//! read-modify-flush sequence of every mutation, so operations never
//! interleave their read-modify-write cycles.

use crate::error::{Error, Result};
use crate::persist::{FileBackend, PersistConfig};
use crate::query::{sort_by_field, Filter};
use crate::store::{value_type_name, DocumentSet, Entry, Record, StoreStats};
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// Embedded JSON document store
///
/// The handle is cheap to share behind an `Arc`; all operations take
/// `&self`. Reads return snapshots, never live views.
pub struct Database {
    inner: Mutex<Inner>,
}

/// Document set and backend guarded together: the in-memory state and
/// the data file are one exclusively-owned resource.
struct Inner {
    docs: DocumentSet,
    backend: FileBackend,
}

impl Database {
    /// Open a database stored at the given data file path
    ///
    /// Creates the containing directory if needed, then loads the
    /// document set once. The file is never re-read after this; it is
    /// only rewritten on mutations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(PersistConfig::new(path.as_ref()))
    }

    /// Open a database with an explicit persistence configuration
    pub fn with_config(config: PersistConfig) -> Result<Self> {
        let backend = FileBackend::new(config)?;
        let docs = backend.load()?;
        info!("database open: {} keys", docs.len());

        Ok(Database {
            inner: Mutex::new(Inner { docs, backend }),
        })
    }

    /// Path of the data file
    pub fn path(&self) -> PathBuf {
        self.lock().backend.path().to_path_buf()
    }

    // Key/value operations

    /// Set the entry at `key`, overwriting any previous entry
    ///
    /// An array of objects is stored as a table; any other value as a
    /// scalar.
    pub fn set_value(&self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let key = key.into();
        let entry = Entry::from(to_value(value)?);
        self.mutate(move |docs| docs.set(key, entry))
    }

    /// Get the value at `key`, storing and returning `default` if absent
    ///
    /// The first read of a missing key materializes the default durably.
    /// The returned value is re-read from the store, so the caller sees
    /// exactly what is now persisted.
    pub fn get_value(&self, key: &str, default: impl Serialize) -> Result<Value> {
        let mut inner = self.lock();

        if inner.docs.get(key).is_none() {
            let entry = Entry::from(to_value(default)?);
            Self::apply(&mut inner, |docs| docs.set(key, entry))?;
        }

        Ok(inner.docs.get(key).unwrap().clone().into_value())
    }

    /// Delete the entry at `key`, returns true if the key existed
    pub fn delete_value(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.mutate(move |docs| docs.delete(&key))
    }

    /// Return the counter at `key` and increment it
    ///
    /// Counters start at 0, so the first call returns 0 and each
    /// following call returns the next integer. Calls are serialized by
    /// the database lock, so every caller observes a distinct value. A
    /// key holding anything other than an integer restarts the counter
    /// at 0.
    pub fn next_id(&self, key: &str) -> Result<i64> {
        let key = key.to_string();
        self.mutate(move |docs| {
            let current = docs
                .get(&key)
                .and_then(Entry::as_scalar)
                .and_then(Value::as_i64)
                .unwrap_or(0);
            docs.set(key, Entry::scalar(current + 1));
            current
        })
    }

    // Table operations

    /// Append a record to the end of a table, creating the table first
    /// if the key does not exist yet
    ///
    /// Fails with [`Error::WrongType`] if the key holds a scalar, and
    /// with [`Error::InvalidRecord`] if `record` does not serialize to a
    /// JSON object.
    pub fn insert(&self, table: &str, record: impl Serialize) -> Result<()> {
        let record = to_record(record)?;
        let mut inner = self.lock();

        match inner.docs.get(table) {
            None => {}
            Some(entry) if entry.is_table() => {}
            Some(entry) => {
                return Err(Error::WrongType {
                    key: table.to_string(),
                    kind: entry.type_name(),
                })
            }
        }

        Self::apply(&mut inner, |docs| {
            if docs.get(table).is_none() {
                docs.set(table, Entry::empty_table());
            }
            if let Some(records) = docs.get_mut(table).and_then(Entry::as_table_mut) {
                records.push(record);
            }
        })
    }

    /// Remove every record matching the filter, returns how many were
    /// removed
    ///
    /// A missing table is a no-op. The document set is flushed either
    /// way.
    pub fn remove(&self, table: &str, filter: impl Into<Filter>) -> Result<usize> {
        let filter = filter.into();
        let table = table.to_string();
        self.mutate(move |docs| {
            match docs.get_mut(&table).and_then(Entry::as_table_mut) {
                Some(records) => {
                    let before = records.len();
                    records.retain(|record| !filter.matches(record));
                    before - records.len()
                }
                None => 0,
            }
        })
    }

    /// Get a snapshot of all records in a table
    ///
    /// Filters apply in sequence, each narrowing the result set. If
    /// `order_by` is given the result is sorted ascending by that field;
    /// the sort is stable, so ties keep their insertion order. A missing
    /// table yields an empty vector.
    pub fn get_all(&self, table: &str, order_by: Option<&str>, filters: &[Filter]) -> Vec<Record> {
        let inner = self.lock();
        let mut records: Vec<Record> = match inner.docs.get(table).and_then(Entry::as_table) {
            Some(records) => records.clone(),
            None => return Vec::new(),
        };
        drop(inner);

        for filter in filters {
            records.retain(|record| filter.matches(record));
        }

        if let Some(field) = order_by {
            sort_by_field(&mut records, field);
        }

        records
    }

    /// Get the first record whose `id` field equals `id`
    pub fn get_by_id(&self, table: &str, id: impl Into<Value>) -> Option<Record> {
        let id = id.into();
        let inner = self.lock();
        inner
            .docs
            .get(table)
            .and_then(Entry::as_table)
            .and_then(|records| records.iter().find(|r| r.get("id") == Some(&id)).cloned())
    }

    /// Get the first record matching the filter, in table order
    pub fn get_by(&self, table: &str, filter: impl Into<Filter>) -> Option<Record> {
        let filter = filter.into();
        let inner = self.lock();
        inner
            .docs
            .get(table)
            .and_then(Entry::as_table)
            .and_then(|records| records.iter().find(|r| filter.matches(r)).cloned())
    }

    /// Merge `data` into the first record matching `key`
    ///
    /// Shallow merge: fields in `data` overwrite same-named fields in
    /// the record, everything else is preserved. A miss is a silent
    /// no-op; use [`Database::update_strict`] to get an error instead.
    pub fn update(&self, table: &str, key: impl Into<Filter>, data: impl Serialize) -> Result<()> {
        self.update_inner(table, key.into(), to_record(data)?)?;
        Ok(())
    }

    /// Like [`Database::update`], but a miss fails with
    /// [`Error::NotFound`]
    pub fn update_strict(
        &self,
        table: &str,
        key: impl Into<Filter>,
        data: impl Serialize,
    ) -> Result<()> {
        if self.update_inner(table, key.into(), to_record(data)?)? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    fn update_inner(&self, table: &str, key: Filter, data: Record) -> Result<bool> {
        let table = table.to_string();
        self.mutate(move |docs| {
            let records = match docs.get_mut(&table).and_then(Entry::as_table_mut) {
                Some(records) => records,
                None => return false,
            };

            match records.iter_mut().find(|record| key.matches(record)) {
                Some(record) => {
                    for (field, value) in data {
                        record.insert(field, value);
                    }
                    true
                }
                None => false,
            }
        })
    }

    // Introspection

    /// Get all top-level keys
    pub fn keys(&self) -> Vec<String> {
        self.lock().docs.keys()
    }

    /// Get the number of top-level keys
    pub fn len(&self) -> usize {
        self.lock().docs.len()
    }

    /// Check if the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.lock().docs.is_empty()
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().docs.contains(key)
    }

    /// Remove all entries and flush
    pub fn clear(&self) -> Result<()> {
        self.mutate(|docs| docs.clear())
    }

    /// Get statistics about the document set
    pub fn stats(&self) -> StoreStats {
        self.lock().docs.stats()
    }

    // Internals

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Run a mutation and flush the result
    fn mutate<T>(&self, f: impl FnOnce(&mut DocumentSet) -> T) -> Result<T> {
        let mut inner = self.lock();
        Self::apply(&mut inner, f)
    }

    /// Apply a mutation under an already-held lock, then flush
    ///
    /// If the flush fails the in-memory state is rolled back, so memory
    /// and disk both keep the prior consistent state.
    fn apply<T>(inner: &mut Inner, f: impl FnOnce(&mut DocumentSet) -> T) -> Result<T> {
        let before = inner.docs.clone();
        let out = f(&mut inner.docs);

        if let Err(e) = inner.backend.flush(&inner.docs) {
            warn!("flush failed, rolling back in-memory state: {}", e);
            inner.docs = before;
            return Err(e);
        }

        Ok(out)
    }
}

fn to_value(value: impl Serialize) -> Result<Value> {
    Ok(serde_json::to_value(value).map_err(io::Error::from)?)
}

fn to_record(value: impl Serialize) -> Result<Record> {
    match to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidRecord(value_type_name(&other))),
    }
}
