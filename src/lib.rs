//! ChartaDB - A lightweight, embedded JSON document store
//!
//! The whole data set lives in memory and is persisted to a single JSON
//! file, rewritten atomically on every mutation. ChartaDB is designed with
//! strong cohesion and loose coupling principles:
//! - `store` holds the document set and knows nothing about disk or queries
//! - `persist` owns the data file and the atomic whole-file flush
//! - `query` provides filtering and ordering, independent of storage
//! - `db` ties them together behind the one public handle, [`Database`]
//!
//! # Example
//!
//! ```no_run
//! use chartadb::{Database, Filter};
//! use serde_json::json;
//!
//! let db = Database::open("data/database.json")?;
//!
//! let id = db.next_id("users.nextId")?;
//! db.insert("users", json!({"id": id, "name": "Alice", "role": "admin"}))?;
//!
//! let admins = db.get_all("users", Some("name"), &[Filter::fields(json!({"role": "admin"}))]);
//! # Ok::<(), chartadb::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod persist;
pub mod query;
pub mod store;

/// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use persist::{FileBackend, PersistConfig, SyncPolicy};
pub use query::Filter;
pub use store::{DocumentSet, Entry, Record, StoreStats, Table};
