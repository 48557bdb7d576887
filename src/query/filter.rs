//! Record filters
//!
//! A filter narrows a table query: either a structural partial match on
//! record fields or an arbitrary predicate function. Filters chained in a
//! query apply in sequence, each narrowing the result set (logical AND).

use crate::store::Record;
use serde_json::Value;
use std::fmt;

/// Predicate applied to records during queries, updates and removals
pub enum Filter {
    /// Structural subset match: every listed field must compare equal
    /// against the record's field of the same name
    Fields(Record),

    /// Arbitrary predicate
    Where(Box<dyn Fn(&Record) -> bool + Send + Sync>),
}

impl Filter {
    /// Partial-match filter from a JSON value
    ///
    /// An object matches records carrying all of its fields with equal
    /// values. A bare scalar is shorthand for matching on `id`.
    pub fn fields(value: Value) -> Self {
        match value {
            Value::Object(map) => Filter::Fields(map),
            other => Filter::id(other),
        }
    }

    /// Filter matching records whose `id` field equals the given value
    pub fn id(id: impl Into<Value>) -> Self {
        let mut map = Record::new();
        map.insert("id".to_string(), id.into());
        Filter::Fields(map)
    }

    /// Filter wrapping an arbitrary predicate
    pub fn where_fn(f: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        Filter::Where(Box::new(f))
    }

    /// Check whether a record passes the filter
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Fields(fields) => fields.iter().all(|(key, value)| record.get(key) == Some(value)),
            Filter::Where(predicate) => predicate(record),
        }
    }
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        Filter::fields(value)
    }
}

impl From<i64> for Filter {
    fn from(id: i64) -> Self {
        Filter::id(id)
    }
}

impl From<i32> for Filter {
    fn from(id: i32) -> Self {
        Filter::id(id as i64)
    }
}

impl From<&str> for Filter {
    fn from(id: &str) -> Self {
        Filter::id(id)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            Filter::Where(_) => f.write_str("Where(<predicate>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn test_fields_subset_match() {
        let filter = Filter::fields(json!({"role": "admin"}));
        assert!(filter.matches(&record(json!({"id": 1, "role": "admin"}))));
        assert!(!filter.matches(&record(json!({"id": 2, "role": "user"}))));
        assert!(!filter.matches(&record(json!({"id": 3}))));
    }

    #[test]
    fn test_fields_match_is_deep() {
        let filter = Filter::fields(json!({"tags": ["a", "b"]}));
        assert!(filter.matches(&record(json!({"id": 1, "tags": ["a", "b"]}))));
        assert!(!filter.matches(&record(json!({"id": 2, "tags": ["a"]}))));
    }

    #[test]
    fn test_empty_fields_match_everything() {
        let filter = Filter::fields(json!({}));
        assert!(filter.matches(&record(json!({"id": 1}))));
    }

    #[test]
    fn test_scalar_is_id_shorthand() {
        let filter = Filter::fields(json!(7));
        assert!(filter.matches(&record(json!({"id": 7, "name": "x"}))));
        assert!(!filter.matches(&record(json!({"id": 8}))));
    }

    #[test]
    fn test_where_predicate() {
        let filter = Filter::where_fn(|r| {
            r.get("age").and_then(Value::as_i64).is_some_and(|age| age >= 18)
        });
        assert!(filter.matches(&record(json!({"age": 30}))));
        assert!(!filter.matches(&record(json!({"age": 12}))));
        assert!(!filter.matches(&record(json!({"name": "no age"}))));
    }
}
