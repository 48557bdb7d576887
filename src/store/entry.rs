//! Entry types for the document set

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single object stored inside a table
pub type Record = serde_json::Map<String, Value>;

/// An ordered sequence of records, addressable by a top-level key
pub type Table = Vec<Record>;

/// Represents the two kinds of values that can live at a top-level key
///
/// A key denotes one entry kind for its lifetime by caller convention;
/// the store does not enforce it structurally.
///
/// The enum is untagged so the data file stays a plain JSON object with
/// no schema or version field. `Table` is tried first during
/// deserialization: an array of objects always loads as a table, and any
/// other JSON shape falls through to `Scalar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    /// Ordered sequence of records
    Table(Table),

    /// Any other JSON value (string, number, boolean, null, nested object)
    Scalar(Value),
}

impl Entry {
    /// Create an empty table
    pub fn empty_table() -> Self {
        Entry::Table(Vec::new())
    }

    /// Create a scalar entry
    pub fn scalar(value: impl Into<Value>) -> Self {
        Entry::Scalar(value.into())
    }

    /// Get the entry kind as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Entry::Table(_) => "table",
            Entry::Scalar(_) => "scalar",
        }
    }

    /// Check if the entry is a table
    pub fn is_table(&self) -> bool {
        matches!(self, Entry::Table(_))
    }

    /// Check if the entry is a scalar
    pub fn is_scalar(&self) -> bool {
        matches!(self, Entry::Scalar(_))
    }

    /// Try to get as a table reference
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Entry::Table(records) => Some(records),
            _ => None,
        }
    }

    /// Try to get as a mutable table
    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Entry::Table(records) => Some(records),
            _ => None,
        }
    }

    /// Try to get as a scalar reference
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Entry::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Convert the entry into a plain JSON value
    pub fn into_value(self) -> Value {
        match self {
            Entry::Table(records) => Value::Array(records.into_iter().map(Value::Object).collect()),
            Entry::Scalar(value) => value,
        }
    }
}

impl From<Value> for Entry {
    /// Classify a JSON value: an array of objects becomes a table,
    /// everything else is stored as a scalar
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) if items.iter().all(Value::is_object) => {
                let records = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect();
                Entry::Table(records)
            }
            other => Entry::Scalar(other),
        }
    }
}

/// Get the JSON type of a value as a string
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_of_objects_is_table() {
        let entry = Entry::from(json!([{"id": 1}, {"id": 2}]));
        assert!(entry.is_table());
        assert_eq!(entry.as_table().unwrap().len(), 2);
    }

    #[test]
    fn test_array_of_scalars_is_scalar() {
        let entry = Entry::from(json!([1, 2, 3]));
        assert!(entry.is_scalar());
        assert_eq!(entry.as_scalar().unwrap(), &json!([1, 2, 3]));
    }

    #[test]
    fn test_mixed_array_is_scalar() {
        let entry = Entry::from(json!([{"id": 1}, 2]));
        assert!(entry.is_scalar());
    }

    #[test]
    fn test_empty_array_is_table() {
        let entry = Entry::from(json!([]));
        assert!(entry.is_table());
        assert!(entry.as_table().unwrap().is_empty());
    }

    #[test]
    fn test_untagged_deserialization() {
        let table: Entry = serde_json::from_str(r#"[{"id": 1, "name": "Alice"}]"#).unwrap();
        assert!(table.is_table());

        let scalar: Entry = serde_json::from_str("42").unwrap();
        assert_eq!(scalar.as_scalar().unwrap(), &json!(42));

        let list: Entry = serde_json::from_str("[1, 2, 3]").unwrap();
        assert!(list.is_scalar());
    }

    #[test]
    fn test_round_trip() {
        let entry = Entry::from(json!([{"id": 1, "tags": ["a", "b"]}]));
        let text = serde_json::to_string(&entry).unwrap();
        let back: Entry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_into_value() {
        let entry = Entry::from(json!([{"id": 1}]));
        assert_eq!(entry.into_value(), json!([{"id": 1}]));

        let entry = Entry::scalar("hello");
        assert_eq!(entry.into_value(), json!("hello"));
    }
}
