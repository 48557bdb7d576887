//! Ordering for query results
//!
//! JSON has no built-in total order, so mixed-type columns compare by
//! type rank first: null < boolean < number < string < array < object.

use crate::store::Record;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Stable ascending sort by the given field
///
/// Records without the field sort as if the field were null, so they end
/// up first. Ties keep their original insertion order.
pub fn sort_by_field(records: &mut [Record], field: &str) {
    records.sort_by(|a, b| {
        let left = a.get(field).unwrap_or(&Value::Null);
        let right = b.get(field).unwrap_or(&Value::Null);
        cmp_values(left, right)
    });
}

/// Total order over JSON values
pub fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => cmp_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (left, right) in x.iter().zip(y.iter()) {
                let ord = cmp_values(left, right);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        // Objects have no meaningful order; compare by size so the sort
        // at least stays total.
        (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn cmp_numbers(x: &Number, y: &Number) -> Ordering {
    // i64/u64 values beyond 2^53 lose precision here; id columns stay
    // well below that.
    let left = x.as_f64().unwrap_or(f64::NAN);
    let right = y.as_f64().unwrap_or(f64::NAN);
    left.total_cmp(&right)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
