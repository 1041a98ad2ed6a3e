use std::cmp::Ordering;
use std::fmt::Debug;

use serde_json::{Number, Value};

/// A row object supplied by the host page. The grid only looks at it
/// through column accessors and the durable id.
pub trait Record {
    type Id: Clone + Ord + Debug;

    fn record_id(&self) -> Self::Id;
}

/// Formats an accessor value for display in a cell, search matching and CSV.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Total order over accessor values used by the sort stage.
///
/// Strings compare case-insensitively, numbers numerically, and mixed
/// types fall back to a fixed type rank so the order stays total.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        _ => type_rank(left)
            .cmp(&type_rank(right))
            .then_with(|| display_value(left).cmp(&display_value(right))),
    }
}

/// Case-insensitive substring match of `needle` (already lowercased) in the
/// displayed form of `value`.
pub fn value_contains(value: &Value, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    display_value(value).to_lowercase().contains(needle)
}

fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    match (left.as_i64(), left.as_u64(), right.as_i64(), right.as_u64()) {
        (Some(a), _, Some(b), _) => a.cmp(&b),
        (Some(a), _, _, Some(b)) => {
            if a < 0 {
                Ordering::Less
            } else {
                (a as u64).cmp(&b)
            }
        }
        (_, Some(a), Some(b), _) => {
            if b < 0 {
                Ordering::Greater
            } else {
                a.cmp(&(b as u64))
            }
        }
        (_, Some(a), _, Some(b)) => a.cmp(&b),
        _ => {
            let left = left.as_f64().unwrap_or(f64::NAN);
            let right = right.as_f64().unwrap_or(f64::NAN);
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
    }
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
