//! Cell value domain.
//!
//! Every provider normalizes its engine-native cells into [`Value`] before
//! they reach the view model, so sorting, filtering and export only ever
//! deal with one shape. 64-bit integers stay `i64` end to end; nothing in
//! this crate round-trips them through `f64`.

use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// A single normalized cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// 64-bit integer, kept exact (never widened through a float)
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDateTime),
    /// Nested array value (columnar list types)
    List(Vec<Value>),
    /// Nested object value, field order preserved
    Map(Vec<(String, Value)>),
    /// A value with no structural display; carries the engine type label
    Opaque(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Plain text form used by filtering and as the sort fallback.
    ///
    /// This is deliberately unformatted (no grouping separators, no
    /// truncation); display formatting lives in [`crate::normalize`].
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_text()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Map(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_text()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Opaque(label) => format!("<{}>", label),
        }
    }

    /// Numeric view for cross-type comparisons (Int vs Float columns).
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Type-aware ordering used by column sort.
///
/// Nulls sort last in ascending order. Mixed-type cells fall back to a
/// case-insensitive comparison of their text form.
pub fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_text().to_lowercase().cmp(&b.to_text().to_lowercase()),
        },
    }
}
