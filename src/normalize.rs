//! Cell value normalization for display and export.
//!
//! Display output is a [`DisplayCell`], not a bare string: null is a typed
//! sentinel (renderers show a muted `-`), and truncated values keep their
//! full text so the shell can offer a "view full value" affordance.
//!
//! Export goes through [`export_value`], which never fails: 64-bit
//! integers beyond float-safe precision become numeric strings, NaN and
//! infinities become their names, and opaque values become a fixed
//! placeholder token. A value that can't be represented structurally
//! degrades to a best-effort string instead of propagating an error into
//! the render path.

use crate::constants::{DISPLAY_FLOAT_DECIMALS, DISPLAY_TRUNCATE_LEN, OPAQUE_PLACEHOLDER};
use crate::provider::Row;
use crate::value::Value;
use serde_json::json;

/// Largest integer magnitude a 64-bit float holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// A cell prepared for display.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayCell {
    /// Null/missing value; rendered as a muted sentinel, never "null"
    Null,
    Plain(String),
    /// Long value cut for display, full text kept for the detail view
    Truncated { preview: String, full: String },
}

impl DisplayCell {
    /// The text a renderer draws in the cell.
    pub fn text(&self) -> &str {
        match self {
            DisplayCell::Null => "-",
            DisplayCell::Plain(s) => s,
            DisplayCell::Truncated { preview, .. } => preview,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DisplayCell::Null)
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, DisplayCell::Truncated { .. })
    }
}

/// Normalize one value for display.
pub fn display_value(value: &Value) -> DisplayCell {
    match value {
        Value::Null => DisplayCell::Null,
        Value::Bool(b) => DisplayCell::Plain(if *b { "true" } else { "false" }.to_string()),
        Value::Int(i) => DisplayCell::Plain(group_digits(*i)),
        Value::Float(f) => DisplayCell::Plain(format_float(*f)),
        Value::Str(s) => truncated(s.clone()),
        Value::Date(d) => DisplayCell::Plain(d.format("%Y-%m-%d %H:%M:%S").to_string()),
        Value::List(_) | Value::Map(_) => {
            // JSON-like summary; falls back to the raw text form if the
            // value defeats serde (it shouldn't, but a summary beats a
            // crash in the render path).
            let summary = serde_json::to_string(&export_value(value))
                .unwrap_or_else(|_| value.to_text());
            truncated(summary)
        }
        Value::Opaque(_) => DisplayCell::Plain(OPAQUE_PLACEHOLDER.to_string()),
    }
}

fn truncated(full: String) -> DisplayCell {
    if full.chars().count() <= DISPLAY_TRUNCATE_LEN {
        DisplayCell::Plain(full)
    } else {
        let preview: String = full.chars().take(DISPLAY_TRUNCATE_LEN).collect();
        DisplayCell::Truncated {
            preview: format!("{}…", preview),
            full,
        }
    }
}

/// Group an integer's digits with `,` separators.
fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Whole floats display like integers; fractional ones keep a fixed number
/// of decimals with trailing zeros trimmed.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER as f64 {
        return group_digits(f as i64);
    }
    let fixed = format!("{:.*}", DISPLAY_FLOAT_DECIMALS, f);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Serialize one value losslessly for copy/export.
pub fn export_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => {
            if i.unsigned_abs() > MAX_SAFE_INTEGER as u64 {
                // Past float-safe precision: a numeric string survives
                // every downstream JSON consumer intact.
                json!(i.to_string())
            } else {
                json!(i)
            }
        }
        Value::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => serde_json::Value::Number(n),
            None => json!(format_float(*f)),
        },
        Value::Str(s) => json!(s),
        Value::Date(d) => json!(d.format("%Y-%m-%dT%H:%M:%S").to_string()),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(export_value).collect())
        }
        Value::Map(fields) => serde_json::Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), export_value(v)))
                .collect(),
        ),
        Value::Opaque(_) => json!(OPAQUE_PLACEHOLDER),
    }
}

/// Serialize one row as a JSON object in column order.
pub fn export_row(row: &Row) -> serde_json::Value {
    serde_json::Value::Object(
        row.iter()
            .map(|(k, v)| (k.clone(), export_value(v)))
            .collect(),
    )
}

/// Write the given rows as CSV, scalars rendered losslessly.
///
/// This backs the shell's copy/download affordance and only ever sees the
/// currently loaded (visible) row set.
pub fn export_csv(columns: &[String], rows: &[&Row]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    let header: Vec<String> = columns.iter().map(|c| quote_csv_field(c)).collect();
    lines.push(header.join(","));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| quote_csv_field(&csv_text(row.get(c).unwrap_or(&Value::Null))))
            .collect();
        lines.push(cells.join(","));
    }

    lines.join("\n")
}

/// Scalar text for CSV export; no grouping separators, no truncation.
fn csv_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Str(s) => s.clone(),
        Value::Date(d) => d.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Value::List(_) | Value::Map(_) => {
            serde_json::to_string(&export_value(value)).unwrap_or_else(|_| value.to_text())
        }
        Value::Opaque(_) => OPAQUE_PLACEHOLDER.to_string(),
    }
}

/// Quote a CSV field if necessary (contains delimiter, quotes, or newlines)
fn quote_csv_field(value: &str) -> String {
    let needs_quoting = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        // Escape internal quotes by doubling them
        let escaped = value.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}
