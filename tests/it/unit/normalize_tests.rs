//! Snapshot tests for display and export normalization.
//!
//! Snapshot testing captures the full formatted output in `.snap` files,
//! which makes display-format regressions obvious in review. To update
//! after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```

use chrono::NaiveDate;
use tableview::normalize::{display_value, export_row};
use tableview::provider::Row;
use tableview::value::Value;

#[test]
fn snapshot_display_grid() {
    let values = vec![
        Value::Null,
        Value::Bool(false),
        Value::Int(1_234_567),
        Value::Int(i64::MAX),
        Value::Float(3.0),
        Value::Float(0.125),
        Value::Str("plain text".to_string()),
        Value::Date(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
        ),
        Value::List(vec![Value::Int(1), Value::Str("a".to_string())]),
        Value::Map(vec![("k".to_string(), Value::Bool(true))]),
        Value::Opaque("Binary".to_string()),
    ];

    let grid: Vec<String> = values
        .iter()
        .map(|v| display_value(v).text().to_string())
        .collect();
    insta::assert_json_snapshot!("display_grid", grid);
}

#[test]
fn snapshot_export_row() {
    let row: Row = [
        ("id".to_string(), Value::Int(i64::MAX)),
        ("count".to_string(), Value::Int(42)),
        ("ratio".to_string(), Value::Float(0.5)),
        ("note".to_string(), Value::Null),
    ]
    .into_iter()
    .collect();

    insta::assert_json_snapshot!("export_row", export_row(&row));
}
