//! Arrow record-batch → row conversion shared by the columnar providers.
//!
//! Both the Parquet and ORC backends decode into arrow `RecordBatch`es;
//! this module turns those into [`Row`]s while keeping 64-bit integers
//! exact. Engine types with no structural display (binary blobs, exotic
//! decimals) become [`Value::Opaque`] carrying the type label instead of a
//! lossy rendering.

use crate::provider::Row;
use crate::value::Value;
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Date64Array, Float32Array, Float64Array,
    Int8Array, Int16Array, Int32Array, Int64Array, LargeListArray, LargeStringArray, ListArray,
    RecordBatch, StringArray, StructArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray, UInt8Array, UInt16Array, UInt32Array,
    UInt64Array,
};
use arrow::datatypes::{DataType as ArrowType, TimeUnit};
use chrono::NaiveDateTime;

/// Convert every row of `batch` into the crate row shape.
pub(crate) fn batch_to_rows(batch: &RecordBatch, column_names: &[String]) -> Vec<Row> {
    let columns = batch.columns();
    (0..batch.num_rows())
        .map(|row_idx| {
            column_names
                .iter()
                .zip(columns)
                .map(|(name, array)| (name.clone(), array_value(array, row_idx)))
                .collect()
        })
        .collect()
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef) -> Option<&'a T> {
    array.as_any().downcast_ref::<T>()
}

/// Extract one cell, preserving integer width and flagging opaque types.
pub(crate) fn array_value(array: &ArrayRef, idx: usize) -> Value {
    if array.is_null(idx) {
        return Value::Null;
    }

    match array.data_type() {
        ArrowType::Null => Value::Null,
        ArrowType::Boolean => downcast::<BooleanArray>(array)
            .map(|a| Value::Bool(a.value(idx)))
            .unwrap_or(Value::Null),
        ArrowType::Int8 => downcast::<Int8Array>(array)
            .map(|a| Value::Int(a.value(idx) as i64))
            .unwrap_or(Value::Null),
        ArrowType::Int16 => downcast::<Int16Array>(array)
            .map(|a| Value::Int(a.value(idx) as i64))
            .unwrap_or(Value::Null),
        ArrowType::Int32 => downcast::<Int32Array>(array)
            .map(|a| Value::Int(a.value(idx) as i64))
            .unwrap_or(Value::Null),
        ArrowType::Int64 => downcast::<Int64Array>(array)
            .map(|a| Value::Int(a.value(idx)))
            .unwrap_or(Value::Null),
        ArrowType::UInt8 => downcast::<UInt8Array>(array)
            .map(|a| Value::Int(a.value(idx) as i64))
            .unwrap_or(Value::Null),
        ArrowType::UInt16 => downcast::<UInt16Array>(array)
            .map(|a| Value::Int(a.value(idx) as i64))
            .unwrap_or(Value::Null),
        ArrowType::UInt32 => downcast::<UInt32Array>(array)
            .map(|a| Value::Int(a.value(idx) as i64))
            .unwrap_or(Value::Null),
        ArrowType::UInt64 => downcast::<UInt64Array>(array)
            .map(|a| {
                let v = a.value(idx);
                // u64 past i64::MAX keeps full precision as a numeric string
                match i64::try_from(v) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::Str(v.to_string()),
                }
            })
            .unwrap_or(Value::Null),
        ArrowType::Float32 => downcast::<Float32Array>(array)
            .map(|a| Value::Float(a.value(idx) as f64))
            .unwrap_or(Value::Null),
        ArrowType::Float64 => downcast::<Float64Array>(array)
            .map(|a| Value::Float(a.value(idx)))
            .unwrap_or(Value::Null),
        ArrowType::Utf8 => downcast::<StringArray>(array)
            .map(|a| Value::Str(a.value(idx).to_string()))
            .unwrap_or(Value::Null),
        ArrowType::LargeUtf8 => downcast::<LargeStringArray>(array)
            .map(|a| Value::Str(a.value(idx).to_string()))
            .unwrap_or(Value::Null),
        ArrowType::Date32 => downcast::<Date32Array>(array)
            .and_then(|a| a.value_as_date(idx))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Value::Date)
            .unwrap_or(Value::Null),
        ArrowType::Date64 => downcast::<Date64Array>(array)
            .and_then(|a| a.value_as_datetime(idx))
            .map(Value::Date)
            .unwrap_or(Value::Null),
        ArrowType::Timestamp(unit, _) => timestamp_value(array, idx, unit),
        ArrowType::List(_) => downcast::<ListArray>(array)
            .map(|a| {
                let inner = a.value(idx);
                Value::List((0..inner.len()).map(|j| array_value(&inner, j)).collect())
            })
            .unwrap_or(Value::Null),
        ArrowType::LargeList(_) => downcast::<LargeListArray>(array)
            .map(|a| {
                let inner = a.value(idx);
                Value::List((0..inner.len()).map(|j| array_value(&inner, j)).collect())
            })
            .unwrap_or(Value::Null),
        ArrowType::Struct(fields) => downcast::<StructArray>(array)
            .map(|a| {
                Value::Map(
                    fields
                        .iter()
                        .zip(a.columns())
                        .map(|(f, col)| (f.name().clone(), array_value(col, idx)))
                        .collect(),
                )
            })
            .unwrap_or(Value::Null),
        other => Value::Opaque(format!("{:?}", other)),
    }
}

fn timestamp_value(array: &ArrayRef, idx: usize, unit: &TimeUnit) -> Value {
    let dt: Option<NaiveDateTime> = match unit {
        TimeUnit::Second => downcast::<TimestampSecondArray>(array)
            .and_then(|a| a.value_as_datetime(idx)),
        TimeUnit::Millisecond => downcast::<TimestampMillisecondArray>(array)
            .and_then(|a| a.value_as_datetime(idx)),
        TimeUnit::Microsecond => downcast::<TimestampMicrosecondArray>(array)
            .and_then(|a| a.value_as_datetime(idx)),
        TimeUnit::Nanosecond => downcast::<TimestampNanosecondArray>(array)
            .and_then(|a| a.value_as_datetime(idx)),
    };
    dt.map(Value::Date).unwrap_or(Value::Null)
}
