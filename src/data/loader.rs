use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::error::ArrowError;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;

use super::model::{Record, Table, Value};
use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a season file, dispatching by extension.
///
/// Supported formats:
/// * `.parquet` – as written by the collector (`df.to_parquet()`)
/// * `.csv`     – header row; cell types are inferred per cell
///
/// `columns` restricts the load to the named columns, returned in the order
/// given. Every name must exist in the file. `None` or an empty slice loads
/// every column.
pub fn load_file(path: &Path, columns: Option<&[&str]>) -> Result<Table> {
    let columns = columns.filter(|c| !c.is_empty());
    match extension(path).as_str() {
        "parquet" | "pq" => load_parquet(path, columns),
        "csv" => load_csv(path, columns),
        other => Err(StoreError::UnsupportedFormat(other.to_string())),
    }
}

/// Row count of a season file without materializing it. Parquet files
/// answer from their footer; CSV files are scanned.
pub fn count_rows(path: &Path) -> Result<usize> {
    match extension(path).as_str() {
        "parquet" | "pq" => {
            let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
            let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
            Ok(builder.metadata().file_metadata().num_rows().max(0) as usize)
        }
        "csv" => {
            let mut reader = csv::Reader::from_path(path)?;
            let mut count = 0;
            for record in reader.records() {
                record?;
                count += 1;
            }
            Ok(count)
        }
        other => Err(StoreError::UnsupportedFormat(other.to_string())),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Check a projection against the columns a file actually has and drop
/// repeated names, keeping the requested order.
fn resolve_projection(requested: &[&str], available: &[String]) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(requested.len());
    for &col in requested {
        if !available.iter().any(|a| a == col) {
            return Err(StoreError::Schema {
                column: col.to_string(),
                available: available.to_vec(),
            });
        }
        if !names.iter().any(|n| n == col) {
            names.push(col.to_string());
        }
    }
    Ok(names)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet season file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Projection is pushed down to the
/// reader so unrequested columns are never decoded.
fn load_parquet(path: &Path, columns: Option<&[&str]>) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let file_schema = builder.schema().clone();
    let available: Vec<String> = file_schema
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let names = match columns {
        Some(requested) => resolve_projection(requested, &available)?,
        None => available,
    };

    let builder = if columns.is_some() {
        let roots = names
            .iter()
            .map(|n| file_schema.index_of(n))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
        builder.with_projection(mask)
    } else {
        builder
    };
    let reader = builder.build()?;

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    let mut batches = 0;
    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        // The reader yields columns in file order; map back to requested order.
        for (slot, name) in values.iter_mut().zip(&names) {
            let idx = schema.index_of(name)?;
            slot.extend(column_values(batch.column(idx))?);
        }
        batches += 1;
    }
    log::debug!(
        "read {} ({} columns, {batches} batches)",
        path.display(),
        names.len()
    );

    Ok(Table::from_columns(names.into_iter().zip(values).collect()))
}

// -- Arrow helpers --

/// Convert a whole Arrow column into cells. Integer, float, boolean, string,
/// dictionary and date/time columns are supported; anything else is cast to
/// text.
fn column_values(col: &ArrayRef) -> Result<Vec<Value>> {
    let values = match col.data_type() {
        DataType::Boolean => {
            let arr = col
                .as_boolean_opt()
                .ok_or_else(|| downcast_error(col, "BooleanArray"))?;
            arr.iter().map(|v| v.map_or(Value::Null, Value::Bool)).collect()
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let widened = cast(col, &DataType::Int64)?;
            let arr = widened
                .as_primitive_opt::<Int64Type>()
                .ok_or_else(|| downcast_error(col, "Int64Array"))?;
            arr.iter().map(|v| v.map_or(Value::Null, Value::Integer)).collect()
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let widened = cast(col, &DataType::Float64)?;
            let arr = widened
                .as_primitive_opt::<Float64Type>()
                .ok_or_else(|| downcast_error(col, "Float64Array"))?;
            arr.iter().map(|v| v.map_or(Value::Null, Value::float)).collect()
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            text_values(col)?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Date))
                .collect()
        }
        _ => text_values(col)?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::String))
            .collect(),
    };
    Ok(values)
}

fn text_values(col: &ArrayRef) -> Result<Vec<Option<String>>> {
    let text = cast(col, &DataType::Utf8)?;
    let arr = text
        .as_string_opt::<i32>()
        .ok_or_else(|| downcast_error(col, "StringArray"))?;
    Ok(arr.iter().map(|v| v.map(str::to_string)).collect())
}

fn downcast_error(col: &ArrayRef, expected: &str) -> StoreError {
    StoreError::Arrow(ArrowError::CastError(format!(
        "expected {expected} for {:?} column",
        col.data_type()
    )))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one pitch per line. Empty cells
/// are null.
fn load_csv(path: &Path, columns: Option<&[&str]>) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let names = match columns {
        Some(requested) => resolve_projection(requested, &headers)?,
        None => headers.clone(),
    };
    let indices: Vec<usize> = names
        .iter()
        .filter_map(|n| headers.iter().position(|h| h == n))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let values = indices
            .iter()
            .map(|&i| guess_value(record.get(i).unwrap_or("")))
            .collect();
        rows.push(Record::new(values));
    }
    log::debug!("read {} ({} rows)", path.display(), rows.len());

    Ok(Table::new(names, rows))
}

fn guess_value(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::float(f);
    }
    if s == "true" || s == "false" || s == "True" || s == "False" {
        return Value::Bool(s.eq_ignore_ascii_case("true"));
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{
        DictionaryArray, Float32Array, Int32Array, StringArray, TimestampNanosecondArray,
    };
    use arrow::datatypes::Int32Type;

    use super::*;

    #[test]
    fn guess_value_types() {
        assert_eq!(Value::Null, guess_value(""));
        assert_eq!(Value::Integer(11), guess_value("11"));
        assert_eq!(Value::Float(97.5), guess_value("97.5"));
        assert_eq!(Value::Null, guess_value("NaN"));
        assert_eq!(Value::Bool(true), guess_value("True"));
        assert_eq!(Value::from("FF"), guess_value("FF"));
    }

    #[test]
    fn resolve_projection_rejects_unknown_columns() {
        let available = vec!["zone".to_string(), "description".to_string()];
        let names = resolve_projection(&["description", "zone", "zone"], &available).unwrap();
        assert_eq!(vec!["description", "zone"], names);

        let err = resolve_projection(&["bat_speed"], &available).unwrap_err();
        assert!(matches!(err, StoreError::Schema { ref column, .. } if column == "bat_speed"));
    }

    #[test]
    fn float32_nan_and_null_become_null() {
        let col: ArrayRef = Arc::new(Float32Array::from(vec![Some(95.5), None, Some(f32::NAN)]));
        let values = column_values(&col).unwrap();
        assert_eq!(vec![Value::Float(95.5), Value::Null, Value::Null], values);
    }

    #[test]
    fn int32_widens_to_integer() {
        let col: ArrayRef = Arc::new(Int32Array::from(vec![Some(2024), None]));
        assert_eq!(
            vec![Value::Integer(2024), Value::Null],
            column_values(&col).unwrap()
        );
    }

    #[test]
    fn dictionary_strings_decode() {
        let dict: DictionaryArray<Int32Type> =
            vec![Some("FF"), Some("SL"), None, Some("FF")].into_iter().collect();
        let col: ArrayRef = Arc::new(dict);
        assert_eq!(
            vec!["FF".into(), "SL".into(), Value::Null, "FF".into()],
            column_values(&col).unwrap()
        );
    }

    #[test]
    fn timestamps_become_dates() {
        let col: ArrayRef = Arc::new(TimestampNanosecondArray::from(vec![0_i64]));
        let values = column_values(&col).unwrap();
        match &values[0] {
            Value::Date(text) => assert!(text.starts_with("1970-01-01"), "{text}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_strings_pass_through() {
        let col: ArrayRef = Arc::new(StringArray::from(vec![Some("ball"), None]));
        assert_eq!(
            vec![Value::from("ball"), Value::Null],
            column_values(&col).unwrap()
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("statcast_2024.feather"), None).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(ref ext) if ext == "feather"));
    }
}
