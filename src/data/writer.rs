use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::{Table, Value};
use crate::error::{Result, StoreError};

/// Write `table` as a single-batch Parquet file.
///
/// Column types are inferred from the cells: integer-only columns become
/// `Int64`, numeric columns with any float become `Float64`, boolean-only
/// columns become `Boolean`, and everything else (including dates and
/// all-null columns) is written as `Utf8`.
pub fn write_parquet(path: &Path, table: &Table) -> Result<()> {
    let mut fields = Vec::with_capacity(table.column_names.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.column_names.len());

    for (idx, name) in table.column_names.iter().enumerate() {
        let cells = table.rows.iter().map(|r| r.get(idx));
        let (data_type, array): (DataType, ArrayRef) = match infer_type(cells.clone()) {
            DataType::Int64 => (
                DataType::Int64,
                Arc::new(cells.map(Value::as_i64).collect::<Int64Array>()),
            ),
            DataType::Float64 => (
                DataType::Float64,
                Arc::new(cells.map(Value::as_f64).collect::<Float64Array>()),
            ),
            DataType::Boolean => (
                DataType::Boolean,
                Arc::new(
                    cells
                        .map(|v| match v {
                            Value::Bool(b) => Some(*b),
                            _ => None,
                        })
                        .collect::<BooleanArray>(),
                ),
            ),
            _ => (
                DataType::Utf8,
                Arc::new(
                    cells
                        .map(|v| (!v.is_null()).then(|| v.to_string()))
                        .collect::<StringArray>(),
                ),
            ),
        };
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = if arrays.is_empty() {
        RecordBatch::new_empty(schema.clone())
    } else {
        RecordBatch::try_new(schema.clone(), arrays)?
    };

    let file = std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    log::debug!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write `table` as CSV with a header row; nulls are empty cells.
pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.column_names)?;
    for row in &table.rows {
        writer.write_record(row.values.iter().map(|v| match v {
            Value::Null => String::new(),
            Value::Float(f) => format!("{f:?}"),
            other => other.to_string(),
        }))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a Value>) -> DataType {
    let mut inferred: Option<DataType> = None;
    for cell in cells {
        let cell_type = match cell {
            Value::Null => continue,
            Value::Integer(_) => DataType::Int64,
            Value::Float(_) => DataType::Float64,
            Value::Bool(_) => DataType::Boolean,
            Value::String(_) | Value::Date(_) => return DataType::Utf8,
        };
        inferred = Some(match (inferred, cell_type) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(DataType::Int64), DataType::Float64) | (Some(DataType::Float64), DataType::Int64) => {
                DataType::Float64
            }
            _ => return DataType::Utf8,
        });
    }
    inferred.unwrap_or(DataType::Utf8)
}
