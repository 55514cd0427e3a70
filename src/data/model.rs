use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Result, StoreError};

// ---------------------------------------------------------------------------
// Value – a single cell of a season table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the column types the collector writes.
///
/// Cells serve as filter selections and grouping keys, so `Value` is totally
/// ordered. Equality, ordering and hashing all compare floats bitwise through
/// `total_cmp`, which keeps `-0.0` and `0.0` distinct in all three.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date or timestamp kept as text.
    Date(String),
    Null,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        // nulls sort first, then booleans, numbers and text
        fn rank(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) | Value::Date(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl Value {
    /// A float cell, with `NaN` stored as missing.
    pub fn float(v: f64) -> Self {
        if v.is_nan() {
            Value::Null
        } else {
            Value::Float(v)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Integer view; floats with no fractional part qualify because pandas
    /// stores nullable integer columns (e.g. `zone`) as floats.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of a table
// ---------------------------------------------------------------------------

/// One pitch (or one plate appearance, after aggregation). Cells are aligned
/// with the owning table's `column_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, idx: usize) -> &Value {
        &self.values[idx]
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded dataset
// ---------------------------------------------------------------------------

/// An in-memory table of pitch events, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Ordered column names.
    pub column_names: Vec<String>,
    /// All rows, in file order.
    pub rows: Vec<Record>,
}

impl Table {
    /// # Panics
    ///
    /// If any row's width differs from the number of columns.
    pub fn new(column_names: Vec<String>, rows: Vec<Record>) -> Self {
        if let Some(pos) = rows.iter().position(|r| r.values.len() != column_names.len()) {
            panic!(
                "row {pos} has {} cells but the table has {} columns",
                rows[pos].values.len(),
                column_names.len()
            );
        }
        Self { column_names, rows }
    }

    /// Build a table from whole columns of equal length.
    ///
    /// # Panics
    ///
    /// If the columns differ in length.
    pub fn from_columns(columns: Vec<(String, Vec<Value>)>) -> Self {
        let n_rows = columns.first().map_or(0, |(_, values)| values.len());
        let mut rows: Vec<Record> = (0..n_rows)
            .map(|_| Record::new(Vec::with_capacity(columns.len())))
            .collect();
        let mut column_names = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            assert_eq!(n_rows, values.len(), "column '{name}' length");
            for (row, value) in rows.iter_mut().zip(values) {
                row.values.push(value);
            }
            column_names.push(name);
        }
        Self { column_names, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    /// Position of `name`. This is the single place a missing column turns
    /// into a schema error.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.column_names
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| StoreError::Schema {
                column: name.to_string(),
                available: self.column_names.clone(),
            })
    }

    /// Cells of one column, in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |r| r.get(idx)))
    }

    /// Sorted distinct values of a column.
    pub fn unique_values(&self, name: &str) -> Result<BTreeSet<Value>> {
        Ok(self.column(name)?.cloned().collect())
    }

    /// Keep only `columns`, in the order given. Duplicate names are kept once.
    pub fn project(&self, columns: &[&str]) -> Result<Table> {
        let mut names: Vec<String> = Vec::with_capacity(columns.len());
        let mut indices = Vec::with_capacity(columns.len());
        for &col in columns {
            if names.iter().any(|n| n == col) {
                continue;
            }
            indices.push(self.column_index(col)?);
            names.push(col.to_string());
        }
        let rows = self
            .rows
            .iter()
            .map(|r| Record::new(indices.iter().map(|&i| r.get(i).clone()).collect()))
            .collect();
        Ok(Table::new(names, rows))
    }

    /// Rows at `indices`, in the order given.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table::new(
            self.column_names.clone(),
            indices.iter().map(|&i| self.rows[i].clone()).collect(),
        )
    }

    /// Stack tables vertically, preserving input order.
    ///
    /// The result's columns are the union of the inputs' columns in
    /// first-seen order; a table lacking a column contributes `Null` cells.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut column_names: Vec<String> = Vec::new();
        for table in &tables {
            for name in &table.column_names {
                if !column_names.contains(name) {
                    column_names.push(name.clone());
                }
            }
        }

        let total: usize = tables.iter().map(Table::len).sum();
        let mut rows = Vec::with_capacity(total);
        for table in tables {
            if table.column_names == column_names {
                rows.extend(table.rows);
                continue;
            }
            let lookup: BTreeMap<&str, usize> = table
                .column_names
                .iter()
                .enumerate()
                .map(|(i, n)| (n.as_str(), i))
                .collect();
            let mapping: Vec<Option<usize>> = column_names
                .iter()
                .map(|n| lookup.get(n.as_str()).copied())
                .collect();
            for row in table.rows {
                let values = mapping
                    .iter()
                    .map(|m| m.map_or(Value::Null, |i| row.values[i].clone()))
                    .collect();
                rows.push(Record::new(values));
            }
        }
        Table { column_names, rows }
    }
}
