use std::collections::{BTreeMap, BTreeSet};

use super::model::{Table, Value};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// A column absent from the map is unconstrained.
pub type FilterState = BTreeMap<String, BTreeSet<Value>>;

/// A filter with a single column constraint.
pub fn select(column: &str, values: impl IntoIterator<Item = Value>) -> FilterState {
    FilterState::from([(column.to_string(), values.into_iter().collect())])
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * The column is not present in `filters` → passes (no constraint)
/// * The filter set for that column is empty → nothing selected → fails
/// * The row's value for that column is in the selected set → passes
///
/// Filtering on a column the table lacks is a
/// [`StoreError::Schema`](crate::StoreError::Schema).
pub fn filtered_indices(table: &Table, filters: &FilterState) -> Result<Vec<usize>> {
    let resolved = filters
        .iter()
        .map(|(col, selected)| Ok((table.column_index(col)?, selected)))
        .collect::<Result<Vec<(usize, &BTreeSet<Value>)>>>()?;

    Ok(table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            resolved
                .iter()
                .all(|(idx, selected)| selected.contains(row.get(*idx)))
        })
        .map(|(i, _)| i)
        .collect())
}

impl Table {
    /// Rows passing `filters`, in original order.
    pub fn filter(&self, filters: &FilterState) -> Result<Table> {
        Ok(self.select_rows(&filtered_indices(self, filters)?))
    }
}

/// Split a table by the values of `column`, preserving row order within
/// each part. Typical use is one part per `game_year`.
pub fn partition_by(table: &Table, column: &str) -> Result<BTreeMap<Value, Table>> {
    let idx = table.column_index(column)?;
    let mut groups: BTreeMap<Value, Vec<usize>> = BTreeMap::new();
    for (i, row) in table.rows.iter().enumerate() {
        groups.entry(row.get(idx).clone()).or_default().push(i);
    }
    Ok(groups
        .into_iter()
        .map(|(key, indices)| (key, table.select_rows(&indices)))
        .collect())
}
