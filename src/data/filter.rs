use std::collections::HashSet;

use super::model::{Cell, Field, Table};
use super::DataError;

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Rows appended at the bottom of every sheet (totals, notes, blanks) that are
/// cut from a projection longer than this.
pub const TRAILING_SUMMARY_ROWS: usize = 7;

/// Select `columns` from `table`, in the given order, keeping every row.
pub fn project(table: &Table, columns: &[Field]) -> Result<Table, DataError> {
    let indices: Vec<usize> = columns
        .iter()
        .map(|&field| {
            table
                .column_index(field)
                .ok_or(DataError::UnknownColumn(field))
        })
        .collect::<Result<_, _>>()?;

    let rows = table
        .rows
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();

    Ok(Table::new(columns.to_vec(), rows))
}

/// Cut the trailing [`TRAILING_SUMMARY_ROWS`] rows when the table is longer
/// than that; shorter tables are returned unchanged.
pub fn drop_trailing_summary(mut table: Table) -> Table {
    if table.len() > TRAILING_SUMMARY_ROWS {
        let keep = table.len() - TRAILING_SUMMARY_ROWS;
        table.rows.truncate(keep);
    }
    table
}

// ---------------------------------------------------------------------------
// Equality filter
// ---------------------------------------------------------------------------

/// One field compared for equality against one value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub field: Field,
    pub value: Cell,
}

/// Distinct non-missing values of `field`, in first-seen order.
pub fn unique_values(table: &Table, field: Field) -> Result<Vec<Cell>, DataError> {
    let column = table
        .column(field)
        .ok_or(DataError::UnknownColumn(field))?;

    let mut seen = HashSet::new();
    Ok(column
        .filter(|cell| !cell.is_missing())
        .filter(|cell| seen.insert((*cell).clone()))
        .cloned()
        .collect())
}

/// Pick the value to filter on: the requested one when it is a candidate,
/// otherwise the first candidate. `None` only when there are no candidates.
pub fn resolve_value(candidates: &[Cell], requested: Option<&Cell>) -> Option<Cell> {
    match requested {
        Some(value) if candidates.contains(value) => Some(value.clone()),
        _ => candidates.first().cloned(),
    }
}

/// Rows whose `field` equals `value`, schema unchanged.
pub fn filter_eq(table: &Table, field: Field, value: &Cell) -> Result<Table, DataError> {
    let idx = table
        .column_index(field)
        .ok_or(DataError::UnknownColumn(field))?;

    let rows = table
        .rows
        .iter()
        .filter(|row| row[idx] == *value)
        .cloned()
        .collect();

    Ok(Table::new(table.columns.clone(), rows))
}

/// Result of [`apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Matching records; empty when there were no candidates.
    pub table: Table,
    /// The value actually filtered on.
    pub value: Option<Cell>,
    /// Distinct values the field offered.
    pub candidates: Vec<Cell>,
}

/// Apply a [`FilterSpec`], substituting the first available value of the
/// field when the requested one is not present. A missing value (such as
/// [`Cell::Empty`]) is never a candidate, so it always selects the first.
pub fn apply(table: &Table, spec: &FilterSpec) -> Result<FilterOutcome, DataError> {
    let candidates = unique_values(table, spec.field)?;
    let value = resolve_value(&candidates, Some(&spec.value));
    let filtered = match &value {
        Some(value) => filter_eq(table, spec.field, value)?,
        None => Table::new(table.columns.clone(), Vec::new()),
    };
    Ok(FilterOutcome {
        table: filtered,
        value,
        candidates,
    })
}
