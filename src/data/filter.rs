use std::collections::HashSet;

use super::model::{CellValue, Table};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Row predicates: which row positions match a condition
// ---------------------------------------------------------------------------

/// Inclusive valid range for a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRule {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl RangeRule {
    pub fn new(column: impl Into<String>, min: f64, max: f64) -> Self {
        RangeRule {
            column: column.into(),
            min,
            max,
        }
    }

    /// Positions of rows whose value lies outside `[min, max]`.
    ///
    /// Nulls and non-numeric cells never violate the rule.
    pub fn violations(&self, table: &Table) -> Result<Vec<usize>> {
        Ok(table
            .column_values(&self.column)?
            .enumerate()
            .filter(|(_, cell)| {
                cell.as_f64()
                    .is_some_and(|v| v < self.min || v > self.max)
            })
            .map(|(i, _)| i)
            .collect())
    }
}

/// Positions of rows whose `column` equals `value`.
pub fn rows_equal(table: &Table, column: &str, value: &CellValue) -> Result<Vec<usize>> {
    Ok(table
        .column_values(column)?
        .enumerate()
        .filter(|(_, cell)| *cell == value)
        .map(|(i, _)| i)
        .collect())
}

/// Positions of rows identical in every column to an earlier row.
/// The first occurrence of each distinct row is not reported.
pub fn duplicate_rows(table: &Table) -> Vec<usize> {
    let mut seen: HashSet<&[CellValue]> = HashSet::with_capacity(table.len());
    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| !seen.insert(row.as_slice()))
        .map(|(i, _)| i)
        .collect()
}
