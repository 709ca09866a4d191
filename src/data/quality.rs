//! Read-only inspections of the table, plus the one destructive clean-up pass.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::filter::{duplicate_rows, rows_equal, RangeRule};
use super::model::{columns, CellValue, ColumnKind, Table};
use super::store::Dataset;
use crate::error::{DatasetError, Result};

/// Oldest release year considered valid.
pub const MIN_YEAR: i32 = 1900;

/// Genre value the upstream dataset uses for songs without any genre.
pub const PLACEHOLDER_GENRE: &str = "set()";

// ---------------------------------------------------------------------------
// Nulls, unique values, shape
// ---------------------------------------------------------------------------

pub fn count_nulls(table: &Table) -> usize {
    table
        .rows()
        .iter()
        .flatten()
        .filter(|cell| cell.is_null())
        .count()
}

/// For every column, whether it holds at least one null.
pub fn nulls_per_column(table: &Table) -> Vec<(String, bool)> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let any = table.rows().iter().any(|row| row[idx].is_null());
            (name.clone(), any)
        })
        .collect()
}

/// Distinct values per column; null counts as one value.
pub fn count_unique_per_column(table: &Table) -> Vec<(String, usize)> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let distinct: BTreeSet<&CellValue> = table.rows().iter().map(|row| &row[idx]).collect();
            (name.clone(), distinct.len())
        })
        .collect()
}

/// Shape and column kinds of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub rows: usize,
    pub columns: Vec<(String, ColumnKind)>,
}

impl TableInfo {
    pub fn to_table(&self) -> Table {
        let mut pairs = vec![
            ("Rows".to_string(), self.rows.to_string()),
            ("Columns".to_string(), self.columns.len().to_string()),
        ];
        pairs.extend(
            self.columns
                .iter()
                .map(|(name, kind)| (name.clone(), kind.to_string())),
        );
        Table::from_pairs("Column name", "Dtype", pairs)
    }
}

pub fn table_info(table: &Table) -> TableInfo {
    TableInfo {
        rows: table.len(),
        columns: table
            .schema()
            .columns
            .into_iter()
            .map(|c| (c.name, c.kind))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

const SUMMARY_COLUMNS: [&str; 12] = [
    "column", "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// Descriptive statistics, one row per column of `table`.
///
/// Numeric columns get count, mean, sample std, min, quartiles and max.
/// Every other column gets count, unique, top and freq.
pub fn summary_statistics(table: &Table) -> Table {
    let schema = table.schema();
    let mut rows = Vec::with_capacity(schema.columns.len());

    for (idx, column) in schema.columns.iter().enumerate() {
        let present: Vec<&CellValue> = table
            .rows()
            .iter()
            .map(|row| &row[idx])
            .filter(|c| !c.is_null())
            .collect();

        let mut row = vec![CellValue::Null; SUMMARY_COLUMNS.len()];
        row[0] = column.name.clone().into();
        row[1] = present.len().into();

        if column.kind.is_numeric() {
            let mut values: Vec<f64> = present.iter().filter_map(|c| c.as_f64()).collect();
            values.sort_by(f64::total_cmp);
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            row[5] = mean.into();
            if values.len() > 1 {
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
                row[6] = var.sqrt().into();
            }
            row[7] = values.first().copied().into();
            row[8] = percentile(&values, 0.25).into();
            row[9] = percentile(&values, 0.50).into();
            row[10] = percentile(&values, 0.75).into();
            row[11] = values.last().copied().into();
        } else {
            let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
            for &cell in &present {
                *counts.entry(cell).or_default() += 1;
            }
            row[2] = counts.len().into();
            // Ties resolve to the smallest value: max_by_key keeps the last
            // maximum, so iterate in reverse order.
            if let Some((top, freq)) = counts.iter().rev().max_by_key(|(_, n)| **n) {
                row[3] = (*top).clone();
                row[4] = (*freq).into();
            }
        }

        rows.push(row);
    }
    Table::from_parts(SUMMARY_COLUMNS.map(String::from).to_vec(), rows)
}

/// Linear interpolation between closest ranks, on sorted input.
fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

// ---------------------------------------------------------------------------
// Outliers and duplicates
// ---------------------------------------------------------------------------

/// Why a row was flagged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Flag {
    OutOfRange { column: String },
    PlaceholderGenre,
    Duplicate,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::OutOfRange { column } => write!(f, "{column} out of range"),
            Flag::PlaceholderGenre => write!(f, "genre is {PLACEHOLDER_GENRE}"),
            Flag::Duplicate => write!(f, "duplicate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedRow {
    /// Position of the row in the table that was scanned.
    pub index: usize,
    pub flags: Vec<Flag>,
    pub cells: Vec<CellValue>,
}

/// Rows found by [`find_outliers_and_duplicates`], ordered by position.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    pub columns: Vec<String>,
    pub rows: Vec<FlaggedRow>,
}

impl OutlierReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|r| r.index)
    }

    /// The flagged rows with their position and reasons in front.
    pub fn to_table(&self) -> Table {
        let header = ["row", "flags"]
            .into_iter()
            .map(String::from)
            .chain(self.columns.iter().cloned())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|flagged| {
                let reasons = flagged
                    .flags
                    .iter()
                    .map(Flag::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                let mut row: Vec<CellValue> = vec![flagged.index.into(), reasons.into()];
                row.extend(flagged.cells.iter().cloned());
                row
            })
            .collect();
        Table::from_parts(header, rows)
    }
}

/// Outcome of [`Dataset::detect_outliers_and_duplicates`].
#[derive(Debug, Clone, PartialEq)]
pub enum CleaningOutcome {
    /// These rows were removed from the table.
    Found(OutlierReport),
    /// Nothing was flagged; the table is unchanged.
    NoneFound,
}

fn range_rules(current_year: i32) -> Vec<RangeRule> {
    let mut rules: Vec<RangeRule> = columns::UNIT_INTERVAL
        .iter()
        .map(|column| RangeRule::new(*column, 0.0, 1.0))
        .collect();
    rules.push(RangeRule::new(
        columns::YEAR,
        f64::from(MIN_YEAR),
        f64::from(current_year),
    ));
    rules.push(RangeRule::new(columns::POPULARITY, 0.0, 100.0));
    rules
}

/// Flag out-of-range values, placeholder genres and repeated rows.
/// Returns `None` when nothing was flagged. The table is not modified.
pub fn find_outliers_and_duplicates(
    table: &Table,
    current_year: i32,
) -> Result<Option<OutlierReport>> {
    let mut flags: BTreeMap<usize, Vec<Flag>> = BTreeMap::new();

    for rule in range_rules(current_year) {
        let hits = rule.violations(table)?;
        if hits.is_empty() {
            log::debug!("No outliers detected in column '{}'", rule.column);
        } else {
            log::info!("Outliers detected in column '{}': rows {hits:?}", rule.column);
        }
        for idx in hits {
            flags.entry(idx).or_default().push(Flag::OutOfRange {
                column: rule.column.clone(),
            });
        }
    }

    let placeholder = rows_equal(table, columns::GENRE, &PLACEHOLDER_GENRE.into())?;
    if !placeholder.is_empty() {
        log::info!("Placeholder genre detected: rows {placeholder:?}");
    }
    for idx in placeholder {
        flags.entry(idx).or_default().push(Flag::PlaceholderGenre);
    }

    let duplicates = duplicate_rows(table);
    if !duplicates.is_empty() {
        log::info!("Duplicates detected: rows {duplicates:?}");
    }
    for idx in duplicates {
        flags.entry(idx).or_default().push(Flag::Duplicate);
    }

    if flags.is_empty() {
        return Ok(None);
    }

    let rows = flags
        .into_iter()
        .filter_map(|(index, flags)| {
            table.row(index).map(|cells| FlaggedRow {
                index,
                flags,
                cells: cells.to_vec(),
            })
        })
        .collect();
    Ok(Some(OutlierReport {
        columns: table.columns().to_vec(),
        rows,
    }))
}

/// Find flagged rows and remove them from `table`.
pub fn clean_outliers_and_duplicates(
    table: &mut Table,
    current_year: i32,
) -> Result<CleaningOutcome> {
    let Some(report) = find_outliers_and_duplicates(table, current_year)? else {
        log::info!("No outliers or duplicates detected in any of the columns");
        return Ok(CleaningOutcome::NoneFound);
    };

    let flagged: BTreeSet<usize> = report.indices().collect();
    table.retain_rows(|idx| !flagged.contains(&idx));
    log::info!(
        "Removed {} outlier and duplicate rows, {} rows remain",
        flagged.len(),
        table.len()
    );
    Ok(CleaningOutcome::Found(report))
}

// ---------------------------------------------------------------------------
// Year span
// ---------------------------------------------------------------------------

/// First and last release year. Years keep their float value, as a
/// fractional year in the data is reported as is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearSpan {
    pub start: f64,
    pub end: f64,
    pub span: f64,
}

impl YearSpan {
    pub fn to_table(&self) -> Table {
        Table::from_pairs(
            "Dataset duration",
            "Years",
            [
                ("Start year".to_string(), self.start),
                ("End year".to_string(), self.end),
                ("Duration".to_string(), self.span),
            ],
        )
    }
}

pub fn dataset_duration(table: &Table) -> Result<YearSpan> {
    let years: Vec<f64> = table
        .column_values(columns::YEAR)?
        .filter_map(CellValue::as_f64)
        .collect();
    let start = years.iter().copied().min_by(f64::total_cmp);
    let end = years.iter().copied().max_by(f64::total_cmp);
    let (Some(start), Some(end)) = (start, end) else {
        return Err(DatasetError::EmptyColumn(columns::YEAR.to_string()));
    };
    Ok(YearSpan {
        start,
        end,
        span: end - start,
    })
}

// ---------------------------------------------------------------------------
// Store entry points
// ---------------------------------------------------------------------------

impl Dataset {
    pub fn count_nulls(&self) -> Result<usize> {
        Ok(count_nulls(self.current()?))
    }

    pub fn nulls_per_column(&self) -> Result<Vec<(String, bool)>> {
        Ok(nulls_per_column(self.current()?))
    }

    pub fn count_unique_per_column(&self) -> Result<Vec<(String, usize)>> {
        Ok(count_unique_per_column(self.current()?))
    }

    pub fn table_info(&self) -> Result<TableInfo> {
        Ok(table_info(self.current()?))
    }

    pub fn summary_statistics(&self) -> Result<Table> {
        Ok(summary_statistics(self.current()?))
    }

    /// Remove every out-of-range, placeholder-genre and duplicate row.
    /// Running it again right after finds nothing.
    pub fn detect_outliers_and_duplicates(&mut self, current_year: i32) -> Result<CleaningOutcome> {
        clean_outliers_and_duplicates(self.current_mut()?, current_year)
    }

    pub fn dataset_duration(&self) -> Result<YearSpan> {
        dataset_duration(self.current()?)
    }
}
