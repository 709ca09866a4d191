use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{DatasetError, Result};

/// Names of the columns the analysis knows about.
pub mod columns {
    pub const ARTIST: &str = "artist";
    pub const SONG: &str = "song";
    pub const DURATION_MS: &str = "duration_ms";
    pub const DURATION_MINUTES: &str = "duration_minutes";
    pub const EXPLICIT: &str = "explicit";
    pub const YEAR: &str = "year";
    pub const POPULARITY: &str = "popularity";
    pub const GENRE: &str = "genre";
    pub const SUBGENRES: &str = "subgenres";
    pub const YEARS_AGO: &str = "years_ago";

    /// Audio features expected to lie in `[0.0, 1.0]`.
    pub const UNIT_INTERVAL: [&str; 7] = [
        "danceability",
        "energy",
        "speechiness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "valence",
    ];
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Values are counted and de-duplicated through `BTreeSet`/`HashSet`, so
/// `CellValue` must be `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so floats (NaN included) have a total order --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<usize> for CellValue {
    fn from(n: usize) -> Self {
        CellValue::Integer(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

impl CellValue {
    /// Interpret the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn kind(&self) -> Option<ColumnKind> {
        match self {
            CellValue::String(_) => Some(ColumnKind::Text),
            CellValue::Integer(_) => Some(ColumnKind::Integer),
            CellValue::Float(_) => Some(ColumnKind::Float),
            CellValue::Bool(_) => Some(ColumnKind::Bool),
            CellValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TableSchema – column names and their inferred kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    /// Non-null values of more than one kind.
    Mixed,
    /// Only nulls (or no rows at all).
    Empty,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "object",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

/// Snapshot of a table's columns, taken once at the start of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }
}

// ---------------------------------------------------------------------------
// Table – the in-memory dataset
// ---------------------------------------------------------------------------

/// Ordered columns and ordered rows; every row is exactly as wide as the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// An empty table with the given header.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from a header and rows, rejecting malformed input.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let table = Table { columns, rows };
        table.validate()?;
        Ok(table)
    }

    /// Table whose rows are produced together with its header, so their width
    /// is fixed by the caller. Report tables inside the crate use this.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let table = Table { columns, rows };
        debug_assert!(table.validate().is_ok(), "malformed report table");
        table
    }

    /// Two-column table from `(key, value)` pairs, used for display reports.
    pub fn from_pairs<V: Into<CellValue>>(
        key_header: &str,
        value_header: &str,
        pairs: impl IntoIterator<Item = (String, V)>,
    ) -> Self {
        Table {
            columns: vec![key_header.to_string(), value_header.to_string()],
            rows: pairs
                .into_iter()
                .map(|(k, v)| vec![CellValue::String(k), v.into()])
                .collect(),
        }
    }

    /// Check that the header has unique names and every row matches its width.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for name in &self.columns {
            if !seen.insert(name.as_str()) {
                return Err(DatasetError::InvalidInput(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }
        if let Some((i, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.columns.len())
        {
            return Err(DatasetError::InvalidInput(format!(
                "row {i} has {} cells but the header has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DatasetError::ColumnNotFound(name.to_string()))
    }

    /// Iterate over one column's cells in row order.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn schema(&self) -> TableSchema {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let mut kind = ColumnKind::Empty;
                for cell_kind in self.rows.iter().filter_map(|row| row[idx].kind()) {
                    kind = match (kind, cell_kind) {
                        (ColumnKind::Empty, k) => k,
                        (a, b) if a == b => a,
                        (ColumnKind::Integer, ColumnKind::Float)
                        | (ColumnKind::Float, ColumnKind::Integer) => ColumnKind::Float,
                        _ => ColumnKind::Mixed,
                    };
                    if kind == ColumnKind::Mixed {
                        break;
                    }
                }
                ColumnSchema {
                    name: name.clone(),
                    kind,
                }
            })
            .collect();
        TableSchema { columns }
    }

    /// Append a row, rejecting it if its width does not match the header.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DatasetError::InvalidInput(format!(
                "row has {} cells but the header has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Overwrite a column if it exists, otherwise append it at the end.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(DatasetError::InvalidInput(format!(
                "column '{name}' has {} values but the table has {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        match self.columns.iter().position(|c| c == name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        if from != to && self.has_column(to) {
            return Err(DatasetError::InvalidInput(format!(
                "cannot rename '{from}' to '{to}': column already exists"
            )));
        }
        let idx = self.column_index(from)?;
        self.columns[idx] = to.to_string();
        Ok(())
    }

    /// Keep only the rows whose position satisfies `keep`.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut idx = 0;
        self.rows.retain(|_| {
            let kept = keep(idx);
            idx += 1;
            kept
        });
    }

    /// Copy of the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Copy of the table ordered by `column`, largest first. Ties keep their order.
    pub fn sorted_desc_by(&self, column: &str) -> Result<Table> {
        let idx = self.column_index(column)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b[idx].cmp(&a[idx]));
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["song".into(), "popularity".into()],
            vec![
                vec!["a".into(), CellValue::Integer(10)],
                vec!["b".into(), CellValue::Integer(80)],
                vec!["c".into(), CellValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Integer(1)]],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidInput(_)));
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let err = Table::from_rows(vec!["a".into(), "a".into()], Vec::new()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidInput(_)));
    }

    #[test]
    fn missing_column_reports_its_name() {
        let err = sample().column_index("genre").unwrap_err();
        assert!(matches!(err, DatasetError::ColumnNotFound(name) if name == "genre"));
    }

    #[test]
    fn schema_promotes_integers_mixed_with_floats() {
        let table = Table::from_rows(
            vec!["x".into(), "y".into(), "z".into()],
            vec![
                vec![CellValue::Integer(1), "a".into(), CellValue::Null],
                vec![CellValue::Float(0.5), CellValue::Integer(2), CellValue::Null],
            ],
        )
        .unwrap();
        let schema = table.schema();
        assert_eq!(schema.kind_of("x"), Some(ColumnKind::Float));
        assert_eq!(schema.kind_of("y"), Some(ColumnKind::Mixed));
        assert_eq!(schema.kind_of("z"), Some(ColumnKind::Empty));
        assert!(!schema.contains("w"));
    }

    #[test]
    fn set_column_appends_then_overwrites() {
        let mut table = sample();
        table
            .set_column("rank", vec![1i64.into(), 2i64.into(), 3i64.into()])
            .unwrap();
        assert_eq!(table.columns().last().map(String::as_str), Some("rank"));
        table
            .set_column("rank", vec![CellValue::Null, CellValue::Null, CellValue::Null])
            .unwrap();
        assert_eq!(table.width(), 3);
        assert!(table.column_values("rank").unwrap().all(CellValue::is_null));
    }

    #[test]
    fn sorted_desc_puts_nulls_last() {
        let sorted = sample().sorted_desc_by("popularity").unwrap();
        let songs: Vec<_> = sorted.column_values("song").unwrap().cloned().collect();
        assert_eq!(songs, vec!["b".into(), "a".into(), CellValue::from("c")]);
    }

    #[test]
    fn float_nan_equals_itself() {
        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
    }
}
