use chrono::Datelike;

use super::model::{columns, CellValue, Table};
use super::store::Dataset;
use crate::error::{DatasetError, Result};

/// Result of [`separate_genres`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreSplit {
    /// `genre` now holds the main genre and `subgenres` the remainder.
    Split { with_subgenres: usize },
    /// A `subgenres` column already exists; the table was left as is.
    AlreadySplit,
}

/// Calendar year of the local clock, for callers of the year-relative operations.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Split a genre list on its first `", "` into main genre and the rest.
pub fn split_genre(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once(", ") {
        Some((main, rest)) => (main, Some(rest)),
        None => (raw, None),
    }
}

/// Rewrite `duration_ms` as minutes rounded to one decimal and rename the
/// column to `duration_minutes`. The table is untouched on error.
pub fn convert_duration_to_minutes(table: &mut Table) -> Result<()> {
    let idx = table.column_index(columns::DURATION_MS)?;
    if table.has_column(columns::DURATION_MINUTES) {
        return Err(DatasetError::InvalidInput(format!(
            "column '{}' already exists",
            columns::DURATION_MINUTES
        )));
    }
    let minutes = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| match &cells[idx] {
            CellValue::Null => Ok(CellValue::Null),
            cell => cell
                .as_f64()
                .map(|ms| CellValue::Float(ms_to_minutes(ms)))
                .ok_or_else(|| not_numeric(columns::DURATION_MS, row, cell)),
        })
        .collect::<Result<Vec<_>>>()?;

    table.set_column(columns::DURATION_MS, minutes)?;
    table.rename_column(columns::DURATION_MS, columns::DURATION_MINUTES)?;
    log::info!("Converted {} durations to minutes", table.len());
    Ok(())
}

/// Minutes rounded half-to-even on the exact binary value, so 3.25 gives
/// 3.2 and 0.15 (stored just below) gives 0.1.
fn ms_to_minutes(ms: f64) -> f64 {
    let minutes = ms / 60_000.0;
    format!("{minutes:.1}").parse().unwrap_or(minutes)
}

/// Split `genre` into main genre and a new `subgenres` column.
///
/// A table that already has `subgenres` is left alone: its `genre` column no
/// longer carries the subgenre list and splitting again would erase it.
pub fn separate_genres(table: &mut Table) -> Result<GenreSplit> {
    if table.schema().contains(columns::SUBGENRES) {
        log::warn!("Genres already split between genre and subgenres columns, nothing to do");
        return Ok(GenreSplit::AlreadySplit);
    }

    let (main, sub): (Vec<CellValue>, Vec<CellValue>) = table
        .column_values(columns::GENRE)?
        .map(|cell| match cell {
            CellValue::String(raw) => {
                let (main, sub) = split_genre(raw);
                (CellValue::from(main), CellValue::from(sub))
            }
            other => (other.clone(), CellValue::Null),
        })
        .unzip();

    let with_subgenres = sub.iter().filter(|c| !c.is_null()).count();
    table.set_column(columns::GENRE, main)?;
    table.set_column(columns::SUBGENRES, sub)?;
    log::info!("Split genres, {with_subgenres} rows have subgenres");
    Ok(GenreSplit::Split { with_subgenres })
}

/// Add (or overwrite) `years_ago = reference_year - year`.
pub fn add_years_ago_column(table: &mut Table, reference_year: i32) -> Result<()> {
    let reference = i64::from(reference_year);
    let years_ago = table
        .column_values(columns::YEAR)?
        .enumerate()
        .map(|(row, cell)| match cell {
            CellValue::Null => Ok(CellValue::Null),
            CellValue::Integer(year) => Ok(CellValue::Integer(reference - year)),
            CellValue::Float(year) => Ok(CellValue::Float(reference as f64 - year)),
            other => Err(not_numeric(columns::YEAR, row, other)),
        })
        .collect::<Result<Vec<_>>>()?;

    table.set_column(columns::YEARS_AGO, years_ago)?;
    log::info!("Added '{}' relative to {reference_year}", columns::YEARS_AGO);
    Ok(())
}

fn not_numeric(column: &str, row: usize, cell: &CellValue) -> DatasetError {
    DatasetError::NotNumeric {
        column: column.to_string(),
        row,
        value: cell.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Store entry points
// ---------------------------------------------------------------------------

impl Dataset {
    pub fn convert_duration_to_minutes(&mut self) -> Result<()> {
        convert_duration_to_minutes(self.current_mut()?)
    }

    pub fn separate_genres(&mut self) -> Result<GenreSplit> {
        separate_genres(self.current_mut()?)
    }

    pub fn add_years_ago_column(&mut self, reference_year: i32) -> Result<()> {
        add_years_ago_column(self.current_mut()?, reference_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs() -> Table {
        Table::from_rows(
            vec!["song".into(), "duration_ms".into(), "year".into(), "genre".into()],
            vec![
                vec!["a".into(), 210_000i64.into(), 2000i64.into(), "pop, Dance/Electronic".into()],
                vec!["b".into(), 200_000i64.into(), 2019i64.into(), "hip hop".into()],
                vec!["c".into(), CellValue::Null, CellValue::Null, CellValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn split_genre_examples() {
        assert_eq!(split_genre("Pop, Dance Pop"), ("Pop", Some("Dance Pop")));
        assert_eq!(split_genre("Pop"), ("Pop", None));
        assert_eq!(split_genre("rock, pop, metal"), ("rock", Some("pop, metal")));
        assert_eq!(split_genre("rock,pop"), ("rock,pop", None));
    }

    #[test]
    fn duration_becomes_minutes_in_place() {
        let mut table = songs();
        let before = table.clone();
        convert_duration_to_minutes(&mut table).unwrap();

        assert_eq!(table.columns()[1], "duration_minutes");
        let minutes: Vec<_> = table.column_values("duration_minutes").unwrap().cloned().collect();
        assert_eq!(
            minutes,
            vec![CellValue::Float(3.5), CellValue::Float(3.3), CellValue::Null]
        );
        for (after, before) in table.rows().iter().zip(before.rows()) {
            assert_eq!(after[0], before[0]);
            assert_eq!(after[2..], before[2..]);
        }
    }

    #[test]
    fn duration_rerun_fails_on_missing_column() {
        let mut table = songs();
        convert_duration_to_minutes(&mut table).unwrap();
        let err = convert_duration_to_minutes(&mut table).unwrap_err();
        assert!(matches!(err, DatasetError::ColumnNotFound(c) if c == "duration_ms"));
    }

    #[test]
    fn minutes_round_like_one_decimal_formatting() {
        let mut table = Table::from_rows(
            vec!["duration_ms".into()],
            vec![
                vec![195_000i64.into()],
                vec![9_000i64.into()],
                vec![213_000i64.into()],
            ],
        )
        .unwrap();
        convert_duration_to_minutes(&mut table).unwrap();
        let minutes: Vec<_> = table.column_values("duration_minutes").unwrap().cloned().collect();
        assert_eq!(
            minutes,
            vec![CellValue::Float(3.2), CellValue::Float(0.1), CellValue::Float(3.5)]
        );
    }

    #[test]
    fn existing_minutes_column_leaves_table_untouched() {
        let mut table = Table::from_rows(
            vec!["duration_ms".into(), "duration_minutes".into()],
            vec![vec![120_000i64.into(), 2.0f64.into()]],
        )
        .unwrap();
        let before = table.clone();
        let err = convert_duration_to_minutes(&mut table).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidInput(_)));
        assert_eq!(table, before);
    }

    #[test]
    fn text_duration_leaves_table_untouched() {
        let mut table = songs();
        table
            .set_column("duration_ms", vec!["3:30".into(), 1i64.into(), CellValue::Null])
            .unwrap();
        let before = table.clone();
        let err = convert_duration_to_minutes(&mut table).unwrap_err();
        assert!(matches!(err, DatasetError::NotNumeric { row: 0, .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn genres_split_once() {
        let mut table = songs();
        assert_eq!(
            separate_genres(&mut table).unwrap(),
            GenreSplit::Split { with_subgenres: 1 }
        );
        let genre: Vec<_> = table.column_values("genre").unwrap().cloned().collect();
        let sub: Vec<_> = table.column_values("subgenres").unwrap().cloned().collect();
        assert_eq!(genre, vec!["pop".into(), "hip hop".into(), CellValue::Null]);
        assert_eq!(sub, vec!["Dance/Electronic".into(), CellValue::Null, CellValue::Null]);

        let snapshot = table.clone();
        assert_eq!(separate_genres(&mut table).unwrap(), GenreSplit::AlreadySplit);
        assert_eq!(table, snapshot);
    }

    #[test]
    fn years_ago_uses_reference_year() {
        let mut table = songs();
        add_years_ago_column(&mut table, 2024).unwrap();
        let ago: Vec<_> = table.column_values("years_ago").unwrap().cloned().collect();
        assert_eq!(ago, vec![24i64.into(), 5i64.into(), CellValue::Null]);
    }

    #[test]
    fn store_entry_points_need_a_table() {
        let mut ds = Dataset::new();
        assert!(matches!(ds.convert_duration_to_minutes(), Err(DatasetError::NotLoaded)));
        assert!(matches!(ds.separate_genres(), Err(DatasetError::NotLoaded)));
        assert!(matches!(ds.add_years_ago_column(2024), Err(DatasetError::NotLoaded)));
    }
}
