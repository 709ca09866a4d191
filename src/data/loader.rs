use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset file into a [`Table`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one song per line
/// * `.json`    – `[{ "artist": "...", "year": 2001, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats and booleans
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Walk `root` depth-first and return the first `.csv` file found.
///
/// Files of a directory are checked before its subdirectories, entries are
/// visited in name order and hidden directories (`.git`, `.venv`, ...) are
/// skipped.
pub fn discover_csv(root: &Path) -> Option<PathBuf> {
    let mut entries: Vec<(PathBuf, fs::FileType)> = fs::read_dir(root)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_type().ok().map(|ft| (entry.path(), ft)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let found = entries.iter().find(|(path, ft)| {
        ft.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
    });
    if let Some((path, _)) = found {
        log::debug!("Found dataset csv at {}", path.display());
        return Some(path.clone());
    }

    entries
        .iter()
        .filter(|(path, ft)| ft.is_dir() && !is_hidden(path))
        .find_map(|(path, _)| discover_csv(path))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row one song.
/// Cell types are guessed per value and numeric columns are then unified.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = record.iter().map(guess_cell_type).collect();
        table
            .push_row(row)
            .with_context(|| format!("CSV row {row_no}"))?;
    }

    promote_numeric_columns(table)
}

/// Cell texts read as missing values, as pandas `read_csv` does by default.
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || NA_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    // Digits required so titles like "Infinity" stay text.
    if s.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

/// Columns holding only numbers, at least one of them fractional, become
/// float columns throughout.
fn promote_numeric_columns(table: Table) -> Result<Table> {
    let float_columns: BTreeSet<usize> = (0..table.width())
        .filter(|&idx| {
            let mut any_float = false;
            let all_numeric = table.rows().iter().all(|row| match &row[idx] {
                CellValue::Float(_) => {
                    any_float = true;
                    true
                }
                CellValue::Integer(_) | CellValue::Null => true,
                _ => false,
            });
            all_numeric && any_float
        })
        .collect();

    if float_columns.is_empty() {
        return Ok(table);
    }

    let columns = table.columns().to_vec();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(idx, cell)| match cell {
                    CellValue::Integer(i) if float_columns.contains(&idx) => {
                        CellValue::Float(*i as f64)
                    }
                    other => other.clone(),
                })
                .collect()
        })
        .collect();
    Ok(Table::from_rows(columns, rows)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "artist": "Britney Spears", "song": "Oops!...I Did It Again", "year": 2000 },
///   ...
/// ]
/// ```
///
/// The header is the union of keys in order of first appearance; keys a
/// record lacks become nulls.
fn load_json(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    promote_numeric_columns(Table::from_rows(columns, rows)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, one song per row.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::new(columns);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect();
            table
                .push_row(cells)
                .with_context(|| format!("Parquet row {row}"))?;
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    // Anything else is shown as its Arrow display string.
    value.unwrap_or_else(|| {
        array_value_to_string(col.as_ref(), row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_cells_are_typed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(
            dir.path(),
            "songs.csv",
            "artist,explicit,year,energy,genre\n\
             Eminem,True,2000,0.9,\"hip hop, pop\"\n\
             Coldplay,False,2002,1,\n",
        );
        let table = load_file(&path)?;

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), ["artist", "explicit", "year", "energy", "genre"]);
        let row = table.row(1).context("second row")?;
        assert_eq!(row[1], CellValue::Bool(false));
        assert_eq!(row[2], CellValue::Integer(2002));
        // Promoted because the column also holds 0.9.
        assert_eq!(row[3], CellValue::Float(1.0));
        assert_eq!(row[4], CellValue::Null);
        assert_eq!(
            table.row(0).context("first row")?[4],
            CellValue::from("hip hop, pop")
        );
        Ok(())
    }

    #[test]
    fn na_tokens_are_missing_values() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(
            dir.path(),
            "songs.csv",
            "song,year,genre\n\
             NaN,2001,NA\n\
             Infinity,N/A,null\n\
             None,2003,pop\n",
        );
        let table = load_file(&path)?;

        let songs: Vec<_> = table.column_values("song")?.cloned().collect();
        assert_eq!(
            songs,
            vec![CellValue::Null, CellValue::from("Infinity"), CellValue::Null]
        );
        let years: Vec<_> = table.column_values("year")?.cloned().collect();
        assert_eq!(
            years,
            vec![CellValue::Integer(2001), CellValue::Null, CellValue::Integer(2003)]
        );
        assert_eq!(crate::data::quality::count_nulls(&table), 5);
        Ok(())
    }

    #[test]
    fn ragged_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.csv", "a,b\n1,2,3\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn unsupported_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "songs.txt", "a,b\n");
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(
            dir.path(),
            "songs.json",
            r#"[{"song": "A", "year": 2001}, {"song": "B", "popularity": 55}]"#,
        );
        let table = load_file(&path)?;
        assert_eq!(table.width(), 3);
        let years: Vec<_> = table.column_values("year")?.cloned().collect();
        assert_eq!(years, vec![CellValue::Integer(2001), CellValue::Null]);
        Ok(())
    }

    #[test]
    fn discovery_prefers_files_and_skips_hidden_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join(".venv"))?;
        write_file(&dir.path().join(".venv"), "aaa.csv", "a\n1\n");
        fs::create_dir(dir.path().join("resources"))?;
        let nested = write_file(&dir.path().join("resources"), "spotify.csv", "a\n1\n");
        write_file(dir.path(), "notes.txt", "");

        assert_eq!(discover_csv(dir.path()), Some(nested));

        let top = write_file(dir.path(), "zzz.csv", "a\n1\n");
        assert_eq!(discover_csv(dir.path()), Some(top));
        Ok(())
    }

    #[test]
    fn discovery_without_csv_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover_csv(dir.path()), None);
        assert_eq!(discover_csv(&dir.path().join("missing")), None);
    }
}
