use melodymetrics::config::AnalysisConfig;
use melodymetrics::data::charts::{self, Chart, ChartKind};
use melodymetrics::data::describe::column_descriptions;
use melodymetrics::data::model::{columns, Table};
use melodymetrics::data::quality::CleaningOutcome;
use melodymetrics::data::store::{Dataset, DatasetSource, PREVIEW_ROWS};
use melodymetrics::data::transform::{current_year, GenreSplit};
use melodymetrics::data::{DatasetError, Result};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central panel shows.
pub enum View {
    Welcome,
    Table { title: String, table: Table },
    Chart { chart: Chart, colors: ColorMap },
}

pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Owner of the loaded table.
    pub dataset: Dataset,

    pub config: AnalysisConfig,

    pub view: View,

    /// Outcome of the last action, shown in the top bar.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            dataset: Dataset::new(),
            config,
            view: View::Welcome,
            status: None,
        }
    }

    /// Run one user action, reporting its message or error in the status line.
    fn run(&mut self, action: &str, f: impl FnOnce(&mut Self) -> Result<String>) {
        match f(self) {
            Ok(message) => {
                log::info!("{action}: {message}");
                self.status = Some(Status::Info(message));
            }
            Err(e) => {
                let e = anyhow::Error::from(e).context(action.to_string());
                log::error!("{e:#}");
                self.status = Some(Status::Error(format!("{e:#}")));
            }
        }
    }

    fn show_table(&mut self, title: impl Into<String>, table: Table) {
        self.view = View::Table {
            title: title.into(),
            table,
        };
    }

    /// The stored table, most popular songs first when the column exists.
    fn show_dataset(&mut self, title: &str) -> Result<()> {
        let table = self.dataset.current()?;
        let view = match table.sorted_desc_by(columns::POPULARITY) {
            Ok(sorted) => sorted,
            Err(DatasetError::ColumnNotFound(_)) => table.clone(),
            Err(e) => return Err(e),
        };
        self.show_table(title, view);
        Ok(())
    }

    // -- Dataset ------------------------------------------------------------

    pub fn load(&mut self, source: DatasetSource) {
        self.run("Loading dataset", |s| {
            s.dataset.load(&source)?;
            s.show_dataset("Dataset (sorted by most popular)")?;
            let table = s.dataset.current()?;
            Ok(format!(
                "Loaded {} rows, {} columns from {}",
                table.len(),
                table.width(),
                s.dataset
                    .source_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ))
        });
    }

    /// Load from the configured file or by searching the data directory.
    pub fn load_configured(&mut self) {
        let source = self.config.source();
        self.load(source);
    }

    pub fn show_current(&mut self) {
        self.run("Showing dataset", |s| {
            s.show_dataset("Current dataset")?;
            Ok(format!("{} rows", s.dataset.current()?.len()))
        });
    }

    pub fn show_preview(&mut self) {
        self.run("Preview", |s| {
            let preview = s.dataset.current()?.head(PREVIEW_ROWS);
            s.show_table(format!("First {PREVIEW_ROWS} rows"), preview);
            Ok("Showing the first rows".into())
        });
    }

    pub fn clear(&mut self) {
        self.dataset.clear();
        self.view = View::Welcome;
        self.status = Some(Status::Info("Dataset removed".into()));
    }

    // -- Inspect ------------------------------------------------------------

    pub fn describe_columns(&mut self) {
        self.run("Describing columns", |s| {
            s.show_table("Dataset columns explanation", column_descriptions());
            Ok("Column descriptions".into())
        });
    }

    pub fn show_info(&mut self) {
        self.run("Dataset info", |s| {
            let info = s.dataset.table_info()?;
            s.show_table("Dataset info", info.to_table());
            Ok(format!("{} rows, {} columns", info.rows, info.columns.len()))
        });
    }

    pub fn show_statistics(&mut self) {
        self.run("Summary statistics", |s| {
            let stats = s.dataset.summary_statistics()?;
            s.show_table("Summary statistics", stats);
            Ok("Statistics per column".into())
        });
    }

    pub fn show_duration(&mut self) {
        self.run("Dataset duration", |s| {
            let span = s.dataset.dataset_duration()?;
            s.show_table("Dataset duration", span.to_table());
            Ok(format!(
                "Start year {}, end year {}, {} years",
                span.start, span.end, span.span
            ))
        });
    }

    pub fn check_nulls(&mut self) {
        self.run("Checking null values", |s| {
            let total = s.dataset.count_nulls()?;
            let per_column = s.dataset.nulls_per_column()?;
            s.show_table(
                "Any null values in columns?",
                Table::from_pairs("Column name", "Any null values", per_column),
            );
            Ok(format!("Total null values in dataset: {total}"))
        });
    }

    pub fn count_unique(&mut self) {
        self.run("Counting unique values", |s| {
            let counts = s.dataset.count_unique_per_column()?;
            s.show_table(
                "Unique values per column",
                Table::from_pairs("Column name", "Unique values", counts),
            );
            Ok("Unique values per column".into())
        });
    }

    // -- Clean & transform --------------------------------------------------

    pub fn clean_outliers_and_duplicates(&mut self) {
        self.run("Cleaning outliers and duplicates", |s| {
            match s.dataset.detect_outliers_and_duplicates(current_year())? {
                CleaningOutcome::Found(report) => {
                    let removed = report.len();
                    s.show_table("Removed outliers and duplicates", report.to_table());
                    Ok(format!("Removed {removed} rows"))
                }
                CleaningOutcome::NoneFound => {
                    s.show_dataset("Current dataset")?;
                    Ok("No outliers or duplicates detected".into())
                }
            }
        });
    }

    pub fn separate_genres(&mut self) {
        self.run("Separating genres", |s| {
            let outcome = s.dataset.separate_genres()?;
            s.show_dataset("Dataset with main genre and subgenres")?;
            Ok(match outcome {
                GenreSplit::Split { with_subgenres } => {
                    format!("Genres split, {with_subgenres} songs have subgenres")
                }
                GenreSplit::AlreadySplit => "Genres were already split, nothing to do".into(),
            })
        });
    }

    pub fn add_years_ago(&mut self) {
        self.run("Adding years ago", |s| {
            let year = current_year();
            s.dataset.add_years_ago_column(year)?;
            s.show_dataset("Dataset with years ago")?;
            Ok(format!("Years counted back from {year}"))
        });
    }

    pub fn convert_duration(&mut self) {
        self.run("Converting duration", |s| {
            s.dataset.convert_duration_to_minutes()?;
            s.show_dataset("Dataset with duration in minutes")?;
            Ok("Duration converted to minutes".into())
        });
    }

    // -- Charts -------------------------------------------------------------

    pub fn open_chart(&mut self, kind: ChartKind) {
        self.run("Building chart", |s| {
            let chart = s.dataset.chart(kind, &s.config.charts)?;
            let colors = ColorMap::new(&charts::labels(&chart));
            s.view = View::Chart { chart, colors };
            Ok(kind.label().to_string())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melodymetrics::data::model::CellValue;
    use std::fs;

    fn loaded_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("songs.csv"),
            "artist,song,duration_ms,explicit,year,popularity,danceability,energy,\
             speechiness,acousticness,instrumentalness,liveness,valence,genre\n\
             A,one,210000,True,2001,40,0.5,0.5,0.1,0.1,0.0,0.2,0.3,\"pop, rock\"\n\
             B,two,180000,False,2002,90,0.6,0.7,0.1,0.1,0.0,0.2,0.3,rock\n\
             B,two,180000,False,2002,90,0.6,0.7,0.1,0.1,0.0,0.2,0.3,rock\n",
        )
        .unwrap();
        let config = AnalysisConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let mut state = AppState::new(config);
        state.load_configured();
        (dir, state)
    }

    #[test]
    fn loading_shows_most_popular_first() {
        let (_dir, state) = loaded_state();
        assert!(matches!(state.status, Some(Status::Info(_))));
        let View::Table { table, .. } = &state.view else {
            panic!("expected a table view");
        };
        assert_eq!(table.row(0).unwrap()[5], CellValue::Integer(90));
        // The stored table keeps file order.
        assert_eq!(
            state.dataset.current().unwrap().row(0).unwrap()[5],
            CellValue::Integer(40)
        );
    }

    #[test]
    fn failed_action_sets_error_status() {
        let mut state = AppState::new(AnalysisConfig::default());
        state.show_statistics();
        assert!(matches!(&state.status, Some(Status::Error(msg)) if msg.contains("no dataset loaded")));
        assert!(matches!(state.view, View::Welcome));
    }

    #[test]
    fn cleaning_reports_removed_rows() {
        let (_dir, mut state) = loaded_state();
        state.clean_outliers_and_duplicates();
        assert!(matches!(&state.status, Some(Status::Info(msg)) if msg == "Removed 1 rows"));
        assert_eq!(state.dataset.current().unwrap().len(), 2);
    }

    #[test]
    fn describe_works_without_dataset() {
        let mut state = AppState::new(AnalysisConfig::default());
        state.describe_columns();
        assert!(matches!(state.view, View::Table { .. }));
    }

    #[test]
    fn charts_open_in_chart_view() {
        let (_dir, mut state) = loaded_state();
        state.open_chart(ChartKind::GenreFrequency);
        assert!(matches!(state.view, View::Chart { .. }));
    }
}
