use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::store::DatasetSource;

/// Knobs for the chart builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Genres plotted in the evolution chart.
    pub top_genres: usize,
    /// Named slices in the pie before the rest is grouped as "Others".
    pub pie_slices: usize,
    /// A year is plotted only when some count in it exceeds this.
    pub yearly_count_threshold: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_genres: 3,
            pie_slices: 4,
            yearly_count_threshold: 4,
        }
    }
}

/// Application settings, read from an optional JSON file.
///
/// ```json
/// { "data_dir": "resources", "charts": { "top_genres": 5 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Root searched for a CSV when no explicit file is given.
    pub data_dir: PathBuf,
    /// Explicit dataset file; takes precedence over `data_dir`.
    pub dataset_file: Option<PathBuf>,
    pub charts: ChartConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            dataset_file: None,
            charts: ChartConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Where "Load dataset" should read from.
    pub fn source(&self) -> DatasetSource {
        match &self.dataset_file {
            Some(file) => DatasetSource::File(file.clone()),
            None => DatasetSource::Discover(self.data_dir.clone()),
        }
    }
}
