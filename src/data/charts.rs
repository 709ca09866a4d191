//! Chart descriptions built from the table. Rendering lives in the UI.

use std::collections::{BTreeMap, BTreeSet};

use super::model::{columns, CellValue, Table};
use super::store::Dataset;
use crate::config::ChartConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    GenreFrequency,
    GenreShare,
    TopGenresEvolution,
    ExplicitEvolution,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::GenreFrequency,
        ChartKind::GenreShare,
        ChartKind::TopGenresEvolution,
        ChartKind::ExplicitEvolution,
    ];

    /// Button label for the chart.
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::GenreFrequency => "Most frequent genres (bar)",
            ChartKind::GenreShare => "Most frequent genres (bar of pie)",
            ChartKind::TopGenresEvolution => "Top genres over time (line)",
            ChartKind::ExplicitEvolution => "Explicit songs over time (line)",
        }
    }
}

/// Label and count, ordered by count descending.
pub type Counts = Vec<(String, usize)>;

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Counts,
}

/// A pie of the leading main genres plus an "Others" slice, and the
/// breakdown of that slice as a stacked bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarOfPie {
    pub title: String,
    pub slices: Counts,
    pub others: Counts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(i64, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Bar(BarChart),
    BarOfPie(BarOfPie),
    Line(LineChart),
}

pub const OTHERS: &str = "Others";

/// Text before the first comma, trimmed.
pub fn main_genre(raw: &str) -> &str {
    raw.split(',').next().unwrap_or(raw).trim()
}

fn ranked(counts: BTreeMap<String, usize>) -> Counts {
    let mut ranked: Counts = counts.into_iter().collect();
    // Stable sort keeps ties in name order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn main_genre_counts(table: &Table) -> Result<Counts> {
    let mut counts = BTreeMap::new();
    for genre in table.column_values(columns::GENRE)?.filter_map(CellValue::as_str) {
        *counts.entry(main_genre(genre).to_string()).or_default() += 1;
    }
    Ok(ranked(counts))
}

fn year_of(cell: &CellValue) -> Option<i64> {
    cell.as_f64().map(|y| y as i64)
}

/// Every genre token of every song, most frequent first.
pub fn most_frequent_genres(table: &Table) -> Result<BarChart> {
    let mut counts = BTreeMap::new();
    for genre in table.column_values(columns::GENRE)?.filter_map(CellValue::as_str) {
        for token in genre.split(", ") {
            *counts.entry(token.to_string()).or_default() += 1;
        }
    }
    Ok(BarChart {
        title: "Most frequent genres".into(),
        x_label: "Genre".into(),
        y_label: "Count".into(),
        bars: ranked(counts),
    })
}

pub fn main_genre_share(table: &Table, config: &ChartConfig) -> Result<BarOfPie> {
    let counts = main_genre_counts(table)?;
    let split = config.pie_slices.min(counts.len());
    let (top, rest) = counts.split_at(split);

    let mut slices = top.to_vec();
    if !rest.is_empty() {
        slices.push((OTHERS.to_string(), rest.iter().map(|(_, n)| n).sum()));
    }
    Ok(BarOfPie {
        title: "Most frequent main genres".into(),
        slices,
        others: rest.to_vec(),
    })
}

/// Songs per year for the leading main genres. Only years where at least
/// one of them has more than `yearly_count_threshold` songs are kept.
pub fn top_genres_evolution(table: &Table, config: &ChartConfig) -> Result<LineChart> {
    let top: Vec<String> = main_genre_counts(table)?
        .into_iter()
        .take(config.top_genres)
        .map(|(genre, _)| genre)
        .collect();

    let genre_idx = table.column_index(columns::GENRE)?;
    let year_idx = table.column_index(columns::YEAR)?;

    let mut per_year: BTreeMap<i64, BTreeMap<&str, usize>> = BTreeMap::new();
    for row in table.rows() {
        let (Some(genre), Some(year)) = (row[genre_idx].as_str(), year_of(&row[year_idx])) else {
            continue;
        };
        let genre = main_genre(genre);
        if let Some(name) = top.iter().find(|t| *t == genre) {
            *per_year
                .entry(year)
                .or_default()
                .entry(name.as_str())
                .or_default() += 1;
        }
    }
    per_year.retain(|_, counts| counts.values().any(|&n| n > config.yearly_count_threshold));

    let series = top
        .iter()
        .map(|genre| Series {
            name: genre.clone(),
            points: per_year
                .iter()
                .map(|(year, counts)| (*year, counts.get(genre.as_str()).copied().unwrap_or(0)))
                .collect(),
        })
        .collect();

    Ok(LineChart {
        title: format!("Top {} genres evolution over time", config.top_genres),
        x_label: "Year".into(),
        y_label: "Number of songs".into(),
        series,
    })
}

/// Explicit songs per year, keeping years above `yearly_count_threshold`.
pub fn explicit_songs_evolution(table: &Table, config: &ChartConfig) -> Result<LineChart> {
    let explicit_idx = table.column_index(columns::EXPLICIT)?;
    let year_idx = table.column_index(columns::YEAR)?;

    let mut per_year: BTreeMap<i64, usize> = BTreeMap::new();
    for row in table.rows() {
        if row[explicit_idx] != CellValue::Bool(true) {
            continue;
        }
        if let Some(year) = year_of(&row[year_idx]) {
            *per_year.entry(year).or_default() += 1;
        }
    }

    let points = per_year
        .into_iter()
        .filter(|&(_, n)| n > config.yearly_count_threshold)
        .collect();

    Ok(LineChart {
        title: "Evolution of explicit songs over time".into(),
        x_label: "Year".into(),
        y_label: "Number of explicit songs".into(),
        series: vec![Series {
            name: "Explicit songs".into(),
            points,
        }],
    })
}

pub fn build_chart(kind: ChartKind, table: &Table, config: &ChartConfig) -> Result<Chart> {
    Ok(match kind {
        ChartKind::GenreFrequency => Chart::Bar(most_frequent_genres(table)?),
        ChartKind::GenreShare => Chart::BarOfPie(main_genre_share(table, config)?),
        ChartKind::TopGenresEvolution => Chart::Line(top_genres_evolution(table, config)?),
        ChartKind::ExplicitEvolution => Chart::Line(explicit_songs_evolution(table, config)?),
    })
}

/// Distinct labels used across a chart, for colour assignment.
pub fn labels(chart: &Chart) -> BTreeSet<String> {
    match chart {
        Chart::Bar(bar) => bar.bars.iter().map(|(l, _)| l.clone()).collect(),
        Chart::BarOfPie(pie) => pie
            .slices
            .iter()
            .chain(&pie.others)
            .map(|(l, _)| l.clone())
            .collect(),
        Chart::Line(line) => line.series.iter().map(|s| s.name.clone()).collect(),
    }
}

impl Dataset {
    pub fn chart(&self, kind: ChartKind, config: &ChartConfig) -> Result<Chart> {
        build_chart(kind, self.current()?, config)
    }
}
