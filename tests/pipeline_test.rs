use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use melodymetrics::config::ChartConfig;
use melodymetrics::data::charts::{Chart, ChartKind};
use melodymetrics::data::model::{columns, CellValue};
use melodymetrics::data::quality::{CleaningOutcome, Flag};
use melodymetrics::data::store::{Dataset, DatasetSource};
use melodymetrics::data::transform::GenreSplit;
use melodymetrics::data::DatasetError;

const HEADER: &str = "artist,song,duration_ms,explicit,year,popularity,danceability,energy,\
                      speechiness,acousticness,instrumentalness,liveness,valence,genre";

const SONGS: [&str; 7] = [
    "A,s1,200000,False,2000,50,0.5,0.6,0.1,0.2,0.0,0.1,0.4,\"pop, rock\"",
    "B,s2,180000,True,2001,60,0.7,0.8,0.2,0.1,0.0,0.3,0.5,\"hip hop, pop\"",
    "C,s3,240000,False,1850,40,0.4,0.5,0.1,0.3,0.0,0.2,0.6,rock",
    "D,s4,210000,False,2005,70,1.2,0.6,0.1,0.2,0.0,0.1,0.4,pop",
    "E,s5,190000,False,2003,30,0.5,0.5,0.1,0.2,0.0,0.1,0.4,set()",
    "A,s1,200000,False,2000,50,0.5,0.6,0.1,0.2,0.0,0.1,0.4,\"pop, rock\"",
    "G,s7,230000,True,2001,80,0.6,0.7,0.1,0.2,0.0,0.1,0.4,rock",
];

fn write_songs(dir: &Path) -> Result<()> {
    let mut contents = format!("{HEADER}\n");
    for song in SONGS {
        contents.push_str(song);
        contents.push('\n');
    }
    fs::write(dir.join("songs_normalize.csv"), contents)?;
    Ok(())
}

fn loaded(dir: &Path) -> Result<Dataset> {
    write_songs(dir)?;
    let mut dataset = Dataset::new();
    let preview = dataset.load(&DatasetSource::Discover(dir.to_path_buf()))?;
    assert_eq!(preview.len(), 5);
    Ok(dataset)
}

#[test]
fn clean_then_transform() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut dataset = loaded(dir.path())?;
    assert_eq!(dataset.current()?.len(), 7);

    let CleaningOutcome::Found(report) = dataset.detect_outliers_and_duplicates(2024)? else {
        panic!("expected flagged rows");
    };
    assert_eq!(report.indices().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    assert_eq!(
        report.rows[0].flags,
        vec![Flag::OutOfRange {
            column: columns::YEAR.to_string()
        }]
    );
    assert_eq!(report.rows[2].flags, vec![Flag::PlaceholderGenre]);
    assert_eq!(report.rows[3].flags, vec![Flag::Duplicate]);
    assert_eq!(dataset.current()?.len(), 3);

    // A clean table stays as it is.
    assert_eq!(
        dataset.detect_outliers_and_duplicates(2024)?,
        CleaningOutcome::NoneFound
    );

    assert_eq!(
        dataset.separate_genres()?,
        GenreSplit::Split { with_subgenres: 2 }
    );
    assert_eq!(dataset.separate_genres()?, GenreSplit::AlreadySplit);
    let table = dataset.current()?;
    let genres: Vec<_> = table.column_values(columns::GENRE)?.cloned().collect();
    assert_eq!(
        genres,
        vec![
            CellValue::from("pop"),
            CellValue::from("hip hop"),
            CellValue::from("rock")
        ]
    );
    let subgenres: Vec<_> = table.column_values(columns::SUBGENRES)?.cloned().collect();
    assert_eq!(
        subgenres,
        vec![CellValue::from("rock"), CellValue::from("pop"), CellValue::Null]
    );

    dataset.add_years_ago_column(2024)?;
    let years_ago: Vec<_> = dataset
        .current()?
        .column_values(columns::YEARS_AGO)?
        .cloned()
        .collect();
    assert_eq!(
        years_ago,
        vec![
            CellValue::Integer(24),
            CellValue::Integer(23),
            CellValue::Integer(23)
        ]
    );

    dataset.convert_duration_to_minutes()?;
    let table = dataset.current()?;
    assert!(!table.has_column(columns::DURATION_MS));
    assert_eq!(
        table.column_values(columns::DURATION_MINUTES)?.next(),
        Some(&CellValue::Float(3.3))
    );
    assert!(matches!(
        dataset.convert_duration_to_minutes(),
        Err(DatasetError::ColumnNotFound(_))
    ));
    Ok(())
}

#[test]
fn charts_follow_the_cleaned_table() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut dataset = loaded(dir.path())?;
    dataset.detect_outliers_and_duplicates(2024)?;

    let Chart::Bar(bar) = dataset.chart(ChartKind::GenreFrequency, &ChartConfig::default())? else {
        panic!("expected a bar chart");
    };
    assert_eq!(
        bar.bars,
        vec![
            ("pop".to_string(), 2),
            ("rock".to_string(), 2),
            ("hip hop".to_string(), 1)
        ]
    );

    for kind in ChartKind::ALL {
        dataset.chart(kind, &ChartConfig::default())?;
    }
    Ok(())
}

#[test]
fn everything_but_loading_needs_a_dataset() {
    let mut dataset = Dataset::new();
    assert!(matches!(dataset.count_nulls(), Err(DatasetError::NotLoaded)));
    assert!(matches!(dataset.summary_statistics(), Err(DatasetError::NotLoaded)));
    assert!(matches!(dataset.separate_genres(), Err(DatasetError::NotLoaded)));
    assert!(matches!(
        dataset.detect_outliers_and_duplicates(2024),
        Err(DatasetError::NotLoaded)
    ));
    assert!(matches!(
        dataset.chart(ChartKind::GenreShare, &ChartConfig::default()),
        Err(DatasetError::NotLoaded)
    ));
}

#[test]
fn parquet_files_load_like_csv() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("songs.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int64, false),
        Field::new("genre", DataType::Utf8, true),
    ]));
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![2001, 2019])),
        Arc::new(StringArray::from(vec![Some("pop, rock"), None])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let mut writer = ArrowWriter::try_new(fs::File::create(&path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    let mut dataset = Dataset::new();
    dataset.load(&DatasetSource::File(path.clone()))?;
    assert_eq!(dataset.source_path(), Some(path.as_path()));

    let table = dataset.current()?;
    assert_eq!(table.columns(), ["year", "genre"]);
    assert_eq!(
        table.row(0),
        Some(&[CellValue::Integer(2001), CellValue::from("pop, rock")][..])
    );
    assert_eq!(table.row(1).map(|r| r[1].clone()), Some(CellValue::Null));

    let span = dataset.dataset_duration()?;
    assert_eq!((span.start, span.end, span.span), (2001.0, 2019.0, 18.0));
    Ok(())
}
