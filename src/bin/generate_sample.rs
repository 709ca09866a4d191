use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write a synthetic songs dataset as CSV and Parquet.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Number of regular songs, before the planted bad rows.
    #[arg(long, default_value_t = 200)]
    songs: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const ARTISTS: [&str; 8] = [
    "Nova Lane",
    "The Driftwoods",
    "MC Static",
    "Luna Vega",
    "Paper Kites Club",
    "DJ Ferrous",
    "Ada Blue",
    "Los Satélites",
];

const GENRES: [&str; 10] = [
    "pop",
    "hip hop, pop",
    "pop, Dance/Electronic",
    "rock, pop",
    "hip hop, pop, R&B",
    "Dance/Electronic",
    "R&B",
    "rock",
    "latin",
    "country",
];

#[derive(Debug, Clone, Serialize)]
struct Song {
    artist: String,
    song: String,
    duration_ms: i64,
    explicit: bool,
    year: i64,
    popularity: i64,
    danceability: f64,
    energy: f64,
    key: i64,
    loudness: f64,
    mode: i64,
    speechiness: f64,
    acousticness: f64,
    instrumentalness: f64,
    liveness: f64,
    valence: f64,
    tempo: f64,
    genre: String,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, low: i64, high: i64) -> i64 {
        low + (self.next_u64() % (high - low + 1) as u64) as i64
    }

    /// Uniform in [0, 1), rounded to three decimals like the source data.
    fn unit(&mut self) -> f64 {
        (self.next_f64() * 1000.0).round() / 1000.0
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn random_song(rng: &mut SimpleRng, index: usize) -> Song {
    let genre = rng.pick(&GENRES);
    Song {
        artist: rng.pick(&ARTISTS).to_string(),
        song: format!("Track {index:03}"),
        duration_ms: rng.range(120_000, 300_000),
        explicit: genre.contains("hip hop") && rng.next_f64() < 0.7,
        year: rng.range(1998, 2020),
        popularity: rng.range(0, 89),
        danceability: rng.unit(),
        energy: rng.unit(),
        key: rng.range(0, 11),
        loudness: -(rng.next_f64() * 12.0 * 100.0).round() / 100.0,
        mode: rng.range(0, 1),
        speechiness: rng.unit() * 0.4,
        acousticness: rng.unit(),
        instrumentalness: rng.unit() * 0.1,
        liveness: rng.unit() * 0.5,
        valence: rng.unit(),
        tempo: 60.0 + (rng.next_f64() * 120.0 * 10.0).round() / 10.0,
        genre: genre.to_string(),
    }
}

/// Regular songs followed by rows the cleaning step should remove.
fn generate(count: usize, seed: u64) -> Vec<Song> {
    let mut rng = SimpleRng::new(seed);
    let mut songs: Vec<Song> = (0..count).map(|i| random_song(&mut rng, i)).collect();

    let mut too_danceable = random_song(&mut rng, count);
    too_danceable.danceability = 1.3;
    songs.push(too_danceable);

    let mut too_old = random_song(&mut rng, count + 1);
    too_old.year = 1850;
    songs.push(too_old);

    let mut too_popular = random_song(&mut rng, count + 2);
    too_popular.popularity = 104;
    songs.push(too_popular);

    let mut placeholder = random_song(&mut rng, count + 3);
    placeholder.genre = "set()".into();
    songs.push(placeholder);

    if let Some(first) = songs.first().cloned() {
        songs.push(first);
    }
    songs
}

fn write_csv(songs: &[Song], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for song in songs {
        writer.serialize(song)?;
    }
    writer.flush()?;
    Ok(())
}

fn to_record_batch(songs: &[Song]) -> Result<RecordBatch> {
    fn text(songs: &[Song], f: impl Fn(&Song) -> &str) -> ArrayRef {
        Arc::new(StringArray::from_iter_values(songs.iter().map(f)))
    }
    fn int(songs: &[Song], f: impl Fn(&Song) -> i64) -> ArrayRef {
        Arc::new(Int64Array::from_iter_values(songs.iter().map(f)))
    }
    fn float(songs: &[Song], f: impl Fn(&Song) -> f64) -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(songs.iter().map(f)))
    }
    fn boolean(songs: &[Song], f: impl Fn(&Song) -> bool) -> ArrayRef {
        Arc::new(songs.iter().map(|s| Some(f(s))).collect::<BooleanArray>())
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("artist", text(songs, |s| s.artist.as_str())),
        ("song", text(songs, |s| s.song.as_str())),
        ("duration_ms", int(songs, |s| s.duration_ms)),
        ("explicit", boolean(songs, |s| s.explicit)),
        ("year", int(songs, |s| s.year)),
        ("popularity", int(songs, |s| s.popularity)),
        ("danceability", float(songs, |s| s.danceability)),
        ("energy", float(songs, |s| s.energy)),
        ("key", int(songs, |s| s.key)),
        ("loudness", float(songs, |s| s.loudness)),
        ("mode", int(songs, |s| s.mode)),
        ("speechiness", float(songs, |s| s.speechiness)),
        ("acousticness", float(songs, |s| s.acousticness)),
        ("instrumentalness", float(songs, |s| s.instrumentalness)),
        ("liveness", float(songs, |s| s.liveness)),
        ("valence", float(songs, |s| s.valence)),
        ("tempo", float(songs, |s| s.tempo)),
        ("genre", text(songs, |s| s.genre.as_str())),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<Field>>(),
    ));
    let arrays = columns.into_iter().map(|(_, array)| array).collect();
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let songs = generate(args.songs, args.seed);

    let csv_path = args.out_dir.join("songs_normalize.csv");
    write_csv(&songs, &csv_path)?;

    let batch = to_record_batch(&songs)?;
    let parquet_path = args.out_dir.join("songs_normalize.parquet");
    write_parquet(&batch, &parquet_path)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])?);
    println!(
        "Wrote {} songs to {} and {}",
        songs.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
