mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::MelodyMetricsApp;
use clap::Parser;
use eframe::egui;
use melodymetrics::config::AnalysisConfig;

/// Interactive exploration of the Spotify top-hits dataset.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON settings file (data directory, dataset file, chart thresholds).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory searched for the first .csv file.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Load this file instead of searching the data directory.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> AnalysisConfig {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path).unwrap_or_else(|e| {
                log::error!("{e:#}, using default settings");
                AnalysisConfig::default()
            }),
            None => AnalysisConfig::default(),
        };
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(file) = self.file {
            config.dataset_file = Some(file);
        }
        config
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let config = Cli::parse().into_config();
    log::debug!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MelodyMetrics",
        options,
        Box::new(|_cc| Ok(Box::new(MelodyMetricsApp::new(config)))),
    )
}
