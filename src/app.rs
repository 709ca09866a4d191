use eframe::egui;

use melodymetrics::config::AnalysisConfig;

use crate::state::{AppState, View};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MelodyMetricsApp {
    pub state: AppState,
}

impl MelodyMetricsApp {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for MelodyMetricsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: actions ----
        egui::SidePanel::left("action_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table or chart ----
        egui::CentralPanel::default().show(ctx, |ui| match &self.state.view {
            View::Welcome => {
                ui.centered_and_justified(|ui| {
                    ui.heading("Load the dataset to start  (File → Load dataset)");
                });
            }
            View::Table { title, table } => table::table_view(ui, title, table),
            View::Chart { chart, colors } => plot::chart_view(ui, chart, colors),
        });
    }
}
