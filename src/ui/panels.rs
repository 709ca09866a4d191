use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use melodymetrics::data::charts::ChartKind;
use melodymetrics::data::store::DatasetSource;

use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – analysis actions
// ---------------------------------------------------------------------------

/// Render the left action panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("MelodyMetrics");
    ui.separator();

    let loaded = state.dataset.is_loaded();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Dataset").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.button("Load dataset").clicked() {
                        state.load_configured();
                    }
                    ui.add_enabled_ui(loaded, |ui: &mut Ui| {
                        if ui.button("Show current dataset").clicked() {
                            state.show_current();
                        }
                        if ui.button("Preview first rows").clicked() {
                            state.show_preview();
                        }
                        if ui.button("Remove dataset").clicked() {
                            state.clear();
                        }
                    });
                });

            egui::CollapsingHeader::new(RichText::new("Inspect").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.button("Column descriptions").clicked() {
                        state.describe_columns();
                    }
                    ui.add_enabled_ui(loaded, |ui: &mut Ui| {
                        if ui.button("Dataset info").clicked() {
                            state.show_info();
                        }
                        if ui.button("Summary statistics").clicked() {
                            state.show_statistics();
                        }
                        if ui.button("Dataset duration").clicked() {
                            state.show_duration();
                        }
                        if ui.button("Check null values").clicked() {
                            state.check_nulls();
                        }
                        if ui.button("Unique values per column").clicked() {
                            state.count_unique();
                        }
                    });
                });

            egui::CollapsingHeader::new(RichText::new("Clean & transform").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.add_enabled_ui(loaded, |ui: &mut Ui| {
                        if ui.button("Remove outliers and duplicates").clicked() {
                            state.clean_outliers_and_duplicates();
                        }
                        if ui.button("Separate genres").clicked() {
                            state.separate_genres();
                        }
                        if ui.button("Add years ago").clicked() {
                            state.add_years_ago();
                        }
                        if ui.button("Duration in minutes").clicked() {
                            state.convert_duration();
                        }
                    });
                });

            egui::CollapsingHeader::new(RichText::new("Charts").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.add_enabled_ui(loaded, |ui: &mut Ui| {
                        for kind in ChartKind::ALL {
                            if ui.button(kind.label()).clicked() {
                                state.open_chart(kind);
                            }
                        }
                    });
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load dataset").clicked() {
                state.load_configured();
                ui.close_menu();
            }
            if ui.button("Remove dataset").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Ok(table) = state.dataset.current() {
            ui.label(format!("{} songs, {} columns", table.len(), table.width()));
            ui.separator();
        }

        match &state.status {
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open songs dataset")
        .set_directory(&state.config.data_dir)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(DatasetSource::File(path));
    }
}
