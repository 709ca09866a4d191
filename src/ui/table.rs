use eframe::egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use melodymetrics::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Table view (central panel)
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// Render a titled table. Only the visible rows are laid out.
pub fn table_view(ui: &mut Ui, title: &str, table: &Table) {
    ui.heading(title);
    ui.label(format!("{} rows × {} columns", table.len(), table.width()));
    ui.separator();

    if table.width() == 0 {
        ui.label("Nothing to show.");
        return;
    }

    ui.push_id(title, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .columns(Column::auto().at_least(60.0).clip(true), table.width())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for name in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, table.len(), |mut row| {
                        let Some(cells) = table.row(row.index()) else {
                            return;
                        };
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell_text(cell));
                            });
                        }
                    });
                });
        });
    });
}

fn cell_text(cell: &CellValue) -> RichText {
    match cell {
        CellValue::Null => RichText::new("NaN").weak(),
        CellValue::Float(v) => RichText::new(format!("{v:.3}")),
        other => RichText::new(other.to_string()),
    }
}
