use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::render::{Body, Rendered, TableView};
use crate::state::AppState;

use super::plot;

const ROW_HEIGHT: f32 = 18.0;
const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 30);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the data preview followed by the output of the selected analysis.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload a CSV file to begin  (File → Open… or drop a file here)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(preview) = &state.preview {
                ui.heading("Data Preview");
                table(ui, "preview_table", preview);
                ui.separator();
            }

            match &state.output {
                Some(rendered) => show(ui, rendered),
                None => {
                    ui.label(RichText::new("Nothing to show yet.").weak());
                }
            }
        });
}

fn show(ui: &mut Ui, rendered: &Rendered) {
    if let Some(heading) = &rendered.heading {
        ui.heading(heading);
    }
    match &rendered.body {
        Body::Text(text) => {
            ui.label(RichText::new(text).monospace());
        }
        Body::Table(view) => {
            copy_button(ui, rendered);
            table(ui, "output_table", view);
        }
        Body::Chart(chart) => plot::chart(ui, chart),
        Body::Warning(msg) => {
            ui.label(RichText::new(msg).color(WARNING_COLOR));
        }
        Body::Error(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    }
}

fn copy_button(ui: &mut Ui, rendered: &Rendered) {
    if ui.small_button("Copy as text").clicked() {
        if let Some(text) = rendered.plain_text() {
            ui.ctx().copy_text(text);
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

fn table(ui: &mut Ui, id: &str, view: &TableView) {
    if let Some(caption) = &view.caption {
        ui.label(RichText::new(caption).weak());
    }
    if view.columns.is_empty() {
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .columns(Column::auto().at_least(40.0), view.columns.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for name in &view.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, view.rows.len(), |mut row| {
                        let cells = &view.rows[row.index()];
                        for cell in cells {
                            row.col(|ui: &mut Ui| {
                                ui.add(egui::Label::new(cell).extend());
                            });
                        }
                    });
                });
        });
    });
}
