use eframe::egui::{self, Color32, Key, RichText, TextEdit, Ui};

use crate::analysis::{AnalysisKind, ParamSchema};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – analysis menu and its parameters
// ---------------------------------------------------------------------------

/// Render the left analysis panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analysis");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("Upload a CSV file to begin.");
        return;
    }

    ui.strong("Choose an analysis");
    let current = state.selected;
    egui::ComboBox::from_id_salt("analysis_kind")
        .selected_text(current.name())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in AnalysisKind::ALL {
                if ui.selectable_label(current == kind, kind.name()).clicked() {
                    state.select(kind);
                }
            }
        });

    ui.add_space(8.0);

    match state.selected.entry().params {
        ParamSchema::None => {}
        ParamSchema::NumericColumn { prompt } => column_picker(ui, state, prompt),
        ParamSchema::QueryText { prompt, hint } => query_editor(ui, state, prompt, hint),
    }
}

fn column_picker(ui: &mut Ui, state: &mut AppState, prompt: &str) {
    let columns = state.numeric_columns();
    if columns.is_empty() {
        // The analysis itself reports the warning.
        return;
    }

    ui.label(prompt);
    let current = state.column().unwrap_or_default().to_string();
    egui::ComboBox::from_id_salt(("numeric_column", state.selected.name()))
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                if ui.selectable_label(current == *col, col).clicked() {
                    state.set_column(col);
                }
            }
        });
}

fn query_editor(ui: &mut Ui, state: &mut AppState, prompt: &str, hint: &str) {
    ui.label(prompt);
    let response = ui.add(
        TextEdit::singleline(&mut state.query_draft)
            .hint_text(hint)
            .desired_width(ui.available_width()),
    );
    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Run").clicked() || submitted {
            let draft = state.query_draft.clone();
            state.set_query(&draft);
        }
        if ui.small_button("Clear").clicked() {
            state.query_draft.clear();
            state.set_query("");
        }
    });

    if state.query().is_empty() {
        ui.label(RichText::new("Press Enter or Run to filter the rows.").weak());
    }
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
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if let (Some(ds), Some(name)) = (&state.dataset, &state.source_name) {
            ui.label(format!(
                "{name}: {} rows × {} columns",
                ds.row_count(),
                ds.column_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a CSV file")
        .add_filter("CSV", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            log::debug!("'{}' not loaded: {e}", path.display());
        }
    }
}
