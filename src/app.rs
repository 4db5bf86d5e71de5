use eframe::egui;

use crate::state::AppState;
use crate::ui::{output, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Files dropped onto the window replace the dataset, last one wins.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let result = match (&file.path, &file.bytes) {
                (Some(path), _) => self.state.load_path(path),
                (None, Some(bytes)) => self.state.load_bytes(&file.name, bytes),
                (None, None) => continue,
            };
            if let Err(e) = result {
                log::debug!("dropped file '{}' rejected: {e}", file.name);
            }
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: analysis menu ----
        egui::SidePanel::left("analysis_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        self.state.refresh();

        // ---- Central panel: preview and output ----
        egui::CentralPanel::default().show(ctx, |ui| {
            output::central_panel(ui, &self.state);
        });
    }
}
