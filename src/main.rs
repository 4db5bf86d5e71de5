mod analysis;
mod app;
mod color;
mod data;
mod error;
mod render;
mod settings;
mod state;
mod ui;

use std::path::{Path, PathBuf};

use app::ExplorerApp;
use eframe::egui;
use settings::{Settings, SETTINGS_FILE};
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load_or_default(Path::new(SETTINGS_FILE));
    let [width, height] = settings.window_size;

    let mut state = AppState::new(settings);
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        if let Err(e) = state.load_path(&path) {
            log::debug!("'{}' not loaded: {e}", path.display());
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "CSV Data Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ExplorerApp::new(state)))),
    )
}
