use std::path::Path;

use crate::analysis::{self, present, AnalysisChoice, AnalysisKind};
use crate::data::loader::{self, LoadOptions};
use crate::data::model::Dataset;
use crate::error::ParseError;
use crate::render::{Rendered, TableView};
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing loaded yet.
    AwaitingFile,
    Idle,
    /// Between dispatch and presentation of one analysis.
    Rendering,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,
    options: LoadOptions,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Dataset>,

    /// File name of the loaded dataset, for the top bar.
    pub source_name: Option<String>,

    pub phase: SessionPhase,

    /// Analysis picked in the menu.
    pub selected: AnalysisKind,

    /// Column parameters, one per single-column chart.
    histogram_column: Option<String>,
    boxplot_column: Option<String>,

    /// Query text being edited; committed with [`AppState::set_query`].
    pub query_draft: String,
    query: String,

    /// First rows of the dataset, rebuilt on every load.
    pub preview: Option<TableView>,

    /// Output of the last dispatch.
    pub output: Option<Rendered>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    last_choice: Option<AnalysisChoice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let options = settings.to_load_options().unwrap_or_else(|e| {
            log::warn!("{e:#}; falling back to default load options");
            LoadOptions::default()
        });
        Self {
            settings,
            options,
            dataset: None,
            source_name: None,
            phase: SessionPhase::AwaitingFile,
            selected: AnalysisKind::DataInfo,
            histogram_column: None,
            boxplot_column: None,
            query_draft: String::new(),
            query: String::new(),
            preview: None,
            output: None,
            status_message: None,
            last_choice: None,
        }
    }

    /// Parse an upload. On failure the current dataset (if any) is kept.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), ParseError> {
        let result = loader::parse_bytes(bytes, &self.options);
        self.finish_load(name, result)
    }

    pub fn load_path(&mut self, path: &Path) -> Result<(), ParseError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let result = loader::load_path(path, &self.options);
        self.finish_load(&name, result)
    }

    fn finish_load(
        &mut self,
        name: &str,
        result: Result<Dataset, ParseError>,
    ) -> Result<(), ParseError> {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded '{name}': {} rows, columns {:?}",
                    dataset.row_count(),
                    dataset.column_names()
                );
                self.set_dataset(dataset);
                self.source_name = Some(name.to_string());
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load '{name}': {e}");
                self.status_message = Some(format!("Error loading {name}: {e}"));
                Err(e)
            }
        }
    }

    /// Replace the dataset wholesale and reset dataset-dependent parameters.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let first_numeric = dataset.numeric_columns().first().map(|c| c.name.clone());
        self.histogram_column = first_numeric.clone();
        self.boxplot_column = first_numeric;
        self.preview = Some(present::preview(&dataset, self.settings.preview_rows));
        self.dataset = Some(dataset);
        self.source_name = None;
        self.output = None;
        self.last_choice = None;
        self.status_message = None;
        self.phase = SessionPhase::Idle;
    }

    pub fn select(&mut self, kind: AnalysisKind) {
        self.selected = kind;
    }

    fn column_slot(&mut self) -> Option<&mut Option<String>> {
        match self.selected {
            AnalysisKind::Histogram => Some(&mut self.histogram_column),
            AnalysisKind::Boxplot => Some(&mut self.boxplot_column),
            _ => None,
        }
    }

    /// Column parameter of the selected analysis, if it takes one.
    pub fn column(&self) -> Option<&str> {
        match self.selected {
            AnalysisKind::Histogram => self.histogram_column.as_deref(),
            AnalysisKind::Boxplot => self.boxplot_column.as_deref(),
            _ => None,
        }
    }

    /// Set the column parameter of the selected analysis; ignored for
    /// analyses without one.
    pub fn set_column(&mut self, name: &str) {
        let kind = self.selected;
        match self.column_slot() {
            Some(slot) => *slot = Some(name.to_string()),
            None => log::debug!("{} takes no column parameter", kind.name()),
        }
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.trim().to_string();
    }

    /// The committed query expression.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The menu choice with its parameters, or `None` while something required
    /// is missing (no dataset, or an empty query).
    pub fn current_choice(&self) -> Option<AnalysisChoice> {
        self.dataset.as_ref()?;
        let choice = match self.selected {
            AnalysisKind::DataInfo => AnalysisChoice::DataInfo,
            AnalysisKind::DescriptiveStatistics => AnalysisChoice::DescriptiveStatistics,
            AnalysisKind::NullValueCount => AnalysisChoice::NullValueCount,
            AnalysisKind::CorrelationHeatmap => AnalysisChoice::CorrelationHeatmap,
            AnalysisKind::Pairplot => AnalysisChoice::Pairplot,
            AnalysisKind::Histogram => AnalysisChoice::Histogram {
                column: self.histogram_column.clone(),
            },
            AnalysisKind::Boxplot => AnalysisChoice::Boxplot {
                column: self.boxplot_column.clone(),
            },
            AnalysisKind::CustomQuery => {
                if self.query.is_empty() {
                    return None;
                }
                AnalysisChoice::CustomQuery {
                    expression: self.query.clone(),
                }
            }
        };
        Some(choice)
    }

    /// Re-run the current choice if it changed since the last pass.
    /// Returns whether an analysis was dispatched.
    pub fn refresh(&mut self) -> bool {
        let Some(choice) = self.current_choice() else {
            self.output = None;
            self.last_choice = None;
            return false;
        };
        if self.last_choice.as_ref() == Some(&choice) {
            return false;
        }
        let Some(dataset) = &self.dataset else {
            return false;
        };

        self.phase = SessionPhase::Rendering;
        self.output = Some(analysis::run(dataset, &choice));
        self.last_choice = Some(choice);
        self.phase = SessionPhase::Idle;
        true
    }

    /// Names of the columns offered for Histogram / Boxplot.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|ds| ds.numeric_columns().iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }
}
