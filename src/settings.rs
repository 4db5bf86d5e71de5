use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::{LoadOptions, DEFAULT_NULL_MARKERS};

/// Looked up in the working directory at startup.
pub const SETTINGS_FILE: &str = "csv_explorer.json";

/// User-tunable options. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub delimiter: char,
    pub null_markers: Vec<String>,
    /// Rows shown in the data preview above each analysis.
    pub preview_rows: usize,
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiter: ',',
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
            preview_rows: 5,
            window_size: [1200.0, 800.0],
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid settings JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Settings from `path` if it exists; defaults when absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no {} found, using default settings", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                log::info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("ignoring settings: {e:#}");
                Self::default()
            }
        }
    }

    pub fn to_load_options(&self) -> Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter {:?} is not a single ASCII character", self.delimiter);
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            null_markers: self.null_markers.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let s = Settings::from_json(r#"{ "delimiter": ";" }"#).unwrap();
        assert_eq!(s.delimiter, ';');
        assert_eq!(s.preview_rows, 5);
        assert_eq!(s.null_markers, Settings::default().null_markers);
        assert_eq!(s.to_load_options().unwrap().delimiter, b';');
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(Settings::from_json("{ delimiter: ").is_err());
        assert!(Settings::from_json(r#"{ "preview_rows": "five" }"#).is_err());
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let s = Settings {
            delimiter: '§',
            ..Settings::default()
        };
        assert!(s.to_load_options().is_err());
    }

    #[test]
    fn absent_file_gives_defaults() {
        let s = Settings::load_or_default(Path::new("definitely/not/here.json"));
        assert_eq!(s, Settings::default());
    }
}
