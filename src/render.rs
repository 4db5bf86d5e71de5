//! Owned, self-contained artifacts produced by the presentation routines.
//!
//! Nothing here touches egui state; the `ui` module only reads these values.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use eframe::egui::Color32;

// ---------------------------------------------------------------------------
// Rendered output
// ---------------------------------------------------------------------------

/// One render pass worth of output for the central panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub heading: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Preformatted monospace text.
    Text(String),
    Table(TableView),
    Chart(Chart),
    /// Advisory message; nothing was computed.
    Warning(String),
    Error(String),
}

impl Rendered {
    pub fn new(heading: Option<&str>, body: Body) -> Self {
        Self {
            heading: heading.map(str::to_string),
            body,
        }
    }

    /// Plain-text form of textual and tabular output. Charts have none.
    pub fn plain_text(&self) -> Option<String> {
        match &self.body {
            Body::Text(s) | Body::Warning(s) | Body::Error(s) => Some(s.clone()),
            Body::Table(t) => Some(t.to_text().unwrap_or_else(|e| e.to_string())),
            Body::Chart(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// A fully formatted table: every cell is already a display string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub caption: Option<String>,
}

impl TableView {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns,
            rows,
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Render as a boxed ASCII table (the form placed on the clipboard).
    pub fn to_text(&self) -> Result<String, ArrowError> {
        if self.columns.is_empty() {
            return Ok(String::new());
        }
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect();
        let arrays: Vec<ArrayRef> = (0..self.columns.len())
            .map(|j| {
                let cells: Vec<&str> = self
                    .rows
                    .iter()
                    .map(|row| row.get(j).map_or("", String::as_str))
                    .collect();
                Arc::new(StringArray::from(cells)) as ArrayRef
            })
            .collect();

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        let mut text = pretty_format_batches(&[batch])?.to_string();
        if let Some(caption) = &self.caption {
            text.push('\n');
            text.push_str(caption);
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Heatmap(Heatmap),
    PairGrid(PairGrid),
    Histogram(HistogramChart),
    Boxplot(BoxplotChart),
}

/// Annotated, colour-coded square matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` × `labels.len()`.
    pub cells: Vec<Vec<HeatCell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub value: f64,
    pub fill: Color32,
    pub annotation: String,
    pub text_color: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSpec {
    pub center: f64,
    pub width: f64,
    pub height: f64,
}

/// Scatter matrix: `panels[row][col]` plots column `col` (x) against `row` (y).
#[derive(Debug, Clone, PartialEq)]
pub struct PairGrid {
    pub columns: Vec<String>,
    pub panels: Vec<Vec<PairPanel>>,
    pub colors: Vec<Color32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairPanel {
    Histogram(Vec<BarSpec>),
    Scatter(Vec<[f64; 2]>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    pub column: String,
    pub bars: Vec<BarSpec>,
    /// Density curve already scaled to bar heights.
    pub density: Vec<[f64; 2]>,
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotChart {
    pub column: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub color: Color32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_text_is_a_boxed_grid() {
        let t = TableView::new(
            vec!["Column".into(), "Null Count".into()],
            vec![vec!["A".into(), "0".into()], vec!["B".into(), "1".into()]],
        );
        let text = t.to_text().unwrap();
        assert!(text.starts_with('+'));
        assert!(text.contains("| Column | Null Count |"));
        assert!(text.contains("| B      | 1          |"));
    }

    #[test]
    fn empty_tables_render() {
        assert_eq!(TableView::default().to_text().unwrap(), "");
        let no_rows = TableView::new(vec!["x".into()], Vec::new()).with_caption("0 rows");
        let text = no_rows.to_text().unwrap();
        assert!(text.contains("| x |"));
        assert!(text.ends_with("0 rows"));
    }
}
