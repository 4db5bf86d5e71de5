/// Analysis layer: the fixed menu and its dispatch.
///
/// Architecture:
/// ```text
///   AnalysisChoice (menu name + its own parameters)
///        │
///        ▼
///   ┌──────────┐
///   │ REGISTRY  │  name → (compute, present, parameter schema)
///   └──────────┘
///        │ compute(&Dataset, &choice)
///        ▼
///   AnalysisResult  (summary, counts, matrix, chart data, rows, warning, error)
///        │ present(result)
///        ▼
///   Rendered        (owned artifact drawn by the ui module)
/// ```
pub mod compute;
pub mod present;

use crate::data::model::{Dataset, Value};
use crate::data::stats::{Bin, BoxStats, NumericSummary};
use crate::error::AnalysisError;
use crate::render::Rendered;

// ---------------------------------------------------------------------------
// Menu entries
// ---------------------------------------------------------------------------

/// The eight analyses offered in the menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    DataInfo,
    DescriptiveStatistics,
    NullValueCount,
    CorrelationHeatmap,
    Pairplot,
    Histogram,
    Boxplot,
    CustomQuery,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 8] = [
        AnalysisKind::DataInfo,
        AnalysisKind::DescriptiveStatistics,
        AnalysisKind::NullValueCount,
        AnalysisKind::CorrelationHeatmap,
        AnalysisKind::Pairplot,
        AnalysisKind::Histogram,
        AnalysisKind::Boxplot,
        AnalysisKind::CustomQuery,
    ];

    pub fn entry(self) -> &'static AnalysisEntry {
        &REGISTRY[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Exact-match lookup of a menu label.
    pub fn from_name(name: &str) -> Option<Self> {
        lookup(name).map(|e| e.kind)
    }
}

/// Which extra input an analysis needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSchema {
    None,
    /// One of the dataset's numeric columns.
    NumericColumn { prompt: &'static str },
    /// A filter expression.
    QueryText {
        prompt: &'static str,
        hint: &'static str,
    },
}

/// A menu choice together with the parameters that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisChoice {
    DataInfo,
    DescriptiveStatistics,
    NullValueCount,
    CorrelationHeatmap,
    Pairplot,
    /// `None` picks the first numeric column.
    Histogram { column: Option<String> },
    Boxplot { column: Option<String> },
    CustomQuery { expression: String },
}

impl AnalysisChoice {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisChoice::DataInfo => AnalysisKind::DataInfo,
            AnalysisChoice::DescriptiveStatistics => AnalysisKind::DescriptiveStatistics,
            AnalysisChoice::NullValueCount => AnalysisKind::NullValueCount,
            AnalysisChoice::CorrelationHeatmap => AnalysisKind::CorrelationHeatmap,
            AnalysisChoice::Pairplot => AnalysisKind::Pairplot,
            AnalysisChoice::Histogram { .. } => AnalysisKind::Histogram,
            AnalysisChoice::Boxplot { .. } => AnalysisKind::Boxplot,
            AnalysisChoice::CustomQuery { .. } => AnalysisKind::CustomQuery,
        }
    }
}

pub type ComputeFn = fn(&Dataset, &AnalysisChoice) -> AnalysisResult;
pub type PresentFn = fn(AnalysisResult) -> Rendered;

pub struct AnalysisEntry {
    pub kind: AnalysisKind,
    pub name: &'static str,
    pub params: ParamSchema,
    pub compute: ComputeFn,
    pub present: PresentFn,
}

/// Indexed by `AnalysisKind as usize`.
pub static REGISTRY: [AnalysisEntry; 8] = [
    AnalysisEntry {
        kind: AnalysisKind::DataInfo,
        name: "Show Data Info",
        params: ParamSchema::None,
        compute: compute::data_info,
        present: present::data_info,
    },
    AnalysisEntry {
        kind: AnalysisKind::DescriptiveStatistics,
        name: "Show Descriptive Statistics",
        params: ParamSchema::None,
        compute: compute::describe,
        present: present::describe,
    },
    AnalysisEntry {
        kind: AnalysisKind::NullValueCount,
        name: "Show Null Value Count",
        params: ParamSchema::None,
        compute: compute::null_counts,
        present: present::null_counts,
    },
    AnalysisEntry {
        kind: AnalysisKind::CorrelationHeatmap,
        name: "Correlation Heatmap",
        params: ParamSchema::None,
        compute: compute::correlation,
        present: present::correlation,
    },
    AnalysisEntry {
        kind: AnalysisKind::Pairplot,
        name: "Pairplot",
        params: ParamSchema::None,
        compute: compute::pairplot,
        present: present::pairplot,
    },
    AnalysisEntry {
        kind: AnalysisKind::Histogram,
        name: "Histogram",
        params: ParamSchema::NumericColumn {
            prompt: "Select a column to plot a histogram",
        },
        compute: compute::histogram,
        present: present::histogram,
    },
    AnalysisEntry {
        kind: AnalysisKind::Boxplot,
        name: "Boxplot",
        params: ParamSchema::NumericColumn {
            prompt: "Select a column to plot a boxplot",
        },
        compute: compute::boxplot,
        present: present::boxplot,
    },
    AnalysisEntry {
        kind: AnalysisKind::CustomQuery,
        name: "Custom Query",
        params: ParamSchema::QueryText {
            prompt: "Enter your query",
            hint: "e.g. Salary > 70000 and Age < 40",
        },
        compute: compute::custom_query,
        present: present::custom_query,
    },
];

pub fn lookup(name: &str) -> Option<&'static AnalysisEntry> {
    REGISTRY.iter().find(|e| e.name == name)
}

/// Compute then present one analysis against the dataset.
pub fn run(dataset: &Dataset, choice: &AnalysisChoice) -> Rendered {
    let entry = choice.kind().entry();
    log::debug!("running '{}' with {choice:?}", entry.name);

    let result = (entry.compute)(dataset, choice);
    match &result {
        AnalysisResult::Warning(w) => log::warn!(
            "{}: {} (needs {}, found {})",
            entry.name,
            w.message,
            w.required,
            w.found
        ),
        AnalysisResult::Error(e) => log::info!("{}: {e}", entry.name),
        _ => {}
    }
    (entry.present)(result)
}

// ---------------------------------------------------------------------------
// Computation results
// ---------------------------------------------------------------------------

/// Transient output of a computation routine; consumed by its presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Info(DataInfo),
    Describe(DescribeTable),
    /// Column name → count, in dataset column order.
    ColumnCounts(Vec<(String, usize)>),
    Correlation(CorrelationMatrix),
    PairGrid(PairGridData),
    Histogram(HistogramData),
    Boxplot(BoxplotData),
    Rows(RowSubset),
    Warning(InsufficientColumnsWarning),
    Error(AnalysisError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataInfo {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    /// Estimated in-memory size of the columns as arrow buffers.
    pub memory_bytes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: &'static str,
    pub non_null: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DescribeTable {
    Numeric(Vec<(String, NumericSummary)>),
    /// Used when the dataset has no numeric column at all.
    Categorical(Vec<(String, CategoricalSummary)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `NaN` where the coefficient is undefined.
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairGridData {
    pub columns: Vec<String>,
    /// Per column, one entry per dataset row.
    pub values: Vec<Vec<Option<f64>>>,
    pub bins: Vec<Vec<Bin>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    pub column: String,
    pub count: usize,
    pub bins: Vec<Bin>,
    /// Probability density `[x, p(x)]`.
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotData {
    pub column: String,
    pub stats: BoxStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSubset {
    pub columns: Vec<String>,
    pub indices: Vec<usize>,
    pub rows: Vec<Vec<Value>>,
    pub total_rows: usize,
}

/// Non-fatal: the analysis needs more numeric columns than the dataset has.
#[derive(Debug, Clone, PartialEq)]
pub struct InsufficientColumnsWarning {
    pub required: usize,
    pub found: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_bytes, LoadOptions};
    use crate::render::Body;

    fn load(csv: &str) -> Dataset {
        parse_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn registry_order_matches_kinds() {
        for (i, kind) in AnalysisKind::ALL.iter().enumerate() {
            assert_eq!(REGISTRY[i].kind, *kind);
            assert_eq!(AnalysisKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn names_match_exactly() {
        assert_eq!(
            AnalysisKind::from_name("Show Null Value Count"),
            Some(AnalysisKind::NullValueCount)
        );
        assert_eq!(AnalysisKind::from_name("show null value count"), None);
        assert!(lookup("Scatter").is_none());
    }

    #[test]
    fn only_column_and_query_analyses_take_parameters() {
        for entry in &REGISTRY {
            let expected = matches!(
                entry.kind,
                AnalysisKind::Histogram | AnalysisKind::Boxplot | AnalysisKind::CustomQuery
            );
            assert_eq!(entry.params != ParamSchema::None, expected, "{}", entry.name);
        }
    }

    #[test]
    fn run_is_deterministic_for_text_and_tables() {
        let ds = load("A,B,C\n1,x,2.5\n2,y,\n3,,4.0\n4,x,1.0\n");
        let choices = [
            AnalysisChoice::DataInfo,
            AnalysisChoice::DescriptiveStatistics,
            AnalysisChoice::NullValueCount,
            AnalysisChoice::CustomQuery {
                expression: "A > 1 and B == 'x'".into(),
            },
        ];
        for choice in &choices {
            let first = run(&ds, choice).plain_text();
            let second = run(&ds, choice).plain_text();
            assert!(first.is_some());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn failed_query_leaves_dataset_untouched() {
        let ds = load("A,B\n1,x\n2,y\n");
        let before = ds.clone();
        let out = run(
            &ds,
            &AnalysisChoice::CustomQuery {
                expression: "Missing > 1".into(),
            },
        );
        assert!(matches!(out.body, Body::Error(ref m) if m.contains("Missing")));
        assert_eq!(ds, before);
    }

    #[test]
    fn pairplot_warns_but_never_errors() {
        let one = load("A,B\n1,x\n2,y\n");
        assert!(matches!(run(&one, &AnalysisChoice::Pairplot).body, Body::Warning(_)));

        let two = load("A,B\n1,2\n2,5\n3,4\n");
        assert!(matches!(run(&two, &AnalysisChoice::Pairplot).body, Body::Chart(_)));
    }
}
