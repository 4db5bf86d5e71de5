use std::collections::BTreeMap;

use crate::color::{self, ACCENT};
use crate::data::model::Dataset;
use crate::render::{
    BarSpec, Body, BoxplotChart, Chart, HeatCell, Heatmap, HistogramChart, PairGrid, PairPanel,
    Rendered, TableView,
};

use super::{
    AnalysisResult, BoxplotData, CorrelationMatrix, DataInfo, DescribeTable, HistogramData,
    PairGridData, RowSubset,
};

// ---------------------------------------------------------------------------
// Per-analysis presenters (heading + shared body conversion)
// ---------------------------------------------------------------------------

pub fn data_info(result: AnalysisResult) -> Rendered {
    Rendered::new(Some("Data Info"), body(result))
}

pub fn describe(result: AnalysisResult) -> Rendered {
    Rendered::new(Some("Descriptive Statistics"), body(result))
}

pub fn null_counts(result: AnalysisResult) -> Rendered {
    Rendered::new(Some("Null Value Count"), body(result))
}

pub fn correlation(result: AnalysisResult) -> Rendered {
    Rendered::new(Some("Correlation Heatmap"), body(result))
}

pub fn pairplot(result: AnalysisResult) -> Rendered {
    Rendered::new(Some("Pairplot"), body(result))
}

pub fn histogram(result: AnalysisResult) -> Rendered {
    let heading = match &result {
        AnalysisResult::Histogram(h) => format!("Histogram of {}", h.column),
        _ => "Histogram".to_string(),
    };
    Rendered::new(Some(&heading), body(result))
}

pub fn boxplot(result: AnalysisResult) -> Rendered {
    let heading = match &result {
        AnalysisResult::Boxplot(b) => format!("Boxplot of {}", b.column),
        _ => "Boxplot".to_string(),
    };
    Rendered::new(Some(&heading), body(result))
}

pub fn custom_query(result: AnalysisResult) -> Rendered {
    Rendered::new(Some("Run a Custom Query"), body(result))
}

fn body(result: AnalysisResult) -> Body {
    match result {
        AnalysisResult::Info(info) => Body::Text(info_text(&info)),
        AnalysisResult::Describe(table) => Body::Table(describe_table(&table)),
        AnalysisResult::ColumnCounts(counts) => Body::Table(TableView::new(
            vec!["Column".into(), "Null Count".into()],
            counts
                .into_iter()
                .map(|(name, n)| vec![name, n.to_string()])
                .collect(),
        )),
        AnalysisResult::Correlation(matrix) => Body::Chart(Chart::Heatmap(heatmap(&matrix))),
        AnalysisResult::PairGrid(grid) => Body::Chart(Chart::PairGrid(pair_grid(&grid))),
        AnalysisResult::Histogram(h) => Body::Chart(Chart::Histogram(histogram_chart(h))),
        AnalysisResult::Boxplot(b) => Body::Chart(Chart::Boxplot(boxplot_chart(b))),
        AnalysisResult::Rows(subset) => Body::Table(rows_table(subset)),
        AnalysisResult::Warning(w) => Body::Warning(w.message),
        AnalysisResult::Error(e) => Body::Error(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Text and tables
// ---------------------------------------------------------------------------

/// Column listing in the familiar data-frame `info()` layout.
fn info_text(info: &DataInfo) -> String {
    let mut out = String::from("<class 'Dataset'>\n");
    if info.rows == 0 {
        out.push_str("RangeIndex: 0 entries\n");
    } else {
        out.push_str(&format!(
            "RangeIndex: {} entries, 0 to {}\n",
            info.rows,
            info.rows - 1
        ));
    }
    out.push_str(&format!(
        "Data columns (total {} columns):\n",
        info.columns.len()
    ));

    let counts: Vec<String> = info
        .columns
        .iter()
        .map(|c| format!("{} non-null", c.non_null))
        .collect();
    let w_idx = info.columns.len().saturating_sub(1).to_string().len().max(3);
    let w_name = info
        .columns
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());
    let w_count = counts
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("Non-Null Count".len());

    let mut line = |a: &str, b: &str, c: &str, d: &str| {
        let text = format!(" {a:<w_idx$} {b:<w_name$}  {c:<w_count$}  {d}");
        out.push_str(text.trim_end());
        out.push('\n');
    };
    line("#", "Column", "Non-Null Count", "Dtype");
    line(
        "---",
        &"-".repeat("Column".len()),
        &"-".repeat("Non-Null Count".len()),
        "-----",
    );
    for (i, (c, count)) in info.columns.iter().zip(&counts).enumerate() {
        line(&i.to_string(), &c.name, count, c.dtype);
    }

    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for c in &info.columns {
        *tally.entry(c.dtype).or_default() += 1;
    }
    let dtypes: Vec<String> = tally.iter().map(|(d, n)| format!("{d}({n})")).collect();
    out.push_str(&format!("dtypes: {}\n", dtypes.join(", ")));
    out.push_str(&format!("memory usage: {}", memory_text(info.memory_bytes)));
    out
}

fn memory_text(bytes: usize) -> String {
    let mut size = bytes as f64;
    for unit in ["bytes", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1}+ {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}+ TB")
}

fn stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.6}")
    }
}

fn describe_table(table: &DescribeTable) -> TableView {
    match table {
        DescribeTable::Numeric(columns) => {
            let mut header = vec![String::new()];
            header.extend(columns.iter().map(|(name, _)| name.clone()));

            let labels = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];
            let rows = labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    let mut row = vec![label.to_string()];
                    row.extend(columns.iter().map(|(_, s)| {
                        let v = match i {
                            0 => s.count as f64,
                            1 => s.mean,
                            2 => s.std,
                            3 => s.min,
                            4 => s.q1,
                            5 => s.median,
                            6 => s.q3,
                            _ => s.max,
                        };
                        stat(v)
                    }));
                    row
                })
                .collect();
            TableView::new(header, rows)
        }
        DescribeTable::Categorical(columns) => {
            let mut header = vec![String::new()];
            header.extend(columns.iter().map(|(name, _)| name.clone()));

            let mut count = vec!["count".to_string()];
            let mut unique = vec!["unique".to_string()];
            let mut top = vec!["top".to_string()];
            let mut freq = vec!["freq".to_string()];
            for (_, s) in columns {
                count.push(s.count.to_string());
                unique.push(s.unique.to_string());
                top.push(s.top.clone().unwrap_or_else(|| "NaN".to_string()));
                freq.push(if s.top.is_some() {
                    s.freq.to_string()
                } else {
                    "NaN".to_string()
                });
            }
            TableView::new(header, vec![count, unique, top, freq])
        }
    }
}

fn rows_table(subset: RowSubset) -> TableView {
    let mut header = vec!["index".to_string()];
    header.extend(subset.columns);

    let matched = subset.indices.len();
    let rows = subset
        .indices
        .iter()
        .zip(subset.rows)
        .map(|(idx, values)| {
            let mut row = vec![idx.to_string()];
            row.extend(values.iter().map(ToString::to_string));
            row
        })
        .collect();

    TableView::new(header, rows).with_caption(format!(
        "{matched} of {} rows matched",
        subset.total_rows
    ))
}

/// The first `n` rows, shown above every analysis after a load.
pub fn preview(dataset: &Dataset, n: usize) -> TableView {
    let mut header = vec![String::new()];
    header.extend(dataset.column_names());

    let shown = n.min(dataset.row_count());
    let rows = (0..shown)
        .map(|row| {
            let mut cells = vec![row.to_string()];
            cells.extend((0..dataset.column_count()).map(|col| dataset.cell(row, col).to_string()));
            cells
        })
        .collect();

    TableView::new(header, rows).with_caption(format!(
        "{} rows × {} columns",
        dataset.row_count(),
        dataset.column_count()
    ))
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn heatmap(matrix: &CorrelationMatrix) -> Heatmap {
    let cells = matrix
        .values
        .iter()
        .map(|row| {
            row.iter()
                .map(|&value| {
                    let fill = color::coolwarm(value);
                    HeatCell {
                        value,
                        fill,
                        annotation: if value.is_nan() {
                            String::new()
                        } else {
                            format!("{value:.2}")
                        },
                        text_color: color::text_on(fill),
                    }
                })
                .collect()
        })
        .collect();

    Heatmap {
        labels: matrix.columns.clone(),
        cells,
    }
}

fn bars(bins: &[crate::data::stats::Bin]) -> Vec<BarSpec> {
    bins.iter()
        .map(|b| BarSpec {
            center: b.center(),
            width: b.width(),
            height: b.count as f64,
        })
        .collect()
}

fn pair_grid(grid: &PairGridData) -> PairGrid {
    let n = grid.columns.len();
    let panels = (0..n)
        .map(|row| {
            (0..n)
                .map(|col| {
                    if row == col {
                        PairPanel::Histogram(bars(&grid.bins[col]))
                    } else {
                        let points = grid.values[col]
                            .iter()
                            .zip(&grid.values[row])
                            .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
                            .collect();
                        PairPanel::Scatter(points)
                    }
                })
                .collect()
        })
        .collect();

    PairGrid {
        columns: grid.columns.clone(),
        panels,
        colors: color::generate_palette(n),
    }
}

/// Bars are counts, so the density curve is scaled by `count × bin width`.
fn histogram_chart(h: HistogramData) -> HistogramChart {
    let bin_width = h.bins.first().map_or(1.0, |b| b.width());
    let scale = h.count as f64 * bin_width;
    HistogramChart {
        bars: bars(&h.bins),
        density: h.density.iter().map(|&[x, p]| [x, p * scale]).collect(),
        column: h.column,
        color: ACCENT,
    }
}

fn boxplot_chart(b: BoxplotData) -> BoxplotChart {
    BoxplotChart {
        column: b.column,
        lower_whisker: b.stats.lower_whisker,
        q1: b.stats.q1,
        median: b.stats.median,
        q3: b.stats.q3,
        upper_whisker: b.stats.upper_whisker,
        outliers: b.stats.outliers,
        color: ACCENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute, AnalysisChoice};
    use crate::data::loader::{parse_bytes, LoadOptions};

    fn scenario() -> Dataset {
        parse_bytes(b"A,B\n1,x\n2,y\n3,\n", &LoadOptions::default()).unwrap()
    }

    #[test]
    fn info_text_lists_every_column() {
        let ds = scenario();
        let out = data_info(compute::data_info(&ds, &AnalysisChoice::DataInfo));
        let Body::Text(text) = out.body else {
            panic!("expected text");
        };
        assert!(text.starts_with("<class 'Dataset'>\nRangeIndex: 3 entries, 0 to 2\n"));
        assert!(text.contains("Data columns (total 2 columns):"));
        assert!(text.contains(" 0   A       3 non-null      int64"));
        assert!(text.contains(" 1   B       2 non-null      object"));
        assert!(text.contains("dtypes: int64(1), object(1)\nmemory usage: "));
        assert!(text.ends_with(" bytes"));
    }

    #[test]
    fn memory_text_scales_units() {
        assert_eq!(memory_text(100), "100.0+ bytes");
        assert_eq!(memory_text(2048), "2.0+ KB");
        assert_eq!(memory_text(3 * 1024 * 1024), "3.0+ MB");
    }

    #[test]
    fn describe_table_has_stat_rows() {
        let ds = scenario();
        let out = describe(compute::describe(&ds, &AnalysisChoice::DescriptiveStatistics));
        let Body::Table(table) = out.body else {
            panic!("expected table");
        };
        assert_eq!(table.columns, ["", "A"]);
        assert_eq!(table.rows[0], ["count", "3.000000"]);
        assert_eq!(table.rows[1], ["mean", "2.000000"]);
        assert_eq!(table.rows[3], ["min", "1.000000"]);
        assert_eq!(table.rows[7], ["max", "3.000000"]);
    }

    #[test]
    fn query_rows_keep_their_row_index() {
        let ds = scenario();
        let out = custom_query(compute::custom_query(
            &ds,
            &AnalysisChoice::CustomQuery {
                expression: "B != 'x'".into(),
            },
        ));
        let Body::Table(table) = out.body else {
            panic!("expected table");
        };
        assert_eq!(table.rows, [["1", "2", "y"], ["2", "3", "NaN"]]);
        assert_eq!(table.caption.as_deref(), Some("2 of 3 rows matched"));
    }

    #[test]
    fn heatmap_cells_are_annotated() {
        let ds = parse_bytes(b"x,y\n1,3\n2,2\n3,1\n", &LoadOptions::default()).unwrap();
        let out = correlation(compute::correlation(&ds, &AnalysisChoice::CorrelationHeatmap));
        let Body::Chart(Chart::Heatmap(h)) = out.body else {
            panic!("expected heatmap");
        };
        assert_eq!(h.labels, ["x", "y"]);
        assert_eq!(h.cells[0][0].annotation, "1.00");
        assert_eq!(h.cells[0][1].annotation, "-1.00");
        assert_ne!(h.cells[0][0].fill, h.cells[0][1].fill);
    }

    #[test]
    fn pair_grid_has_histograms_on_the_diagonal() {
        let ds = parse_bytes(b"x,y,z\n1,3,\n2,2,1\n3,1,4\n", &LoadOptions::default()).unwrap();
        let out = pairplot(compute::pairplot(&ds, &AnalysisChoice::Pairplot));
        let Body::Chart(Chart::PairGrid(g)) = out.body else {
            panic!("expected pair grid");
        };
        assert_eq!(g.panels.len(), 3);
        assert!(matches!(g.panels[1][1], PairPanel::Histogram(_)));
        let PairPanel::Scatter(points) = &g.panels[2][0] else {
            panic!("expected scatter");
        };
        // Row 0 has no z value, so only two points survive.
        assert_eq!(points, &vec![[2.0, 1.0], [3.0, 4.0]]);
    }

    #[test]
    fn histogram_density_is_scaled_to_counts() {
        let ds = parse_bytes(b"v\n1\n2\n2\n3\n3\n3\n4\n4\n5\n", &LoadOptions::default()).unwrap();
        let out = histogram(compute::histogram(&ds, &AnalysisChoice::Histogram { column: None }));
        assert_eq!(out.heading.as_deref(), Some("Histogram of v"));
        let Body::Chart(Chart::Histogram(h)) = out.body else {
            panic!("expected histogram");
        };
        let tallest = h.bars.iter().map(|b| b.height).fold(0.0, f64::max);
        let peak = h.density.iter().map(|p| p[1]).fold(0.0, f64::max);
        assert!(peak > 0.5 * tallest && peak < 2.0 * tallest);
    }

    #[test]
    fn preview_shows_first_rows() {
        let t = preview(&scenario(), 2);
        assert_eq!(t.columns, ["", "A", "B"]);
        assert_eq!(t.rows, [["0", "1", "x"], ["1", "2", "y"]]);
        assert_eq!(t.caption.as_deref(), Some("3 rows × 2 columns"));
    }
}
