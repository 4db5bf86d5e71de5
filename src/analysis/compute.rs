use std::collections::HashMap;

use polars::prelude::Float64Chunked;

use crate::data::model::{Column, ColumnType, Dataset};
use crate::data::query::Query;
use crate::data::stats;
use crate::error::AnalysisError;

use super::{
    AnalysisChoice, AnalysisResult, BoxplotData, CategoricalSummary, ColumnInfo,
    CorrelationMatrix, DataInfo, DescribeTable, HistogramData, InsufficientColumnsWarning,
    PairGridData, RowSubset,
};

/// Points on the density curve overlaying a histogram.
const KDE_POINTS: usize = 200;

// ---------------------------------------------------------------------------
// Table summaries
// ---------------------------------------------------------------------------

pub fn data_info(dataset: &Dataset, _: &AnalysisChoice) -> AnalysisResult {
    let mut memory_bytes = 0;
    let columns = dataset
        .columns()
        .iter()
        .map(|c| {
            let series = c.to_series();
            memory_bytes += series.estimated_size();
            ColumnInfo {
                name: c.name.clone(),
                dtype: c.kind.dtype(),
                non_null: series.len() - series.null_count(),
            }
        })
        .collect();

    AnalysisResult::Info(DataInfo {
        rows: dataset.row_count(),
        columns,
        memory_bytes,
    })
}

/// Numeric columns get count/mean/std/quartiles; a dataset without any
/// numeric column gets count/unique/top/freq over its other columns.
pub fn describe(dataset: &Dataset, _: &AnalysisChoice) -> AnalysisResult {
    let numeric = dataset.numeric_columns();
    if !numeric.is_empty() {
        let rows = numeric
            .iter()
            .map(|c| (c.name.clone(), stats::summarize(&c.to_f64())))
            .collect();
        return AnalysisResult::Describe(DescribeTable::Numeric(rows));
    }

    let rows = dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), categorical_summary(c)))
        .collect();
    AnalysisResult::Describe(DescribeTable::Categorical(rows))
}

fn categorical_summary(column: &Column) -> CategoricalSummary {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut present = 0;
    for v in column.values.iter().filter(|v| !v.is_missing()) {
        present += 1;
        let key = v.to_string();
        let n = counts.entry(key.clone()).or_insert(0);
        if *n == 0 {
            order.push(key);
        }
        *n += 1;
    }

    // First-seen value wins ties.
    let mut top: Option<(&String, usize)> = None;
    for key in &order {
        let n = counts[key];
        if top.map_or(true, |(_, best)| n > best) {
            top = Some((key, n));
        }
    }

    CategoricalSummary {
        count: present,
        unique: order.len(),
        top: top.map(|(k, _)| k.clone()),
        freq: top.map_or(0, |(_, n)| n),
    }
}

pub fn null_counts(dataset: &Dataset, _: &AnalysisChoice) -> AnalysisResult {
    AnalysisResult::ColumnCounts(
        dataset
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.to_series().null_count()))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Multi-column charts
// ---------------------------------------------------------------------------

fn insufficient(required: usize, found: usize, message: &str) -> AnalysisResult {
    AnalysisResult::Warning(InsufficientColumnsWarning {
        required,
        found,
        message: message.to_string(),
    })
}

fn optional_values(column: &Column) -> Vec<Option<f64>> {
    column.values.iter().map(|v| v.as_f64()).collect()
}

/// Pearson matrix over numeric and boolean columns.
pub fn correlation(dataset: &Dataset, _: &AnalysisChoice) -> AnalysisResult {
    let columns: Vec<&Column> = dataset
        .columns()
        .iter()
        .filter(|c| c.is_numeric() || c.kind == ColumnType::Boolean)
        .collect();
    if columns.is_empty() {
        return insufficient(1, 0, "No numeric columns found for correlation heatmap.");
    }

    let data: Vec<Float64Chunked> = columns.iter().map(|c| c.to_f64()).collect();
    let values = (0..data.len())
        .map(|i| {
            (0..data.len())
                .map(|j| stats::pearson(&data[i], &data[j]))
                .collect()
        })
        .collect();

    AnalysisResult::Correlation(CorrelationMatrix {
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        values,
    })
}

pub fn pairplot(dataset: &Dataset, _: &AnalysisChoice) -> AnalysisResult {
    let numeric = dataset.numeric_columns();
    if numeric.len() < 2 {
        return insufficient(
            2,
            numeric.len(),
            "You need at least two numeric columns to generate a pairplot.",
        );
    }

    AnalysisResult::PairGrid(PairGridData {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        values: numeric.iter().map(|c| optional_values(c)).collect(),
        bins: numeric
            .iter()
            .map(|c| stats::histogram(&c.to_f64()))
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Single-column charts
// ---------------------------------------------------------------------------

/// The requested numeric column, or the first one when none was requested.
fn numeric_column<'a>(
    dataset: &'a Dataset,
    requested: Option<&str>,
) -> Result<Option<&'a Column>, AnalysisError> {
    match requested {
        Some(name) => {
            let column = dataset
                .column(name)
                .ok_or_else(|| AnalysisError::UnknownColumn(name.to_string()))?;
            if !column.is_numeric() {
                return Err(AnalysisError::NotNumeric(name.to_string()));
            }
            Ok(Some(column))
        }
        None => Ok(dataset.numeric_columns().into_iter().next()),
    }
}

fn requested_column(choice: &AnalysisChoice) -> Option<&str> {
    match choice {
        AnalysisChoice::Histogram { column } | AnalysisChoice::Boxplot { column } => {
            column.as_deref()
        }
        _ => None,
    }
}

pub fn histogram(dataset: &Dataset, choice: &AnalysisChoice) -> AnalysisResult {
    if dataset.numeric_columns().is_empty() {
        return insufficient(1, 0, "No numeric columns found for histogram.");
    }
    let column = match numeric_column(dataset, requested_column(choice)) {
        Ok(Some(c)) => c,
        Ok(None) => return insufficient(1, 0, "No numeric columns found for histogram."),
        Err(e) => return AnalysisResult::Error(e),
    };

    let values = column.to_f64();
    AnalysisResult::Histogram(HistogramData {
        column: column.name.clone(),
        count: values.len() - values.null_count(),
        bins: stats::histogram(&values),
        density: stats::gaussian_kde(&values, KDE_POINTS),
    })
}

pub fn boxplot(dataset: &Dataset, choice: &AnalysisChoice) -> AnalysisResult {
    if dataset.numeric_columns().is_empty() {
        return insufficient(1, 0, "No numeric columns found for boxplot.");
    }
    let column = match numeric_column(dataset, requested_column(choice)) {
        Ok(Some(c)) => c,
        Ok(None) => return insufficient(1, 0, "No numeric columns found for boxplot."),
        Err(e) => return AnalysisResult::Error(e),
    };

    match stats::box_stats(&column.to_f64()) {
        Some(stats) => AnalysisResult::Boxplot(BoxplotData {
            column: column.name.clone(),
            stats,
        }),
        None => insufficient(1, 0, "The selected column has no values to plot."),
    }
}

// ---------------------------------------------------------------------------
// Custom query
// ---------------------------------------------------------------------------

pub fn custom_query(dataset: &Dataset, choice: &AnalysisChoice) -> AnalysisResult {
    let expression = match choice {
        AnalysisChoice::CustomQuery { expression } => expression.as_str(),
        _ => "",
    };

    let indices = match Query::parse(expression, dataset).and_then(|q| q.matching_rows(dataset)) {
        Ok(indices) => indices,
        Err(e) => return AnalysisResult::Error(e.into()),
    };

    let rows = indices
        .iter()
        .map(|&row| {
            (0..dataset.column_count())
                .map(|col| dataset.cell(row, col).clone())
                .collect()
        })
        .collect();

    AnalysisResult::Rows(RowSubset {
        columns: dataset.column_names(),
        indices,
        rows,
        total_rows: dataset.row_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{parse_bytes, LoadOptions};
    use crate::data::model::Value;
    use crate::error::QueryError;

    fn load(csv: &str) -> Dataset {
        parse_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap()
    }

    fn scenario() -> Dataset {
        load("A,B\n1,x\n2,y\n3,\n")
    }

    #[test]
    fn scenario_null_counts() {
        let result = null_counts(&scenario(), &AnalysisChoice::NullValueCount);
        assert_eq!(
            result,
            AnalysisResult::ColumnCounts(vec![("A".into(), 0), ("B".into(), 1)])
        );
    }

    #[test]
    fn null_count_keys_are_the_column_names() {
        let ds = load("p,q,r,s\n1,,a,True\n,2.5,,False\n");
        let AnalysisResult::ColumnCounts(counts) = null_counts(&ds, &AnalysisChoice::NullValueCount)
        else {
            panic!("expected column counts");
        };
        let keys: Vec<String> = counts.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, ds.column_names());
    }

    #[test]
    fn scenario_describe() {
        let AnalysisResult::Describe(DescribeTable::Numeric(rows)) =
            describe(&scenario(), &AnalysisChoice::DescriptiveStatistics)
        else {
            panic!("expected numeric describe");
        };
        assert_eq!(rows.len(), 1);
        let (name, s) = &rows[0];
        assert_eq!(name, "A");
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
    }

    #[test]
    fn describe_all_missing_numeric_column_counts_zero() {
        let ds = load("A,B\n,x\n,y\n");
        assert_eq!(ds.column("A").map(|c| c.kind), Some(ColumnType::Float));
        let AnalysisResult::Describe(DescribeTable::Numeric(rows)) =
            describe(&ds, &AnalysisChoice::DescriptiveStatistics)
        else {
            panic!("expected numeric describe");
        };
        assert_eq!(rows.len(), 1);
        let (name, s) = &rows[0];
        assert_eq!(name, "A");
        assert_eq!(s.count, 0);
        for stat in [s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max] {
            assert!(stat.is_nan());
        }
    }

    #[test]
    fn describe_falls_back_to_categorical() {
        let ds = load("city,flag\nOslo,True\nRome,False\nOslo,True\nRome,True\n");
        let AnalysisResult::Describe(DescribeTable::Categorical(rows)) =
            describe(&ds, &AnalysisChoice::DescriptiveStatistics)
        else {
            panic!("expected categorical describe");
        };
        let city = &rows[0].1;
        assert_eq!(city.count, 4);
        assert_eq!(city.unique, 2);
        assert_eq!(city.top.as_deref(), Some("Oslo"));
        assert_eq!(city.freq, 2);
        assert_eq!(rows[1].1.top.as_deref(), Some("True"));
    }

    #[test]
    fn data_info_lists_types_and_non_null_counts() {
        let AnalysisResult::Info(info) = data_info(&scenario(), &AnalysisChoice::DataInfo) else {
            panic!("expected info");
        };
        assert_eq!(info.rows, 3);
        assert_eq!(info.columns[0].dtype, "int64");
        assert_eq!(info.columns[1].dtype, "object");
        assert_eq!(info.columns[1].non_null, 2);
        assert!(info.memory_bytes > 0);
    }

    #[test]
    fn correlation_covers_numeric_and_bool_only() {
        let ds = load("x,y,label,ok\n1,2,a,True\n2,4,b,False\n3,7,c,True\n");
        let AnalysisResult::Correlation(m) = correlation(&ds, &AnalysisChoice::CorrelationHeatmap)
        else {
            panic!("expected matrix");
        };
        assert_eq!(m.columns, ["x", "y", "ok"]);
        assert!((m.values[0][0] - 1.0).abs() < 1e-12);
        assert_eq!(m.values[0][1], m.values[1][0]);
        assert!(m.values[0][1] > 0.9);
    }

    #[test]
    fn correlation_without_numbers_warns() {
        let ds = load("name\nann\nbob\n");
        assert!(matches!(
            correlation(&ds, &AnalysisChoice::CorrelationHeatmap),
            AnalysisResult::Warning(InsufficientColumnsWarning { required: 1, found: 0, .. })
        ));
    }

    #[test]
    fn histogram_defaults_to_first_numeric_column() {
        let ds = scenario();
        let AnalysisResult::Histogram(h) =
            histogram(&ds, &AnalysisChoice::Histogram { column: None })
        else {
            panic!("expected histogram");
        };
        assert_eq!(h.column, "A");
        assert_eq!(h.count, 3);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn histogram_rejects_text_columns() {
        let result = histogram(
            &scenario(),
            &AnalysisChoice::Histogram {
                column: Some("B".into()),
            },
        );
        assert_eq!(
            result,
            AnalysisResult::Error(AnalysisError::NotNumeric("B".into()))
        );
    }

    #[test]
    fn single_column_charts_warn_without_numbers() {
        let ds = load("name\nann\n");
        for result in [
            histogram(&ds, &AnalysisChoice::Histogram { column: None }),
            boxplot(&ds, &AnalysisChoice::Boxplot { column: None }),
        ] {
            assert!(matches!(result, AnalysisResult::Warning(_)));
        }
    }

    #[test]
    fn boxplot_ignores_missing_values() {
        let ds = load("v,w\n1,a\n,b\n3,c\n5,d\n");
        let AnalysisResult::Boxplot(b) = boxplot(
            &ds,
            &AnalysisChoice::Boxplot {
                column: Some("v".into()),
            },
        ) else {
            panic!("expected boxplot");
        };
        assert_eq!(b.stats.median, 3.0);
    }

    #[test]
    fn query_returns_matching_rows_with_indices() {
        let ds = scenario();
        let AnalysisResult::Rows(subset) = custom_query(
            &ds,
            &AnalysisChoice::CustomQuery {
                expression: "A >= 2".into(),
            },
        ) else {
            panic!("expected rows");
        };
        assert_eq!(subset.indices, vec![1, 2]);
        assert_eq!(subset.rows[1], vec![Value::Int(3), Value::Missing]);
        assert_eq!(subset.total_rows, 3);
    }

    #[test]
    fn query_on_unknown_column_is_a_query_error() {
        let result = custom_query(
            &scenario(),
            &AnalysisChoice::CustomQuery {
                expression: "C == 1".into(),
            },
        );
        assert_eq!(
            result,
            AnalysisResult::Error(AnalysisError::Query(QueryError::UnknownColumn("C".into())))
        );
    }
}
