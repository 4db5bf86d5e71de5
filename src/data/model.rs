use std::fmt;

use polars::prelude::*;

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common data-frame dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Missing,
}

impl Value {
    /// Interpret the value as an `f64` (bools count as 0/1).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(_) | Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Short name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "str",
            Value::Missing => "NaN",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Missing => write!(f, "NaN"),
        }
    }
}

/// Format a float the way a data-frame cell shows it: whole numbers keep a
/// trailing `.0`, everything else uses the shortest round-trip form.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "inf" } else { "-inf" };
        s.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Inferred type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnType {
    /// The dtype label shown by "Show Data Info".
    pub fn dtype(self) -> &'static str {
        match self {
            ColumnType::Integer => "int64",
            ColumnType::Float => "float64",
            ColumnType::Boolean => "bool",
            ColumnType::Text => "object",
        }
    }

    /// Integer and float columns; booleans are excluded here.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

/// One named, homogeneously typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// The column as a polars series; missing cells become nulls.
    pub fn to_series(&self) -> Series {
        let name: PlSmallStr = self.name.as_str().into();
        match self.kind {
            ColumnType::Integer => {
                let values: Vec<Option<i64>> = self
                    .values
                    .iter()
                    .map(|v| match v {
                        Value::Int(i) => Some(*i),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            ColumnType::Float => {
                let values: Vec<Option<f64>> = self.values.iter().map(Value::as_f64).collect();
                Series::new(name, values)
            }
            ColumnType::Boolean => {
                let values: Vec<Option<bool>> = self
                    .values
                    .iter()
                    .map(|v| match v {
                        Value::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
            ColumnType::Text => {
                let values: Vec<Option<&str>> = self
                    .values
                    .iter()
                    .map(|v| match v {
                        Value::Text(s) => Some(s.as_str()),
                        _ => None,
                    })
                    .collect();
                Series::new(name, values)
            }
        }
    }

    /// Cells as `f64` (bools as 0/1); text and missing cells are null.
    pub fn to_f64(&self) -> Float64Chunked {
        Float64Chunked::from_iter_options(
            self.name.as_str().into(),
            self.values.iter().map(Value::as_f64),
        )
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The uploaded table. Immutable once built; every column has `row_count` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Assemble a dataset, rejecting columns of unequal length.
    pub fn new(columns: Vec<Column>) -> Result<Self, ParseError> {
        let row_count = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(ParseError::ColumnLength {
                column: bad.name.clone(),
                expected: row_count,
                found: bad.len(),
            });
        }
        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Integer and float columns, in dataset order.
    pub fn numeric_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_numeric()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Value {
        &self.columns[col].values[row]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_formatting_keeps_trailing_zero() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Missing.to_string(), "NaN");
    }

    #[test]
    fn unequal_columns_are_rejected() {
        let a = Column::new("a", ColumnType::Integer, vec![Value::Int(1), Value::Int(2)]);
        let b = Column::new("b", ColumnType::Integer, vec![Value::Int(1)]);
        let err = Dataset::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, ParseError::ColumnLength { found: 1, .. }));
    }

    #[test]
    fn numeric_columns_exclude_text_and_bool() {
        let ds = Dataset::new(vec![
            Column::new("n", ColumnType::Float, vec![Value::Float(1.0)]),
            Column::new("t", ColumnType::Text, vec![Value::Text("x".into())]),
            Column::new("b", ColumnType::Boolean, vec![Value::Bool(true)]),
        ])
        .unwrap();
        let names: Vec<_> = ds.numeric_columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["n"]);
        assert_eq!(ds.row_count(), 1);
        assert_eq!(ds.column_index("b"), Some(2));
    }

    #[test]
    fn series_carry_missing_cells_as_nulls() {
        let c = Column::new(
            "t",
            ColumnType::Text,
            vec![Value::Text("x".into()), Value::Missing, Value::Text("y".into())],
        );
        let s = c.to_series();
        assert_eq!(s.len(), 3);
        assert_eq!(s.null_count(), 1);
        assert_eq!(s.dtype(), &DataType::String);

        let n = Column::new("n", ColumnType::Integer, vec![Value::Int(4), Value::Missing]);
        assert_eq!(n.to_series().dtype(), &DataType::Int64);
        let f = n.to_f64();
        assert_eq!(f.get(0), Some(4.0));
        assert_eq!(f.get(1), None);
    }
}
