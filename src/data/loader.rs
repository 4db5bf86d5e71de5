use std::collections::HashSet;
use std::path::Path;

use crate::error::ParseError;

use super::model::{Column, ColumnType, Dataset, Value};

/// Cell contents treated as missing when no other markers are configured.
pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How to split and interpret the uploaded text.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub null_markers: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a delimited text file from disk into a [`Dataset`].
pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Dataset, ParseError> {
    let bytes = std::fs::read(path)?;
    parse_bytes(&bytes, options)
}

/// Parse an uploaded byte stream. Either the whole input parses or nothing is
/// produced.
///
/// Layout: one header row with column names, then one record per row. Every
/// record must have as many fields as the header.
pub fn parse_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Dataset, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding {
        offset: e.valid_up_to(),
    })?;
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = clean_headers(reader.headers()?);
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in reader.records() {
        let record = result?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let nulls: HashSet<&str> = options.null_markers.iter().map(String::as_str).collect();
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw, &nulls))
        .collect();

    Dataset::new(columns)
}

// ---------------------------------------------------------------------------
// Header cleanup
// ---------------------------------------------------------------------------

/// Blank names become `Unnamed: {i}`; repeats get `.1`, `.2`, ... suffixes.
fn clean_headers(raw: &csv::StringRecord) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    raw.iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            };
            let mut name = base.clone();
            let mut suffix = 0;
            while taken.contains(&name) {
                suffix += 1;
                name = format!("{base}.{suffix}");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Pick one type for the whole column and convert every cell to it.
fn infer_column(name: String, raw: Vec<String>, nulls: &HashSet<&str>) -> Column {
    if raw.is_empty() {
        return Column::new(name, ColumnType::Text, Vec::new());
    }

    let is_null = |s: &str| nulls.contains(s);
    let present: Vec<&str> = raw.iter().map(String::as_str).filter(|&s| !is_null(s)).collect();
    let any_missing = present.len() < raw.len();

    let convert = |parse: &dyn Fn(&str) -> Value| -> Vec<Value> {
        raw.iter()
            .map(|s| {
                if is_null(s.as_str()) {
                    Value::Missing
                } else {
                    parse(s.as_str())
                }
            })
            .collect()
    };

    if present.is_empty() {
        return Column::new(name, ColumnType::Float, vec![Value::Missing; raw.len()]);
    }

    if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        // Integer columns with holes are promoted to float.
        return if any_missing {
            let values = convert(&|s: &str| Value::Float(s.trim().parse::<f64>().unwrap_or(f64::NAN)));
            Column::new(name, ColumnType::Float, values)
        } else {
            let values = convert(&|s: &str| s.trim().parse::<i64>().map_or(Value::Missing, Value::Int));
            Column::new(name, ColumnType::Integer, values)
        };
    }

    if present.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
        let values = convert(&|s: &str| s.trim().parse::<f64>().map_or(Value::Missing, Value::Float));
        return Column::new(name, ColumnType::Float, values);
    }

    if !any_missing && present.iter().all(|s| parse_bool(s).is_some()) {
        let values = convert(&|s: &str| parse_bool(s).map_or(Value::Missing, Value::Bool));
        return Column::new(name, ColumnType::Boolean, values);
    }

    let values = convert(&|s: &str| Value::Text(s.to_string()));
    Column::new(name, ColumnType::Text, values)
}
