use thiserror::Error;

// ---------------------------------------------------------------------------
// Load failures
// ---------------------------------------------------------------------------

/// Why an upload could not be turned into a [`Dataset`](crate::data::model::Dataset).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("the file is empty (no header row to read columns from)")]
    Empty,

    #[error("the file is not valid UTF-8 text (first bad byte at offset {offset})")]
    Encoding { offset: usize },

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("malformed CSV: {0}")]
    Malformed(String),

    #[error("column '{column}' has {found} values but the dataset has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line());
        match e.into_kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => ParseError::RaggedRow {
                line: pos.map(|p| p.line()).or(line).unwrap_or(0),
                expected: expected_len as usize,
                found: len as usize,
            },
            csv::ErrorKind::Io(io) => ParseError::Io(io),
            csv::ErrorKind::Utf8 { pos, .. } => ParseError::Encoding {
                offset: pos.map(|p| p.byte() as usize).unwrap_or(0),
            },
            other => ParseError::Malformed(format!("{other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Query failures
// ---------------------------------------------------------------------------

/// Why a filter expression could not be compiled or evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("name '{0}' is not a column of the dataset")]
    UnknownColumn(String),

    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("the expression does not evaluate to True/False (got {0} at row {1})")]
    NotBoolean(&'static str, usize),
}

// ---------------------------------------------------------------------------
// Analysis failures
// ---------------------------------------------------------------------------

/// Errors a computation routine reports inline instead of a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Query Error: {0}")]
    Query(#[from] QueryError),

    #[error("column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
}
