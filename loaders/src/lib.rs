//! Instance-file ingestion.
//!
//! Each supported format is parsed into the same neutral [`RawInstance`]
//! model; the solver crate owns the conversion into its internal types.
//! Supported formats: OR-Library SCP, RAIL, CVRP column files, and a
//! best-effort subset of MPS shaped like set-covering models.

pub mod cvrp;
pub mod mps;
pub mod rail;
pub mod scp;
pub mod solution;

mod parse;

use derive_more::{Display, Error};

/// Neutral parsed model: column row-lists (0-based), per-column costs, and
/// an optional warm-start column list (CVRP files embed one).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInstance {
    pub nrows: usize,
    pub cols: Vec<Vec<usize>>,
    pub costs: Vec<f64>,
    pub warmstart: Vec<usize>,
}

/// Recognized instance-file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Rail,
    Scp,
    Cvrp,
    Mps,
}

/// Parses `path` according to `format`.
pub fn parse_instance(path: &std::path::Path, format: Format) -> Result<RawInstance, ParseError> {
    match format {
        Format::Rail => rail::parse(path),
        Format::Scp => scp::parse(path),
        Format::Cvrp => cvrp::parse(path),
        Format::Mps => mps::parse(path),
    }
}

#[derive(Debug, Display, Error)]
pub enum ParseError {
    #[display("{source}")]
    Io { source: std::io::Error },

    #[display("{file}:{line}: unexpected end of file")]
    UnexpectedEof { file: String, line: usize },

    #[display("{file}:{line}: expected a number, found \"{token}\"")]
    BadToken {
        file: String,
        line: usize,
        token: String,
    },

    #[display("{file}:{line}: index {index} out of range [{min}, {max}]")]
    IndexOutOfRange {
        file: String,
        line: usize,
        index: i64,
        min: i64,
        max: i64,
    },

    #[display("{file}: column {col} is empty")]
    EmptyColumn { file: String, col: usize },

    #[display("{file}:{line}: not a {format} instance")]
    WrongFormat {
        file: String,
        line: usize,
        format: &'static str,
    },

    #[display("{file}:{line}: unknown row \"{name}\"")]
    UnknownRow {
        file: String,
        line: usize,
        name: String,
    },
}

impl From<std::io::Error> for ParseError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}

/// Rejects instances that slipped through a parser with an empty column.
pub(crate) fn check_no_empty_cols(raw: &RawInstance, file: &str) -> Result<(), ParseError> {
    for (col, rows) in raw.cols.iter().enumerate() {
        if rows.is_empty() {
            return Err(ParseError::EmptyColumn {
                file: file.to_string(),
                col,
            });
        }
    }
    Ok(())
}
