//! RAIL format: line 1 holds `nrows ncols`, then one line per column with
//! `cost k i1 ... ik` and 1-based row indices.

use std::path::Path;

use crate::parse::{Lines, check_index, parse_tok};
use crate::{ParseError, RawInstance, check_no_empty_cols};

pub fn parse(path: &Path) -> Result<RawInstance, ParseError> {
    let mut lines = Lines::open(path)?;

    let header = lines.next()?;
    let toks: Vec<&str> = header.split_whitespace().collect();
    if toks.len() != 2 {
        return Err(ParseError::WrongFormat {
            file: lines.file().to_string(),
            line: lines.line_no(),
            format: "RAIL",
        });
    }
    let nrows: usize = parse_tok(&lines, toks[0])?;
    let ncols: usize = parse_tok(&lines, toks[1])?;

    let mut raw = RawInstance {
        nrows,
        cols: Vec::with_capacity(ncols),
        costs: Vec::with_capacity(ncols),
        warmstart: Vec::new(),
    };

    for _ in 0..ncols {
        let line = lines.next()?;
        let toks: Vec<&str> = line.split_whitespace().collect();
        if toks.len() < 2 {
            return Err(ParseError::WrongFormat {
                file: lines.file().to_string(),
                line: lines.line_no(),
                format: "RAIL",
            });
        }

        let cost: f64 = parse_tok(&lines, toks[0])?;
        let col_nrows: usize = parse_tok(&lines, toks[1])?;
        if toks.len() != col_nrows + 2 {
            return Err(ParseError::WrongFormat {
                file: lines.file().to_string(),
                line: lines.line_no(),
                format: "RAIL",
            });
        }

        let mut col = Vec::with_capacity(col_nrows);
        for tok in &toks[2..] {
            let ridx: i64 = parse_tok(&lines, tok)?;
            col.push(check_index(&lines, ridx, 1, nrows as i64)? - 1);
        }
        raw.costs.push(cost);
        raw.cols.push(col);
    }

    check_no_empty_cols(&raw, lines.file())?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_a_small_instance() {
        let file = write_temp("3 2\n1.5 2 1 2\n2.5 2 2 3\n");
        let raw = parse(file.path()).unwrap();
        assert_eq!(raw.nrows, 3);
        assert_eq!(raw.costs, vec![1.5, 2.5]);
        assert_eq!(raw.cols[0], vec![0, 1]);
        assert_eq!(raw.cols[1], vec![1, 2]);
    }

    #[test]
    fn rejects_wrong_row_count_on_column_line() {
        let file = write_temp("3 1\n1.5 3 1 2\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::WrongFormat { line: 2, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_row() {
        let file = write_temp("2 1\n1.0 2 1 3\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn rejects_truncated_file() {
        let file = write_temp("2 2\n1.0 1 1\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }
}
