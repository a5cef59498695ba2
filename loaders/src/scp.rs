//! OR-Library SCP format.
//!
//! Line 1 holds `nrows ncols`; the next `ncols` whitespace-separated values
//! are the column costs; then, for each row in order, a count `k` on its own
//! line followed by `k` 1-based column indices, possibly wrapped across
//! lines.

use std::path::Path;

use crate::parse::{Cursor, Lines, check_index, parse_tok};
use crate::{ParseError, RawInstance, check_no_empty_cols};

pub fn parse(path: &Path) -> Result<RawInstance, ParseError> {
    let mut lines = Lines::open(path)?;

    let header = lines.next()?;
    let toks: Vec<&str> = header.split_whitespace().collect();
    if toks.len() != 2 {
        return Err(ParseError::WrongFormat {
            file: lines.file().to_string(),
            line: lines.line_no(),
            format: "SCP",
        });
    }
    let nrows: usize = parse_tok(&lines, toks[0])?;
    let ncols: usize = parse_tok(&lines, toks[1])?;

    let mut cursor = Cursor::new(lines);
    let mut raw = RawInstance {
        nrows,
        cols: vec![Vec::new(); ncols],
        costs: Vec::with_capacity(ncols),
        warmstart: Vec::new(),
    };
    for _ in 0..ncols {
        raw.costs.push(cursor.next_tok::<f64>()?);
    }

    for i in 0..nrows {
        // The row size sits alone on its line.
        if cursor.load_next_line()? != 1 {
            return Err(ParseError::WrongFormat {
                file: cursor.lines.file().to_string(),
                line: cursor.lines.line_no(),
                format: "SCP",
            });
        }
        let row_ncols: usize = cursor.next_tok()?;

        for _ in 0..row_ncols {
            let cidx: i64 = cursor.next_tok()?;
            let cidx = check_index(&cursor.lines, cidx, 1, ncols as i64)?;
            raw.cols[cidx - 1].push(i);
        }
    }

    check_no_empty_cols(&raw, cursor.lines.file())?;
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
        let file = write_temp("3 4\n2.0 3.0 4.0 5.0\n2\n1 2\n2\n2 3\n1\n4\n");
        let raw = parse(file.path()).unwrap();
        assert_eq!(raw.nrows, 3);
        assert_eq!(raw.costs, vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(raw.cols[0], vec![0]);
        assert_eq!(raw.cols[1], vec![0, 1]);
        assert_eq!(raw.cols[2], vec![1]);
        assert_eq!(raw.cols[3], vec![2]);
    }

    #[test]
    fn costs_and_indices_may_wrap_lines() {
        let file = write_temp("2 3\n1.0\n2.0 3.0\n2\n1\n2\n2\n2 3\n");
        let raw = parse(file.path()).unwrap();
        assert_eq!(raw.costs, vec![1.0, 2.0, 3.0]);
        assert_eq!(raw.cols[1], vec![0, 1]);
    }

    #[test]
    fn rejects_out_of_range_column() {
        let file = write_temp("1 2\n1.0 1.0\n2\n1 3\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn rejects_truncated_file() {
        let file = write_temp("2 2\n1.0 1.0\n1\n1\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn rejects_empty_column() {
        // Column 2 never covers a row.
        let file = write_temp("2 2\n1.0 1.0\n1\n1\n1\n1\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::EmptyColumn { col: 1, .. })
        ));
    }

    #[test]
    fn rejects_row_count_sharing_a_line() {
        let file = write_temp("1 2\n1.0 1.0\n2 1 2\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::WrongFormat { .. })
        ));
    }
}
