//! CVRP column format: line 1 holds `nrows ncols`, then one line per column
//! with `cost solcost i1 ... ik` (0-based row indices). The final line lists
//! the warm-start column indices.
//!
//! `solcost` is route-pricing metadata; it is validated (it can never beat
//! the column cost) and discarded.

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
            format: "CVRP",
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
        if toks.len() < 3 {
            return Err(ParseError::WrongFormat {
                file: lines.file().to_string(),
                line: lines.line_no(),
                format: "CVRP",
            });
        }

        let cost: f64 = parse_tok(&lines, toks[0])?;
        let solcost: f64 = parse_tok(&lines, toks[1])?;
        if solcost < cost {
            return Err(ParseError::WrongFormat {
                file: lines.file().to_string(),
                line: lines.line_no(),
                format: "CVRP",
            });
        }

        let mut col = Vec::with_capacity(toks.len() - 2);
        for tok in &toks[2..] {
            let ridx: i64 = parse_tok(&lines, tok)?;
            col.push(check_index(&lines, ridx, 0, nrows as i64 - 1)?);
        }
        raw.costs.push(cost);
        raw.cols.push(col);
    }

    let warmstart_line = lines.next()?;
    for tok in warmstart_line.split_whitespace() {
        let j: i64 = parse_tok(&lines, tok)?;
        raw.warmstart.push(check_index(&lines, j, 0, ncols as i64 - 1)?);
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
    fn parses_columns_and_warmstart() {
        let file = write_temp("3 2\n5.0 6.0 0 1\n4.0 4.0 1 2\n0 1\n");
        let raw = parse(file.path()).unwrap();
        assert_eq!(raw.nrows, 3);
        assert_eq!(raw.costs, vec![5.0, 4.0]);
        assert_eq!(raw.cols[0], vec![0, 1]);
        assert_eq!(raw.cols[1], vec![1, 2]);
        assert_eq!(raw.warmstart, vec![0, 1]);
    }

    #[test]
    fn rejects_solcost_below_cost() {
        let file = write_temp("2 1\n5.0 4.0 0 1\n\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::WrongFormat { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_row() {
        let file = write_temp("2 1\n1.0 1.0 0 2\n\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::IndexOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn empty_warmstart_line_is_fine() {
        let file = write_temp("1 1\n1.0 1.0 0\n\n");
        let raw = parse(file.path()).unwrap();
        assert!(raw.warmstart.is_empty());
    }
}
