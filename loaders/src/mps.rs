//! Best-effort MPS subset for set-covering-shaped models.
//!
//! Accepted sections: `ROWS` (one `N` objective plus `G`/`E`/`L` rows),
//! `COLUMNS` with `row coef` pairs whose constraint coefficients are ±1,
//! and the `RHS`/`BOUNDS` epilogue, which is skipped. Unrecognized lines
//! are skipped; a general MIP file is rejected rather than mis-parsed.

use std::collections::HashMap;
use std::path::Path;

use crate::parse::{Lines, parse_tok};
use crate::{ParseError, RawInstance, check_no_empty_cols};

/// Lines scanned for the `ROWS` header before giving up.
const HEADER_SCAN_LINES: usize = 10;

pub fn parse(path: &Path) -> Result<RawInstance, ParseError> {
    let mut lines = Lines::open(path)?;

    let mut line = lines.next()?;
    let mut down_counter = HEADER_SCAN_LINES;
    while line.trim() != "ROWS" && down_counter > 0 {
        line = lines.next()?;
        down_counter -= 1;
    }
    if line.trim() != "ROWS" {
        return Err(ParseError::WrongFormat {
            file: lines.file().to_string(),
            line: lines.line_no(),
            format: "MPS",
        });
    }

    // ROWS: collect the objective name and number the constraint rows.
    let mut nrows = 0usize;
    let mut rows_map: HashMap<String, usize> = HashMap::new();
    let mut obj_name = String::new();
    loop {
        line = lines.next()?;
        if line.trim() == "COLUMNS" {
            break;
        }
        let toks: Vec<&str> = line.split_whitespace().collect();
        if toks.len() >= 2 {
            match toks[0] {
                "N" => obj_name = toks[1].to_string(),
                "G" | "E" | "L" => {
                    rows_map.insert(toks[1].to_string(), nrows);
                    nrows += 1;
                }
                _ => {}
            }
        }
    }

    // COLUMNS: `col row coef [row coef]` records, objective entries carry
    // the column cost.
    let mut raw = RawInstance {
        nrows,
        ..RawInstance::default()
    };
    let mut prev_col_name = String::new();
    loop {
        line = lines.next()?;
        if line.trim() == "RHS" {
            break;
        }
        let toks: Vec<&str> = line.split_whitespace().collect();

        // Best effort to skip marker/header lines inside COLUMNS.
        if toks.len() < 3 || !starts_numeric(toks[2]) {
            continue;
        }

        if toks[0] != prev_col_name {
            prev_col_name = toks[0].to_string();
            raw.cols.push(Vec::new());
            raw.costs.push(f64::MAX);
        }

        let mut t = 1;
        while t + 1 < toks.len() {
            let value: f64 = parse_tok(&lines, toks[t + 1])?;
            if toks[t] == obj_name {
                *raw.costs.last_mut().expect("a column is open") = value;
            } else {
                if value.abs() != 1.0 {
                    return Err(ParseError::BadToken {
                        file: lines.file().to_string(),
                        line: lines.line_no(),
                        token: toks[t + 1].to_string(),
                    });
                }
                let i = *rows_map
                    .get(toks[t])
                    .ok_or_else(|| ParseError::UnknownRow {
                        file: lines.file().to_string(),
                        line: lines.line_no(),
                        name: toks[t].to_string(),
                    })?;
                raw.cols.last_mut().expect("a column is open").push(i);
            }
            t += 2;
        }
    }

    // RHS and BOUNDS hold no structure for a covering model.
    while lines.next_opt()?.is_some() {}

    check_no_empty_cols(&raw, lines.file())?;
    Ok(raw)
}

fn starts_numeric(tok: &str) -> bool {
    tok.starts_with(|c: char| c.is_ascii_digit() || c == '-')
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

    const SMALL_MPS: &str = "\
NAME          tiny
ROWS
 N  COST
 G  R1
 G  R2
COLUMNS
    X1  COST  2.0  R1  1
    X2  COST  3.0  R1  1
    X2  R2  1
RHS
    RHS  R1  1  R2  1
BOUNDS
ENDATA
";

    #[test]
    fn parses_a_covering_model() {
        let file = write_temp(SMALL_MPS);
        let raw = parse(file.path()).unwrap();
        assert_eq!(raw.nrows, 2);
        assert_eq!(raw.costs, vec![2.0, 3.0]);
        assert_eq!(raw.cols[0], vec![0]);
        assert_eq!(raw.cols[1], vec![0, 1]);
    }

    #[test]
    fn rejects_files_without_rows_section() {
        let file = write_temp("NAME x\nCOLUMNS\n");
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::WrongFormat { .. }) | Err(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn rejects_non_unit_coefficients() {
        let mps = "\
ROWS
 N  COST
 G  R1
COLUMNS
    X1  COST  2.0  R1  4
RHS
";
        let file = write_temp(mps);
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::BadToken { .. })
        ));
    }

    #[test]
    fn rejects_unknown_rows() {
        let mps = "\
ROWS
 N  COST
 G  R1
COLUMNS
    X1  COST  2.0  R9  1
RHS
";
        let file = write_temp(mps);
        assert!(matches!(
            parse(file.path()),
            Err(ParseError::UnknownRow { .. })
        ));
    }
}
