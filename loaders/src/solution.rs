//! Solution files: a single line `cost j1 j2 ...` in the original column
//! numbering, read and written symmetrically.

use std::io::Write;
use std::path::Path;

use crate::ParseError;
use crate::parse::{Cursor, Lines};

/// A parsed solution file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSolution {
    pub cost: f64,
    pub idxs: Vec<usize>,
}

pub fn read(path: &Path) -> Result<RawSolution, ParseError> {
    let lines = Lines::open(path)?;
    let mut cursor = Cursor::new(lines);

    cursor.load_next_line()?;
    let mut sol = RawSolution {
        cost: cursor.next_tok()?,
        idxs: Vec::new(),
    };
    while !cursor.line_exhausted() {
        sol.idxs.push(cursor.next_tok()?);
    }
    Ok(sol)
}

pub fn write(path: &Path, sol: &RawSolution) -> Result<(), ParseError> {
    let mut file = std::fs::File::create(path)?;
    write!(file, "{}", sol.cost)?;
    for &j in &sol.idxs {
        write!(file, " {}", j)?;
    }
    writeln!(file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_the_solution() {
        let sol = RawSolution {
            cost: 429.0,
            idxs: vec![3, 1, 4, 1, 5],
        };
        let file = tempfile::NamedTempFile::new().unwrap();
        write(file.path(), &sol).unwrap();
        let back = read(file.path()).unwrap();
        assert_eq!(back, sol);
    }

    #[test]
    fn fractional_costs_survive() {
        let sol = RawSolution {
            cost: 7.5,
            idxs: vec![0],
        };
        let file = tempfile::NamedTempFile::new().unwrap();
        write(file.path(), &sol).unwrap();
        assert_eq!(read(file.path()).unwrap(), sol);
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            read(file.path()),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }
}
