//! Line and token plumbing shared by the format parsers.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::ParseError;

/// Buffered line reader that tracks the file name and line number for error
/// reporting.
pub(crate) struct Lines {
    file: String,
    reader: BufReader<File>,
    line_no: usize,
}

impl Lines {
    pub(crate) fn open(path: &Path) -> Result<Self, ParseError> {
        Ok(Self {
            file: path.display().to_string(),
            reader: BufReader::new(File::open(path)?),
            line_no: 0,
        })
    }

    pub(crate) fn file(&self) -> &str {
        &self.file
    }

    pub(crate) fn line_no(&self) -> usize {
        self.line_no
    }

    /// Next line, or `None` at end of file.
    pub(crate) fn next_opt(&mut self) -> Result<Option<String>, ParseError> {
        let mut buf = String::new();
        let n = self.reader.read_line(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Next line; end of file is an error.
    pub(crate) fn next(&mut self) -> Result<String, ParseError> {
        self.next_opt()?.ok_or_else(|| ParseError::UnexpectedEof {
            file: self.file.clone(),
            line: self.line_no + 1,
        })
    }

    pub(crate) fn eof_error(&self) -> ParseError {
        ParseError::UnexpectedEof {
            file: self.file.clone(),
            line: self.line_no + 1,
        }
    }

    pub(crate) fn bad_token(&self, token: &str) -> ParseError {
        ParseError::BadToken {
            file: self.file.clone(),
            line: self.line_no,
            token: token.to_string(),
        }
    }
}

/// Parses one whitespace token, mapping failures to a located error.
pub(crate) fn parse_tok<T: FromStr>(lines: &Lines, tok: &str) -> Result<T, ParseError> {
    tok.parse().map_err(|_| lines.bad_token(tok))
}

/// Token cursor over a [`Lines`] reader for formats whose records wrap
/// across physical lines (SCP, solution files). Tokens of the current line
/// are buffered; [`next_tok`] transparently pulls the next line when the
/// buffer runs dry.
///
/// [`next_tok`]: Cursor::next_tok
pub(crate) struct Cursor {
    pub(crate) lines: Lines,
    toks: Vec<String>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(lines: Lines) -> Self {
        Self {
            lines,
            toks: Vec::new(),
            pos: 0,
        }
    }

    pub(crate) fn line_exhausted(&self) -> bool {
        self.pos >= self.toks.len()
    }

    /// Discards the current buffer and loads the next line's tokens.
    /// Returns the number of tokens on that line.
    pub(crate) fn load_next_line(&mut self) -> Result<usize, ParseError> {
        let line = self.lines.next()?;
        self.toks.clear();
        self.toks.extend(line.split_whitespace().map(str::to_string));
        self.pos = 0;
        Ok(self.toks.len())
    }

    /// Next token, reading further lines as needed.
    pub(crate) fn next_tok<T: FromStr>(&mut self) -> Result<T, ParseError> {
        while self.line_exhausted() {
            self.load_next_line()?;
        }
        let tok = &self.toks[self.pos];
        self.pos += 1;
        tok.parse().map_err(|_| self.lines.bad_token(tok))
    }
}

/// Bounds check yielding a located out-of-range diagnostic.
pub(crate) fn check_index(
    lines: &Lines,
    index: i64,
    min: i64,
    max: i64,
) -> Result<usize, ParseError> {
    if index < min || index > max {
        return Err(ParseError::IndexOutOfRange {
            file: lines.file().to_string(),
            line: lines.line_no(),
            index,
            min,
            max,
        });
    }
    Ok(index as usize)
}
