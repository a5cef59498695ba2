//! Sparse instance representation.
//!
//! Columns are the primary storage (a column-major sparse binary matrix);
//! the row view is a denormalization rebuilt by [`fill_rows_from_cols`]
//! whenever the column structure changes.

use crate::{C, E, R};

/// A sparse binary matrix stored column-major: `idxs` is the flat sequence
/// of row indices and `begs[j]..begs[j + 1]` delimits column `j`'s row list.
/// For fine-grained manipulations both fields are public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseBinMat {
    pub idxs: Vec<R>,
    pub begs: Vec<usize>,
}

impl Default for SparseBinMat {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseBinMat {
    pub fn new() -> Self {
        Self {
            idxs: Vec::new(),
            begs: vec![0],
        }
    }

    /// Number of columns.
    pub fn size(&self) -> usize {
        self.begs.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.begs.len() == 1
    }

    /// Row list of column `j`.
    #[inline]
    pub fn col(&self, j: C) -> &[R] {
        debug_assert!(j + 1 < self.begs.len() && self.begs[j + 1] <= self.idxs.len());
        &self.idxs[self.begs[j]..self.begs[j + 1]]
    }

    /// Appends a column given its row list. Empty columns are forbidden.
    pub fn push_col(&mut self, rows: &[R]) {
        debug_assert!(!rows.is_empty(), "empty columns are forbidden");
        self.idxs.extend_from_slice(rows);
        self.begs.push(self.idxs.len());
    }

    pub fn clear(&mut self) {
        self.idxs.clear();
        self.begs.clear();
        self.begs.push(0);
    }
}

/// A set covering instance: columns, the derived row view, and per-column
/// costs. Well-formed iff `cols` and `rows` are mutual inverses, no row or
/// column is empty, and all costs are finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    pub cols: SparseBinMat,
    pub rows: Vec<Vec<C>>,
    pub costs: Vec<E>,
}

impl Instance {
    pub fn clear(&mut self) {
        self.cols.clear();
        self.rows.clear();
        self.costs.clear();
    }
}

/// A column subset of an enclosing instance, expected to contain the
/// promising columns under the current duals. `col_map[j]` is core column
/// `j`'s index in the enclosing instance; the row set is shared.
#[derive(Debug, Clone, Default)]
pub struct CoreInstance {
    pub inst: Instance,
    pub col_map: Vec<C>,
}

/// Rebuilds the row view from the column view in one pass. This is the only
/// sanctioned way to produce `rows`.
pub fn fill_rows_from_cols(cols: &SparseBinMat, nrows: usize, rows: &mut Vec<Vec<C>>) {
    rows.resize(nrows, Vec::new());
    let guess = if nrows > 0 { cols.idxs.len() / nrows } else { 0 };
    for row in rows.iter_mut() {
        row.clear();
        row.reserve(guess);
    }

    for j in 0..cols.size() {
        for &i in cols.col(j) {
            rows[i].push(j);
        }
    }
}

/// Copies column `j` (row list and cost) from `src` onto the end of `dest`.
pub fn push_col_from(src: &Instance, j: C, dest: &mut Instance) {
    dest.cols.push_col(src.cols.col(j));
    dest.costs.push(src.costs[j]);
}

/// Debug-build check that `cols` and `rows` are mutual inverses and that no
/// row or column is empty.
pub fn debug_check_cols_and_rows(cols: &SparseBinMat, rows: &[Vec<C>]) {
    if cfg!(debug_assertions) {
        for j in 0..cols.size() {
            debug_assert!(!cols.col(j).is_empty(), "column {} is empty", j);
            for &i in cols.col(j) {
                debug_assert!(
                    rows[i].contains(&j),
                    "column {} lists row {} but not vice versa",
                    j,
                    i
                );
            }
        }
        for (i, row) in rows.iter().enumerate() {
            debug_assert!(!row.is_empty(), "row {} is empty", i);
            for &j in row {
                debug_assert!(
                    cols.col(j).contains(&i),
                    "row {} lists column {} but not vice versa",
                    i,
                    j
                );
            }
        }
    }
}
