//! Multiset row-coverage counters.
//!
//! Tracks how many selected columns cover each row, and answers the two
//! redundancy queries the greedy and fixing steps are built on: "would this
//! column add nothing?" and "could this column be dropped for free?".

use crate::R;

/// Per-row counters of how many times each row is covered by a set of
/// columns. All operations are linear in the subset size; the counter array
/// size is pinned at construction and changed only by [`reset`].
///
/// [`reset`]: CoverCounters::reset
#[derive(Debug, Clone, Default)]
pub struct CoverCounters {
    counters: Vec<u32>,
}

impl CoverCounters {
    pub fn new(nelems: usize) -> Self {
        Self {
            counters: vec![0; nelems],
        }
    }

    /// Zeroes the counters and resizes to `nelems`.
    pub fn reset(&mut self, nelems: usize) {
        self.counters.clear();
        self.counters.resize(nelems, 0);
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Covers every row in `subset`, returning how many went from 0 to 1.
    pub fn cover(&mut self, subset: &[R]) -> usize {
        let mut covered = 0;
        for &i in subset {
            debug_assert!(i < self.counters.len());
            if self.counters[i] == 0 {
                covered += 1;
            }
            self.counters[i] += 1;
        }
        covered
    }

    /// Uncovers every row in `subset`, returning how many went from 1 to 0.
    /// Every touched counter must be positive.
    pub fn uncover(&mut self, subset: &[R]) -> usize {
        let mut uncovered = 0;
        for &i in subset {
            debug_assert!(i < self.counters.len());
            debug_assert!(self.counters[i] > 0, "uncovering an uncovered row");
            self.counters[i] -= 1;
            if self.counters[i] == 0 {
                uncovered += 1;
            }
        }
        uncovered
    }

    /// True iff every row in `subset` is already covered, i.e. covering the
    /// subset would newly cover nothing.
    pub fn is_redundant_cover(&self, subset: &[R]) -> bool {
        subset.iter().all(|&i| self.counters[i] > 0)
    }

    /// True iff every row in `subset` is covered at least twice, i.e. the
    /// subset could be removed without uncovering anything.
    pub fn is_redundant_uncover(&self, subset: &[R]) -> bool {
        subset.iter().all(|&i| self.counters[i] > 1)
    }
}

impl std::ops::Index<usize> for CoverCounters {
    type Output = u32;

    fn index(&self, i: usize) -> &u32 {
        &self.counters[i]
    }
}
