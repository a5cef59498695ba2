//! Column fixing: committing columns to the final solution and shrinking the
//! instance in place.
//!
//! Fixing is irreversible within a three-phase run; the refinement loop
//! restores state by keeping the original instance alongside. Two layers of
//! mapping keep external numbering intact: [`FixingData::curr2orig`] maps the
//! current shrunken instance back to the original, and each fixing step emits
//! an old→new [`IdxsMaps`] so external data (multipliers, solutions) can
//! follow the compaction.

pub mod col_fixing;

pub use col_fixing::ColFixing;

use crate::instance::Instance;
use crate::{C, E, R, REMOVED_COL, REMOVED_ROW};

/// Old→new mappings produced by one compaction step. Entries of removed
/// columns/rows hold the tombstones.
#[derive(Debug, Clone, Default)]
pub struct IdxsMaps {
    pub col_map: Vec<C>,
    pub row_map: Vec<R>,
}

/// Mapping from the current shrunken instance to the original, plus the
/// columns fixed so far (original numbering) and their accumulated cost.
#[derive(Debug, Clone, Default)]
pub struct FixingData {
    pub curr2orig: IdxsMaps,
    pub fixed_cols: Vec<C>,
    pub fixed_cost: E,
}

impl FixingData {
    /// Identity mappings, nothing fixed.
    pub fn identity(ncols: usize, nrows: usize) -> Self {
        let mut fixing = Self::default();
        fixing.reset_to_identity(ncols, nrows);
        fixing
    }

    pub fn reset_to_identity(&mut self, ncols: usize, nrows: usize) {
        self.curr2orig.col_map.clear();
        self.curr2orig.col_map.extend(0..ncols);
        self.curr2orig.row_map.clear();
        self.curr2orig.row_map.extend(0..nrows);
        self.fixed_cols.clear();
        self.fixed_cost = 0.0;
    }
}

/// Fixes `cols_to_fix` in `inst` in place: their costs are accumulated into
/// `fixing`, every row they cover is removed, and surviving columns and rows
/// are compacted downward. `old2new` receives the old→new maps of this step,
/// already folded into `fixing.curr2orig`. New indices are always <= old
/// ones, which is what allows external data to be updated in place.
pub fn fix_columns_and_compute_maps(
    cols_to_fix: &[C],
    inst: &mut Instance,
    fixing: &mut FixingData,
    old2new: &mut IdxsMaps,
) {
    old2new.col_map.clear();
    old2new.row_map.clear();
    if cols_to_fix.is_empty() {
        return;
    }

    let removed_rows = mark_fixed_elements(inst, cols_to_fix, fixing);
    if removed_rows == inst.rows.len() {
        // Everything fixed: empty instance, empty maps.
        inst.clear();
        fixing.curr2orig.col_map.clear();
        fixing.curr2orig.row_map.clear();
        return;
    }

    compact_rows(inst, fixing, old2new);
    compact_cols(inst, fixing, old2new);
    renumber_row_entries(inst, old2new);

    crate::instance::debug_check_cols_and_rows(&inst.cols, &inst.rows);
}

/// Marks fixed columns and their rows with tombstones in `curr2orig`,
/// recording original indices and costs. Returns the number of rows removed.
fn mark_fixed_elements(inst: &Instance, cols_to_fix: &[C], fixing: &mut FixingData) -> usize {
    let mut removed_rows = 0;
    for &j in cols_to_fix {
        let orig_j = fixing.curr2orig.col_map[j];
        debug_assert!(orig_j != REMOVED_COL, "column fixed twice");

        fixing.fixed_cost += inst.costs[j];
        fixing.fixed_cols.push(orig_j);
        fixing.curr2orig.col_map[j] = REMOVED_COL;
        for &i in inst.cols.col(j) {
            if fixing.curr2orig.row_map[i] != REMOVED_ROW {
                removed_rows += 1;
            }
            fixing.curr2orig.row_map[i] = REMOVED_ROW;
        }
    }
    removed_rows
}

/// Moves surviving rows downward and fills the old→new row map.
fn compact_rows(inst: &mut Instance, fixing: &mut FixingData, old2new: &mut IdxsMaps) {
    let old_nrows = inst.rows.len();
    old2new.row_map.clear();
    old2new.row_map.resize(old_nrows, REMOVED_ROW);

    let mut next_i = 0;
    for old_i in 0..old_nrows {
        let orig_i = fixing.curr2orig.row_map[old_i];
        if orig_i == REMOVED_ROW {
            continue;
        }
        debug_assert!(!inst.rows[old_i].is_empty());
        if next_i != old_i {
            inst.rows[next_i] = std::mem::take(&mut inst.rows[old_i]);
        }
        fixing.curr2orig.row_map[next_i] = orig_i;
        old2new.row_map[old_i] = next_i;
        next_i += 1;
    }
    fixing.curr2orig.row_map.truncate(next_i);
    inst.rows.truncate(next_i);
}

/// Moves surviving columns downward, dropping removed rows from their row
/// lists, and fills the old→new column map. Columns left without rows are
/// dropped as well.
fn compact_cols(inst: &mut Instance, fixing: &mut FixingData, old2new: &mut IdxsMaps) {
    let old_ncols = inst.cols.size();
    old2new.col_map.clear();
    old2new.col_map.resize(old_ncols, REMOVED_COL);

    let mut next_j = 0;
    let mut n = 0;
    for old_j in 0..old_ncols {
        if fixing.curr2orig.col_map[old_j] == REMOVED_COL {
            continue;
        }

        let nbeg = n;
        for o in inst.cols.begs[old_j]..inst.cols.begs[old_j + 1] {
            let new_i = old2new.row_map[inst.cols.idxs[o]];
            if new_i != REMOVED_ROW {
                inst.cols.idxs[n] = new_i;
                n += 1;
            }
        }
        if n == nbeg {
            fixing.curr2orig.col_map[old_j] = REMOVED_COL;
            continue;
        }

        inst.cols.begs[next_j] = nbeg;
        inst.costs[next_j] = inst.costs[old_j];
        fixing.curr2orig.col_map[next_j] = fixing.curr2orig.col_map[old_j];
        old2new.col_map[old_j] = next_j;
        next_j += 1;
    }
    inst.cols.begs[next_j] = n;
    inst.cols.idxs.truncate(n);
    inst.cols.begs.truncate(next_j + 1);
    inst.costs.truncate(next_j);
    fixing.curr2orig.col_map.truncate(next_j);
}

/// Renumbers the column indices stored in each surviving row.
fn renumber_row_entries(inst: &mut Instance, old2new: &IdxsMaps) {
    for row in &mut inst.rows {
        let mut w = 0;
        for r in 0..row.len() {
            let new_j = old2new.col_map[row[r]];
            if new_j != REMOVED_COL {
                row[w] = new_j;
                w += 1;
            }
        }
        debug_assert!(w > 0, "surviving row lost every column");
        row.truncate(w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_support::make_instance;

    #[test]
    fn identity_maps_everything_to_itself() {
        let fixing = FixingData::identity(3, 2);
        assert_eq!(fixing.curr2orig.col_map, vec![0, 1, 2]);
        assert_eq!(fixing.curr2orig.row_map, vec![0, 1]);
        assert!(fixing.fixed_cols.is_empty());
        assert_eq!(fixing.fixed_cost, 0.0);
    }

    #[test]
    fn fixing_one_column_shrinks_and_maps() {
        // 4 rows; fixing column 0 removes rows 0 and 1.
        let mut inst = make_instance(
            &[&[0, 1], &[1, 2], &[2, 3], &[3]],
            &[10.0, 4.0, 6.0, 1.0],
        );
        let total_cost: f64 = inst.costs.iter().sum();
        let mut fixing = FixingData::identity(4, 4);
        let mut old2new = IdxsMaps::default();

        fix_columns_and_compute_maps(&[0], &mut inst, &mut fixing, &mut old2new);

        // Column 1 lost row 1 but survives with row 2; rows 2 and 3 survive.
        assert_eq!(inst.rows.len(), 2);
        assert_eq!(inst.cols.size(), 3);
        assert_eq!(fixing.fixed_cols, vec![0]);
        assert_eq!(fixing.fixed_cost, 10.0);
        assert_eq!(fixing.curr2orig.row_map, vec![2, 3]);
        assert_eq!(fixing.curr2orig.col_map, vec![1, 2, 3]);
        assert_eq!(old2new.col_map, vec![REMOVED_COL, 0, 1, 2]);
        assert_eq!(old2new.row_map, vec![REMOVED_ROW, REMOVED_ROW, 0, 1]);

        // Conservation: fixed cost plus remaining costs never exceeds the
        // original total.
        let remaining: f64 = inst.costs.iter().sum();
        assert!(fixing.fixed_cost + remaining <= total_cost + 1e-9);
    }

    #[test]
    fn fixing_everything_empties_the_instance() {
        let mut inst = make_instance(&[&[0], &[1], &[0, 1]], &[1.0, 1.0, 1.5]);
        let mut fixing = FixingData::identity(3, 2);
        let mut old2new = IdxsMaps::default();

        fix_columns_and_compute_maps(&[2], &mut inst, &mut fixing, &mut old2new);

        assert!(inst.rows.is_empty());
        assert_eq!(inst.cols.size(), 0);
        assert_eq!(fixing.fixed_cols, vec![2]);
        assert_eq!(fixing.fixed_cost, 1.5);
    }

    #[test]
    fn column_covered_away_is_dropped() {
        // Fixing column 0 (rows 0,1) leaves column 1 (row 1 only) empty.
        let mut inst = make_instance(&[&[0, 1], &[1], &[2]], &[3.0, 1.0, 2.0]);
        let mut fixing = FixingData::identity(3, 3);
        let mut old2new = IdxsMaps::default();

        fix_columns_and_compute_maps(&[0], &mut inst, &mut fixing, &mut old2new);

        assert_eq!(inst.cols.size(), 1);
        assert_eq!(inst.rows.len(), 1);
        assert_eq!(old2new.col_map, vec![REMOVED_COL, REMOVED_COL, 0]);
        assert_eq!(fixing.curr2orig.col_map, vec![2]);
    }

    #[test]
    fn successive_fixings_compose() {
        let mut inst = make_instance(
            &[&[0], &[1], &[2], &[3], &[2, 3]],
            &[1.0, 1.0, 1.0, 1.0, 1.5],
        );
        let mut fixing = FixingData::identity(5, 4);
        let mut old2new = IdxsMaps::default();

        fix_columns_and_compute_maps(&[0], &mut inst, &mut fixing, &mut old2new);
        // Now current column 0 is original column 1.
        fix_columns_and_compute_maps(&[0], &mut inst, &mut fixing, &mut old2new);

        assert_eq!(fixing.fixed_cols, vec![0, 1]);
        assert_eq!(fixing.fixed_cost, 2.0);
        assert_eq!(fixing.curr2orig.col_map, vec![2, 3, 4]);
        assert_eq!(fixing.curr2orig.row_map, vec![2, 3]);
    }
}
