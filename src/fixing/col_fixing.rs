//! Three-phase column fixing step.
//!
//! At the end of each three-phase iteration, a conflict-free set of
//! negative-reduced-cost columns (extended by a short greedy run) is fixed
//! into the solution and the instance is shrunk in place.

use crate::coverage::CoverCounters;
use crate::env::Environment;
use crate::fixing::{FixingData, IdxsMaps, fix_columns_and_compute_maps};
use crate::greedy::Greedy;
use crate::instance::Instance;
use crate::{E, REMOVED_ROW, Solution, vprint};

/// Reduced costs below this threshold make a column a fixing candidate.
const COL_FIX_THRESH: E = -0.001;

/// Column fixing functor; owns its scratch buffers.
#[derive(Debug, Clone, Default)]
pub struct ColFixing {
    cols_to_fix: Solution,
    old2new: IdxsMaps,
    row_coverage: CoverCounters,
    reduced_costs: Vec<E>,
}

impl ColFixing {
    /// Fixes columns in `inst` and updates the multipliers to the surviving
    /// rows. `orig_nrows` (the row count before any fixing) sizes the greedy
    /// extension budget.
    pub fn fix(
        &mut self,
        env: &Environment,
        orig_nrows: usize,
        inst: &mut Instance,
        fixing: &mut FixingData,
        mults: &mut Vec<E>,
        greedy: &mut Greedy,
    ) {
        debug_assert_eq!(inst.rows.len(), fixing.curr2orig.row_map.len());
        debug_assert_eq!(inst.rows.len(), mults.len());

        self.select_non_overlapping_cols(inst, mults);
        let no_overlap_ncols = self.cols_to_fix.idxs.len();

        // Extend the conflict-free set with a handful of greedy columns so
        // each fixing round retires a meaningful share of the rows.
        let fix_at_least = no_overlap_ncols + (orig_nrows / 200).max(1);
        greedy.run_with_reduced_costs(
            env,
            inst,
            mults,
            &self.reduced_costs,
            &mut self.cols_to_fix,
            E::INFINITY,
            fix_at_least,
        );

        fix_columns_and_compute_maps(&self.cols_to_fix.idxs, inst, fixing, &mut self.old2new);
        Self::apply_maps_to_mults(&self.old2new, mults);

        vprint!(
            env,
            4,
            "CFIX> Fixing {} columns ({} + {})",
            self.cols_to_fix.idxs.len(),
            no_overlap_ncols,
            self.cols_to_fix.idxs.len() - no_overlap_ncols
        );
    }

    /// Collects columns with clearly negative reduced cost whose rows do not
    /// overlap each other. Fixing only non-overlapping candidates retires
    /// fewer rows per round but leaves the residual solvable.
    fn select_non_overlapping_cols(&mut self, inst: &Instance, mults: &[E]) {
        let ncols = inst.cols.size();
        self.reduced_costs.resize(ncols, 0.0);
        self.row_coverage.reset(inst.rows.len());
        self.cols_to_fix.clear();

        for j in 0..ncols {
            let mut reduced = inst.costs[j];
            for &i in inst.cols.col(j) {
                reduced -= mults[i];
            }
            self.reduced_costs[j] = reduced;

            if reduced < COL_FIX_THRESH {
                self.cols_to_fix.idxs.push(j);
                self.row_coverage.cover(inst.cols.col(j));
            }
        }

        let row_coverage = &self.row_coverage;
        self.cols_to_fix
            .idxs
            .retain(|&j| inst.cols.col(j).iter().all(|&i| row_coverage[i] <= 1));
    }

    /// Compacts the multipliers onto the surviving rows.
    fn apply_maps_to_mults(old2new: &IdxsMaps, mults: &mut Vec<E>) {
        let mut new_i = 0;
        for old_i in 0..old2new.row_map.len() {
            if old2new.row_map[old_i] != REMOVED_ROW {
                debug_assert_eq!(new_i, old2new.row_map[old_i]);
                mults[new_i] = mults[old_i];
                new_i += 1;
            }
        }
        mults.truncate(new_i);
    }
}
