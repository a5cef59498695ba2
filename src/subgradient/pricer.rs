//! Core-instance construction (pricing).
//!
//! Given the current multipliers, selects a small column subset guaranteed
//! to contain the promising columns and rebuilds the core instance around
//! it. Returns the Lagrangian lower bound on the enclosing instance.

use crate::instance::{CoreInstance, Instance, fill_rows_from_cols, push_col_from};
use crate::{C, E};

/// Columns kept per row by the per-row selection, so the greedy step can
/// always cover every row inside the core.
const MIN_COV: usize = 5;

/// Reduced costs below this threshold qualify for the global selection.
const C1_THRESH: E = 0.1;

/// Pricing functor; owns its scratch buffers.
#[derive(Debug, Clone, Default)]
pub struct Pricer {
    reduced_costs: Vec<E>,
    taken: Vec<bool>,
    row_best: Vec<C>,
}

impl Pricer {
    /// Prices the enclosing instance under `mults`, refreshing `core`.
    /// Returns `L(u) = Σᵢ uᵢ + Σⱼ min(0, c̄ⱼ)`.
    pub fn price(&mut self, inst: &Instance, mults: &[E], core: &mut CoreInstance) -> E {
        let nrows = inst.rows.len();
        let ncols = inst.cols.size();

        debug_assert_eq!(nrows, mults.len());
        if nrows == 0 || ncols == 0 {
            return 0.0;
        }

        core.col_map.clear();
        self.taken.clear();
        self.taken.resize(ncols, false);

        let real_lower_bound = self.compute_reduced_costs(inst, mults);
        self.select_global_cols(inst, &mut core.col_map);
        self.select_per_row_cols(inst, &mut core.col_map);

        core.inst.clear();
        for &j in &core.col_map {
            push_col_from(inst, j, &mut core.inst);
        }
        fill_rows_from_cols(&core.inst.cols, nrows, &mut core.inst.rows);

        real_lower_bound
    }

    /// One pass over the columns: reduced costs and the real lower bound.
    fn compute_reduced_costs(&mut self, inst: &Instance, mults: &[E]) -> E {
        let mut lower_bound: E = mults.iter().sum();

        self.reduced_costs.resize(inst.cols.size(), 0.0);
        for j in 0..inst.cols.size() {
            let mut reduced = inst.costs[j];
            for &i in inst.cols.col(j) {
                reduced -= mults[i];
            }
            self.reduced_costs[j] = reduced;
            if reduced < 0.0 {
                lower_bound += reduced;
            }
        }
        lower_bound
    }

    /// C1: every column with small reduced cost, truncated to the
    /// `5 * nrows` cheapest when too many qualify.
    fn select_global_cols(&mut self, inst: &Instance, idxs: &mut Vec<C>) {
        debug_assert!(idxs.is_empty());

        for (j, &reduced) in self.reduced_costs.iter().enumerate() {
            if reduced < C1_THRESH {
                idxs.push(j);
            }
        }

        let maxsize = 5 * inst.rows.len();
        if idxs.len() > maxsize {
            let reduced_costs = &self.reduced_costs;
            idxs.select_nth_unstable_by(maxsize - 1, |&a, &b| {
                reduced_costs[a]
                    .partial_cmp(&reduced_costs[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            idxs.truncate(maxsize);
        }

        for &j in idxs.iter() {
            self.taken[j] = true;
        }
    }

    /// C2: for each row, the `MIN_COV` covering columns with the smallest
    /// reduced cost; appends the ones not already selected.
    fn select_per_row_cols(&mut self, inst: &Instance, idxs: &mut Vec<C>) {
        for row in &inst.rows {
            self.row_best.clear();
            self.row_best.extend_from_slice(row);
            if self.row_best.len() > MIN_COV {
                let reduced_costs = &self.reduced_costs;
                self.row_best.select_nth_unstable_by(MIN_COV - 1, |&a, &b| {
                    reduced_costs[a]
                        .partial_cmp(&reduced_costs[b])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                self.row_best.truncate(MIN_COV);
            }

            for &j in &self.row_best {
                if !self.taken[j] {
                    self.taken[j] = true;
                    idxs.push(j);
                }
            }
        }
    }
}
