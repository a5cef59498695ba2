//! Redundant-column elimination.
//!
//! After greedy construction some selected columns are fully redundant
//! (every row they cover is covered at least twice). Picking the cheapest
//! subset to drop is itself NP-hard, so the engine splits the work: greedy
//! thinning down to a handful of candidates, then a depth-bounded implicit
//! enumeration over the survivors.
//!
//! Two coverage counters are live at once and must not be collapsed:
//! `total_cover` counts all not-yet-removed columns, `partial_cover` only
//! the columns committed to the kept solution.

use crate::coverage::CoverCounters;
use crate::instance::Instance;
use crate::{C, ColAndCost, E};

/// Maximum number of redundant columns handed to the implicit enumeration.
pub const ENUM_VARS: usize = 10;

/// Scratch state shared by the thinning and enumeration steps.
#[derive(Debug, Clone, Default)]
pub struct RedundancyData {
    /// Individually redundant columns with their costs, sorted by cost.
    pub redund_set: Vec<ColAndCost>,
    /// Row coverage if all remaining (non-removed) columns are selected.
    pub total_cover: CoverCounters,
    /// Row coverage of the columns kept so far.
    pub partial_cover: CoverCounters,
    /// Columns chosen for removal.
    pub cols_to_remove: Vec<C>,
    /// Best complete cost seen (starts at the caller's cutoff).
    pub best_cost: E,
    /// Cost of the kept columns.
    pub partial_cost: E,
    /// Number of rows covered by the kept columns.
    pub partial_cov_count: usize,
}

impl RedundancyData {
    /// Partitions `sol` into kept columns and the individually-redundant
    /// set, using the caller-prepared `total_cover` (covering all of `sol`).
    /// Stops early once the kept cost alone reaches the cutoff.
    pub fn init_from_solution(&mut self, inst: &Instance, sol: &[C], cutoff: E) {
        self.redund_set.clear();
        self.partial_cover.reset(inst.rows.len());
        self.partial_cov_count = 0;
        self.cols_to_remove.clear();
        self.best_cost = cutoff;
        self.partial_cost = 0.0;

        for &j in sol {
            if self.total_cover.is_redundant_uncover(inst.cols.col(j)) {
                self.redund_set.push(ColAndCost {
                    idx: j,
                    cost: inst.costs[j],
                });
            } else {
                self.partial_cov_count += self.partial_cover.cover(inst.cols.col(j));
                self.partial_cost += inst.costs[j];
                if self.partial_cost >= cutoff {
                    return;
                }
            }
        }
        self.redund_set
            .sort_by(|a, b| a.cost.partial_cmp(&b.cost).unwrap_or(std::cmp::Ordering::Equal));
    }
}

/// Greedy thinning: while more than [`ENUM_VARS`] redundant columns remain
/// (and the kept cost is still below the best), drop the most expensive one
/// and re-evaluate its peers — some stop being redundant once it is gone and
/// move to the kept side.
pub fn heuristic_removal(inst: &Instance, red: &mut RedundancyData) {
    while red.partial_cost < red.best_cost && red.redund_set.len() > ENUM_VARS {
        if red.partial_cov_count == inst.rows.len() {
            return;
        }

        let j = red.redund_set.pop().expect("redund_set is non-empty").idx;
        red.total_cover.uncover(inst.cols.col(j));
        red.cols_to_remove.push(j);

        // Peers that lost their redundancy join the kept columns.
        let total_cover = &mut red.total_cover;
        let partial_cover = &mut red.partial_cover;
        let partial_cost = &mut red.partial_cost;
        let partial_cov_count = &mut red.partial_cov_count;
        red.redund_set.retain(|x| {
            if total_cover.is_redundant_uncover(inst.cols.col(x.idx)) {
                true
            } else {
                *partial_cost += inst.costs[x.idx];
                *partial_cov_count += partial_cover.cover(inst.cols.col(x.idx));
                false
            }
        });
    }
}

/// Depth-bounded branch and bound over the at-most-[`ENUM_VARS`] surviving
/// redundant columns. Appends the discarded columns to `cols_to_remove` and
/// updates `best_cost` when a cheaper completion is found.
pub fn enumeration_removal(inst: &Instance, red: &mut RedundancyData) {
    debug_assert!(red.redund_set.len() <= ENUM_VARS);
    let old_best = red.best_cost;
    if red.partial_cost >= old_best || red.redund_set.is_empty() {
        return;
    }

    let mut keep_state = [false; ENUM_VARS];
    let mut cols_to_keep = [false; ENUM_VARS];
    enumerate(inst, red, 0, &mut keep_state, &mut cols_to_keep);

    if red.best_cost < old_best {
        for (r, x) in red.redund_set.iter().enumerate() {
            if !cols_to_keep[r] {
                red.cols_to_remove.push(x.idx);
            }
        }
    }
}

/// Tries the column at `depth` in its two states. The take branch applies
/// only if the column still covers something new and fits under the best
/// cost; the skip branch only if removing it leaves every row covered.
fn enumerate(
    inst: &Instance,
    red: &mut RedundancyData,
    depth: usize,
    keep_state: &mut [bool; ENUM_VARS],
    best: &mut [bool; ENUM_VARS],
) {
    debug_assert!(red.partial_cov_count <= red.partial_cover.len());

    if depth == red.redund_set.len()
        || depth == ENUM_VARS
        || red.partial_cov_count == red.partial_cover.len()
    {
        if red.partial_cost < red.best_cost {
            red.best_cost = red.partial_cost;
            best.copy_from_slice(keep_state);
        }
        return;
    }

    let ColAndCost { idx, cost } = red.redund_set[depth];
    let col = inst.cols.col(idx);

    if red.partial_cost + cost < red.best_cost && !red.partial_cover.is_redundant_cover(col) {
        keep_state[depth] = true;
        red.partial_cov_count += red.partial_cover.cover(col);
        red.partial_cost += cost;

        enumerate(inst, red, depth + 1, keep_state, best);

        keep_state[depth] = false;
        red.partial_cov_count -= red.partial_cover.uncover(col);
        red.partial_cost -= cost;
    }

    if red.total_cover.is_redundant_uncover(col) {
        red.total_cover.uncover(col);
        enumerate(inst, red, depth + 1, keep_state, best);
        red.total_cover.cover(col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_support::make_instance;

    fn setup(inst: &Instance, sol: &[C], cutoff: E) -> RedundancyData {
        let mut red = RedundancyData::default();
        red.total_cover.reset(inst.rows.len());
        for &j in sol {
            red.total_cover.cover(inst.cols.col(j));
        }
        red.init_from_solution(inst, sol, cutoff);
        red
    }

    #[test]
    fn partition_splits_kept_and_redundant() {
        // Columns 0 and 1 cover everything; column 2 is fully redundant.
        let inst = make_instance(&[&[0, 1], &[2, 3], &[1, 2]], &[2.0, 2.0, 1.0]);
        let red = setup(&inst, &[0, 1, 2], E::INFINITY);
        assert_eq!(red.redund_set.len(), 1);
        assert_eq!(red.redund_set[0].idx, 2);
        assert_eq!(red.partial_cost, 4.0);
        assert_eq!(red.partial_cov_count, 4);
    }

    #[test]
    fn enumeration_drops_the_redundant_column() {
        let inst = make_instance(&[&[0, 1], &[2, 3], &[1, 2]], &[2.0, 2.0, 1.0]);
        let mut red = setup(&inst, &[0, 1, 2], E::INFINITY);
        enumeration_removal(&inst, &mut red);
        assert_eq!(red.best_cost, 4.0);
        assert_eq!(red.cols_to_remove, vec![2]);
    }

    #[test]
    fn enumeration_keeps_needed_subset() {
        // Rows 0..3. Solution: {0,1,2} where 0={0,1}, 1={1,2}, 2={2,3,0}:
        // every column is individually redundant against the trio? No:
        // total cover = row0:2, row1:2, row2:2, row3:1. Column 2 holds the
        // only copy of row 3, so only columns 0 and 1 are redundant... but
        // removing both uncovers rows 1 and 2? Removing 0 leaves row1 to
        // col1; removing 1 leaves row2 to col2; removing both leaves row1
        // uncovered. The cheapest completion keeps exactly one of them.
        let inst = make_instance(
            &[&[0, 1], &[1, 2], &[0, 2, 3]],
            &[3.0, 2.0, 4.0],
        );
        let mut red = setup(&inst, &[0, 1, 2], E::INFINITY);
        assert_eq!(red.redund_set.len(), 2);
        enumeration_removal(&inst, &mut red);
        // Keeps column 2 (forced) + the cheaper redundant column 1.
        assert_eq!(red.best_cost, 6.0);
        assert_eq!(red.cols_to_remove, vec![0]);
    }

    #[test]
    fn thinning_reduces_to_enum_size() {
        // 2 rows covered by many duplicate columns: all but the kept pair
        // are redundant.
        let cols: Vec<Vec<usize>> = (0..16).map(|_| vec![0, 1]).collect();
        let col_slices: Vec<&[usize]> = cols.iter().map(|c| c.as_slice()).collect();
        let costs: Vec<E> = (0..16).map(|j| 1.0 + j as E).collect();
        let inst = make_instance(&col_slices, &costs);

        let sol: Vec<C> = (0..16).collect();
        let mut red = setup(&inst, &sol, E::INFINITY);
        // Every column is individually redundant against the other 15.
        assert!(red.redund_set.len() > ENUM_VARS);
        heuristic_removal(&inst, &mut red);
        assert!(red.redund_set.len() <= ENUM_VARS);
        enumeration_removal(&inst, &mut red);
        // Nothing but the cheapest column should remain.
        assert_eq!(red.best_cost, 1.0);
        assert_eq!(red.cols_to_remove.len(), 15);
    }

    #[test]
    fn removal_never_breaks_feasibility_nor_raises_cost() {
        let inst = make_instance(
            &[&[0, 1, 2], &[2, 3], &[3, 4], &[0, 4], &[1, 3]],
            &[3.0, 2.0, 2.0, 2.0, 2.0],
        );
        let sol: Vec<C> = vec![0, 1, 2, 3, 4];
        let start_cost: E = sol.iter().map(|&j| inst.costs[j]).sum();
        let mut red = setup(&inst, &sol, E::INFINITY);
        heuristic_removal(&inst, &mut red);
        enumeration_removal(&inst, &mut red);

        let kept: Vec<C> = sol
            .iter()
            .copied()
            .filter(|j| !red.cols_to_remove.contains(j))
            .collect();
        let mut cover = CoverCounters::new(inst.rows.len());
        let mut covered = 0;
        for &j in &kept {
            covered += cover.cover(inst.cols.col(j));
        }
        assert_eq!(covered, inst.rows.len());
        let kept_cost: E = kept.iter().map(|&j| inst.costs[j]).sum();
        assert!(kept_cost <= start_cost);
        assert!((kept_cost - red.best_cost).abs() < 1e-9);
    }
}
