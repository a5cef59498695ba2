//! Greedy primal construction driven by Lagrangian scores.
//!
//! Quantity over quality: the greedy step is called thousands of times per
//! run, so the functor keeps its score and redundancy scratch alive across
//! calls instead of reallocating.

pub mod redundancy;
pub mod scores;

use crate::env::Environment;
use crate::instance::Instance;
use crate::{E, Solution};
use redundancy::{RedundancyData, enumeration_removal, heuristic_removal};
use scores::Scores;

/// Greedy solution builder with redundancy elimination.
///
/// A valid (feasible, cost-below-cutoff) solution is signalled by the
/// returned cost being `< cutoff`; otherwise the caller discards the result.
/// An infeasible solution is only ever returned when `max_sol_size` cut the
/// construction short, which is the column-fixing contract.
#[derive(Debug, Clone, Default)]
pub struct Greedy {
    scores: Scores,
    redund: RedundancyData,
}

impl Greedy {
    /// Runs the greedy step computing reduced costs from `mults` first.
    pub fn run(
        &mut self,
        env: &Environment,
        inst: &Instance,
        mults: &[E],
        sol: &mut Solution,
        cutoff: E,
        max_sol_size: usize,
    ) -> E {
        self.scores.gammas.clear();
        self.scores.gammas.extend_from_slice(&inst.costs);
        for j in 0..inst.cols.size() {
            for &i in inst.cols.col(j) {
                self.scores.gammas[j] -= mults[i];
            }
        }
        self.build(env, inst, mults, sol, cutoff, max_sol_size)
    }

    /// Runs the greedy step with the reduced costs already available (they
    /// seed the gamma values).
    pub fn run_with_reduced_costs(
        &mut self,
        env: &Environment,
        inst: &Instance,
        mults: &[E],
        reduced_costs: &[E],
        sol: &mut Solution,
        cutoff: E,
        max_sol_size: usize,
    ) -> E {
        self.scores.gammas.clear();
        self.scores.gammas.extend_from_slice(reduced_costs);
        self.build(env, inst, mults, sol, cutoff, max_sol_size)
    }

    /// The greedy algorithm: initialize scores, repeatedly take the best
    /// scoring column until every row is covered (or the size cap is hit),
    /// then strip redundant columns under the cutoff.
    fn build(
        &mut self,
        env: &Environment,
        inst: &Instance,
        mults: &[E],
        sol: &mut Solution,
        cutoff: E,
        max_sol_size: usize,
    ) -> E {
        let nrows = inst.rows.len();
        let total_cover = &mut self.redund.total_cover;
        total_cover.reset(nrows);

        let mut nrows_to_cover = nrows;
        self.scores.init(inst);
        if !sol.idxs.is_empty() {
            nrows_to_cover -= self
                .scores
                .cover_solution(inst, &sol.idxs, mults, total_cover);
        }

        if nrows_to_cover == 0 {
            self.remove_redundant_cols(inst, cutoff, sol);
            return sol.cost;
        }

        let mut window = self
            .scores
            .select_good_scores(nrows_to_cover.min(inst.cols.size()));
        let mut update_trigger = self.scores.scores[window - 1].score;

        while nrows_to_cover > 0 && sol.idxs.len() < max_sol_size {
            let mut s_min = self.scores.argmin_in_window(window);
            if self.scores.scores[s_min].score >= update_trigger {
                // The window went stale: recompute it around the still
                // useful columns. This is also where the clock is polled;
                // cutoff-free calls must run to completion because their
                // result cannot be discarded.
                if cutoff < E::INFINITY && env.timer.expired() {
                    break;
                }
                let amount = nrows_to_cover
                    .min(inst.cols.size() - sol.idxs.len())
                    .max(1);
                window = self.scores.select_good_scores(amount);
                update_trigger = self.scores.scores[window - 1].score;
                s_min = self.scores.argmin_in_window(window);
            }

            let jstar = self.scores.scores[s_min].idx;
            debug_assert!(self.scores.scores[s_min].score < E::INFINITY, "illegal score");
            debug_assert!(!sol.idxs.contains(&jstar), "duplicate column");
            sol.idxs.push(jstar);

            self.scores
                .update_changed(inst, mults, &self.redund.total_cover, s_min);
            nrows_to_cover -= self.redund.total_cover.cover(inst.cols.col(jstar));
        }

        if nrows_to_cover > 0 && sol.idxs.len() < max_sol_size {
            // Clock ran out mid-construction: the partial set covers only
            // part of the rows, so hand back the discard sentinel.
            sol.cost = E::INFINITY;
            return sol.cost;
        }

        self.remove_redundant_cols(inst, cutoff, sol);
        sol.cost
    }

    /// Redundancy elimination pipeline: partition, early exits, greedy
    /// thinning, bounded enumeration.
    fn remove_redundant_cols(&mut self, inst: &Instance, cutoff: E, sol: &mut Solution) {
        let red = &mut self.redund;
        red.init_from_solution(inst, &sol.idxs, cutoff);
        if Self::try_early_exit(red, sol) {
            return;
        }

        heuristic_removal(inst, red);
        if Self::try_early_exit(red, sol) {
            return;
        }

        enumeration_removal(inst, red);
        sol.cost = red.best_cost;
        if sol.cost >= cutoff {
            return;
        }
        let cols_to_remove = &red.cols_to_remove;
        sol.idxs.retain(|j| !cols_to_remove.contains(j));
    }

    /// Settles the easy cases: kept cost already past the cutoff (discard),
    /// no redundant candidates (done), or kept columns covering everything
    /// (drop every candidate). Returns true when the pipeline can stop.
    fn try_early_exit(red: &mut RedundancyData, sol: &mut Solution) -> bool {
        sol.cost = red.partial_cost;
        if red.partial_cost >= red.best_cost || red.redund_set.is_empty() {
            return true;
        }
        if red.partial_cov_count < red.partial_cover.len() {
            return false;
        }

        for x in &red.redund_set {
            red.cols_to_remove.push(x.idx);
        }
        let cols_to_remove = &red.cols_to_remove;
        sol.idxs.retain(|j| !cols_to_remove.contains(j));
        true
    }
}
