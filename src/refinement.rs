//! Refinement: the outer loop of the solver.
//!
//! Runs the three-phase engine on the whole instance, then repeatedly fixes
//! a growing fraction of the best solution's columns and re-solves the
//! residual, until the gap closes, the instance empties, or the clock wins.

use crate::callback::{RefinementState, SolverHooks};
use crate::coverage::CoverCounters;
use crate::env::Environment;
use crate::fixing::{FixingData, IdxsMaps, fix_columns_and_compute_maps};
use crate::instance::Instance;
use crate::random::{Prng, prng_from_seed};
use crate::three_phase::ThreePhase;
use crate::{C, ColAndCost, DualState, E, Solution, Status, debug_check_solution, vprint};

/// Outcome of a solver run: the best primal solution (original column
/// numbering), the honest dual state recorded before any fixing, and how the
/// run ended.
#[derive(Debug, Clone, Default)]
pub struct SolveResult {
    pub sol: Solution,
    pub dual: DualState,
    pub status: Status,
}

/// Chooses the columns of the incumbent to fix for the next refinement
/// iteration, ranked by their contribution to the duality gap.
#[derive(Debug, Clone)]
struct FixManager {
    fix_fraction: E,
    prev_cost: E,
    row_coverage: CoverCounters,
    gap_contributions: Vec<ColAndCost>,
}

impl FixManager {
    fn new() -> Self {
        Self {
            fix_fraction: 0.0,
            prev_cost: E::INFINITY,
            row_coverage: CoverCounters::default(),
            gap_contributions: Vec::new(),
        }
    }

    /// Bumps the fixing fraction geometrically (resetting after an
    /// improvement), scores each incumbent column by `Δⱼ = max(0, c̄ⱼ) +
    /// Σᵢ uᵢ (covᵢ - 1) / covᵢ`, and fixes the lowest-Δ columns until they
    /// jointly cover the target number of rows.
    fn select_cols_to_fix(
        &mut self,
        env: &Environment,
        inst: &Instance,
        best_mults: &[E],
        best_sol: &Solution,
    ) -> Vec<C> {
        let nrows = inst.rows.len();

        self.fix_fraction = (self.fix_fraction * env.alpha).min(1.0);
        if best_sol.cost < self.prev_cost {
            self.fix_fraction = env.min_fixing;
        }
        self.prev_cost = best_sol.cost;

        let nrows_to_fix = (nrows as E * self.fix_fraction) as usize;
        debug_assert_eq!(best_mults.len(), nrows);

        self.row_coverage.reset(nrows);
        for &j in &best_sol.idxs {
            self.row_coverage.cover(inst.cols.col(j));
        }

        self.gap_contributions.clear();
        for &j in &best_sol.idxs {
            let mut gap_contrib = 0.0;
            let mut reduced_cost = inst.costs[j];
            for &i in inst.cols.col(j) {
                let cov = self.row_coverage[i] as E;
                gap_contrib += best_mults[i] * (cov - 1.0) / cov;
                reduced_cost -= best_mults[i];
            }
            gap_contrib += reduced_cost.max(0.0);
            self.gap_contributions.push(ColAndCost {
                idx: j,
                cost: gap_contrib,
            });
        }
        self.gap_contributions.sort_by(|a, b| {
            a.cost
                .partial_cmp(&b.cost)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.idx.cmp(&b.idx))
        });

        let mut covered_rows = 0;
        self.row_coverage.reset(nrows);
        let mut cols_to_fix = Vec::new();
        for c in &self.gap_contributions {
            covered_rows += self.row_coverage.cover(inst.cols.col(c.idx));
            if covered_rows > nrows_to_fix {
                break;
            }
            cols_to_fix.push(c.idx);
        }
        cols_to_fix
    }
}

/// Complete solver: refinement loop around the three-phase engine.
pub struct Refinement {
    orig_inst: Instance,
    inst: Instance,
    three_phase: ThreePhase,
    fix_manager: FixManager,
    fixing: FixingData,
    old2new: IdxsMaps,
    rnd: Prng,
}

impl Refinement {
    /// Snapshots `orig_inst`; the working copy is rebuilt every iteration.
    pub fn new(env: &Environment, orig_inst: Instance) -> Self {
        Self {
            inst: orig_inst.clone(),
            orig_inst,
            three_phase: ThreePhase::default(),
            fix_manager: FixManager::new(),
            fixing: FixingData::default(),
            old2new: IdxsMaps::default(),
            rnd: prng_from_seed(env.seed),
        }
    }

    /// Runs the solver, optionally warm-started, until termination.
    pub fn solve(&mut self, env: &Environment, warmstart: &Solution, hooks: &mut SolverHooks) -> SolveResult {
        let ncols = self.orig_inst.cols.size();
        let nrows = self.orig_inst.rows.len();

        let mut best_sol = Solution::empty();
        if !warmstart.idxs.is_empty() {
            best_sol = warmstart.clone();
        }

        let mut nofix_dual = DualState {
            mults: Vec::new(),
            lb: E::NEG_INFINITY,
        };
        let mut max_cost = E::NEG_INFINITY;
        let mut status = Status::InProgress;
        self.fixing.reset_to_identity(ncols, nrows);

        let mut iter_counter = 0usize;
        loop {
            let result = self
                .three_phase
                .run(env, &mut self.inst, &mut self.rnd, &hooks.stopper);
            if result.sol.cost + self.fixing.fixed_cost < best_sol.cost {
                from_fixed_to_unfixed_sol(&result.sol, &self.fixing, &mut best_sol);
                debug_check_solution(&self.orig_inst, &best_sol);
            }

            if iter_counter == 0 {
                nofix_dual = result.nofix_dual;
                max_cost = env.beta * nofix_dual.lb + env.epsilon;
            }

            if best_sol.cost <= max_cost {
                status = Status::Optimal;
                break;
            }
            if let Some(stop_status) = hooks.stopper.check(env) {
                status = stop_status;
                break;
            }

            self.inst.clone_from(&self.orig_inst);
            let cols_to_fix =
                self.fix_manager
                    .select_cols_to_fix(env, &self.inst, &nofix_dual.mults, &best_sol);
            // The maps must match the freshly restored instance even when
            // nothing gets fixed this round.
            self.fixing.reset_to_identity(ncols, nrows);
            if !cols_to_fix.is_empty() {
                fix_columns_and_compute_maps(
                    &cols_to_fix,
                    &mut self.inst,
                    &mut self.fixing,
                    &mut self.old2new,
                );
            }

            hooks.callback.call(&RefinementState {
                iter: iter_counter,
                best_cost: best_sol.cost,
                lower_bound: nofix_dual.lb,
                fixed_cost: self.fixing.fixed_cost,
                free_rows_pct: self.inst.rows.len() as E * 100.0 / nrows as E,
                elapsed_secs: env.timer.elapsed(),
            });

            if self.inst.rows.is_empty() {
                status = Status::Feasible;
                break;
            }
            if let Some(stop_status) = hooks.stopper.check(env) {
                status = stop_status;
                break;
            }
            iter_counter += 1;
        }

        SolveResult {
            sol: best_sol,
            dual: nofix_dual,
            status,
        }
    }
}

/// Runs the complete solver on `orig_inst`.
pub fn run(
    env: &Environment,
    orig_inst: &Instance,
    warmstart: &Solution,
    hooks: &mut SolverHooks,
) -> SolveResult {
    let mut refinement = Refinement::new(env, orig_inst.clone());
    let result = refinement.solve(env, warmstart, hooks);
    vprint!(
        env,
        1,
        "CFT> Best solution {:.2} time {:.2}s",
        result.sol.cost,
        env.timer.elapsed()
    );
    result
}

/// Converts a solution of the fixed instance to one of the unfixed
/// instance, prepending the fixed columns.
fn from_fixed_to_unfixed_sol(sol: &Solution, fixing: &FixingData, best_sol: &mut Solution) {
    best_sol.cost = sol.cost + fixing.fixed_cost;
    best_sol.idxs.clear();
    best_sol.idxs.extend_from_slice(&fixing.fixed_cols);
    for &j in &sol.idxs {
        best_sol.idxs.push(fixing.curr2orig.col_map[j]);
    }
}
