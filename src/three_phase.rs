//! One orchestration cycle: subgradient → heuristic → column fixing.
//!
//! The instance handed in gets progressively fixed in place and loses its
//! original state; the caller keeps a pristine copy if it needs to restore.

use crate::env::Environment;
use crate::fixing::{ColFixing, FixingData};
use crate::greedy::Greedy;
use crate::instance::{CoreInstance, Instance, fill_rows_from_cols, push_col_from};
use crate::random::{Prng, rnd_real};
use crate::stop::Stopper;
use crate::subgradient::{Pricer, Subgradient};
use crate::{C, DualState, E, REMOVED_COL, Solution, debug_check_solution, vprint};

/// Step size the subgradient phase restarts from on every cycle.
const INIT_STEP_SIZE: E = 0.1;

/// Columns initially taken per row when building the tentative core.
const TENTATIVE_ROW_COVERAGE: usize = 5;

/// Result of a three-phase run: the best solution (in the numbering of the
/// instance handed in) plus the dual state recorded before the first fixing
/// distorted the problem.
#[derive(Debug, Clone, Default)]
pub struct ThreePhaseResult {
    pub sol: Solution,
    pub nofix_dual: DualState,
}

/// Three-phase engine; owns every sub-component and their scratch buffers.
#[derive(Default)]
pub struct ThreePhase {
    subgrad: Subgradient,
    greedy: Greedy,
    col_fixing: ColFixing,
    pricer: Pricer,
    fixing: FixingData,
    sol: Solution,
    best_sol: Solution,
    core: CoreInstance,
    mults: Vec<E>,
    unfixed_mults: Vec<E>,
}

impl ThreePhase {
    /// Runs three-phase cycles on `inst` until its rows are exhausted, the
    /// bound closes on the incumbent, or the clock runs out.
    pub fn run(
        &mut self,
        env: &Environment,
        inst: &mut Instance,
        rnd: &mut Prng,
        stop: &Stopper,
    ) -> ThreePhaseResult {
        let orig_nrows = inst.rows.len();
        let mut unfixed_lb = E::NEG_INFINITY;
        self.setup(env, inst);

        let mut iter_counter = 0usize;
        while !inst.rows.is_empty() {
            vprint!(env, 3, "3PHS> Three-phase iteration {}:", iter_counter);

            let mut step_size = INIT_STEP_SIZE;
            let cutoff = self.best_sol.cost - self.fixing.fixed_cost;
            let mut real_lb = self.subgrad.run(
                env,
                inst,
                cutoff,
                &mut self.pricer,
                &mut self.core,
                &mut step_size,
                &mut self.mults,
                stop,
            );

            if iter_counter == 0 {
                self.unfixed_mults.clone_from(&self.mults);
                unfixed_lb = real_lb;
            }

            if real_lb + self.fixing.fixed_cost >= self.best_sol.cost - env.epsilon
                || stop.check(env).is_some()
            {
                break;
            }

            // The solution only gets filled when one below the cutoff shows
            // up; a stale cost means "nothing found".
            self.sol.idxs.clear();
            self.sol.cost = cutoff;
            self.subgrad.heuristic(
                env,
                &self.core.inst,
                step_size,
                &mut self.greedy,
                &mut self.sol,
                &mut self.mults,
                stop,
            );

            if self.sol.cost + self.fixing.fixed_cost < self.best_sol.cost {
                Self::from_core_to_unfixed_sol(&self.sol, &self.core, &self.fixing, &mut self.best_sol);
            }

            self.col_fixing.fix(
                env,
                orig_nrows,
                inst,
                &mut self.fixing,
                &mut self.mults,
                &mut self.greedy,
            );
            real_lb = self.pricer.price(inst, &self.mults, &mut self.core);
            perturb_mults(&mut self.mults, rnd);

            vprint!(env, 3, "3PHS> Remaining rows:     {}", inst.rows.len());
            vprint!(env, 3, "3PHS> Remaining columns:  {}", inst.cols.size());
            vprint!(env, 3, "3PHS> Core instance cols: {}", self.core.inst.cols.size());
            vprint!(env, 3, "3PHS> Fixed cost:         {:.2}", self.fixing.fixed_cost);
            vprint!(env, 3, "3PHS> Best solution:      {:.2}", self.best_sol.cost);
            vprint!(env, 3, "3PHS> Current LB:         {:.2}", real_lb + self.fixing.fixed_cost);

            // The bound tends to be tightest right after the fixing.
            if real_lb + self.fixing.fixed_cost >= self.best_sol.cost - env.epsilon {
                break;
            }
            iter_counter += 1;
        }

        vprint!(env, 3, "3PHS> Best solution: {:.2}", self.best_sol.cost);
        ThreePhaseResult {
            sol: self.best_sol.clone(),
            nofix_dual: DualState {
                mults: self.unfixed_mults.clone(),
                lb: unfixed_lb,
            },
        }
    }

    /// Builds the tentative core, seeds greedy multipliers, resets the
    /// fixing maps, and installs an initial incumbent from a plain greedy
    /// run.
    fn setup(&mut self, env: &Environment, inst: &Instance) {
        build_tentative_core(inst, &mut self.core);
        compute_greedy_mults(&self.core.inst, &mut self.mults);
        self.fixing
            .reset_to_identity(inst.cols.size(), inst.rows.len());

        self.sol.clear();
        self.greedy.run_with_reduced_costs(
            env,
            &self.core.inst,
            &self.mults,
            &self.core.inst.costs,
            &mut self.sol,
            E::INFINITY,
            usize::MAX,
        );

        Self::from_core_to_unfixed_sol(&self.sol, &self.core, &self.fixing, &mut self.best_sol);
        debug_check_solution(inst, &self.best_sol);
    }

    /// Maps a core-instance solution (pricing and fixing both applied) back
    /// to the instance the three-phase run started from.
    fn from_core_to_unfixed_sol(
        core_sol: &Solution,
        core: &CoreInstance,
        fixing: &FixingData,
        unfixed_sol: &mut Solution,
    ) {
        unfixed_sol.cost = core_sol.cost + fixing.fixed_cost;
        unfixed_sol.idxs.clear();
        unfixed_sol.idxs.extend_from_slice(&fixing.fixed_cols);
        for &j in &core_sol.idxs {
            let unpriced_j = core.col_map[j];
            let unfixed_j = fixing.curr2orig.col_map[unpriced_j];
            debug_assert!(unfixed_j != REMOVED_COL);
            unfixed_sol.idxs.push(unfixed_j);
        }
    }
}

/// Greedy dual seed: each row gets the smallest cost-per-covered-row among
/// its columns.
fn compute_greedy_mults(inst: &Instance, mults: &mut Vec<E>) {
    mults.clear();
    mults.resize(inst.rows.len(), E::INFINITY);
    for (i, row) in inst.rows.iter().enumerate() {
        for &j in row {
            let candidate = inst.costs[j] / inst.cols.col(j).len() as E;
            mults[i] = mults[i].min(candidate);
        }
    }
}

/// Multiplier perturbation by a uniform factor in [0.9, 1.1).
fn perturb_mults(mults: &mut [E], rnd: &mut Prng) {
    for u in mults.iter_mut() {
        *u *= rnd_real(rnd, 0.9, 1.1);
        debug_assert!(u.is_finite(), "multiplier is not finite");
    }
}

/// Selects the first few columns of each row as the initial core, before
/// any dual information exists.
fn build_tentative_core(inst: &Instance, core: &mut CoreInstance) {
    let nrows = inst.rows.len();

    core.inst.clear();
    core.col_map.clear();
    core.col_map.reserve(nrows * TENTATIVE_ROW_COVERAGE);
    for row in &inst.rows {
        for &j in row.iter().take(TENTATIVE_ROW_COVERAGE) {
            core.col_map.push(j);
        }
    }

    // Duplicates across rows are detected by sorting the candidate list.
    core.col_map.sort_unstable();
    core.col_map.dedup();
    for idx in 0..core.col_map.len() {
        let j: C = core.col_map[idx];
        push_col_from(inst, j, &mut core.inst);
    }

    fill_rows_from_cols(&core.inst.cols, nrows, &mut core.inst.rows);
}
