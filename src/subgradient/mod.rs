//! Subgradient phase of the three-phase algorithm.
//!
//! Dual ascent on the Lagrangian multipliers with an adaptive step size,
//! periodic pricing against the enclosing instance, and a heuristic
//! sub-phase that drives the greedy constructor with the evolving duals.

pub mod managers;
pub mod pricer;

pub use pricer::Pricer;

use crate::coverage::CoverCounters;
use crate::env::Environment;
use crate::greedy::Greedy;
use crate::instance::{CoreInstance, Instance};
use crate::stop::Stopper;
use crate::{C, E, Solution, debug_check_solution, vprint};
use managers::{ExitConditionManager, PricingManager, StepSizeManager};

/// Squared subgradient norms are integers; anything below this is zero.
const ZERO_NORM: E = 0.999;

/// Subgradient functor; owns the dual-side scratch shared by the ascent and
/// heuristic sub-phases.
#[derive(Debug, Clone, Default)]
pub struct Subgradient {
    /// Columns with negative reduced cost and the bound they certify.
    lb_sol: Solution,
    greedy_sol: Solution,
    row_coverage: CoverCounters,
    reduced_costs: Vec<E>,
    mults: Vec<E>,
}

impl Subgradient {
    /// Dual ascent on the core instance. Prices the enclosing `inst`
    /// periodically (refreshing `core`), records the best multipliers in
    /// `best_mults`, and returns the best real (enclosing-instance) lower
    /// bound.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        env: &Environment,
        inst: &Instance,
        cutoff: E,
        pricer: &mut Pricer,
        core: &mut CoreInstance,
        step_size: &mut E,
        best_mults: &mut Vec<E>,
        stop: &Stopper,
    ) -> E {
        let nrows = inst.rows.len();
        let max_real_lb = cutoff - env.epsilon;

        debug_assert!(!inst.cols.is_empty(), "empty instance");
        debug_assert!(!core.inst.cols.is_empty(), "empty core instance");
        debug_assert_eq!(nrows, core.inst.rows.len(), "incompatible instances");

        let mut next_step_size = StepSizeManager::new(20, *step_size);
        let mut should_exit = ExitConditionManager::new(300);
        let mut should_price = PricingManager::new(10, (nrows / 3).clamp(1, 1000));
        let mut best_core_lb = E::NEG_INFINITY;
        let mut best_real_lb = E::NEG_INFINITY;
        let mut priced = false;
        self.reset_bounds(&core.inst.costs, &mut best_core_lb);
        self.mults.clone_from(best_mults);

        vprint!(
            env,
            4,
            "SUBG> Subgradient start: UB {:.2}, cutoff {:.2}",
            cutoff,
            max_real_lb
        );

        let max_iters = 10 * nrows;
        for iter in 0..max_iters {
            if best_real_lb >= max_real_lb {
                break;
            }
            if stop.check(env).is_some() {
                break;
            }

            self.update_lbsol_and_reduced_costs(&core.inst);
            self.compute_reduced_row_coverage(&core.inst);
            let sqr_norm = self.subgrad_sqr_norm();

            if self.lb_sol.cost > best_core_lb {
                vprint!(env, 5, "SUBG> {:4}: Current lower bound: {:.2}", iter, self.lb_sol.cost);
                best_core_lb = self.lb_sol.cost;
                best_mults.clone_from(&self.mults);
            }

            if sqr_norm < ZERO_NORM {
                // Zero subgradient: the incumbent multipliers are optimal
                // for the current core.
                vprint!(env, 4, "SUBG> {:4}: Found optimal multipliers.", iter);
                best_mults.clone_from(&self.mults);
                break;
            }

            if should_exit.should_exit(env, iter, best_core_lb) {
                break;
            }

            *step_size = next_step_size.next(iter, self.lb_sol.cost);
            let step_factor = *step_size * (cutoff - self.lb_sol.cost) / sqr_norm;
            self.update_mults(step_factor);

            if should_price.should_price(iter) && iter < max_iters - 1 {
                let real_lb = pricer.price(inst, &self.mults, core);
                should_price.update(best_core_lb, real_lb, cutoff);
                priced = true;

                vprint!(
                    env,
                    4,
                    "SUBG> {:4}: LB: {:8.2}  Core LB: {:8.2}  Step size: {:6.1}",
                    iter,
                    real_lb,
                    best_core_lb,
                    step_size
                );

                best_real_lb = best_real_lb.max(real_lb);
                self.reset_bounds(&core.inst.costs, &mut best_core_lb);
            }
        }

        if !priced {
            // The loop ended before the first pricing event (tiny instances
            // or an early zero-norm exit): price once with the best duals so
            // the caller still gets a real bound on the enclosing instance.
            best_real_lb = best_real_lb.max(pricer.price(inst, best_mults, core));
        }

        best_real_lb
    }

    /// Heuristic sub-phase: up to `env.heur_iters` fixed-step subgradient
    /// iterations targeting the incumbent cost, each followed by a greedy
    /// construction with the current multipliers.
    #[allow(clippy::too_many_arguments)]
    pub fn heuristic(
        &mut self,
        env: &Environment,
        core_inst: &Instance,
        step_size: E,
        greedy: &mut Greedy,
        best_sol: &mut Solution,
        best_mults: &mut Vec<E>,
        stop: &Stopper,
    ) {
        let mut best_core_lb = E::NEG_INFINITY;
        self.reset_bounds(&core_inst.costs, &mut best_core_lb);
        self.mults.clone_from(best_mults);

        for iter in 0..env.heur_iters {
            if stop.check(env).is_some() {
                break;
            }

            self.update_lbsol_and_reduced_costs(core_inst);
            self.row_coverage.reset(core_inst.rows.len());
            for s in 0..self.lb_sol.idxs.len() {
                let j = self.lb_sol.idxs[s];
                self.row_coverage.cover(core_inst.cols.col(j));
            }
            let sqr_norm = self.subgrad_sqr_norm();

            if self.lb_sol.cost > best_core_lb {
                best_core_lb = self.lb_sol.cost;
                if !env.heur_mults_from_greedy {
                    best_mults.clone_from(&self.mults);
                }
            }

            let cutoff = best_sol.cost;
            if best_core_lb >= best_sol.cost - env.epsilon {
                return;
            }

            self.greedy_sol.clear();
            let greedy_cost = greedy.run_with_reduced_costs(
                env,
                core_inst,
                &self.mults,
                &self.reduced_costs,
                &mut self.greedy_sol,
                cutoff,
                usize::MAX,
            );
            vprint!(env, 5, "HEUR> {:4}: Greedy solution {:.2}", iter, greedy_cost);
            if greedy_cost <= best_sol.cost - env.epsilon {
                std::mem::swap(best_sol, &mut self.greedy_sol);
                if env.heur_mults_from_greedy {
                    best_mults.clone_from(&self.mults);
                }
                vprint!(env, 4, "HEUR> {:4}: Improved solution {:.2}", iter, best_sol.cost);
                debug_check_solution(core_inst, best_sol);
            }

            if sqr_norm < ZERO_NORM {
                debug_assert!(best_core_lb <= best_sol.cost, "optimum is above cutoff");
                vprint!(env, 4, "HEUR> {:4}: Found optimal multipliers.", iter);
                best_mults.clone_from(&self.mults);
                return;
            }

            let step_factor = step_size * (best_sol.cost - self.lb_sol.cost) / sqr_norm;
            self.update_mults(step_factor);
        }
    }

    /// Re-arms the per-core state as if the multipliers were all zero; the
    /// real values are recomputed at the head of the next iteration.
    fn reset_bounds(&mut self, core_costs: &[E], best_core_lb: &mut E) {
        self.reduced_costs.clear();
        self.reduced_costs.extend_from_slice(core_costs);
        *best_core_lb = E::NEG_INFINITY;
        self.lb_sol.idxs.clear();
        self.lb_sol.cost = E::NEG_INFINITY;
    }

    /// Recomputes reduced costs under the current multipliers and collects
    /// the negative ones into `lb_sol`, whose cost becomes `L(u)`.
    fn update_lbsol_and_reduced_costs(&mut self, inst: &Instance) {
        self.lb_sol.idxs.clear();
        self.lb_sol.cost = self.mults.iter().sum();

        self.reduced_costs.resize(inst.cols.size(), 0.0);
        for j in 0..inst.cols.size() {
            let mut reduced = inst.costs[j];
            for &i in inst.cols.col(j) {
                reduced -= self.mults[i];
            }
            self.reduced_costs[j] = reduced;

            if reduced < 0.0 {
                self.lb_sol.idxs.push(j);
                self.lb_sol.cost += reduced;
            }
        }
    }

    /// Row coverage of `lb_sol` keeping only non-redundant columns, cheapest
    /// reduced cost first.
    fn compute_reduced_row_coverage(&mut self, inst: &Instance) {
        self.row_coverage.reset(inst.rows.len());
        let reduced_costs = &self.reduced_costs;
        self.lb_sol.idxs.sort_by(|&a, &b| {
            reduced_costs[a]
                .partial_cmp(&reduced_costs[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for s in 0..self.lb_sol.idxs.len() {
            let j: C = self.lb_sol.idxs[s];
            let col = inst.cols.col(j);
            if !self.row_coverage.is_redundant_cover(col) {
                self.row_coverage.cover(col);
            }
        }
    }

    /// Squared norm of the subgradient `(1 - cov_i)_i`.
    fn subgrad_sqr_norm(&self) -> E {
        let mut sqr_norm: i64 = 0;
        for i in 0..self.row_coverage.len() {
            let violation = 1 - self.row_coverage[i] as i64;
            sqr_norm += violation * violation;
        }
        sqr_norm as E
    }

    /// Projected ascent step `u_i := max(0, u_i + step_factor * (1 - cov_i))`.
    fn update_mults(&mut self, step_factor: E) {
        for i in 0..self.row_coverage.len() {
            let violation = 1.0 - self.row_coverage[i] as E;
            self.mults[i] = (self.mults[i] + step_factor * violation).max(0.0);
            debug_assert!(self.mults[i].is_finite(), "multiplier is not finite");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_support::make_instance;

    fn tentative_core(inst: &Instance) -> CoreInstance {
        let mut core = CoreInstance::default();
        let mut pricer = Pricer::default();
        pricer.price(inst, &vec![0.0; inst.rows.len()], &mut core);
        core
    }

    #[test]
    fn lbsol_collects_negative_reduced_costs() {
        let inst = make_instance(&[&[0], &[1], &[0, 1]], &[5.0, 5.0, 7.0]);
        let mut subgrad = Subgradient::default();
        subgrad.mults = vec![6.0, 6.0];
        subgrad.update_lbsol_and_reduced_costs(&inst);
        // L(u) = 12 + (-1) + (-1) + (-5) = 5 with all columns negative.
        assert_eq!(subgrad.lb_sol.idxs, vec![0, 1, 2]);
        assert!((subgrad.lb_sol.cost - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_norm_keeps_multipliers() {
        // With u = (5, 5) the reduced costs are (0, 0, -3); the negative
        // column covers both rows exactly once, so the subgradient is zero
        // and the multipliers must come back as given.
        let inst = make_instance(&[&[0], &[1], &[0, 1]], &[5.0, 5.0, 7.0]);
        let core = CoreInstance {
            inst: inst.clone(),
            col_map: vec![0, 1, 2],
        };
        let mut subgrad = Subgradient::default();
        let env = Environment::default();
        let mut pricer = Pricer::default();
        let mut core = core;
        let mut step_size = 0.1;
        let mut best_mults = vec![5.0, 5.0];
        let stop = Stopper::new();

        let lb = subgrad.run(
            &env,
            &inst,
            100.0,
            &mut pricer,
            &mut core,
            &mut step_size,
            &mut best_mults,
            &stop,
        );
        assert_eq!(best_mults, vec![5.0, 5.0]);
        // Final pricing fallback reports L(u) = 10 - 3 = 7.
        assert!((lb - 7.0).abs() < 1e-9);
    }

    #[test]
    fn ascent_reaches_the_optimal_bound() {
        // Two disjoint rows, unit-ish costs: optimal duals are u_i = cost of
        // the cheapest column covering row i, LB = 5 + 4 = 9.
        let inst = make_instance(&[&[0], &[1], &[0], &[1]], &[5.0, 4.0, 8.0, 9.0]);
        let core = tentative_core(&inst);
        let mut subgrad = Subgradient::default();
        let mut env = Environment::default();
        env.verbose = 0;
        let mut pricer = Pricer::default();
        let mut core = core;
        let mut step_size = 0.1;
        let mut best_mults = vec![0.0, 0.0];
        let stop = Stopper::new();

        let lb = subgrad.run(
            &env,
            &inst,
            9.0,
            &mut pricer,
            &mut core,
            &mut step_size,
            &mut best_mults,
            &stop,
        );
        assert!(lb <= 9.0 + 1e-6);
        assert!(lb > 0.0);
    }

    #[test]
    fn heuristic_improves_the_incumbent() {
        let inst = make_instance(&[&[0], &[1], &[0, 1]], &[5.0, 5.0, 7.0]);
        let mut subgrad = Subgradient::default();
        let mut env = Environment::default();
        env.verbose = 0;
        let mut greedy = Greedy::default();
        let mut best_sol = Solution {
            idxs: vec![0, 1],
            cost: 10.0,
        };
        let mut best_mults = vec![3.5, 3.5];
        let stop = Stopper::new();

        subgrad.heuristic(
            &env,
            &inst,
            0.1,
            &mut greedy,
            &mut best_sol,
            &mut best_mults,
            &stop,
        );
        assert_eq!(best_sol.idxs, vec![2]);
        assert_eq!(best_sol.cost, 7.0);
    }
}
