//! Per-iteration hooks for the refinement loop.

use crate::E;
use crate::stop::Stopper;

/// Snapshot of the refinement loop handed to callbacks once per iteration.
#[derive(Debug, Clone, Copy)]
pub struct RefinementState {
    pub iter: usize,
    pub best_cost: E,
    pub lower_bound: E,
    pub fixed_cost: E,
    /// Fraction of original rows still free (not fixed), in percent.
    pub free_rows_pct: E,
    pub elapsed_secs: f64,
}

/// Hook invoked once per refinement iteration for logging or monitoring.
pub trait Callback {
    /// Called at the end of each iteration with the current state.
    fn call(&mut self, state: &RefinementState);
}

/// A callback that does nothing. Use when no per-iteration output is needed.
pub struct NoOpCallback {}

impl Callback for NoOpCallback {
    fn call(&mut self, _state: &RefinementState) {
        // Do nothing
    }
}

/// Prints one gap/bound summary per refinement iteration.
pub struct GapOutput {}

impl Callback for GapOutput {
    fn call(&mut self, state: &RefinementState) {
        println!(
            "REFN> {:2}: Best solution {:.2}, lb {:.2}, gap {:.2}%",
            state.iter,
            state.best_cost,
            state.lower_bound,
            100.0 * (state.best_cost - state.lower_bound) / state.best_cost,
        );
        println!(
            "REFN> {:2}: Fixed cost {:.2}, free rows {:.0}%, time {:.2}s",
            state.iter, state.fixed_cost, state.free_rows_pct, state.elapsed_secs,
        );
    }
}

/// Callback and stop poll bundle threaded through the solver.
pub struct SolverHooks {
    pub callback: Box<dyn Callback>,
    pub stopper: Stopper,
}

impl SolverHooks {
    pub fn new(callback: Box<dyn Callback>, stopper: Stopper) -> Self {
        Self { callback, stopper }
    }

    /// No output, no external interrupt; the environment's time limit still
    /// applies.
    pub fn silent() -> Self {
        Self {
            callback: Box::new(NoOpCallback {}),
            stopper: Stopper::new(),
        }
    }
}
