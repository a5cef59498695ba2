//! Solver configuration and the wall-clock timer polled by every loop head.

use crate::E;

/// Wall-clock timer with a deadline, polled cooperatively by the solver
/// loops. Cheap enough (`Instant::elapsed`) to check every iteration.
#[derive(Debug, Clone)]
pub struct Timer {
    start: std::time::Instant,
    limit: f64,
}

impl Timer {
    pub fn new(limit_secs: f64) -> Self {
        Self {
            start: std::time::Instant::now(),
            limit: limit_secs,
        }
    }

    /// Seconds elapsed since construction.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// True once the time budget is exhausted.
    pub fn expired(&self) -> bool {
        self.start.elapsed().as_secs_f64() >= self.limit
    }
}

/// Configuration container for a solver run.
///
/// Field defaults assume integer-cost instances (`epsilon` uses the "-1
/// trick"); users with continuous costs should set `epsilon` much smaller.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Wall-clock deadline in seconds.
    pub time_limit: f64,
    /// Verbosity level 0-5 controlling print thresholds.
    pub verbose: u64,
    /// Cost comparison tolerance.
    pub epsilon: E,
    /// Number of heuristic-phase iterations per three-phase cycle.
    pub heur_iters: usize,
    /// Geometric growth factor for the refinement fixing fraction.
    pub alpha: E,
    /// Refinement terminates once `cost <= beta * lb + epsilon`.
    pub beta: E,
    /// Fixing fraction right after an incumbent improvement.
    pub min_fixing: E,
    /// Subgradient early exit: minimum absolute LB improvement per period.
    pub abs_subgrad_exit: E,
    /// Subgradient early exit: minimum relative LB improvement per period.
    pub rel_subgrad_exit: E,
    /// PRNG seed.
    pub seed: u64,
    /// Override all column costs with 1.0.
    pub use_unit_costs: bool,
    /// Store the heuristic-phase multipliers associated with the best greedy
    /// primal instead of the best dual bound.
    pub heur_mults_from_greedy: bool,
    /// Wall clock started at construction.
    pub timer: Timer,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            time_limit: f64::INFINITY,
            verbose: 4,
            epsilon: 0.999,
            heur_iters: 250,
            alpha: 1.1,
            beta: 1.0,
            min_fixing: 0.3,
            abs_subgrad_exit: 1.0,
            rel_subgrad_exit: 0.001,
            seed: 0,
            use_unit_costs: false,
            heur_mults_from_greedy: false,
            timer: Timer::new(f64::INFINITY),
        }
    }
}

impl Environment {
    /// Creates an environment with defaults and starts its timer against
    /// `time_limit`.
    pub fn new(time_limit: f64) -> Self {
        Self {
            time_limit,
            timer: Timer::new(time_limit),
            ..Self::default()
        }
    }
}
