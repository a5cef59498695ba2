//! A Lagrangian heuristic for the set covering problem.
//!
//! The solver follows the Caprara–Fischetti–Toth scheme: an outer
//! [refinement](crate::refinement) loop repeatedly fixes promising columns
//! and re-solves the shrunken residual with an inner
//! [three-phase](crate::three_phase) engine (subgradient dual ascent,
//! randomized greedy construction, column fixing).

/// Real type used for costs, multipliers and bounds.
pub type E = f64;
/// Column index type.
pub type C = usize;
/// Row index type.
pub type R = usize;

/// Tombstone marking a column removed during in-place compaction.
pub const REMOVED_COL: C = C::MAX;
/// Tombstone marking a row removed during in-place compaction.
pub const REMOVED_ROW: R = R::MAX;

pub mod callback;
pub mod coverage;
pub mod env;
pub mod fixing;
pub mod greedy;
pub mod instance;
pub mod interface;
pub mod progress;
pub mod random;
pub mod refinement;
pub mod stop;
pub mod subgradient;
pub mod three_phase;

pub use env::Environment;
pub use instance::{CoreInstance, Instance, SparseBinMat};
pub use refinement::{Refinement, SolveResult};

/// Status codes for the solver.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Status {
    /// The solver is still running.
    #[default]
    InProgress,
    /// The incumbent cost reached `beta * lower_bound + epsilon`.
    Optimal,
    /// The refinement loop exhausted the instance without closing the gap.
    Feasible,
    /// The solver stopped due to the time limit.
    TimeLimit,
    /// The solver was interrupted (e.g., by user or signal).
    Interrupted,
}

/// A primal solution: selected column indices and their total cost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    pub idxs: Vec<C>,
    pub cost: E,
}

impl Solution {
    /// An empty solution with an infinite sentinel cost.
    pub fn empty() -> Self {
        Self {
            idxs: Vec::new(),
            cost: E::INFINITY,
        }
    }

    pub fn clear(&mut self) {
        self.idxs.clear();
        self.cost = 0.0;
    }
}

/// A dual solution: Lagrangian multipliers and the bound they certify.
#[derive(Debug, Clone, Default)]
pub struct DualState {
    pub mults: Vec<E>,
    pub lb: E,
}

/// Pair of a column index and a cost of some sort (reduced cost, score, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColAndCost {
    pub idx: C,
    pub cost: E,
}

/// Debug-build check that `sol` is a feasible solution of `inst` and that its
/// recorded cost matches the column costs.
pub fn debug_check_solution(inst: &Instance, sol: &Solution) {
    if cfg!(debug_assertions) {
        let nrows = inst.rows.len();
        let mut cover = coverage::CoverCounters::new(nrows);
        let mut covered = 0;
        for &j in &sol.idxs {
            covered += cover.cover(inst.cols.col(j));
        }
        debug_assert_eq!(covered, nrows, "solution does not cover every row");

        let total: E = sol.idxs.iter().map(|&j| inst.costs[j]).sum();
        debug_assert!(
            (total - sol.cost).abs() < 1e-6,
            "recorded cost {} != column cost sum {}",
            sol.cost,
            total
        );
    }
}
