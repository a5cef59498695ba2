//! Conversion from the loaders' neutral models into solver types.
//!
//! The loaders crate knows file formats; this module owns structural
//! validation (mutual column/row membership, no empty rows or columns,
//! finite costs) and warm-start checking.

use derive_more::{Display, Error};
use loaders::RawInstance;
use loaders::solution::RawSolution;

use crate::instance::{Instance, fill_rows_from_cols};
use crate::{C, E, Solution};

#[derive(Debug, Display, Error, PartialEq)]
pub enum ModelError {
    #[display("instance has no rows or no columns")]
    EmptyInstance,

    #[display("column {col} covers no row")]
    EmptyColumn { col: usize },

    #[display("column {col} repeats row {row}")]
    DuplicateRow { col: usize, row: usize },

    #[display("row {row} is covered by no column")]
    UncoveredRow { row: usize },

    #[display("column {col} lists row {row}, outside the {nrows} rows")]
    RowOutOfRange { col: usize, row: usize, nrows: usize },

    #[display("column {col} has a non-finite cost")]
    NonFiniteCost { col: usize },

    #[display("solution column {col} is outside the {ncols} columns")]
    ColOutOfRange { col: usize, ncols: usize },

    #[display("solution leaves row {row} uncovered")]
    InfeasibleSolution { row: usize },

    #[display("solution cost {recorded} does not match the column costs {actual}")]
    CostMismatch { recorded: E, actual: E },
}

impl TryFrom<RawInstance> for Instance {
    type Error = ModelError;

    /// Builds a well-formed [`Instance`], rejecting structural defects the
    /// parsers cannot see (uncovered rows in particular).
    fn try_from(raw: RawInstance) -> Result<Self, ModelError> {
        if raw.nrows == 0 || raw.cols.is_empty() {
            return Err(ModelError::EmptyInstance);
        }

        let mut inst = Instance::default();
        for (col, rows) in raw.cols.iter().enumerate() {
            if rows.is_empty() {
                return Err(ModelError::EmptyColumn { col });
            }
            let mut seen = rows.clone();
            seen.sort_unstable();
            for w in seen.windows(2) {
                if w[0] == w[1] {
                    return Err(ModelError::DuplicateRow { col, row: w[0] });
                }
            }
            for &row in rows {
                if row >= raw.nrows {
                    return Err(ModelError::RowOutOfRange {
                        col,
                        row,
                        nrows: raw.nrows,
                    });
                }
            }
            if !raw.costs[col].is_finite() {
                return Err(ModelError::NonFiniteCost { col });
            }
            inst.cols.push_col(rows);
        }
        inst.costs = raw.costs;

        fill_rows_from_cols(&inst.cols, raw.nrows, &mut inst.rows);
        if let Some(row) = inst.rows.iter().position(|r| r.is_empty()) {
            return Err(ModelError::UncoveredRow { row });
        }
        Ok(inst)
    }
}

/// Overrides every cost with 1.0 (the `-U` switch).
pub fn apply_unit_costs(inst: &mut Instance) {
    inst.costs.iter_mut().for_each(|c| *c = 1.0);
}

/// Builds a feasible [`Solution`] from bare column indices, computing the
/// cost from the instance.
pub fn solution_from_idxs(inst: &Instance, idxs: &[C]) -> Result<Solution, ModelError> {
    let ncols = inst.cols.size();
    let mut covered = vec![false; inst.rows.len()];
    let mut cost = 0.0;
    for &j in idxs {
        if j >= ncols {
            return Err(ModelError::ColOutOfRange { col: j, ncols });
        }
        cost += inst.costs[j];
        for &i in inst.cols.col(j) {
            covered[i] = true;
        }
    }
    if let Some(row) = covered.iter().position(|&c| !c) {
        return Err(ModelError::InfeasibleSolution { row });
    }
    Ok(Solution {
        idxs: idxs.to_vec(),
        cost,
    })
}

/// Validates a warm start read from a solution file: feasibility plus the
/// recorded cost matching the instance's column costs.
pub fn solution_from_file(inst: &Instance, raw: &RawSolution) -> Result<Solution, ModelError> {
    let sol = solution_from_idxs(inst, &raw.idxs)?;
    if (sol.cost - raw.cost).abs() > 1e-6 {
        return Err(ModelError::CostMismatch {
            recorded: raw.cost,
            actual: sol.cost,
        });
    }
    Ok(sol)
}

/// Serializes a solution for the writer.
pub fn solution_to_raw(sol: &Solution) -> RawSolution {
    RawSolution {
        cost: sol.cost,
        idxs: sol.idxs.clone(),
    }
}
