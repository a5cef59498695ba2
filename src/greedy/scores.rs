//! Per-column Lagrangian scores and the good-scores selection window.
//!
//! `gamma[j]` is column `j`'s cost minus the multipliers of its already
//! covered rows; `mu[j]` is the number of still-uncovered rows it would
//! cover. The live score combines the two and is updated incrementally as
//! coverage changes, confined to the affected columns.

use crate::coverage::CoverCounters;
use crate::instance::Instance;
use crate::{C, E, REMOVED_COL};

#[derive(Debug, Clone, Copy)]
pub struct ScoreData {
    pub score: E,
    pub idx: C,
}

/// Score as described in the paper: columns that would cover nothing are
/// pushed to +inf, positive gammas are diluted by coverage, negative gammas
/// amplified by it.
#[inline]
pub fn compute_score(gamma: E, mu: usize) -> E {
    if mu == 0 {
        E::INFINITY
    } else if gamma > 0.0 {
        gamma / mu as E
    } else {
        gamma * mu as E
    }
}

/// Column scores with the bookkeeping needed for incremental updates:
/// `score_map[j]` locates column `j` inside `scores` after partial
/// reorderings.
#[derive(Debug, Clone, Default)]
pub struct Scores {
    pub scores: Vec<ScoreData>,
    pub gammas: Vec<E>,
    covered_counts: Vec<usize>,
    score_map: Vec<C>,
}

impl Scores {
    /// Initializes every column's score from the preset `gammas` and full
    /// coverage counts.
    pub fn init(&mut self, inst: &Instance) {
        let ncols = inst.cols.size();
        debug_assert_eq!(self.gammas.len(), ncols, "gammas must be preset");

        self.scores.clear();
        self.score_map.clear();
        self.score_map.extend(0..ncols);
        self.covered_counts.clear();
        self.covered_counts.resize(ncols, 0);

        for j in 0..ncols {
            let mu = inst.cols.col(j).len();
            self.covered_counts[j] = mu;
            let score = compute_score(self.gammas[j], mu);
            debug_assert!(self.gammas[j].is_finite(), "gamma is not finite");
            self.scores.push(ScoreData { score, idx: j });
        }
    }

    /// Reacts to row `i` becoming covered: every column containing it loses
    /// one unit of useful coverage and regains `i`'s multiplier in gamma.
    fn on_row_covered(&mut self, row: &[C], i_mult: E) {
        for &j in row {
            self.covered_counts[j] -= 1;
            self.gammas[j] += i_mult;

            let s = self.score_map[j];
            debug_assert!(s != REMOVED_COL, "column is not in the score map");
            self.scores[s].score = compute_score(self.gammas[j], self.covered_counts[j]);
            debug_assert!(self.gammas[j].is_finite(), "gamma is not finite");
        }
    }

    /// Folds an already partially-built solution into the scores. Covers the
    /// solution's columns in `total_cover` and updates every column touching
    /// a covered row. Returns how many rows the solution covers.
    pub fn cover_solution(
        &mut self,
        inst: &Instance,
        sol_idxs: &[C],
        mults: &[E],
        total_cover: &mut CoverCounters,
    ) -> usize {
        let mut covered_rows = 0;
        for &j in sol_idxs {
            covered_rows += total_cover.cover(inst.cols.col(j));
        }
        for i in 0..total_cover.len() {
            if total_cover[i] > 0 {
                self.on_row_covered(&inst.rows[i], mults[i]);
            }
        }
        covered_rows
    }

    /// Incremental update after selecting the column at score slot
    /// `score_argmin`: only rows it newly covers (still at zero in
    /// `total_cover`) and the columns containing them are touched. Must be
    /// called before covering the column in `total_cover`.
    pub fn update_changed(
        &mut self,
        inst: &Instance,
        mults: &[E],
        total_cover: &CoverCounters,
        score_argmin: usize,
    ) {
        let jstar = self.scores[score_argmin].idx;
        let col_start = inst.cols.begs[jstar];
        let col_end = inst.cols.begs[jstar + 1];
        for o in col_start..col_end {
            let i = inst.cols.idxs[o];
            if total_cover[i] == 0 {
                self.on_row_covered(&inst.rows[i], mults[i]);
            }
        }
    }

    /// Partitions the scores so the `amount` smallest live ones are
    /// contiguous at the front, drops dead (+inf) entries, and refreshes the
    /// score map. Returns the window length (may be smaller than `amount`).
    pub fn select_good_scores(&mut self, amount: usize) -> usize {
        debug_assert!(amount > 0, "good window must be non-empty");

        let score_map = &mut self.score_map;
        self.scores.retain(|sd| {
            if sd.score < E::INFINITY {
                true
            } else {
                score_map[sd.idx] = REMOVED_COL;
                false
            }
        });

        let amount = amount.min(self.scores.len());
        if amount > 0 && amount < self.scores.len() {
            self.scores
                .select_nth_unstable_by(amount - 1, |a, b| cmp_score(*a, *b));
        }
        for (s, sd) in self.scores.iter().enumerate() {
            self.score_map[sd.idx] = s;
        }
        amount
    }

    /// Index (into `scores`) of the smallest score within the first
    /// `window` entries; ties break on the lower column index.
    pub fn argmin_in_window(&self, window: usize) -> usize {
        debug_assert!(window > 0 && window <= self.scores.len());
        let mut best = 0;
        for s in 1..window {
            if cmp_score(self.scores[s], self.scores[best]).is_lt() {
                best = s;
            }
        }
        best
    }
}

/// Orders by score, then by column index so equal scores resolve stably.
#[inline]
fn cmp_score(a: ScoreData, b: ScoreData) -> std::cmp::Ordering {
    a.score
        .partial_cmp(&b.score)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(a.idx.cmp(&b.idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::test_support::make_instance;

    fn scores_for(inst: &Instance, gammas: &[E]) -> Scores {
        let mut scores = Scores::default();
        scores.gammas = gammas.to_vec();
        scores.init(inst);
        scores
    }

    #[test]
    fn score_formula() {
        assert_eq!(compute_score(6.0, 3), 2.0);
        assert_eq!(compute_score(-2.0, 3), -6.0);
        assert_eq!(compute_score(1.0, 0), E::INFINITY);
    }

    #[test]
    fn init_uses_full_column_sizes() {
        let inst = make_instance(&[&[0, 1], &[1, 2], &[2]], &[4.0, 3.0, 5.0]);
        let scores = scores_for(&inst, &[4.0, 3.0, 5.0]);
        assert_eq!(scores.scores[0].score, 2.0);
        assert_eq!(scores.scores[1].score, 1.5);
        assert_eq!(scores.scores[2].score, 5.0);
    }

    #[test]
    fn covering_a_row_updates_only_its_columns() {
        let inst = make_instance(&[&[0, 1], &[1, 2], &[2]], &[4.0, 3.0, 5.0]);
        let mut scores = scores_for(&inst, &[4.0, 3.0, 5.0]);
        let mults = vec![1.0, 1.0, 1.0];
        let mut cover = CoverCounters::new(3);

        // Select column 0 at slot 0; rows 0 and 1 become covered.
        scores.update_changed(&inst, &mults, &cover, 0);
        cover.cover(inst.cols.col(0));

        // Column 0: mu 0 -> dead. Column 1: lost row 1, gamma 3+1=4, mu 1.
        assert_eq!(scores.scores[0].score, E::INFINITY);
        assert_eq!(scores.scores[1].score, 4.0);
        // Column 2 untouched.
        assert_eq!(scores.scores[2].score, 5.0);
    }

    #[test]
    fn good_scores_window_is_the_k_smallest() {
        // The wide column scores 20 / 4 = 5, above both singletons kept.
        let inst = make_instance(
            &[&[0], &[1], &[2], &[3], &[0, 1, 2, 3]],
            &[9.0, 2.0, 7.0, 4.0, 20.0],
        );
        let mut scores = scores_for(&inst, &[9.0, 2.0, 7.0, 4.0, 20.0]);
        let window = scores.select_good_scores(2);
        assert_eq!(window, 2);
        let mut window_scores: Vec<E> = scores.scores[..window].iter().map(|sd| sd.score).collect();
        window_scores.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(window_scores, vec![2.0, 4.0]);

        let s_min = scores.argmin_in_window(window);
        assert_eq!(scores.scores[s_min].idx, 1);
    }

    #[test]
    fn tie_breaks_on_lower_column_index() {
        let inst = make_instance(&[&[0], &[1], &[2]], &[3.0, 3.0, 3.0]);
        let mut scores = scores_for(&inst, &[3.0, 3.0, 3.0]);
        let window = scores.select_good_scores(3);
        let s_min = scores.argmin_in_window(window);
        assert_eq!(scores.scores[s_min].idx, 0);
    }
}
