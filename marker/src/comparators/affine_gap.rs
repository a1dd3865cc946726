//! A comparator that globally aligns observed output against expected output, character by
//! character, using affine gap penalties.
//!
//! Opening a gap costs `gap_open + gap_extend` for its first character and `gap_extend` for every
//! further character of the same run, so one long insertion is cheaper than many short ones.
//!
//! The grid has one row per expected character and one column per observed character. Each cell
//! remembers which move produced its best score. When moves tie the preference is, in order, a gap
//! in the observed output, a diagonal match or substitution, then a gap in the expected output.
//! That order decides where credit lands when output is shifted, so it must not change.

use crate::traits::comparator::OutputComparator;
use crate::types::{AlignedColumn, AlignmentResult};
use util::execution_config::MarkingOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    /// Consume one expected and one observed character.
    Diagonal,
    /// Consume one expected character against a gap in the observed output.
    GapInObserved,
    /// Consume one observed character against a gap in the expected output.
    GapInExpected,
}

/// Needleman-Wunsch alignment with affine gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffineGapComparator {
    pub match_score: i64,
    pub substitution_score: i64,
    pub gap_open: i64,
    pub gap_extend: i64,
    pub gap_marker: char,
}

impl Default for AffineGapComparator {
    fn default() -> Self {
        Self::from_options(&MarkingOptions::default())
    }
}

impl AffineGapComparator {
    pub fn from_options(options: &MarkingOptions) -> Self {
        Self {
            match_score: options.match_score,
            substitution_score: options.substitution_score,
            gap_open: options.gap_open,
            gap_extend: options.gap_extend,
            gap_marker: options.gap_marker,
        }
    }

    fn pair_score(&self, expected: char, observed: char) -> i64 {
        if expected == observed {
            self.match_score
        } else {
            self.substitution_score
        }
    }
}

/// Score and move grids stored row-major, `rows x cols`.
struct Grid {
    cols: usize,
    scores: Vec<i64>,
    moves: Vec<Move>,
}

impl Grid {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            scores: vec![0; rows * cols],
            moves: vec![Move::Diagonal; rows * cols],
        }
    }

    fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    fn score(&self, i: usize, j: usize) -> i64 {
        self.scores[self.index(i, j)]
    }

    fn mv(&self, i: usize, j: usize) -> Move {
        self.moves[self.index(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, score: i64, mv: Move) {
        let idx = self.index(i, j);
        self.scores[idx] = score;
        self.moves[idx] = mv;
    }
}

impl OutputComparator for AffineGapComparator {
    fn align(&self, observed: &str, expected: &str) -> AlignmentResult {
        let obs: Vec<char> = observed.chars().collect();
        let exp: Vec<char> = expected.chars().collect();
        let (rows, cols) = (exp.len() + 1, obs.len() + 1);
        let mut grid = Grid::new(rows, cols);

        // Boundaries: a single gap run along each edge.
        for j in 1..cols {
            let open = if j == 1 { self.gap_open } else { 0 };
            let score = grid.score(0, j - 1) + self.gap_extend + open;
            grid.set(0, j, score, Move::GapInExpected);
        }
        for i in 1..rows {
            let open = if i == 1 { self.gap_open } else { 0 };
            let score = grid.score(i - 1, 0) + self.gap_extend + open;
            grid.set(i, 0, score, Move::GapInObserved);
        }

        for i in 1..rows {
            for j in 1..cols {
                let diagonal = grid.score(i - 1, j - 1) + self.pair_score(exp[i - 1], obs[j - 1]);

                let up = grid.score(i - 1, j)
                    + self.gap_extend
                    + if grid.mv(i - 1, j) == Move::GapInObserved {
                        0
                    } else {
                        self.gap_open
                    };

                let left = grid.score(i, j - 1)
                    + self.gap_extend
                    + if grid.mv(i, j - 1) == Move::GapInExpected {
                        0
                    } else {
                        self.gap_open
                    };

                let (score, mv) = if up >= diagonal && up >= left {
                    (up, Move::GapInObserved)
                } else if diagonal >= left {
                    (diagonal, Move::Diagonal)
                } else {
                    (left, Move::GapInExpected)
                };
                grid.set(i, j, score, mv);
            }
        }

        let mut columns = Vec::with_capacity(rows.max(cols));
        let (mut i, mut j) = (exp.len(), obs.len());
        while i > 0 || j > 0 {
            let mv = if i == 0 {
                Move::GapInExpected
            } else if j == 0 {
                Move::GapInObserved
            } else {
                grid.mv(i, j)
            };
            match mv {
                Move::Diagonal => {
                    columns.push(AlignedColumn {
                        observed: Some(obs[j - 1]),
                        expected: Some(exp[i - 1]),
                    });
                    i -= 1;
                    j -= 1;
                }
                Move::GapInObserved => {
                    columns.push(AlignedColumn {
                        observed: None,
                        expected: Some(exp[i - 1]),
                    });
                    i -= 1;
                }
                Move::GapInExpected => {
                    columns.push(AlignedColumn {
                        observed: Some(obs[j - 1]),
                        expected: None,
                    });
                    j -= 1;
                }
            }
        }
        columns.reverse();

        AlignmentResult {
            score: grid.score(exp.len(), obs.len()),
            columns,
            gap_marker: self.gap_marker,
        }
    }
}
