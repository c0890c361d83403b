//! Row-major scan with early termination.

use crate::types::grid::{Grid, SEQUENCE_LENGTH};

/// Runs needed for a mutant verdict.
const MUTANT_THRESHOLD: usize = 2;

/// Direction a run extends from its start cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `(row, col) .. (row, col + 3)`.
    Horizontal,
    /// `(row, col) .. (row + 3, col)`.
    Vertical,
    /// `(row, col) .. (row - 3, col + 3)`.
    DiagonalAscending,
    /// `(row, col) .. (row + 3, col + 3)`.
    DiagonalDescending,
}

impl Direction {
    /// Order in which directions are tried at each cell.
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalAscending,
        Direction::DiagonalDescending,
    ];

    /// Whether a run starting at `(row, col)` fits inside an `n`×`n` grid.
    #[inline]
    pub fn fits(self, row: usize, col: usize, n: usize) -> bool {
        if n < SEQUENCE_LENGTH {
            return false;
        }
        let last = n - SEQUENCE_LENGTH;
        match self {
            Direction::Horizontal => col <= last,
            Direction::Vertical => row <= last,
            Direction::DiagonalAscending => row >= SEQUENCE_LENGTH - 1 && col <= last,
            Direction::DiagonalDescending => row <= last && col <= last,
        }
    }

    /// Cell `step` positions away from `(row, col)`. Only valid after `fits`.
    #[inline]
    fn offset(self, row: usize, col: usize, step: usize) -> (usize, usize) {
        match self {
            Direction::Horizontal => (row, col + step),
            Direction::Vertical => (row + step, col),
            Direction::DiagonalAscending => (row - step, col + step),
            Direction::DiagonalDescending => (row + step, col + step),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Horizontal => write!(f, "horizontal"),
            Direction::Vertical => write!(f, "vertical"),
            Direction::DiagonalAscending => write!(f, "diagonal_ascending"),
            Direction::DiagonalDescending => write!(f, "diagonal_descending"),
        }
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Whether the grid is a mutant.
    pub mutant: bool,

    /// Runs found before the scan stopped (at most 2).
    pub sequences: usize,

    /// Cells examined, including the one where the scan stopped.
    pub cells_visited: usize,
}

/// Stateless detector. Safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detector;

impl Detector {
    /// Creates a new detector.
    pub fn new() -> Self {
        Self
    }

    /// Classifies raw rows.
    ///
    /// Malformed input (empty, non-square, symbols outside `ATCG`) is
    /// reported as `false`.
    pub fn is_mutant<S: AsRef<str>>(&self, rows: &[S]) -> bool {
        match Grid::parse(rows) {
            Ok(grid) => self.is_mutant_grid(&grid),
            Err(e) => {
                tracing::debug!(reason = %e, "Rejected malformed DNA grid");
                false
            }
        }
    }

    /// Classifies an already validated grid.
    pub fn is_mutant_grid(&self, grid: &Grid) -> bool {
        self.scan(grid).mutant
    }

    /// Scans `grid` in row-major order and stops at the second run.
    pub fn scan(&self, grid: &Grid) -> ScanReport {
        let n = grid.size();
        let mut sequences = 0;
        let mut cells_visited = 0;

        for row in 0..n {
            for col in 0..n {
                cells_visited += 1;
                for direction in Direction::ALL {
                    if direction.fits(row, col, n) && Self::run_at(grid, row, col, direction) {
                        sequences += 1;
                        tracing::trace!(row, col, %direction, sequences, "Sequence found");
                        if sequences >= MUTANT_THRESHOLD {
                            return ScanReport {
                                mutant: true,
                                sequences,
                                cells_visited,
                            };
                        }
                    }
                }
            }
        }

        ScanReport {
            mutant: false,
            sequences,
            cells_visited,
        }
    }

    /// Whether the four cells from `(row, col)` along `direction` match.
    #[inline]
    fn run_at(grid: &Grid, row: usize, col: usize, direction: Direction) -> bool {
        let base = grid.cell(row, col);
        (1..SEQUENCE_LENGTH).all(|step| {
            let (r, c) = direction.offset(row, col, step);
            grid.cell(r, c) == base
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> Grid {
        Grid::parse(rows).unwrap()
    }

    #[test]
    fn test_horizontal_and_diagonal() {
        let dna = ["ATGCGA", "CAGTGC", "TTATGT", "AGAAGG", "CCCCTA", "TCACTG"];
        assert!(Detector::new().is_mutant(&dna));
    }

    #[test]
    fn test_vertical_sequences() {
        let dna = ["AAAAGA", "CAGTGC", "TTATGT", "AGAAGG", "CACCTA", "TCACTG"];
        assert!(Detector::new().is_mutant(&dna));
    }

    #[test]
    fn test_multiple_horizontal() {
        let dna = ["TTTTGA", "CAGTGC", "TTATGT", "AGAAGG", "CCCCTA", "TCACTG"];
        assert!(Detector::new().is_mutant(&dna));
    }

    #[test]
    fn test_descending_diagonal_and_horizontal() {
        let dna = ["ATGCGA", "CAGTGC", "TTATTT", "AGAAGG", "CCCCTA", "TCACTG"];
        assert!(Detector::new().is_mutant(&dna));
    }

    #[test]
    fn test_three_run_is_not_a_sequence() {
        let dna = ["ATGCGA", "CAGTGC", "TTATTT", "AGACGG", "GCGTCA", "TCACTG"];
        assert!(!Detector::new().is_mutant(&dna));
    }

    #[test]
    fn test_no_sequences() {
        let dna = ["ATGC", "CAGT", "TTAT", "AGAT"];
        let report = Detector::new().scan(&grid(&dna));
        assert!(!report.mutant);
        assert_eq!(report.sequences, 0);
        assert_eq!(report.cells_visited, 16);
    }

    #[test]
    fn test_two_rows_4x4() {
        let dna = ["AAAA", "CCCC", "TTAT", "AGAC"];
        assert!(Detector::new().is_mutant(&dna));
    }

    #[test]
    fn test_single_row_run_4x4_counts_once() {
        let dna = ["AAAA", "CGTC", "TTAT", "AGAC"];
        let report = Detector::new().scan(&grid(&dna));
        assert!(!report.mutant);
        assert_eq!(report.sequences, 1);
    }

    #[test]
    fn test_uniform_grid_stops_early() {
        let dna = ["AAAAAA"; 6];
        let report = Detector::new().scan(&grid(&dna));
        assert!(report.mutant);
        assert_eq!(report.sequences, 2);
        // (0,0) starts a horizontal and a vertical run
        assert_eq!(report.cells_visited, 1);
    }

    #[test]
    fn test_overlapping_run_counts_twice() {
        // one straight line of five A's starts two horizontal runs
        let dna = ["AAAAA", "CGTCG", "TCGTC", "GTCGT", "CGTCG"];
        let report = Detector::new().scan(&grid(&dna));
        assert!(report.mutant);
        assert_eq!(report.sequences, 2);
        assert_eq!(report.cells_visited, 2);
    }

    #[test]
    fn test_vertical_only() {
        let dna = ["ACGT", "ATGC", "AGTC", "ACTG"];
        let report = Detector::new().scan(&grid(&dna));
        assert_eq!(report.sequences, 1);
        assert!(!report.mutant);
    }

    #[test]
    fn test_descending_diagonal() {
        let dna = ["GCTA", "TGCC", "CAGT", "ATCG"];
        let report = Detector::new().scan(&grid(&dna));
        assert_eq!(report.sequences, 1);
        assert!(!report.mutant);
    }

    #[test]
    fn test_ascending_diagonal() {
        // G's from (3,0) up to (0,3)
        let dna = ["ACTG", "CTGA", "TGAC", "GACT"];
        let report = Detector::new().scan(&grid(&dna));
        assert_eq!(report.sequences, 1);
        assert!(!report.mutant);
    }

    #[test]
    fn test_grid_smaller_than_run() {
        let dna = ["AAA", "AAA", "AAA"];
        let report = Detector::new().scan(&grid(&dna));
        assert!(!report.mutant);
        assert_eq!(report.sequences, 0);
        assert_eq!(report.cells_visited, 9);
    }

    #[test]
    fn test_malformed_input_is_human() {
        let detector = Detector::new();
        let empty: [&str; 0] = [];
        assert!(!detector.is_mutant(&empty));
        assert!(!detector.is_mutant(&["ATGCGA", "CAGTGC", "TTATGT"]));
        assert!(!detector.is_mutant(&[
            "AAAAAA", "CAGTXC", "TTATGT", "AGAAGG", "CCCCTA", "TCACTG"
        ]));
    }

    #[test]
    fn test_fits_bounds() {
        assert!(Direction::Horizontal.fits(5, 2, 6));
        assert!(!Direction::Horizontal.fits(0, 3, 6));
        assert!(Direction::Vertical.fits(2, 5, 6));
        assert!(!Direction::Vertical.fits(3, 0, 6));
        assert!(Direction::DiagonalAscending.fits(3, 0, 6));
        assert!(!Direction::DiagonalAscending.fits(2, 0, 6));
        assert!(!Direction::DiagonalAscending.fits(5, 3, 6));
        assert!(Direction::DiagonalDescending.fits(2, 2, 6));
        assert!(!Direction::DiagonalDescending.fits(2, 3, 6));
        assert!(!Direction::Horizontal.fits(0, 0, 3));
    }

    #[test]
    fn test_verdict_depends_only_on_content() {
        let detector = Detector::new();
        let a = vec!["AAAA".to_string(), "CCCC".to_string(), "TTAT".to_string(), "AGAC".to_string()];
        let b: Vec<String> = a.clone();
        assert_eq!(detector.is_mutant(&a), detector.is_mutant(&b));
        assert_eq!(detector.is_mutant(&a), detector.is_mutant(&a));
    }
}
