//! Square nucleotide grid.

use std::fmt;

use thiserror::Error;

/// Length of a run that counts as a sequence.
pub const SEQUENCE_LENGTH: usize = 4;

/// Symbols a grid may contain.
pub const NUCLEOTIDES: [u8; 4] = [b'A', b'T', b'C', b'G'];

/// Reason a grid was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("DNA sequence is missing")]
    NullGrid,

    #[error("DNA sequence is empty")]
    Empty,

    #[error("row {row} is null")]
    NullRow { row: usize },

    #[error("row {row} has length {len}, expected {expected} (matrix must be NxN)")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("invalid symbol '{symbol}' at row {row}, column {col} (allowed: A, T, C, G)")]
    InvalidSymbol { row: usize, col: usize, symbol: char },
}

/// A validated n×n grid of nucleotides.
///
/// Cells live in a flat row-major buffer; `cell(row, col)` reads
/// `cells[row * n + col]`. Once built the grid is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Validates `rows` and builds a grid.
    ///
    /// The first violation in row-major order is reported.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            // chars().count() so a multi-byte symbol reports the right length
            let len = line.chars().count();
            if len != size {
                return Err(GridError::NotSquare {
                    row,
                    len,
                    expected: size,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                if !symbol.is_ascii() || !NUCLEOTIDES.contains(&(symbol as u8)) {
                    return Err(GridError::InvalidSymbol { row, col, symbol });
                }
                cells.push(symbol as u8);
            }
        }

        Ok(Self { size, cells })
    }

    /// Builds a grid from the shape a JSON transport produces, where the
    /// whole sequence or any single row may be `null`.
    pub fn from_nullable(rows: Option<&[Option<String>]>) -> Result<Self, GridError> {
        let rows = rows.ok_or(GridError::NullGrid)?;
        let present = rows
            .iter()
            .enumerate()
            .map(|(row, line)| line.as_deref().ok_or(GridError::NullRow { row }))
            .collect::<Result<Vec<&str>, _>>()?;
        Self::parse(&present)
    }

    /// Side length `n`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Symbol at `(row, col)`. Callers keep indices in bounds.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.size + col]
    }

    /// Iterates the rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.cells.chunks(self.size).map(|chunk| {
            // cells only ever hold ASCII nucleotides
            std::str::from_utf8(chunk).unwrap_or_default()
        })
    }

    /// All rows concatenated without separators.
    pub fn concat_bytes(&self) -> &[u8] {
        &self.cells
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_grid() {
        let grid = Grid::parse(&["ATGC", "CAGT", "TTAT", "AGAC"]).unwrap();
        assert_eq!(grid.size(), 4);
        assert_eq!(grid.cell(0, 0), b'A');
        assert_eq!(grid.cell(3, 3), b'C');
        assert_eq!(grid.rows().collect::<Vec<_>>(), vec!["ATGC", "CAGT", "TTAT", "AGAC"]);
        assert_eq!(grid.concat_bytes(), b"ATGCCAGTTTATAGAC");
    }

    #[test]
    fn test_single_cell_grid() {
        let grid = Grid::parse(&["G"]).unwrap();
        assert_eq!(grid.size(), 1);
    }

    #[test]
    fn test_empty_grid() {
        let rows: [&str; 0] = [];
        assert_eq!(Grid::parse(&rows), Err(GridError::Empty));
    }

    #[test]
    fn test_not_square() {
        let err = Grid::parse(&["ATGCGA", "CAGTGC", "TTATGT"]).unwrap_err();
        assert_eq!(
            err,
            GridError::NotSquare {
                row: 0,
                len: 6,
                expected: 3
            }
        );
    }

    #[test]
    fn test_ragged_rows() {
        let err = Grid::parse(&["ATG", "CA", "TTA"]).unwrap_err();
        assert!(matches!(err, GridError::NotSquare { row: 1, len: 2, .. }));
    }

    #[test]
    fn test_invalid_symbol() {
        let err = Grid::parse(&["ATG", "CXG", "TTA"]).unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidSymbol {
                row: 1,
                col: 1,
                symbol: 'X'
            }
        );
    }

    #[test]
    fn test_lowercase_is_invalid() {
        assert!(matches!(
            Grid::parse(&["at", "CG"]),
            Err(GridError::InvalidSymbol { row: 0, col: 0, .. })
        ));
    }

    #[test]
    fn test_multibyte_symbol_is_invalid() {
        assert!(matches!(
            Grid::parse(&["AÁ", "CG"]),
            Err(GridError::InvalidSymbol { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_from_nullable() {
        assert_eq!(Grid::from_nullable(None), Err(GridError::NullGrid));

        let rows = vec![Some("AT".to_string()), None];
        assert_eq!(
            Grid::from_nullable(Some(rows.as_slice())),
            Err(GridError::NullRow { row: 1 })
        );

        let rows = vec![Some("AT".to_string()), Some("CG".to_string())];
        assert!(Grid::from_nullable(Some(rows.as_slice())).is_ok());
    }

    #[test]
    fn test_display() {
        let grid = Grid::parse(&["AT", "CG"]).unwrap();
        assert_eq!(grid.to_string(), "AT\nCG");
    }
}
