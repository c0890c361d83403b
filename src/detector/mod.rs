//! Mutant detector.
//!
//! Scans a square nucleotide grid for runs of four identical symbols in
//! four directions (horizontal, vertical, both diagonals). A grid with
//! at least two such runs is a mutant.
//!
//! ## Counting
//!
//! A run is identified by its start cell and direction, so a straight line
//! of five equal symbols counts as two runs, and one cell may start runs in
//! several directions. The scan stops as soon as the second run is found.

mod scan;

pub use scan::{Detector, Direction, ScanReport};
