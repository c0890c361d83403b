//! Content-addressed memoization of detector verdicts.
//!
//! [`AnalysisCache`] fingerprints each grid, answers repeated content
//! from the record store, and runs the detector only on the first miss.
//! The miss path is serialized per fingerprint and committed together
//! with the tally, so concurrent first submissions of one grid produce a
//! single record and a single count.

mod analysis;

pub use analysis::{AnalysisCache, CacheStats};
