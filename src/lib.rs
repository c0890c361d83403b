//! # mutant-scan
//!
//! Detects mutant DNA in square nucleotide grids and memoizes verdicts by
//! content fingerprint.
//!
//! A grid is a mutant when it holds at least two runs of four identical
//! symbols (horizontal, vertical or diagonal). Each distinct grid is
//! scanned once; later submissions are answered from the record store,
//! and a mutant/human tally is kept for first-time verdicts.
//!
//! ## Modules
//!
//! - [`detector`] - Run detection with early termination
//! - [`fingerprint`] - SHA-256 content keys
//! - [`store`] - Record stores (memory, SQLite)
//! - [`cache`] - Compute-once analysis cache
//! - [`stats`] - Tally reporting
//! - [`server`] - Line-delimited JSON server
//! - [`cli`] - Command line interface
//! - [`types`] - Shared types
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mutant_scan::cache::AnalysisCache;
//! use mutant_scan::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = AnalysisCache::with_store(Arc::new(MemoryStore::new()));
//!     let mutant = cache.analyze(&["AAAA", "CCCC", "TTAT", "AGAC"]).await.unwrap();
//!     assert!(mutant);
//! }
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod detector;
pub mod fingerprint;
pub mod server;
pub mod stats;
pub mod store;
pub mod types;

pub use types::config::Config;
pub use types::errors::{ScanError, ScanResult};
pub use types::grid::{Grid, GridError};
pub use types::responses::Verdict;
